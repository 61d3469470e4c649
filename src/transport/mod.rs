pub mod http;
pub mod mock;

use anyhow::Result;
use async_trait::async_trait;

/// The tunnel to the counterpart. One request in flight at a time.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send this turn's payload and wait for the next command.
    async fn exchange(&self, payload: &str) -> Result<String>;

    /// Forward a diagnostic message as a `__LOG` request outside the
    /// turn sequence. The response body is ignored.
    async fn log(&self, message: &str) -> Result<()>;
}
