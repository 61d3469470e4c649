pub mod poller;

use anyhow::Result;
use async_trait::async_trait;

/// The outermost boundary. main.rs only knows this trait.
#[async_trait]
pub trait Engine: Send {
    /// Drive the session until the counterpart disconnects. Only a
    /// transport failure ends it early.
    async fn run(&mut self) -> Result<SessionStats>;
}

/// Counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Completed exchanges, including the final disconnect.
    pub turns: u64,
    pub evaluations: u64,
    /// Evaluations whose payload was error text.
    pub errors: u64,
    pub describes: u64,
    pub keepalives: u64,
}
