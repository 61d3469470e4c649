pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One completed exchange with the counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Position in the session, starting at 1.
    pub seq: u64,
    /// How the incoming command was classified.
    pub kind: String,
    pub outgoing: String,
    pub incoming: String,
}

/// Where turns are kept after the loop has moved on.
#[async_trait]
pub trait Transcript: Send + Sync {
    async fn record(&self, turn: TurnRecord) -> Result<()>;
    async fn turns(&self) -> Result<Vec<TurnRecord>>;
}
