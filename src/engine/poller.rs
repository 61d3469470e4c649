use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{Engine, SessionStats};
use crate::eval::{self, Environment, Evaluation};
use crate::protocol::{Command, EMPTY_DESCRIPTION, KEEPALIVE, READY};
use crate::transcript::{Transcript, TurnRecord};
use crate::transport::Transport;

/// Where the poller is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing sent yet; the first payload is `__READY`.
    Ready,
    /// A request is in flight.
    AwaitingCommand,
    Evaluating,
    Describing,
    /// The last command was a timeout; `__KEEPALIVE` goes next.
    KeepAlive,
    /// Terminal. No further requests are sent.
    Disconnected,
}

/// The long-poll loop. Sends the current payload, classifies the reply,
/// runs it against the environment and keeps the result for next turn.
pub struct PollerEngine {
    transport: Arc<dyn Transport>,
    env: Environment,
    transcript: Arc<dyn Transcript>,
    payload: String,
    state: SessionState,
    stats: SessionStats,
}

impl PollerEngine {
    pub fn new(
        transport: Arc<dyn Transport>,
        env: Environment,
        transcript: Arc<dyn Transcript>,
    ) -> Self {
        Self {
            transport,
            env,
            transcript,
            payload: READY.to_string(),
            state: SessionState::Ready,
            stats: SessionStats::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// What the next request will carry.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Perform one exchange. Returns `false` once disconnected; after
    /// that, calling it again sends nothing.
    pub async fn turn(&mut self) -> Result<bool> {
        if self.state == SessionState::Disconnected {
            return Ok(false);
        }

        self.state = SessionState::AwaitingCommand;
        debug!(payload = %self.payload, "-> counterpart");
        let incoming = self
            .transport
            .exchange(&self.payload)
            .await
            .context("tunnel exchange failed")?;
        debug!(command = %incoming, "<- counterpart");

        self.stats.turns += 1;
        let command = Command::classify(&incoming);
        let kind = command.kind();

        let next = match command {
            Command::Timeout => {
                self.state = SessionState::KeepAlive;
                self.stats.keepalives += 1;
                Some(KEEPALIVE.to_string())
            }
            Command::Disconnect => {
                self.state = SessionState::Disconnected;
                None
            }
            Command::Describe(target) => {
                self.state = SessionState::Describing;
                self.stats.describes += 1;
                Some(self.describe(&target).await)
            }
            Command::Evaluate(source) => {
                self.state = SessionState::Evaluating;
                self.stats.evaluations += 1;
                Some(self.evaluate(&source).await)
            }
        };

        let record = TurnRecord {
            seq: self.stats.turns,
            kind: kind.to_string(),
            outgoing: self.payload.clone(),
            incoming,
        };
        if let Err(e) = self.transcript.record(record).await {
            warn!(error = %e, "failed to record turn");
        }

        match next {
            Some(payload) => {
                self.payload = payload;
                Ok(true)
            }
            None => {
                info!(turns = self.stats.turns, "counterpart disconnected");
                Ok(false)
            }
        }
    }

    async fn evaluate(&mut self, source: &str) -> String {
        let Evaluation { result, logs } = eval::evaluate(source, &mut self.env);
        self.forward_logs(logs).await;
        match result {
            Ok(value) => eval::render(&value),
            Err(e) => {
                debug!(error = %e, "evaluation failed");
                self.stats.errors += 1;
                e.to_string()
            }
        }
    }

    async fn describe(&mut self, target: &str) -> String {
        let Evaluation { result, logs } = eval::describe(target, &mut self.env);
        self.forward_logs(logs).await;
        match result {
            Ok(properties) => eval::render_properties(&properties),
            Err(e) => {
                warn!(expression = %target, error = %e, "describe failed");
                EMPTY_DESCRIPTION.to_string()
            }
        }
    }

    /// Best effort: a lost log line never affects the session.
    async fn forward_logs(&self, logs: Vec<String>) {
        for message in logs {
            if let Err(e) = self.transport.log(&message).await {
                warn!(error = %e, "failed to forward log message");
            }
        }
    }
}

#[async_trait]
impl Engine for PollerEngine {
    async fn run(&mut self) -> Result<SessionStats> {
        info!("session started");
        while self.turn().await? {}
        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::sqlite::SqliteTranscript;
    use crate::transport::mock::MockTransport;

    fn engine(responses: &[&str]) -> (PollerEngine, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new(responses.iter().copied()));
        let transcript = Arc::new(SqliteTranscript::in_memory().unwrap());
        let engine = PollerEngine::new(transport.clone(), Environment::new(), transcript);
        (engine, transport)
    }

    #[test]
    fn starts_ready() {
        let (engine, _) = engine(&[]);
        assert_eq!(engine.state(), SessionState::Ready);
        assert_eq!(engine.payload(), "__READY");
    }

    #[tokio::test]
    async fn state_follows_command_kind() {
        let (mut engine, _) = engine(&[
            "__USER_INPUT_TIMEOUT",
            "1",
            "__DESCRIBE 1",
            "__DISCONNECT",
        ]);

        assert!(engine.turn().await.unwrap());
        assert_eq!(engine.state(), SessionState::KeepAlive);

        assert!(engine.turn().await.unwrap());
        assert_eq!(engine.state(), SessionState::Evaluating);

        assert!(engine.turn().await.unwrap());
        assert_eq!(engine.state(), SessionState::Describing);

        assert!(!engine.turn().await.unwrap());
        assert_eq!(engine.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn transport_error_leaves_state_awaiting() {
        let (mut engine, _) = engine(&[]);
        assert!(engine.turn().await.is_err());
        assert_eq!(engine.state(), SessionState::AwaitingCommand);
    }
}
