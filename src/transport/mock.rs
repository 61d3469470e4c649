use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::Transport;

/// A scripted counterpart for tests. Answers exchanges with pre-defined
/// commands in order and records everything it was sent.
pub struct MockTransport {
    responses: Vec<String>,
    index: AtomicUsize,
    sent: Mutex<Vec<String>>,
    logs: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new<S: Into<String>>(responses: impl IntoIterator<Item = S>) -> Self {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            index: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
            logs: Mutex::new(Vec::new()),
        }
    }

    /// Payloads sent via `exchange`, in order.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Messages forwarded via `log`, in order.
    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn exchange(&self, payload: &str) -> Result<String> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(payload.to_string());
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        self.responses.get(i).cloned().ok_or_else(|| {
            anyhow::anyhow!("MockTransport: no more responses (called {} times)", i + 1)
        })
    }

    async fn log(&self, message: &str) -> Result<()> {
        self.logs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
        Ok(())
    }
}
