//! The process-wide registry of names expressions evaluate against.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value, json};
use std::path::Path;

/// Name → value bindings. Created at startup and handed to the evaluator;
/// only assignment expressions change it afterwards.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: Map<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// An environment holding the `process` descriptor for this session.
    pub fn for_process(endpoint: &str) -> Self {
        let mut env = Self::new();
        env.set(
            "process",
            json!({
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "pid": std::process::id(),
                "endpoint": endpoint,
            }),
        );
        env
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bind every top-level entry of a JSON object. Returns how many
    /// names were bound.
    pub fn seed(&mut self, value: Value) -> Result<usize> {
        let Value::Object(entries) = value else {
            bail!("seed must be a JSON object, got {}", super::value::kind_name(&value));
        };
        let count = entries.len();
        for (name, value) in entries {
            self.set(name, value);
        }
        Ok(count)
    }

    /// Load seed bindings from a JSON file.
    pub fn seed_from_file(&mut self, path: &Path) -> Result<usize> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("seed file {} is not valid JSON", path.display()))?;
        self.seed(value)
    }
}
