//! A small expression language evaluated against an explicit
//! [`Environment`].
//!
//! This is not general code execution: expressions can read
//! and bind names, build JSON values, do arithmetic and comparisons, and
//! call a fixed set of builtins (see [`builtins::NAMES`]).

mod ast;
pub mod builtins;
pub mod env;
pub mod error;
mod interp;
mod lexer;
mod parser;
pub mod value;

pub use env::Environment;
pub use error::EvalError;
pub use parser::MAX_DEPTH;
pub use value::Property;

use serde_json::Value;

use interp::Interpreter;

/// The outcome of evaluating one command, plus any messages the
/// expression passed to `log()` before it finished or failed.
#[derive(Debug)]
pub struct Evaluation<T = Value> {
    pub result: Result<T, EvalError>,
    pub logs: Vec<String>,
}

/// Evaluate `source` against `env`. Assignments persist in `env`.
pub fn evaluate(source: &str, env: &mut Environment) -> Evaluation {
    let program = match parser::parse(source) {
        Ok(program) => program,
        Err(e) => {
            return Evaluation {
                result: Err(e),
                logs: Vec::new(),
            };
        }
    };
    let mut interpreter = Interpreter::new(env);
    let result = interpreter.run(&program);
    Evaluation {
        result,
        logs: interpreter.into_logs(),
    }
}

/// Evaluate `source` and list the own properties of the result.
pub fn describe(source: &str, env: &mut Environment) -> Evaluation<Vec<Property>> {
    let Evaluation { result, logs } = evaluate(source, env);
    Evaluation {
        result: result.and_then(|value| value::own_properties(&value)),
        logs,
    }
}

/// Pretty JSON with two-space indentation.
pub fn render(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| e.to_string())
}

/// Compact JSON array of `{name, type}` entries.
pub fn render_properties(properties: &[Property]) -> String {
    serde_json::to_string(properties).unwrap_or_else(|_| "[]".to_string())
}
