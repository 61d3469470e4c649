//! Functions callable by name from expressions.

use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

use super::error::EvalError;
use super::value::{display, kind_name, number, type_of};

pub const NAMES: &[&str] = &[
    "keys", "values", "len", "inspect", "log", "str", "num", "upper", "lower", "now",
];

pub fn is_builtin(name: &str) -> bool {
    NAMES.contains(&name)
}

/// Call a builtin. `log` appends to `logs` instead of printing.
pub fn call(name: &str, args: Vec<Value>, logs: &mut Vec<String>) -> Result<Value, EvalError> {
    match name {
        "log" => {
            let line = args.iter().map(display).collect::<Vec<_>>().join(" ");
            logs.push(line);
            Ok(Value::Null)
        }
        "now" => {
            arity(name, &args, 0)?;
            let millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as f64)
                .unwrap_or(0.0);
            Ok(number(millis))
        }
        _ => {
            arity(name, &args, 1)?;
            let arg = &args[0];
            match name {
                "keys" => Ok(Value::Array(
                    entries(arg)?
                        .into_iter()
                        .map(|(k, _)| Value::String(k))
                        .collect(),
                )),
                "values" => Ok(Value::Array(
                    entries(arg)?.into_iter().map(|(_, v)| v).collect(),
                )),
                "len" => len(arg),
                "inspect" => inspect(arg),
                "str" => Ok(Value::String(display(arg))),
                "num" => to_number(arg),
                "upper" => Ok(Value::String(string_arg(name, arg)?.to_uppercase())),
                "lower" => Ok(Value::String(string_arg(name, arg)?.to_lowercase())),
                other => Err(EvalError::Reference(other.to_string())),
            }
        }
    }
}

fn arity(name: &str, args: &[Value], expected: usize) -> Result<(), EvalError> {
    if args.len() != expected {
        return Err(EvalError::type_error(format!(
            "{name} expects {expected} argument(s), got {}",
            args.len()
        )));
    }
    Ok(())
}

fn string_arg<'a>(name: &str, value: &'a Value) -> Result<&'a str, EvalError> {
    value.as_str().ok_or_else(|| {
        EvalError::type_error(format!(
            "{name} expects a string, got {}",
            kind_name(value)
        ))
    })
}

/// Enumerable own entries: object fields, array items, string chars.
fn entries(value: &Value) -> Result<Vec<(String, Value)>, EvalError> {
    Ok(match value {
        Value::Null => {
            return Err(EvalError::type_error(
                "cannot convert undefined or null to object",
            ));
        }
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v.clone()))
            .collect(),
        Value::String(s) => s
            .chars()
            .enumerate()
            .map(|(i, c)| (i.to_string(), Value::String(c.to_string())))
            .collect(),
        Value::Bool(_) | Value::Number(_) => Vec::new(),
    })
}

fn len(value: &Value) -> Result<Value, EvalError> {
    let n = match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => {
            return Err(EvalError::type_error(format!(
                "len expects a string, array or object, got {}",
                kind_name(other)
            )));
        }
    };
    Ok(number(n as f64))
}

/// Sorted `"<type> [<key>] = <value>"` lines, one per entry.
fn inspect(value: &Value) -> Result<Value, EvalError> {
    let mut entries = entries(value)?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(Value::Array(
        entries
            .into_iter()
            .map(|(k, v)| Value::String(format!("{} [{}] = {}", type_of(&v), k, display(&v))))
            .collect(),
    ))
}

fn to_number(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Number(_) => Ok(value.clone()),
        Value::Null => Ok(number(0.0)),
        Value::Bool(b) => Ok(number(if *b { 1.0 } else { 0.0 })),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(number(0.0));
            }
            Ok(trimmed.parse::<f64>().map(number).unwrap_or(Value::Null))
        }
        other => Err(EvalError::type_error(format!(
            "cannot convert {} to number",
            kind_name(other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        call(name, args, &mut Vec::new())
    }

    #[test]
    fn keys_and_values_of_object() {
        let obj = json!({"b": 1, "a": 2});
        assert_eq!(run("keys", vec![obj.clone()]).unwrap(), json!(["b", "a"]));
        assert_eq!(run("values", vec![obj]).unwrap(), json!([1, 2]));
    }

    #[test]
    fn keys_of_array_are_indices() {
        assert_eq!(run("keys", vec![json!([7, 8])]).unwrap(), json!(["0", "1"]));
    }

    #[test]
    fn keys_of_null_fails() {
        assert!(run("keys", vec![json!(null)]).is_err());
    }

    #[test]
    fn len_counts_chars() {
        assert_eq!(run("len", vec![json!("héllo")]).unwrap(), json!(5));
        assert_eq!(run("len", vec![json!([1, 2, 3])]).unwrap(), json!(3));
        assert!(run("len", vec![json!(3)]).is_err());
    }

    #[test]
    fn inspect_sorts_keys() {
        let lines = run("inspect", vec![json!({"b": "x", "a": 1})]).unwrap();
        assert_eq!(lines, json!(["number [a] = 1", "string [b] = x"]));
    }

    #[test]
    fn log_records_joined_args() {
        let mut logs = Vec::new();
        let result = call("log", vec![json!("count"), json!(3)], &mut logs).unwrap();
        assert_eq!(result, Value::Null);
        assert_eq!(logs, vec!["count 3".to_string()]);
    }

    #[test]
    fn num_conversions() {
        assert_eq!(run("num", vec![json!(" 42 ")]).unwrap(), json!(42));
        assert_eq!(run("num", vec![json!("1.5")]).unwrap(), json!(1.5));
        assert_eq!(run("num", vec![json!("abc")]).unwrap(), Value::Null);
        assert_eq!(run("num", vec![json!(true)]).unwrap(), json!(1));
        assert!(run("num", vec![json!([])]).is_err());
    }

    #[test]
    fn case_conversion_requires_strings() {
        assert_eq!(run("upper", vec![json!("abc")]).unwrap(), json!("ABC"));
        assert_eq!(run("lower", vec![json!("ABC")]).unwrap(), json!("abc"));
        let err = run("upper", vec![json!(1)]).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: upper expects a string, got number");
    }

    #[test]
    fn wrong_arity() {
        let err = run("keys", vec![]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: keys expects 1 argument(s), got 0"
        );
        assert!(run("now", vec![json!(1)]).is_err());
    }

    #[test]
    fn now_is_positive() {
        let now = run("now", vec![]).unwrap();
        assert!(now.as_f64().unwrap() > 0.0);
    }

    #[test]
    fn every_name_is_callable() {
        for name in NAMES {
            assert!(is_builtin(name));
        }
        assert!(!is_builtin("eval"));
    }
}
