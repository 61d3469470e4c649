//! Helpers over [`serde_json::Value`], the run-time value of the language.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::error::EvalError;

/// Largest integer a double represents exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// One own property of a described value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Build a number value. Integral results stay integers so `1+1`
/// renders as `2`; non-finite results become `null`.
pub fn number(n: f64) -> Value {
    if !n.is_finite() {
        return Value::Null;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        // -0 renders as 0
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

/// Run-time type descriptor, as `typeof` reports it.
pub fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Bool(_) => "boolean",
        Value::Null | Value::Array(_) | Value::Object(_) => "object",
    }
}

/// Name used in error messages; distinguishes arrays and null.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Array(_) => "array",
        other => type_of(other),
    }
}

pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Structural equality; numbers compare by magnitude so `1 == 1.0`.
pub fn equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| equals(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| equals(x, y)))
        }
        _ => a == b,
    }
}

/// String conversion used by concatenation, `str()` and `log()`.
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Coerce for arithmetic. Only numbers qualify.
pub fn as_number(value: &Value, context: &str) -> Result<f64, EvalError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| EvalError::type_error("number out of range")),
        other => Err(EvalError::type_error(format!(
            "cannot {context} {}",
            kind_name(other)
        ))),
    }
}

/// Own property names and their types, in enumeration order.
pub fn own_properties(value: &Value) -> Result<Vec<Property>, EvalError> {
    let property = |name: String, v: &Value| Property {
        name,
        kind: type_of(v).to_string(),
    };
    let length = || Property {
        name: "length".to_string(),
        kind: "number".to_string(),
    };

    Ok(match value {
        Value::Null => {
            return Err(EvalError::type_error(
                "cannot convert undefined or null to object",
            ));
        }
        Value::Object(map) => map.iter().map(|(k, v)| property(k.clone(), v)).collect(),
        Value::Array(items) => {
            let mut props: Vec<Property> = items
                .iter()
                .enumerate()
                .map(|(i, v)| property(i.to_string(), v))
                .collect();
            props.push(length());
            props
        }
        Value::String(s) => {
            let count = s.chars().count();
            let mut props: Vec<Property> = (0..count)
                .map(|i| Property {
                    name: i.to_string(),
                    kind: "string".to_string(),
                })
                .collect();
            props.push(length());
            props
        }
        Value::Bool(_) | Value::Number(_) => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integral_numbers_stay_integers() {
        assert_eq!(number(2.0).to_string(), "2");
        assert_eq!(number(-0.0).to_string(), "0");
        assert_eq!(number(0.5).to_string(), "0.5");
    }

    #[test]
    fn non_finite_numbers_become_null() {
        assert_eq!(number(f64::NAN), Value::Null);
        assert_eq!(number(f64::INFINITY), Value::Null);
    }

    #[test]
    fn huge_integers_stay_floats() {
        assert!(number(1e300).is_f64());
    }

    #[test]
    fn typeof_descriptors() {
        assert_eq!(type_of(&json!(1)), "number");
        assert_eq!(type_of(&json!("x")), "string");
        assert_eq!(type_of(&json!(true)), "boolean");
        assert_eq!(type_of(&json!(null)), "object");
        assert_eq!(type_of(&json!([1])), "object");
        assert_eq!(type_of(&json!({})), "object");
    }

    #[test]
    fn truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!truthy(&falsy), "{falsy} should be falsy");
        }
        for t in [json!(true), json!(-1), json!("0"), json!([]), json!({})] {
            assert!(truthy(&t), "{t} should be truthy");
        }
    }

    #[test]
    fn numeric_equality_ignores_representation() {
        assert!(equals(&json!(1), &json!(1.0)));
        assert!(equals(&json!([1, {"a": 2}]), &json!([1.0, {"a": 2.0}])));
        assert!(!equals(&json!(1), &json!("1")));
        assert!(!equals(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
    }

    #[test]
    fn display_matches_string_conversion() {
        assert_eq!(display(&json!("x")), "x");
        assert_eq!(display(&json!(1.5)), "1.5");
        assert_eq!(display(&json!([1, null, "a"])), "1,,a");
        assert_eq!(display(&json!({"a": 1})), "[object Object]");
        assert_eq!(display(&json!(null)), "null");
    }

    #[test]
    fn object_properties_keep_insertion_order() {
        let props = own_properties(&json!({"b": "x", "a": 1})).unwrap();
        let names: Vec<&str> = props.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(props[0].kind, "string");
        assert_eq!(props[1].kind, "number");
    }

    #[test]
    fn array_properties_end_with_length() {
        let props = own_properties(&json!([true, {}])).unwrap();
        assert_eq!(
            props,
            vec![
                Property {
                    name: "0".to_string(),
                    kind: "boolean".to_string()
                },
                Property {
                    name: "1".to_string(),
                    kind: "object".to_string()
                },
                Property {
                    name: "length".to_string(),
                    kind: "number".to_string()
                },
            ]
        );
    }

    #[test]
    fn string_properties_are_indices() {
        let props = own_properties(&json!("hé")).unwrap();
        assert_eq!(props.len(), 3);
        assert_eq!(props[1].kind, "string");
        assert_eq!(props[2].name, "length");
    }

    #[test]
    fn primitives_have_no_properties() {
        assert!(own_properties(&json!(5)).unwrap().is_empty());
        assert!(own_properties(&json!(false)).unwrap().is_empty());
    }

    #[test]
    fn null_has_no_properties_to_enumerate() {
        assert!(own_properties(&json!(null)).is_err());
    }

    #[test]
    fn property_serializes_type_field() {
        let p = Property {
            name: "a".to_string(),
            kind: "number".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&p).unwrap(),
            r#"{"name":"a","type":"number"}"#
        );
    }
}
