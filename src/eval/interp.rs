use serde_json::{Map, Value};

use super::ast::{BinaryOp, Expr, Program, UnaryOp};
use super::builtins;
use super::env::Environment;
use super::error::EvalError;
use super::value::{as_number, display, equals, kind_name, number, truthy, type_of};

/// Tree-walking interpreter over a borrowed environment.
pub struct Interpreter<'a> {
    env: &'a mut Environment,
    logs: Vec<String>,
}

impl<'a> Interpreter<'a> {
    pub fn new(env: &'a mut Environment) -> Self {
        Self {
            env,
            logs: Vec::new(),
        }
    }

    pub fn run(&mut self, program: &Program) -> Result<Value, EvalError> {
        let mut last = Value::Null;
        for statement in &program.statements {
            last = self.eval(statement)?;
        }
        Ok(last)
    }

    /// Messages recorded by `log()` so far, including those from a run
    /// that later failed.
    pub fn into_logs(self) -> Vec<String> {
        self.logs
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Array(items) => Ok(Value::Array(
                items
                    .iter()
                    .map(|item| self.eval(item))
                    .collect::<Result<_, _>>()?,
            )),
            Expr::Object(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    let value = self.eval(value)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::Object(map))
            }
            Expr::Ident(name) => self.lookup(name),
            Expr::Member(target, name) => {
                let target = self.eval(target)?;
                property(&target, name)
            }
            Expr::Index(target, index) => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                property(&target, &display(&index))
            }
            Expr::Call(callee, args) => self.call(callee, args),
            Expr::Unary(op, operand) => self.unary(*op, operand),
            Expr::Binary(BinaryOp::And, left, right) => {
                let left = self.eval(left)?;
                if truthy(&left) { self.eval(right) } else { Ok(left) }
            }
            Expr::Binary(BinaryOp::Or, left, right) => {
                let left = self.eval(left)?;
                if truthy(&left) { Ok(left) } else { self.eval(right) }
            }
            Expr::Binary(op, left, right) => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                binary(*op, &left, &right)
            }
            Expr::Conditional(test, consequent, alternate) => {
                if truthy(&self.eval(test)?) {
                    self.eval(consequent)
                } else {
                    self.eval(alternate)
                }
            }
            Expr::Assign(name, value) => {
                let value = self.eval(value)?;
                self.env.set(name.clone(), value.clone());
                Ok(value)
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        self.env
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::Reference(name.to_string()))
    }

    fn call(&mut self, callee: &Expr, args: &[Expr]) -> Result<Value, EvalError> {
        let Expr::Ident(name) = callee else {
            return Err(EvalError::type_error("expression is not a function"));
        };
        if self.env.contains(name) {
            return Err(EvalError::type_error(format!("{name} is not a function")));
        }
        if !builtins::is_builtin(name) {
            return Err(EvalError::Reference(name.clone()));
        }
        let args = args
            .iter()
            .map(|arg| self.eval(arg))
            .collect::<Result<Vec<_>, _>>()?;
        builtins::call(name, args, &mut self.logs)
    }

    fn unary(&mut self, op: UnaryOp, operand: &Expr) -> Result<Value, EvalError> {
        if op == UnaryOp::TypeOf
            && let Expr::Ident(name) = operand
            && !self.env.contains(name)
        {
            let kind = if builtins::is_builtin(name) {
                "function"
            } else {
                "undefined"
            };
            return Ok(Value::String(kind.to_string()));
        }

        let value = self.eval(operand)?;
        Ok(match op {
            UnaryOp::Neg => number(-as_number(&value, "negate")?),
            UnaryOp::Not => Value::Bool(!truthy(&value)),
            UnaryOp::TypeOf => Value::String(type_of(&value).to_string()),
        })
    }
}

/// Read `name` from a value: object field, array/string index or
/// `length`. Missing properties read as `null`.
fn property(target: &Value, name: &str) -> Result<Value, EvalError> {
    let length = |n: usize| number(n as f64);
    Ok(match target {
        Value::Null => {
            return Err(EvalError::type_error(format!(
                "cannot read properties of null (reading '{name}')"
            )));
        }
        Value::Object(map) => map.get(name).cloned().unwrap_or(Value::Null),
        Value::Array(items) if name == "length" => length(items.len()),
        Value::Array(items) => name
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get(i).cloned())
            .unwrap_or(Value::Null),
        Value::String(s) if name == "length" => length(s.chars().count()),
        Value::String(s) => name
            .parse::<usize>()
            .ok()
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::String(c.to_string()))
            .unwrap_or(Value::Null),
        Value::Bool(_) | Value::Number(_) => Value::Null,
    })
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add => {
            if left.is_string() || right.is_string() {
                return Ok(Value::String(display(left) + &display(right)));
            }
            if let (Value::Number(_), Value::Number(_)) = (left, right) {
                return Ok(number(
                    as_number(left, "add")? + as_number(right, "add")?,
                ));
            }
            Err(EvalError::type_error(format!(
                "cannot add {} and {}",
                kind_name(left),
                kind_name(right)
            )))
        }
        BinaryOp::Sub => Ok(number(
            as_number(left, "subtract")? - as_number(right, "subtract")?,
        )),
        BinaryOp::Mul => Ok(number(
            as_number(left, "multiply")? * as_number(right, "multiply")?,
        )),
        BinaryOp::Div | BinaryOp::Rem => {
            let l = as_number(left, "divide")?;
            let r = as_number(right, "divide")?;
            if r == 0.0 {
                return Err(EvalError::Range("division by zero".to_string()));
            }
            Ok(number(if op == BinaryOp::Div { l / r } else { l % r }))
        }
        BinaryOp::Eq => Ok(Value::Bool(equals(left, right))),
        BinaryOp::Ne => Ok(Value::Bool(!equals(left, right))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (left, right) {
                (Value::Number(_), Value::Number(_)) => as_number(left, "compare")?
                    .partial_cmp(&as_number(right, "compare")?),
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => {
                    return Err(EvalError::type_error(format!(
                        "cannot compare {} and {}",
                        kind_name(left),
                        kind_name(right)
                    )));
                }
            };
            let Some(ordering) = ordering else {
                return Ok(Value::Bool(false));
            };
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::Le => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            }))
        }
        // short-circuiting happens in `eval`; these only pick the operand
        BinaryOp::And => Ok((if truthy(left) { right } else { left }).clone()),
        BinaryOp::Or => Ok((if truthy(left) { left } else { right }).clone()),
    }
}
