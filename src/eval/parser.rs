//! Recursive-descent parser. Precedence, lowest first:
//! assignment, `?:`, `||`, `&&`, equality, relational, additive,
//! multiplicative, unary, postfix (`.`, `[]`, call), primary.

use serde_json::{Map, Value};

use super::ast::{BinaryOp, Expr, Program, UnaryOp};
use super::error::EvalError;
use super::lexer::{Spanned, Token, tokenize};
use super::value::number;

/// Limit on syntax tree height. Every level costs a handful of parser
/// frames and interpreter frames, so this stays inside a 2 MiB thread stack.
pub const MAX_DEPTH: usize = 64;

/// Binary operators and their binding power, loosest first.
const BINARY_OPS: &[(&str, BinaryOp, u8)] = &[
    ("||", BinaryOp::Or, 0),
    ("&&", BinaryOp::And, 1),
    ("===", BinaryOp::Eq, 2),
    ("!==", BinaryOp::Ne, 2),
    ("==", BinaryOp::Eq, 2),
    ("!=", BinaryOp::Ne, 2),
    ("<=", BinaryOp::Le, 3),
    (">=", BinaryOp::Ge, 3),
    ("<", BinaryOp::Lt, 3),
    (">", BinaryOp::Gt, 3),
    ("+", BinaryOp::Add, 4),
    ("-", BinaryOp::Sub, 4),
    ("*", BinaryOp::Mul, 5),
    ("/", BinaryOp::Div, 5),
    ("%", BinaryOp::Rem, 5),
];

pub fn parse(source: &str) -> Result<Program, EvalError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        index: 0,
        depth: 0,
    };
    parser.program()
}

struct Parser {
    tokens: Vec<Spanned>,
    index: usize,
    depth: usize,
}

impl Parser {
    fn program(&mut self) -> Result<Program, EvalError> {
        let mut statements = Vec::new();
        loop {
            while self.eat(";") {}
            if self.peek().is_none() {
                break;
            }
            statements.push(self.statement()?);
            if self.peek().is_some() && !self.eat(";") {
                return Err(self.unexpected());
            }
        }
        if statements.is_empty() {
            return Err(EvalError::syntax("unexpected end of input"));
        }
        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Expr, EvalError> {
        if self.peek_ident() == Some("let") {
            self.index += 1;
            let name = self.identifier()?;
            self.expect("=")?;
            let value = self.expression()?;
            return Ok(Expr::Assign(name, Box::new(value)));
        }
        self.expression()
    }

    fn expression(&mut self) -> Result<Expr, EvalError> {
        self.enter()?;
        let result = self.assignment();
        self.depth -= 1;
        result
    }

    /// Count one more level of tree height.
    fn enter(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::syntax("expression nested too deeply"));
        }
        Ok(())
    }

    fn assignment(&mut self) -> Result<Expr, EvalError> {
        let pos = self.position();
        let target = self.conditional()?;
        if !self.eat("=") {
            return Ok(target);
        }
        match target {
            Expr::Ident(name) => {
                let value = self.expression()?;
                Ok(Expr::Assign(name, Box::new(value)))
            }
            _ => Err(EvalError::syntax(format!(
                "invalid assignment target at {pos}"
            ))),
        }
    }

    fn conditional(&mut self) -> Result<Expr, EvalError> {
        let test = self.binary(0)?;
        if !self.eat("?") {
            return Ok(test);
        }
        let consequent = self.expression()?;
        self.expect(":")?;
        let alternate = self.expression()?;
        Ok(Expr::Conditional(
            Box::new(test),
            Box::new(consequent),
            Box::new(alternate),
        ))
    }

    /// Precedence climbing: folds every operator that binds at least as
    /// tightly as `min`, recursing only for right operands.
    fn binary(&mut self, min: u8) -> Result<Expr, EvalError> {
        let mut left = self.unary()?;
        let mut folds = 0;
        while let Some((op, power)) = self.peek_binary().filter(|(_, power)| *power >= min) {
            self.index += 1;
            self.enter()?;
            folds += 1;
            let right = self.binary(power + 1)?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.depth -= folds;
        Ok(left)
    }

    fn peek_binary(&self) -> Option<(BinaryOp, u8)> {
        let Some(Token::Punct(punct)) = self.peek() else {
            return None;
        };
        BINARY_OPS
            .iter()
            .find(|(symbol, ..)| symbol == punct)
            .map(|&(_, op, power)| (op, power))
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        // unary plus is a no-op
        while self.eat("+") {}

        let op = if self.eat("-") {
            Some(UnaryOp::Neg)
        } else if self.eat("!") {
            Some(UnaryOp::Not)
        } else if self.peek_ident() == Some("typeof") {
            self.index += 1;
            Some(UnaryOp::TypeOf)
        } else {
            None
        };

        match op {
            Some(op) => {
                self.enter()?;
                let operand = self.unary()?;
                self.depth -= 1;
                Ok(Expr::Unary(op, Box::new(operand)))
            }
            None => self.postfix(),
        }
    }

    fn postfix(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.primary()?;
        let mut folds = 0;
        loop {
            if matches!(self.peek(), Some(Token::Punct("." | "[" | "("))) {
                self.enter()?;
                folds += 1;
            }
            if self.eat(".") {
                let name = self.identifier()?;
                expr = Expr::Member(Box::new(expr), name);
            } else if self.eat("[") {
                let index = self.expression()?;
                self.expect("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else if self.eat("(") {
                let args = self.list(")")?;
                expr = Expr::Call(Box::new(expr), args);
            } else {
                self.depth -= folds;
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        let Some(spanned) = self.tokens.get(self.index).cloned() else {
            return Err(EvalError::syntax("unexpected end of input"));
        };
        self.index += 1;

        match spanned.token {
            Token::Number(n) => Ok(Expr::Literal(number(n))),
            Token::Str(s) => Ok(Expr::Literal(Value::String(s))),
            Token::Ident(name) => Ok(match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" | "undefined" => Expr::Literal(Value::Null),
                "let" | "typeof" => {
                    self.index -= 1;
                    return Err(self.unexpected());
                }
                _ => Expr::Ident(name),
            }),
            Token::Punct("(") => {
                let inner = self.expression()?;
                self.expect(")")?;
                Ok(inner)
            }
            Token::Punct("[") => Ok(Expr::Array(self.list("]")?)),
            Token::Punct("{") => self.object(),
            Token::Punct(_) => {
                self.index -= 1;
                Err(self.unexpected())
            }
        }
    }

    fn object(&mut self) -> Result<Expr, EvalError> {
        let mut entries: Vec<(String, Expr)> = Vec::new();
        loop {
            if self.eat("}") {
                break;
            }
            let key = match self.tokens.get(self.index).map(|s| s.token.clone()) {
                Some(Token::Ident(name)) => name,
                Some(Token::Str(s)) => s,
                Some(Token::Number(n)) => super::value::display(&number(n)),
                _ => return Err(self.unexpected()),
            };
            self.index += 1;
            self.expect(":")?;
            let value = self.expression()?;
            entries.push((key, value));
            if !self.eat(",") {
                self.expect("}")?;
                break;
            }
        }

        // constant objects fold into a literal
        if entries.iter().all(|(_, e)| matches!(e, Expr::Literal(_))) {
            let mut map = Map::new();
            for (key, expr) in entries {
                if let Expr::Literal(v) = expr {
                    map.insert(key, v);
                }
            }
            return Ok(Expr::Literal(Value::Object(map)));
        }
        Ok(Expr::Object(entries))
    }

    /// Comma-separated expressions up to `close`; trailing comma allowed.
    fn list(&mut self, close: &str) -> Result<Vec<Expr>, EvalError> {
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.expression()?);
            if !self.eat(",") {
                self.expect(close)?;
                return Ok(items);
            }
        }
    }

    fn identifier(&mut self) -> Result<String, EvalError> {
        match self.tokens.get(self.index).map(|s| &s.token) {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.index += 1;
                Ok(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index).map(|s| &s.token)
    }

    fn peek_ident(&self) -> Option<&str> {
        match self.peek() {
            Some(Token::Ident(name)) => Some(name),
            _ => None,
        }
    }

    fn position(&self) -> usize {
        self.tokens.get(self.index).map(|s| s.pos).unwrap_or(0)
    }

    fn eat(&mut self, punct: &str) -> bool {
        if matches!(self.peek(), Some(Token::Punct(p)) if *p == punct) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> Result<(), EvalError> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> EvalError {
        match self.tokens.get(self.index) {
            None => EvalError::syntax("unexpected end of input"),
            Some(spanned) => {
                let shown = match &spanned.token {
                    Token::Number(n) => super::value::display(&number(*n)),
                    Token::Str(s) => format!("{s:?}"),
                    Token::Ident(name) => name.clone(),
                    Token::Punct(p) => p.to_string(),
                };
                EvalError::syntax(format!("unexpected token '{shown}' at {}", spanned.pos))
            }
        }
    }
}
