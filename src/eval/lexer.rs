//! Tokenizer for the expression language.

use super::error::EvalError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Punct(&'static str),
}

/// A token and the character offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: usize,
}

/// Multi-character operators first so the longest match wins.
const PUNCTUATION: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "(", ")", "[", "]", "{", "}", ",", ".",
    ":", ";", "?", "+", "-", "*", "/", "%", "!", "=", "<", ">",
];

pub fn tokenize(source: &str) -> Result<Vec<Spanned>, EvalError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let start = i;

        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit()))
        {
            let (number, end) = read_number(&chars, i)?;
            tokens.push(Spanned {
                token: Token::Number(number),
                pos: start,
            });
            i = end;
            continue;
        }

        if c == '"' || c == '\'' {
            let (text, end) = read_string(&chars, i)?;
            tokens.push(Spanned {
                token: Token::Str(text),
                pos: start,
            });
            i = end;
            continue;
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            while i < chars.len() && is_ident_char(chars[i]) {
                i += 1;
            }
            tokens.push(Spanned {
                token: Token::Ident(chars[start..i].iter().collect()),
                pos: start,
            });
            continue;
        }

        let punct = PUNCTUATION.iter().find(|p| {
            p.chars()
                .enumerate()
                .all(|(offset, pc)| chars.get(i + offset) == Some(&pc))
        });
        match punct {
            Some(p) => {
                tokens.push(Spanned {
                    token: Token::Punct(*p),
                    pos: start,
                });
                i += p.chars().count();
            }
            None => {
                return Err(EvalError::syntax(format!(
                    "unexpected character '{c}' at {start}"
                )));
            }
        }
    }

    Ok(tokens)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn read_number(chars: &[char], start: usize) -> Result<(f64, usize), EvalError> {
    let mut i = start;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    if i < chars.len() && (chars[i].is_alphabetic() || chars[i] == '_') {
        return Err(EvalError::syntax(format!("invalid number literal at {start}")));
    }

    let text: String = chars[start..i].iter().collect();
    text.parse::<f64>()
        .map(|n| (n, i))
        .map_err(|_| EvalError::syntax(format!("invalid number literal at {start}")))
}

fn read_string(chars: &[char], start: usize) -> Result<(String, usize), EvalError> {
    let quote = chars[start];
    let mut out = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        let c = chars[i];
        if c == quote {
            return Ok((out, i + 1));
        }
        if c == '\n' {
            break;
        }
        if c == '\\' {
            i += 1;
            let Some(&escaped) = chars.get(i) else {
                break;
            };
            match escaped {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                '0' => out.push('\0'),
                'u' => {
                    let hex: String = chars.get(i + 1..i + 5).unwrap_or_default().iter().collect();
                    let code = u32::from_str_radix(&hex, 16)
                        .ok()
                        .filter(|_| hex.len() == 4)
                        .and_then(char::from_u32)
                        .ok_or_else(|| {
                            EvalError::syntax(format!("invalid unicode escape at {i}"))
                        })?;
                    out.push(code);
                    i += 4;
                }
                other => out.push(other),
            }
            i += 1;
            continue;
        }
        out.push(c);
        i += 1;
    }

    Err(EvalError::syntax(format!(
        "unterminated string literal at {start}"
    )))
}
