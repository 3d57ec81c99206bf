//! Restricted arithmetic expressions.
//!
//! This is the language `eval` calls are evaluated in.  It deliberately
//! covers only what a calculator needs:
//!
//! ```text
//! expr    := term   (('+' | '-') term)*
//! term    := unary  (('*' | '/' | '%') unary)*
//! unary   := ('-' | '+') unary | primary
//! primary := NUMBER | '(' expr ')'
//! NUMBER  := DIGITS ('.' DIGITS)?
//! ```
//!
//! Integer arithmetic stays integral and is overflow-checked.  `/` returns an
//! integer when the division is exact and a float otherwise, so `7/2` is
//! `3.5` and `6/3` is `2`.

use serde_json::Value;
use thiserror::Error;

/// Maximum nesting of parentheses and unary operators.
const MAX_DEPTH: usize = 64;

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Errors produced while parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token at offset {offset}")]
    UnexpectedToken { offset: usize },

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("expression nested deeper than {MAX_DEPTH} levels")]
    TooDeep,

    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow")]
    Overflow,
}

/// A numeric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// JSON form of the value.  Integral floats within the exactly
    /// representable range are emitted as integers (`1`, not `1.0`).
    pub fn to_json(self) -> Value {
        match self {
            Number::Int(i) => Value::from(i),
            Number::Float(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
                Value::from(f as i64)
            }
            Number::Float(f) => Value::from(f),
        }
    }
}

/// Parses and evaluates `source`.
///
/// # Errors
///
/// Returns [`ExpressionError`] if `source` is not a well-formed expression or
/// if evaluation divides by zero or overflows.
///
/// # Example
///
/// ```rust
/// use wsrpc_client::domain::{evaluate, Number};
///
/// assert_eq!(evaluate("1+1").unwrap(), Number::Int(2));
/// assert_eq!(evaluate("(1 + 2) * -3").unwrap(), Number::Int(-9));
/// ```
pub fn evaluate(source: &str) -> Result<Number, ExpressionError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(ExpressionError::Empty);
    }
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    match parser.peek() {
        None => Ok(value),
        Some(tok) => Err(ExpressionError::UnexpectedToken { offset: tok.offset }),
    }
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum TokenKind {
    Num(Number),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn tokenize(source: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        let kind = match ch {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => {
                let mut end = offset;
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Num(parse_number(&source[offset..end])?),
                    offset,
                });
                continue;
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            other => return Err(ExpressionError::UnexpectedChar { ch: other, offset }),
        };
        chars.next();
        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

fn parse_number(literal: &str) -> Result<Number, ExpressionError> {
    let invalid = || ExpressionError::InvalidNumber(literal.to_string());
    match literal.split_once('.') {
        None => literal
            .parse::<i64>()
            .map(Number::Int)
            .map_err(|_| ExpressionError::Overflow),
        Some((whole, frac)) => {
            if whole.is_empty() || frac.is_empty() || frac.contains('.') {
                return Err(invalid());
            }
            literal.parse::<f64>().map(Number::Float).map_err(|_| invalid())
        }
    }
}

// ── Parser / evaluator ────────────────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expr(&mut self) -> Result<Number, ExpressionError> {
        let mut acc = self.term()?;
        while let Some(tok) = self.peek() {
            let op = match tok.kind {
                TokenKind::Plus => add,
                TokenKind::Minus => sub,
                _ => break,
            };
            self.bump();
            let rhs = self.term()?;
            acc = op(acc, rhs)?;
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<Number, ExpressionError> {
        let mut acc = self.unary()?;
        while let Some(tok) = self.peek() {
            let op = match tok.kind {
                TokenKind::Star => mul,
                TokenKind::Slash => div,
                TokenKind::Percent => rem,
                _ => break,
            };
            self.bump();
            let rhs = self.unary()?;
            acc = op(acc, rhs)?;
        }
        Ok(acc)
    }

    fn unary(&mut self) -> Result<Number, ExpressionError> {
        match self.peek().map(|t| t.kind) {
            Some(TokenKind::Minus) => {
                self.bump();
                let value = self.nested(Self::unary)?;
                neg(value)
            }
            Some(TokenKind::Plus) => {
                self.bump();
                self.nested(Self::unary)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Number, ExpressionError> {
        let tok = self.bump().ok_or(ExpressionError::UnexpectedEnd)?;
        match tok.kind {
            TokenKind::Num(n) => Ok(n),
            TokenKind::LParen => {
                let value = self.nested(Self::expr)?;
                match self.bump() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(value),
                    Some(other) => Err(ExpressionError::UnexpectedToken {
                        offset: other.offset,
                    }),
                    None => Err(ExpressionError::UnexpectedEnd),
                }
            }
            _ => Err(ExpressionError::UnexpectedToken { offset: tok.offset }),
        }
    }

    fn nested(
        &mut self,
        f: fn(&mut Self) -> Result<Number, ExpressionError>,
    ) -> Result<Number, ExpressionError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExpressionError::TooDeep);
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

fn finite(f: f64) -> Result<Number, ExpressionError> {
    if f.is_finite() {
        Ok(Number::Float(f))
    } else {
        Err(ExpressionError::Overflow)
    }
}

fn add(a: Number, b: Number) -> Result<Number, ExpressionError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            x.checked_add(y).map(Number::Int).ok_or(ExpressionError::Overflow)
        }
        _ => finite(a.as_f64() + b.as_f64()),
    }
}

fn sub(a: Number, b: Number) -> Result<Number, ExpressionError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            x.checked_sub(y).map(Number::Int).ok_or(ExpressionError::Overflow)
        }
        _ => finite(a.as_f64() - b.as_f64()),
    }
}

fn mul(a: Number, b: Number) -> Result<Number, ExpressionError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            x.checked_mul(y).map(Number::Int).ok_or(ExpressionError::Overflow)
        }
        _ => finite(a.as_f64() * b.as_f64()),
    }
}

fn div(a: Number, b: Number) -> Result<Number, ExpressionError> {
    match (a, b) {
        (_, Number::Int(0)) => Err(ExpressionError::DivisionByZero),
        (Number::Int(x), Number::Int(y)) if x.checked_rem(y) == Some(0) => {
            x.checked_div(y).map(Number::Int).ok_or(ExpressionError::Overflow)
        }
        _ if b.as_f64() == 0.0 => Err(ExpressionError::DivisionByZero),
        _ => finite(a.as_f64() / b.as_f64()),
    }
}

fn rem(a: Number, b: Number) -> Result<Number, ExpressionError> {
    match (a, b) {
        (_, Number::Int(0)) => Err(ExpressionError::DivisionByZero),
        (Number::Int(x), Number::Int(y)) => {
            x.checked_rem(y).map(Number::Int).ok_or(ExpressionError::Overflow)
        }
        _ if b.as_f64() == 0.0 => Err(ExpressionError::DivisionByZero),
        _ => finite(a.as_f64() % b.as_f64()),
    }
}

fn neg(a: Number) -> Result<Number, ExpressionError> {
    match a {
        Number::Int(x) => x.checked_neg().map(Number::Int).ok_or(ExpressionError::Overflow),
        Number::Float(f) => Ok(Number::Float(-f)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
