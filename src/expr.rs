//! Arithmetic expression evaluator shared by the keypad and the query fallback.
//!
//! The lexer is the allow-list: it maps the display symbols `×` and `÷` to
//! their operators, skips whitespace and rejects every character outside the
//! active [`Dialect`]. Parsing is plain recursive descent with the usual
//! precedence (`* /` over `+ -`), unary signs and parentheses.

use std::f64::consts::PI;
use std::fmt;

use crate::error::{CalcError, CalcResult};

/// Which characters the lexer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Digits, `+ - * / . ( )` and the display symbols `×` `÷`.
    Keypad,
    /// Everything the keypad accepts, plus `π` and exponent notation (`2e3`).
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

/// Evaluates keypad input such as `"12 + 7"` or `"3 × (4 ÷ 2)"`.
pub fn evaluate_expression(text: &str) -> CalcResult {
    evaluate_in(text, Dialect::Keypad)
}

/// Evaluates `text` under the given dialect.
///
/// Non-finite results (`1/0`, `0/0`) are returned as values, not errors.
pub fn evaluate_in(text: &str, dialect: Dialect) -> CalcResult {
    let tokens = tokenize(text, dialect)?;
    if tokens.is_empty() {
        return Err(CalcError::EmptyExpression);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expression()?;
    match parser.peek() {
        None => Ok(value),
        Some(Token::RParen) => Err(CalcError::ClosingBracketMismatch),
        Some(tok) => Err(CalcError::UnexpectedToken(tok.to_string())),
    }
}

fn tokenize(text: &str, dialect: Dialect) -> Result<Vec<Token>, CalcError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let token = match ch {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '0'..='9' | '.' => {
                let (value, next) = lex_number(&chars, i, dialect)?;
                i = next;
                tokens.push(Token::Number(value));
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' | '×' => Token::Star,
            '/' | '÷' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            'π' if dialect == Dialect::Query => Token::Number(PI),
            _ => return Err(CalcError::InvalidCharacter { ch, pos: i }),
        };
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

/// Lexes a decimal literal starting at `start` and returns it with the index
/// just past it.
fn lex_number(chars: &[char], start: usize, dialect: Dialect) -> Result<(f64, usize), CalcError> {
    let mut i = start;
    let mut seen_dot = false;
    let mut seen_digit = false;

    while i < chars.len() {
        match chars[i] {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            '.' => {
                let literal: String = chars[start..=i].iter().collect();
                return Err(CalcError::MalformedNumber(literal));
            }
            _ => break,
        }
        i += 1;
    }

    if dialect == Dialect::Query && seen_digit && chars.get(i) == Some(&'e') {
        i += 1;
        if matches!(chars.get(i), Some('+') | Some('-')) {
            i += 1;
        }
        let exp_start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            let literal: String = chars[start..i].iter().collect();
            return Err(CalcError::MalformedNumber(literal));
        }
    }

    let literal: String = chars[start..i].iter().collect();
    if !seen_digit {
        return Err(CalcError::MalformedNumber(literal));
    }
    literal
        .parse::<f64>()
        .map(|value| (value, i))
        .map_err(|_| CalcError::MalformedNumber(literal))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> CalcResult {
        let mut acc = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            acc = if op == Token::Plus { acc + rhs } else { acc - rhs };
        }
        Ok(acc)
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> CalcResult {
        let mut acc = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            acc = if op == Token::Star { acc * rhs } else { acc / rhs };
        }
        Ok(acc)
    }

    fn unary(&mut self) -> CalcResult {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> CalcResult {
        match self.advance() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let inner = self.expression()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    Some(tok) => Err(CalcError::UnexpectedToken(tok.to_string())),
                    None => Err(CalcError::OpenBracketMismatch),
                }
            }
            Some(Token::RParen) => Err(CalcError::ClosingBracketMismatch),
            Some(tok) => Err(CalcError::UnexpectedToken(tok.to_string())),
            None => Err(CalcError::UnexpectedEnd),
        }
    }
}
