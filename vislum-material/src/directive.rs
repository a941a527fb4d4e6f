use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static DIRECTIVE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*([A-Za-z_]+)\b(.*)$").unwrap());

static DEFINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)(\([^)]*\))?\s*(.*)$").unwrap());

static IDENTIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// A preprocessor directive recognized by the composer.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Directive<'a> {
    Define(&'a str, &'a str),
    Undef(&'a str),
    Ifdef(&'a str),
    Ifndef(&'a str),
    If(&'a str),
    Elif(&'a str),
    Else,
    Endif,
    /// A directive the composer has no use for, like `#version` or `#line`.
    Other(&'a str),
    /// A recognized directive with a missing or invalid operand.
    Malformed(&'static str),
}

/// Drops a trailing `//` comment.
fn strip_comment(text: &str) -> &str {
    match text.find("//") {
        Some(index) => text[..index].trim(),
        None => text.trim(),
    }
}

fn parse_identifier(text: &str) -> Option<&str> {
    IDENTIFIER_REGEX.is_match(text).then_some(text)
}

impl<'a> Directive<'a> {
    /// Parses `line`, returning `None` when it is not a directive.
    pub fn parse(line: &'a str) -> Option<Self> {
        let caps = DIRECTIVE_REGEX.captures(line)?;
        let name = caps.get(1)?.as_str();
        let rest = strip_comment(caps.get(2).map_or("", |rest| rest.as_str()));

        let directive = match name {
            "define" => match DEFINE_REGEX.captures(rest) {
                Some(caps) => {
                    let name = caps.get(1).map_or("", |name| name.as_str());
                    let value = caps.get(3).map_or("", |value| value.as_str());
                    Directive::Define(name, value)
                }
                None => Directive::Malformed("#define"),
            },
            "undef" => parse_identifier(rest).map_or(Directive::Malformed("#undef"), Directive::Undef),
            "ifdef" => parse_identifier(rest).map_or(Directive::Malformed("#ifdef"), Directive::Ifdef),
            "ifndef" => parse_identifier(rest).map_or(Directive::Malformed("#ifndef"), Directive::Ifndef),
            "if" if rest.is_empty() => Directive::Malformed("#if"),
            "if" => Directive::If(rest),
            "elif" if rest.is_empty() => Directive::Malformed("#elif"),
            "elif" => Directive::Elif(rest),
            "else" => Directive::Else,
            "endif" => Directive::Endif,
            other => Directive::Other(other),
        };

        Some(directive)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token {0}")]
    UnexpectedToken(String),

    #[error("{0} does not expand to an integer")]
    NotAnInteger(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Integer(i64),
    Identifier(&'a str),
    Defined,
    Not,
    And,
    Or,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    OpenParen,
    CloseParen,
}

fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim().trim_end_matches(['u', 'U']);
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

fn tokenize(expression: &str) -> Result<Vec<Token<'_>>, ExpressionError> {
    let bytes = expression.as_bytes();
    let mut tokens = Vec::new();
    let mut index = 0;

    while index < bytes.len() {
        let byte = bytes[index];
        let next = bytes.get(index + 1).copied();

        let (token, len) = match byte {
            b' ' | b'\t' => {
                index += 1;
                continue;
            }
            b'(' => (Token::OpenParen, 1),
            b')' => (Token::CloseParen, 1),
            b'&' if next == Some(b'&') => (Token::And, 2),
            b'|' if next == Some(b'|') => (Token::Or, 2),
            b'=' if next == Some(b'=') => (Token::Equal, 2),
            b'!' if next == Some(b'=') => (Token::NotEqual, 2),
            b'!' => (Token::Not, 1),
            b'<' if next == Some(b'=') => (Token::LessEqual, 2),
            b'<' => (Token::Less, 1),
            b'>' if next == Some(b'=') => (Token::GreaterEqual, 2),
            b'>' => (Token::Greater, 1),
            b'0'..=b'9' => {
                let len = bytes[index..]
                    .iter()
                    .take_while(|b| b.is_ascii_alphanumeric())
                    .count();
                let literal = &expression[index..index + len];
                let value = parse_integer(literal).ok_or_else(|| ExpressionError::UnexpectedToken(literal.to_owned()))?;
                (Token::Integer(value), len)
            }
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => {
                let len = bytes[index..]
                    .iter()
                    .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                    .count();
                match &expression[index..index + len] {
                    "defined" => (Token::Defined, len),
                    identifier => (Token::Identifier(identifier), len),
                }
            }
            _ => {
                let c = expression[index..].chars().next().unwrap_or('\0');
                return Err(ExpressionError::UnexpectedCharacter(c));
            }
        };

        tokens.push(token);
        index += len;
    }

    Ok(tokens)
}

/// Recursive descent over the tokens of one `#if` expression.
///
/// Precedence, lowest first: `||`, `&&`, equality, relational, unary `!`.
struct ExpressionParser<'a, 'd> {
    tokens: Vec<Token<'a>>,
    position: usize,
    defines: &'d HashMap<String, String>,
}

impl<'a> ExpressionParser<'a, '_> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Result<Token<'a>, ExpressionError> {
        let token = self.tokens.get(self.position).cloned().ok_or(ExpressionError::UnexpectedEnd)?;
        self.position += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: Token<'a>) -> Result<(), ExpressionError> {
        let token = self.next()?;
        if token == expected {
            Ok(())
        } else {
            Err(ExpressionError::UnexpectedToken(format!("{token:?}")))
        }
    }

    fn or(&mut self) -> Result<i64, ExpressionError> {
        let mut value = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.position += 1;
            let rhs = self.and()?;
            value = (value != 0 || rhs != 0) as i64;
        }
        Ok(value)
    }

    fn and(&mut self) -> Result<i64, ExpressionError> {
        let mut value = self.equality()?;
        while self.peek() == Some(&Token::And) {
            self.position += 1;
            let rhs = self.equality()?;
            value = (value != 0 && rhs != 0) as i64;
        }
        Ok(value)
    }

    fn equality(&mut self) -> Result<i64, ExpressionError> {
        let mut value = self.relational()?;
        loop {
            let op = match self.peek() {
                Some(Token::Equal) => Token::Equal,
                Some(Token::NotEqual) => Token::NotEqual,
                _ => return Ok(value),
            };
            self.position += 1;
            let rhs = self.relational()?;
            value = match op {
                Token::Equal => (value == rhs) as i64,
                _ => (value != rhs) as i64,
            };
        }
    }

    fn relational(&mut self) -> Result<i64, ExpressionError> {
        let mut value = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(op @ (Token::Less | Token::LessEqual | Token::Greater | Token::GreaterEqual)) => op.clone(),
                _ => return Ok(value),
            };
            self.position += 1;
            let rhs = self.unary()?;
            value = match op {
                Token::Less => (value < rhs) as i64,
                Token::LessEqual => (value <= rhs) as i64,
                Token::Greater => (value > rhs) as i64,
                _ => (value >= rhs) as i64,
            };
        }
    }

    fn unary(&mut self) -> Result<i64, ExpressionError> {
        match self.next()? {
            Token::Not => Ok((self.unary()? == 0) as i64),
            Token::Integer(value) => Ok(value),
            Token::OpenParen => {
                let value = self.or()?;
                self.expect(Token::CloseParen)?;
                Ok(value)
            }
            Token::Defined => {
                let parenthesized = self.peek() == Some(&Token::OpenParen);
                if parenthesized {
                    self.position += 1;
                }
                let name = match self.next()? {
                    Token::Identifier(name) => name,
                    token => return Err(ExpressionError::UnexpectedToken(format!("{token:?}"))),
                };
                if parenthesized {
                    self.expect(Token::CloseParen)?;
                }
                Ok(self.defines.contains_key(name) as i64)
            }
            // Undefined identifiers evaluate to zero.
            Token::Identifier(name) => match self.defines.get(name) {
                None => Ok(0),
                Some(value) => parse_integer(value).ok_or_else(|| ExpressionError::NotAnInteger(name.to_owned())),
            },
            token => Err(ExpressionError::UnexpectedToken(format!("{token:?}"))),
        }
    }
}

/// Evaluates an `#if` expression against `defines`. Non-zero is true.
pub(crate) fn evaluate(expression: &str, defines: &HashMap<String, String>) -> Result<bool, ExpressionError> {
    let mut parser = ExpressionParser {
        tokens: tokenize(expression)?,
        position: 0,
        defines,
    };

    let value = parser.or()?;
    match parser.peek() {
        None => Ok(value != 0),
        Some(token) => Err(ExpressionError::UnexpectedToken(format!("{token:?}"))),
    }
}
