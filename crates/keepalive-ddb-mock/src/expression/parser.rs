//! Lexer and recursive-descent parser for the expression subset the store
//! client emits.
//!
//! ```text
//! cond   := clause (AND clause)*
//! clause := ident '=' ':'bind
//!         | attribute_exists '(' ident ')'
//!         | attribute_not_exists '(' ident ')'
//!         | '(' cond ')'
//! update := SET ident '=' ':'bind (',' ident '=' ':'bind)*
//! ```
//!
//! Keywords and function names match case-insensitively. Bind variables are
//! resolved while parsing, so a parsed expression is self-contained.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use keepalive_ddb_model::types::ExpressionAttributeValues;
use keepalive_ddb_model::{
    AttributeValue, is_expression_word, is_reserved_word, reserved_keyword_message,
};

use super::predicate::{Assignment, Predicate};

/// Errors produced while parsing an expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    /// An unexpected token was encountered.
    #[error("Invalid expression: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },
    /// A bind variable has no value.
    #[error("Invalid expression: An expression attribute value used in expression is not defined; attribute value: :{name}")]
    UnresolvedValue {
        /// The bind variable, without its `:`.
        name: String,
    },
    /// An attribute name is a reserved word.
    #[error("{}", reserved_keyword_message(.0))]
    ReservedKeyword(String),
    /// A recognised construct outside the supported subset.
    #[error("Invalid expression: unsupported {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Identifier(String),
    Placeholder(String),
    ValueRef(String),
    Eq,
    Comma,
    LParen,
    RParen,
    And,
    Set,
    AttributeExists,
    AttributeNotExists,
    /// A DynamoDB keyword or operator the subset does not support.
    Other(String),
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(s) => write!(f, "identifier '{s}'"),
            Self::Placeholder(s) => write!(f, "#{s}"),
            Self::ValueRef(s) => write!(f, ":{s}"),
            Self::Eq => write!(f, "'='"),
            Self::Comma => write!(f, "','"),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::And => write!(f, "AND"),
            Self::Set => write!(f, "SET"),
            Self::AttributeExists => write!(f, "attribute_exists"),
            Self::AttributeNotExists => write!(f, "attribute_not_exists"),
            Self::Other(s) => write!(f, "'{s}'"),
            Self::Eof => write!(f, "end of expression"),
        }
    }
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, ExpressionError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ExpressionError> {
        while self.chars.peek().is_some_and(char::is_ascii_whitespace) {
            self.chars.next();
        }
        let Some(&ch) = self.chars.peek() else {
            return Ok(Token::Eof);
        };

        match ch {
            '#' => {
                self.chars.next();
                Ok(Token::Placeholder(self.read_ident_chars()))
            }
            ':' => {
                self.chars.next();
                let name = self.read_ident_chars();
                if name.is_empty() {
                    return Err(ExpressionError::UnexpectedToken {
                        expected: "value name after ':'".to_owned(),
                        found: "empty".to_owned(),
                    });
                }
                Ok(Token::ValueRef(name))
            }
            '=' => {
                self.chars.next();
                Ok(Token::Eq)
            }
            ',' => {
                self.chars.next();
                Ok(Token::Comma)
            }
            '(' => {
                self.chars.next();
                Ok(Token::LParen)
            }
            ')' => {
                self.chars.next();
                Ok(Token::RParen)
            }
            '<' | '>' | '+' | '-' | '.' | '[' | ']' => {
                self.chars.next();
                let mut op = ch.to_string();
                if let Some(&next) = self.chars.peek() {
                    if matches!((ch, next), ('<', '=' | '>') | ('>', '=')) {
                        op.push(next);
                        self.chars.next();
                    }
                }
                Ok(Token::Other(op))
            }
            c if is_ident_start(c) => Ok(self.read_identifier_or_keyword()),
            _ => Err(ExpressionError::UnexpectedToken {
                expected: "valid token".to_owned(),
                found: format!("'{ch}'"),
            }),
        }
    }

    fn read_ident_chars(&mut self) -> String {
        let mut s = String::new();
        while let Some(&c) = self.chars.peek() {
            if is_ident_continue(c) {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let ident = self.read_ident_chars();
        match ident.to_ascii_lowercase().as_str() {
            "and" => Token::And,
            "set" => Token::Set,
            "attribute_exists" => Token::AttributeExists,
            "attribute_not_exists" => Token::AttributeNotExists,
            _ if is_expression_word(&ident) => Token::Other(ident),
            _ => Token::Identifier(ident),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Parser<'v> {
    tokens: Vec<Token>,
    pos: usize,
    values: &'v ExpressionAttributeValues,
}

impl<'v> Parser<'v> {
    fn new(input: &str, values: &'v ExpressionAttributeValues) -> Result<Self, ExpressionError> {
        Ok(Self {
            tokens: Lexer::new(input).tokenize()?,
            pos: 0,
            values,
        })
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ExpressionError> {
        let token = self.advance();
        if token == *expected {
            Ok(())
        } else {
            Err(unexpected(&expected.to_string(), &token))
        }
    }

    fn expect_end(&mut self) -> Result<(), ExpressionError> {
        match self.advance() {
            Token::Eof => Ok(()),
            Token::Other(op) => Err(ExpressionError::Unsupported(format!("operator '{op}'"))),
            token => Err(unexpected("end of expression", &token)),
        }
    }

    fn attribute(&mut self) -> Result<String, ExpressionError> {
        match self.advance() {
            Token::Identifier(name) => {
                if is_reserved_word(&name) {
                    return Err(ExpressionError::ReservedKeyword(name));
                }
                Ok(name)
            }
            Token::Placeholder(name) => Err(ExpressionError::Unsupported(format!(
                "attribute name placeholder #{name}"
            ))),
            token => Err(unexpected("attribute name", &token)),
        }
    }

    fn bind(&mut self) -> Result<AttributeValue, ExpressionError> {
        match self.advance() {
            Token::ValueRef(name) => self
                .values
                .get(&format!(":{name}"))
                .cloned()
                .ok_or(ExpressionError::UnresolvedValue { name }),
            Token::Other(op) => Err(ExpressionError::Unsupported(format!("operator '{op}'"))),
            token => Err(unexpected("bind variable", &token)),
        }
    }

    fn condition(&mut self, out: &mut Vec<Predicate>) -> Result<(), ExpressionError> {
        self.clause(out)?;
        while *self.peek() == Token::And {
            self.advance();
            self.clause(out)?;
        }
        Ok(())
    }

    fn clause(&mut self, out: &mut Vec<Predicate>) -> Result<(), ExpressionError> {
        match self.peek().clone() {
            Token::LParen => {
                self.advance();
                self.condition(out)?;
                self.expect(&Token::RParen)
            }
            Token::AttributeExists | Token::AttributeNotExists => {
                let function = self.advance();
                self.expect(&Token::LParen)?;
                let attribute = self.attribute()?;
                self.expect(&Token::RParen)?;
                out.push(if function == Token::AttributeExists {
                    Predicate::Exists(attribute)
                } else {
                    Predicate::NotExists(attribute)
                });
                Ok(())
            }
            Token::Other(word) => Err(ExpressionError::Unsupported(format!("'{word}'"))),
            _ => {
                let attribute = self.attribute()?;
                match self.advance() {
                    Token::Eq => {}
                    Token::Other(op) => {
                        return Err(ExpressionError::Unsupported(format!("operator '{op}'")));
                    }
                    token => return Err(unexpected("'='", &token)),
                }
                let value = self.bind()?;
                out.push(Predicate::Equals { attribute, value });
                Ok(())
            }
        }
    }

    fn assignment(&mut self) -> Result<Assignment, ExpressionError> {
        let attribute = self.attribute()?;
        self.expect(&Token::Eq)?;
        let value = self.bind()?;
        Ok(Assignment { attribute, value })
    }
}

fn unexpected(expected: &str, found: &Token) -> ExpressionError {
    ExpressionError::UnexpectedToken {
        expected: expected.to_owned(),
        found: found.to_string(),
    }
}

/// Parses a condition expression into the predicates it conjoins.
pub fn parse_condition(
    expression: &str,
    values: &ExpressionAttributeValues,
) -> Result<Vec<Predicate>, ExpressionError> {
    let mut parser = Parser::new(expression, values)?;
    let mut predicates = Vec::new();
    parser.condition(&mut predicates)?;
    parser.expect_end()?;
    Ok(predicates)
}

/// Parses a `SET` update expression into its assignments, in order.
pub fn parse_update(
    expression: &str,
    values: &ExpressionAttributeValues,
) -> Result<Vec<Assignment>, ExpressionError> {
    let mut parser = Parser::new(expression, values)?;
    match parser.advance() {
        Token::Set => {}
        Token::Other(word) => {
            return Err(ExpressionError::Unsupported(format!("update action '{word}'")));
        }
        token => return Err(unexpected("SET", &token)),
    }
    let mut assignments = vec![parser.assignment()?];
    while *parser.peek() == Token::Comma {
        parser.advance();
        assignments.push(parser.assignment()?);
    }
    parser.expect_end()?;
    Ok(assignments)
}
