//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) must convert their
//! internal failure modes into one of the variants defined here.  This enables a
//! uniform `Result<T>` alias throughout the crate and ergonomic inter‑operation
//! with `anyhow`, while still preserving rich diagnostic detail.
//!
//! The module **does not** print diagnostics itself; the `Display` impls render
//! the canonical diagnostic formats and the interpreter decides where they go.

use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error, anchored to the offending token.
    #[error("[line {line}] Error {location}: {message}")]
    Parse {
        message: String,
        line: usize,
        /// Either `at end` or `at '<lexeme>'`.
        location: String,
    },

    /// Static‑analysis or resolution failure (e.g. early‑binding errors).
    #[error("[line {line}] Error {location}: {message}")]
    Resolve {
        message: String,
        line: usize,
        location: String,
    },

    /// Runtime evaluation error, anchored to the offending token.
    #[error("{message}\n[line {line}]")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error`.  Enables `?` on I/O ops.
    #[error("{0}")]
    Io(String),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error("{0}")]
    Utf8(String),
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        LoxError::Parse {
            message,
            line: token.line,
            location: locate(token),
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        LoxError::Resolve {
            message,
            line: token.line,
            location: locate(token),
        }
    }

    /// Helper constructor for **runtime** failures.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: line={}, msg={}", token.line, message);

        LoxError::Runtime {
            message,
            line: token.line,
        }
    }
}

/// Renders the `at end` / `at '<lexeme>'` part of a compile diagnostic.
fn locate(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        "at end".to_string()
    } else {
        format!("at '{}'", token.lexeme)
    }
}

impl From<io::Error> for LoxError {
    fn from(e: io::Error) -> Self {
        LoxError::Io(e.to_string())
    }
}

impl From<std::string::FromUtf8Error> for LoxError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        LoxError::Utf8(e.to_string())
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_diagnostic_format() {
        let token = Token::new(TokenType::IDENTIFIER, "oops".to_string(), 3);
        let err = LoxError::parse(&token, "Expect expression.");

        assert_eq!(
            err.to_string(),
            "[line 3] Error at 'oops': Expect expression."
        );
    }

    #[test]
    fn compile_diagnostic_at_end() {
        let token = Token::new(TokenType::EOF, "".to_string(), 7);
        let err = LoxError::parse(&token, "Expect ';' after value.");

        assert_eq!(
            err.to_string(),
            "[line 7] Error at end: Expect ';' after value."
        );
    }

    #[test]
    fn runtime_diagnostic_format() {
        let token = Token::new(TokenType::PLUS, "+".to_string(), 2);
        let err = LoxError::runtime(&token, "Operand must be a number.");

        assert_eq!(err.to_string(), "Operand must be a number.\n[line 2]");
    }
}
