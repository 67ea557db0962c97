//! Structured interpreter errors.

use std::fmt::{self, Display};

use thiserror::Error;

use crate::value::ValueRef;

pub type Result<T> = std::result::Result<T, LithError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    /// End of input with no form underway; benign at the top level, where
    /// the driver treats it as normal termination.
    #[error("End of File")]
    Eof,
    /// End of input in the middle of a form or token.
    #[error("Unexpected End of File: {0}")]
    UnexpectedEof(String),
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("unbound symbol: '{0}'")]
    Unbound(String),
    #[error("trying to redefine already defined symbol: '{0}'")]
    Redefine(String),
    #[error("wrong number of arguments: expected {}{expected} argument(s) but given {got} argument(s)", if *.exact { "" } else { "at least " })]
    Arity {
        expected: usize,
        got: usize,
        /// Exact count, or a lower bound (variadic callee).
        exact: bool,
    },
    /// An argument had the wrong tag; `index` is 1-based.
    #[error("type error: expecting {expected} instead of {got} as the argument number {index}")]
    ArgType {
        expected: &'static str,
        got: &'static str,
        index: usize,
    },
    /// A type error that does not fit the expected/got shape.
    #[error("type error: {0}")]
    Type(String),
    /// Raised from the language by `(error "...")`.
    #[error("error: {0}")]
    Custom(String),
}

/// An error kind plus the context the reporter prints: the callee that was
/// being applied and the offending expression, captured when the error
/// fired so it survives any later unwinding.
#[derive(Debug, Clone)]
pub struct LithError {
    pub kind: ErrorKind,
    pub name: Option<String>,
    pub expr: Option<ValueRef>,
}

impl LithError {
    pub fn new(kind: ErrorKind) -> Self {
        LithError {
            kind,
            name: None,
            expr: None,
        }
    }

    pub fn eof() -> Self {
        LithError::new(ErrorKind::Eof)
    }

    pub fn unexpected_eof(context: impl Into<String>) -> Self {
        LithError::new(ErrorKind::UnexpectedEof(context.into()))
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        LithError::new(ErrorKind::Syntax(message.into()))
    }

    pub fn unbound(symbol: impl Into<String>) -> Self {
        LithError::new(ErrorKind::Unbound(symbol.into()))
    }

    pub fn redefine(symbol: impl Into<String>) -> Self {
        LithError::new(ErrorKind::Redefine(symbol.into()))
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        LithError::new(ErrorKind::Type(message.into()))
    }

    pub fn custom(message: impl Into<String>) -> Self {
        LithError::new(ErrorKind::Custom(message.into()))
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_expr(mut self, expr: ValueRef) -> Self {
        self.expr = Some(expr);
        self
    }

    /// True for the clean end-of-input condition the driver swallows.
    pub fn is_benign_eof(&self) -> bool {
        matches!(self.kind, ErrorKind::Eof)
    }
}

impl Display for LithError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(name) = &self.name {
            write!(f, " [in '{name}']")?;
        }
        if let Some(expr) = &self.expr {
            write!(f, "\noccurred in: {expr}")?;
        }
        Ok(())
    }
}

impl std::error::Error for LithError {}

impl From<ErrorKind> for LithError {
    fn from(kind: ErrorKind) -> Self {
        LithError::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn arity_message_marks_lower_bounds() {
        let exact = ErrorKind::Arity {
            expected: 2,
            got: 3,
            exact: true,
        };
        assert_eq!(
            format!("{exact}"),
            "wrong number of arguments: expected 2 argument(s) but given 3 argument(s)"
        );
        let at_least = ErrorKind::Arity {
            expected: 1,
            got: 0,
            exact: false,
        };
        assert_eq!(
            format!("{at_least}"),
            "wrong number of arguments: expected at least 1 argument(s) but given 0 argument(s)"
        );
    }

    #[test]
    fn report_appends_name_and_expr() {
        let err = LithError::new(ErrorKind::ArgType {
            expected: "pair",
            got: "integer",
            index: 1,
        })
        .with_name("car")
        .with_expr(Value::integer(5));
        assert_eq!(
            format!("{err}"),
            "type error: expecting pair instead of integer as the argument number 1 [in 'car']\noccurred in: 5"
        );
    }

    #[test]
    fn benign_eof_is_only_the_eof_kind() {
        assert!(LithError::eof().is_benign_eof());
        assert!(!LithError::unexpected_eof("while reading a string literal").is_benign_eof());
        assert!(!LithError::syntax("x").is_benign_eof());
    }
}
