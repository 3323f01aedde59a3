use crate::token::RcToken;
use thiserror::Error;

/// A lexical or syntax error. Any of these suppresses execution of the source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StaticError {
    #[error("[line {line}] Error: {message}")]
    ScanError { line: usize, message: String },
    #[error("[line {}] Error{}: {}", .token.line, .token.location(), .message)]
    ParseError { token: RcToken, message: String },
}

impl StaticError {
    pub fn line(&self) -> usize {
        match self {
            StaticError::ScanError { line, .. } => *line,
            StaticError::ParseError { token, .. } => token.line,
        }
    }
}

/// Accumulates static errors across a whole scan and parse pass.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<StaticError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan_error(&mut self, line: usize, message: impl Into<String>) {
        self.push(StaticError::ScanError {
            line,
            message: message.into(),
        });
    }

    pub fn push(&mut self, error: StaticError) {
        tracing::debug!(%error, "static error");
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[StaticError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<StaticError> {
        self.errors
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorKind {
    #[error("Operands of '{0}' must be numbers.")]
    OperandsMustBeNumbers(String),
    #[error("Operands of '{0}' must be two numbers or two strings.")]
    OperandsMustBeNumbersOrStrings(String),
    #[error("Operand of '{0}' must be a number.")]
    OperandMustBeNumber(String),
    #[error("Division by zero.")]
    DivisionByZero,
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),
    #[error("Variable '{0}' used before initialization.")]
    Uninitialized(String),
    #[error("Ternary test must be a boolean.")]
    NonBooleanTest,
    #[error("Can only call functions.")]
    NotCallable,
    #[error("Expected {expected} arguments but got {got}.")]
    ArityMismatch { expected: usize, got: usize },
    #[error("Stack overflow.")]
    StackOverflow,
    #[error("Could not write output: {0}")]
    Output(String),
}

/// An error raised while executing, tied to the token that caused it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}\n[line {}]", .token.line)]
pub struct RuntimeError {
    pub token: RcToken,
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub fn new(token: &RcToken, kind: RuntimeErrorKind) -> Self {
        RuntimeError {
            token: RcToken::clone(token),
            kind,
        }
    }
}

/// The outcome of running one piece of source through a session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoxError {
    #[error("{}", render_static(.0))]
    Static(Vec<StaticError>),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

fn render_static(errors: &[StaticError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Literal, Token};
    use crate::token_type::TokenType;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn token(type_: TokenType, lexeme: &str, line: usize) -> RcToken {
        Rc::new(Token::new(type_, lexeme.to_string(), Literal::NIL, line))
    }

    #[test]
    fn static_errors_render_with_location() {
        let scan = StaticError::ScanError {
            line: 2,
            message: String::from("Unexpected character '@'."),
        };
        let parse = StaticError::ParseError {
            token: token(TokenType::SEMICOLON, ";", 5),
            message: String::from("Expect expression."),
        };
        let at_end = StaticError::ParseError {
            token: token(TokenType::EOF, "", 9),
            message: String::from("Expect ';' after value."),
        };
        assert_eq!(scan.to_string(), "[line 2] Error: Unexpected character '@'.");
        assert_eq!(parse.to_string(), "[line 5] Error at ';': Expect expression.");
        assert_eq!(at_end.to_string(), "[line 9] Error at end: Expect ';' after value.");
    }

    #[test]
    fn runtime_error_renders_message_then_line() {
        let err = RuntimeError::new(&token(TokenType::SLASH, "/", 7), RuntimeErrorKind::DivisionByZero);
        assert_eq!(err.to_string(), "Division by zero.\n[line 7]");
    }

    #[test]
    fn diagnostics_accumulate_in_order() {
        let mut diagnostics = Diagnostics::new();
        assert!(!diagnostics.has_errors());
        diagnostics.scan_error(1, "first");
        diagnostics.scan_error(3, "second");
        let lines: Vec<usize> = diagnostics.errors().iter().map(StaticError::line).collect();
        assert_eq!(lines, vec![1, 3]);
        let rendered = LoxError::Static(diagnostics.into_errors()).to_string();
        assert_eq!(rendered, "[line 1] Error: first\n[line 3] Error: second");
    }
}
