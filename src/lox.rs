use crate::error::{Diagnostics, LoxError, StaticError};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::scanner::Scanner;
use crate::stmt::Stmt;
use std::io::Write;

/// A session: one global scope that persists across every piece of source it runs.
pub struct Lox {
    interpreter: Interpreter,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    pub fn new() -> Self {
        Lox {
            interpreter: Interpreter::new(),
        }
    }

    pub fn with_output(out: Box<dyn Write>) -> Self {
        Lox {
            interpreter: Interpreter::with_output(out),
        }
    }

    pub fn set_echo_expressions(&mut self, echo: bool) {
        self.interpreter.set_echo_expressions(echo);
    }

    /// Scans and parses `source`, returning every lexical and syntax error found in one pass.
    #[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn parse(source: &str) -> Result<Vec<Stmt>, Vec<StaticError>> {
        let mut diagnostics = Diagnostics::new();
        let mut scanner = Scanner::new(source);
        scanner.scan_tokens(&mut diagnostics);
        let statements = Parser::new(&mut diagnostics, scanner.into_tokens()).parse();
        if diagnostics.has_errors() {
            return Err(diagnostics.into_errors());
        }
        Ok(statements)
    }

    /// Parses and executes `source`. Nothing runs if there are static errors.
    pub fn run(&mut self, source: &str) -> Result<(), LoxError> {
        let statements = Lox::parse(source).map_err(LoxError::Static)?;
        self.interpreter.interpret(&statements)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SharedOutput;
    use pretty_assertions::assert_eq;

    #[test]
    fn static_errors_suppress_execution() {
        let output = SharedOutput::new();
        let mut lox = Lox::with_output(Box::new(output.clone()));
        let err = lox.run("print 1;\nprint 2 +;\nvar x = ;").unwrap_err();
        match err {
            LoxError::Static(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected static errors, got {:?}", other),
        }
        assert_eq!(output.contents(), "");
    }

    #[test]
    fn scan_and_parse_errors_are_reported_together() {
        let errors = Lox::parse("var a = @;\nprint (1;").unwrap_err();
        let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "[line 1] Error: Unexpected character '@'.",
                "[line 1] Error at ';': Expect expression.",
                "[line 2] Error at ';': Expect ')' after expression.",
            ]
        );
    }

    #[test]
    fn globals_persist_across_runs() {
        let output = SharedOutput::new();
        let mut lox = Lox::with_output(Box::new(output.clone()));
        lox.run("var a = 1;").unwrap();
        assert!(lox.run("a = 2; print nope;").is_err());
        lox.run("print a;").unwrap();
        assert_eq!(output.contents(), "2\n");
    }
}
