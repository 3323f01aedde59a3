//! A tree-walking interpreter for Lox: scanner, recursive-descent parser and evaluator.
//!
//! ```
//! use treelox::Lox;
//!
//! let mut lox = Lox::new();
//! lox.run("var greeting = \"hi\"; print greeting + \"!\";").unwrap();
//! ```

pub mod ast_printer;
pub mod callable;
pub mod environment;
pub mod error;
pub mod expr;
pub mod interpreter;
pub mod lox;
pub mod lox_function;
pub mod parser;
pub mod scanner;
mod stack;
pub mod stmt;
pub mod token;
pub mod token_type;

#[doc(hidden)]
pub mod testing;

pub use crate::error::{LoxError, RuntimeError, StaticError};
pub use crate::interpreter::{ExprValue, Interpreter};
pub use crate::lox::Lox;
