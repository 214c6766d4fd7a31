//! Rox: a tree-walking interpreter for a small, class-free Lox dialect.
//!
//! The pipeline is [`scanner`] → [`parser`] → [`resolver`] → [`interpreter`];
//! [`lox::Lox`] wires the stages together and routes diagnostics to a
//! [`report::Reporter`].

pub mod ast_printer;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod lox;
pub mod parser;
pub mod report;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod value;

pub use error::{LoxError, Result};
pub use lox::{Lox, RunStatus};
