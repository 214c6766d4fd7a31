//! Diagnostic sinks.
//!
//! The pipeline never prints errors itself. The [`Lox`](crate::lox::Lox)
//! driver hands every scan, parse and resolve error to
//! [`Reporter::error`] and every runtime error to [`Reporter::runtime_error`].

use log::debug;

use crate::error::LoxError;
use crate::token::Token;

pub trait Reporter {
    /// A static (scan/parse/resolve) error. `location` is empty, `" at end"`
    /// or `" at 'lexeme'"`.
    fn error(&mut self, line: usize, location: &str, message: &str);

    /// A runtime error at the offending operator or call site.
    fn runtime_error(&mut self, token: &Token, message: &str);

    /// Route a [`LoxError`] to the matching callback. I/O failures on the
    /// output sink are reported as line‑less static errors.
    fn report(&mut self, err: &LoxError) {
        match err {
            LoxError::Lex { message, line } => self.error(*line, "", message),
            LoxError::Parse {
                message,
                line,
                location,
            }
            | LoxError::Resolve {
                message,
                line,
                location,
            } => self.error(*line, location, message),
            LoxError::Runtime { token, message } => self.runtime_error(token, message),
            other => self.error(0, "", &other.to_string()),
        }
    }
}

/// Prints diagnostics to standard error.
#[derive(Debug, Default)]
pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn error(&mut self, line: usize, location: &str, message: &str) {
        debug!("Reporting error at line {}: {}", line, message);

        eprintln!("[line {}] Error{}: {}", line, location, message);
    }

    fn runtime_error(&mut self, token: &Token, message: &str) {
        debug!("Reporting runtime error at line {}: {}", token.line, message);

        eprintln!("{}\n[line {}]", message, token.line);
    }
}

/// Collects formatted diagnostics in memory.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    lines: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every diagnostic so far, oldest first, in the same format
    /// [`StderrReporter`] prints (runtime errors span two lines).
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `true` if any diagnostic contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Reporter for Diagnostics {
    fn error(&mut self, line: usize, location: &str, message: &str) {
        self.lines
            .push(format!("[line {}] Error{}: {}", line, location, message));
    }

    fn runtime_error(&mut self, token: &Token, message: &str) {
        self.lines.push(format!("{}\n[line {}]", message, token.line));
    }
}
