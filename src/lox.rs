//! Run driver: scan → parse → resolve → interpret, with diagnostics routed to
//! a [`Reporter`].
//!
//! A `Lox` keeps its interpreter between runs, so globals defined by one REPL
//! line are visible to the next. Each run is self-contained otherwise: a
//! statement cannot continue across two `run` calls.

use std::io::{self, Write};

use log::{debug, info};

use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::{NodeId, Parser};
use crate::report::{Reporter, StderrReporter};
use crate::resolver::Resolver;
use crate::scanner::Scanner;

/// Outcome of one [`Lox::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// A scan, parse or resolve error was reported; nothing executed.
    StaticError,
    /// Execution started and was aborted by a runtime error.
    RuntimeError,
}

impl RunStatus {
    /// Conventional process exit code (sysexits `EX_DATAERR` / `EX_SOFTWARE`).
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::StaticError => 65,
            RunStatus::RuntimeError => 70,
        }
    }
}

pub struct Lox<W: Write = io::Stdout, R: Reporter = StderrReporter> {
    interpreter: Interpreter<W>,
    reporter: R,
    next_id: NodeId,
}

impl Lox {
    /// Print to stdout, report to stderr.
    pub fn new() -> Self {
        Self::with_sinks(io::stdout(), StderrReporter)
    }
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write, R: Reporter> Lox<W, R> {
    pub fn with_sinks(out: W, reporter: R) -> Self {
        Self {
            interpreter: Interpreter::with_output(out),
            reporter,
            next_id: NodeId(0),
        }
    }

    pub fn interpreter(&self) -> &Interpreter<W> {
        &self.interpreter
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }

    /// Run one complete program.
    pub fn run(&mut self, source: &str) -> RunStatus {
        info!("Running {} byte(s) of source", source.len());

        let (tokens, scan_errors) = Scanner::new(source).scan_tokens();
        self.report_all(&scan_errors);

        let mut parser = Parser::with_first_id(tokens, self.next_id);
        let statements = parser.parse();
        self.next_id = parser.next_id();

        let parse_errors = parser.into_errors();
        self.report_all(&parse_errors);

        if !scan_errors.is_empty() || !parse_errors.is_empty() {
            debug!("Static errors present, skipping execution");
            return RunStatus::StaticError;
        }

        match Resolver::new().resolve(&statements) {
            Ok(locals) => self.interpreter.resolve(locals),
            Err(errors) => {
                self.report_all(&errors);
                return RunStatus::StaticError;
            }
        }

        match self.interpreter.interpret(&statements) {
            Ok(()) => RunStatus::Success,
            Err(e) => {
                self.reporter.report(&e);
                RunStatus::RuntimeError
            }
        }
    }

    fn report_all(&mut self, errors: &[LoxError]) {
        for e in errors {
            self.reporter.report(e);
        }
    }
}
