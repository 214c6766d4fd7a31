//! Static resolver pass.
//!
//! One AST walk that
//! 1. builds lexical scopes (a stack of `HashMap<String, bool>` tracking
//!    declared vs. defined names),
//! 2. reports static errors (reading a local in its own initializer,
//!    `return` outside a function), and
//! 3. records, for each variable occurrence found in a local scope, how many
//!    scopes out its binding lives. Occurrences found in no scope are left
//!    unrecorded and read from the globals at run time.
//!
//! The walk does not stop at the first error; every error is collected and
//! returned together. Distances are only handed out when the walk found no
//! errors, so a rejected program leaves nothing behind.

use crate::error::LoxError;
use crate::parser::{Expr, FunctionDecl, NodeId, Stmt};
use crate::token::Token;
use log::{debug, info};
use std::collections::HashMap;

/// Resolved distances, keyed by variable node.
pub type Locals = HashMap<NodeId, usize>;

/// Are we inside a function body? Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
}

#[derive(Debug)]
pub struct Resolver {
    locals: Locals,
    scopes: Vec<HashMap<String, bool>>, // false = declared, true = defined
    current_function: FunctionType,
    errors: Vec<LoxError>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        info!("Resolver instantiated");

        Resolver {
            locals: HashMap::new(),
            scopes: Vec::new(),
            current_function: FunctionType::None,
            errors: Vec::new(),
        }
    }

    /// Resolve a whole program, returning the distance of every local
    /// variable occurrence. The program must not run if this returns errors.
    pub fn resolve(mut self, statements: &[Stmt]) -> Result<Locals, Vec<LoxError>> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        self.resolve_stmts(statements);

        if self.errors.is_empty() {
            Ok(self.locals)
        } else {
            info!("Resolve pass found {} error(s)", self.errors.len());
            Err(self.errors)
        }
    }

    fn resolve_stmts(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_stmts(statements);
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define
                self.declare(name);
                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }
                self.define(name);
            }

            Stmt::Function(decl) => {
                // The name is usable inside its own body, so recursion works.
                self.declare(&decl.name);
                self.define(&decl.name);
                self.resolve_function(decl);
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expr(expr),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.error(keyword, "Can't return from top-level code.");
                }
                if let Some(expr) = value {
                    self.resolve_expr(expr);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner),

            Expr::Unary { right, .. } => self.resolve_expr(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                let declared_only = self
                    .scopes
                    .last()
                    .and_then(|scope| scope.get(&name.lexeme))
                    == Some(&false);

                if declared_only {
                    self.error(name, "Can't read local variable in its own initializer.");
                    return;
                }

                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }
        }
    }

    /// Parameters and body share one fresh scope, mirroring the single frame
    /// the interpreter creates per call.
    fn resolve_function(&mut self, decl: &FunctionDecl) {
        let enclosing = self.current_function;
        self.current_function = FunctionType::Function;

        self.begin_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&decl.body);
        self.end_scope();

        self.current_function = enclosing;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), false);
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    /// Walk innermost → outermost; record the distance of the first scope
    /// holding `name`. Nothing is recorded for globals.
    fn resolve_local(&mut self, id: NodeId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                self.locals.insert(id, depth);
                return;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }

    fn error(&mut self, token: &Token, message: &str) {
        self.errors.push(LoxError::resolve(token, message));
    }
}
