//! Tree‑walking evaluator.
//!
//! Statements execute in order against a chain of [`Environment`] frames.
//! Variable reads and writes use the distances recorded by the
//! [`Resolver`](crate::resolver::Resolver); nodes without a recorded distance
//! go straight to the global frame.
//!
//! `return` is not an error: [`Interpreter::execute`] yields a [`Flow`] and
//! only a function call turns `Flow::Return` back into a value. Runtime errors
//! travel as `Err(LoxError::Runtime { .. })` up to [`Interpreter::interpret`].

use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, trace};

use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::function::LoxFunction;
use crate::parser::{Expr, LiteralValue, NodeId, Stmt};
use crate::resolver::Locals;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    /// A `return` is unwinding towards the nearest call.
    Return(Value),
}

pub struct Interpreter<W: Write = io::Stdout> {
    globals: EnvRef,
    environment: EnvRef,
    locals: Locals,
    out: W,
}

impl<W: Write> Interpreter<W> {
    /// Interpreter printing to `out`. Native functions such as `clock` are
    /// defined in the global frame.
    pub fn with_output(out: W) -> Self {
        info!("Initializing Interpreter");

        let globals = Environment::new().into_ref();

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock",
                arity: 0,
                func: |_args: &[Value]| {
                    let seconds = SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .map_err(|e| format!("Clock error: {}", e))?
                        .as_secs_f64();
                    Ok(Value::Number(seconds))
                },
            },
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out,
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Adopt the distances of a program that resolved cleanly. Each one says
    /// how many frames out from its use the variable node's binding lives.
    pub fn resolve(&mut self, locals: Locals) {
        trace!("Recording {} resolved local(s)", locals.len());

        self.locals.extend(locals);
    }

    /// Distance recorded for `id`, or `None` for a global reference.
    pub fn resolved_depth(&self, id: NodeId) -> Option<usize> {
        self.locals.get(&id).copied()
    }

    /// Execute a program. The first runtime error stops it.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        let result = statements
            .iter()
            .try_for_each(|stmt| self.execute(stmt).map(drop));

        // A runtime error outranks a failed flush.
        let flushed = self.out.flush();

        match &result {
            Ok(()) => info!("Interpretation completed successfully"),
            Err(e) => debug!("Runtime debug: {}", e),
        }

        result.and_then(|()| flushed.map_err(LoxError::from))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────

    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;

                // Functions have no printed form.
                if !value.is_callable() {
                    writeln!(self.out, "{}", value)?;
                }
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);

                self.environment.borrow_mut().define(&name.lexeme, value);
            }

            Stmt::Block(statements) => {
                let frame = Environment::with_enclosing(Rc::clone(&self.environment));
                return self.execute_block(statements, frame.into_ref());
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch);
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }

            Stmt::Function(decl) => {
                debug!("Defining function '{}'", decl.name.lexeme);

                let function = LoxFunction::new(Rc::clone(decl), Rc::clone(&self.environment));
                self.environment
                    .borrow_mut()
                    .define(&decl.name.lexeme, Value::Function(Rc::new(function)));
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                return Ok(Flow::Return(value));
            }
        }

        Ok(Flow::Normal)
    }

    /// Run `statements` with `frame` as the current environment, restoring the
    /// previous environment on every exit path.
    pub fn execute_block(&mut self, statements: &[Stmt], frame: EnvRef) -> Result<Flow> {
        let previous = std::mem::replace(&mut self.environment, frame);

        let mut result = Ok(Flow::Normal);
        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.environment = previous;
        result
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                unary(operator, right)
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(operator, left, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                let short_circuit = match operator.token_type {
                    TokenType::OR => left.is_truthy(),
                    _ => !left.is_truthy(),
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => self.environment.borrow_mut().assign_at(
                        distance,
                        name,
                        value.clone(),
                    )?,
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut args = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }

                self.call(callee, paren, args)
            }
        }
    }

    fn look_up_variable(&self, id: NodeId, name: &Token) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => self.environment.borrow().get_at(distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    fn call(&mut self, callee: Value, paren: &Token, args: Vec<Value>) -> Result<Value> {
        match callee {
            Value::Function(function) => {
                check_arity(paren, function.arity(), args.len())?;
                function.call(self, args)
            }

            Value::NativeFunction { name, arity, func } => {
                check_arity(paren, arity, args.len())?;
                debug!("Calling native function '{}'", name);
                func(&args).map_err(|msg| LoxError::runtime(paren, msg))
            }

            _ => Err(LoxError::runtime(paren, "Can only call functions.")),
        }
    }
}

fn check_arity(paren: &Token, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        return Ok(());
    }

    Err(LoxError::runtime(
        paren,
        format!("Expected {} arguments but got {}.", expected, got),
    ))
}

fn unary(operator: &Token, right: Value) -> Result<Value> {
    match operator.token_type {
        TokenType::MINUS => match right {
            Value::Number(n) => Ok(Value::Number(-n)),
            _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
        },

        // Negates truthiness, so `!!x` is `true` only for `true` itself.
        TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),

        _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
    }
}

/// Binary operators dispatch on the left operand's type first. A number on
/// the left never raises: a mismatched right operand yields `nil`. Booleans,
/// strings and `nil` on the left reject a mismatched right operand.
fn binary(operator: &Token, left: Value, right: Value) -> Result<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(number_op(operator, a, b)),
        (Value::Number(_), _) => Ok(Value::Nil),

        (Value::Bool(a), Value::Bool(b)) => match operator.token_type {
            TokenType::AND => Ok(Value::Bool(a && b)),
            TokenType::OR => Ok(Value::Bool(a || b)),
            TokenType::EQUAL_EQUAL => Ok(Value::Bool(a == b)),
            TokenType::BANG_EQUAL => Ok(Value::Bool(a != b)),
            _ => Err(unsupported(operator, "booleans")),
        },

        (Value::String(a), Value::String(b)) => match operator.token_type {
            TokenType::PLUS => Ok(Value::String(a + &b)),
            TokenType::EQUAL_EQUAL => Ok(Value::Bool(a == b)),
            TokenType::BANG_EQUAL => Ok(Value::Bool(a != b)),
            _ => Err(unsupported(operator, "strings")),
        },

        (Value::Nil, Value::Nil) => match operator.token_type {
            TokenType::EQUAL_EQUAL => Ok(Value::Bool(true)),
            TokenType::BANG_EQUAL => Ok(Value::Bool(false)),
            _ => Err(unsupported(operator, "nil")),
        },

        (left @ (Value::Function(_) | Value::NativeFunction { .. }), _) => Err(LoxError::runtime(
            operator,
            format!("Operator not supported for {}s.", left.type_name()),
        )),

        (Value::Bool(_) | Value::String(_) | Value::Nil, _) => Err(LoxError::runtime(
            operator,
            "Operands are not of the same type.",
        )),
    }
}

fn number_op(operator: &Token, a: f64, b: f64) -> Value {
    match operator.token_type {
        TokenType::PLUS => Value::Number(a + b),
        TokenType::MINUS => Value::Number(a - b),
        TokenType::STAR => Value::Number(a * b),
        TokenType::SLASH => Value::Number(a / b),
        TokenType::GREATER => Value::Bool(a > b),
        TokenType::GREATER_EQUAL => Value::Bool(a >= b),
        TokenType::LESS => Value::Bool(a < b),
        TokenType::LESS_EQUAL => Value::Bool(a <= b),
        TokenType::EQUAL_EQUAL => Value::Bool(a == b),
        TokenType::BANG_EQUAL => Value::Bool(a != b),
        _ => Value::Nil,
    }
}

fn unsupported(operator: &Token, kind: &str) -> LoxError {
    LoxError::runtime(operator, format!("Operator not supported for {}.", kind))
}
