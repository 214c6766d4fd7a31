use std::fmt;
use std::io::Write;
use std::rc::Rc;

use log::debug;

use crate::environment::{EnvRef, Environment};
use crate::error::Result;
use crate::interpreter::{Flow, Interpreter};
use crate::stmt::FunctionDecl;
use crate::value::Value;

/// A closure: a declaration paired with the frame that was current when the
/// declaration executed. The frame is shared, so writes made after capture
/// are visible to the closure and vice versa.
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef) -> Self {
        Self {
            declaration,
            closure,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Bind `arguments` in a fresh frame chained to the closure and run the
    /// body there. Arity has already been checked by the caller.
    pub fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        debug!("Calling '{}' with {} argument(s)", self.name(), arguments.len());

        let mut frame = Environment::with_enclosing(Rc::clone(&self.closure));
        for (param, value) in self.declaration.params.iter().zip(arguments) {
            frame.define(&param.lexeme, value);
        }

        match interpreter.execute_block(&self.declaration.body, frame.into_ref())? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

impl fmt::Debug for LoxFunction {
    // The closure may contain this very function; don't walk it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxFunction")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .finish_non_exhaustive()
    }
}
