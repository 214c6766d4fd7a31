use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use log::trace;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a frame. Blocks, calls and closures all hold one of these.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One frame of the name → value chain.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    /// The global frame.
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap a frame in its shared handle.
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Bind `name` in this frame, replacing any existing binding here.
    pub fn define(&mut self, name: &str, value: Value) {
        trace!("define '{}' = {}", name, value);

        self.values.insert(name.to_string(), value);
    }

    /// Dynamic lookup through the whole chain, innermost first.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Dynamic assignment through the whole chain, innermost first.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Read `name` from the frame exactly `distance` links up the chain.
    pub fn get_at(&self, distance: usize, name: &Token) -> Result<Value> {
        if distance == 0 {
            return self.values.get(&name.lexeme).cloned().ok_or_else(|| undefined(name));
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow().get_at(distance - 1, name),
            None => Err(undefined(name)),
        }
    }

    /// Overwrite `name` in the frame exactly `distance` links up the chain.
    pub fn assign_at(&mut self, distance: usize, name: &Token, value: Value) -> Result<()> {
        if distance == 0 {
            return match self.values.get_mut(&name.lexeme) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(undefined(name)),
            };
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign_at(distance - 1, name, value),
            None => Err(undefined(name)),
        }
    }
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}
