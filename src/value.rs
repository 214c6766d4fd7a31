use std::fmt;
use std::rc::Rc;

use crate::function::LoxFunction;

/// Signature of a built-in function. An `Err` becomes a runtime error at the
/// call site.
pub type NativeFn = fn(&[Value]) -> Result<Value, String>;

/// Runtime value union.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Bool(bool),
    Nil,
    /// A user-defined closure.
    Function(Rc<LoxFunction>),
    NativeFunction {
        name: &'static str,
        arity: usize,
        func: NativeFn,
    },
}

impl Value {
    /// Only `true` is truthy. Numbers, strings, `nil` and functions are all
    /// falsy.
    pub fn is_truthy(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::NativeFunction { .. })
    }

    /// Name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Nil => "nil",
            Value::Function(_) | Value::NativeFunction { .. } => "function",
        }
    }
}

impl PartialEq for Value {
    /// Structural for plain data; identity for functions.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::NativeFunction { name: a, .. }, Value::NativeFunction { name: b, .. }) => {
                a == b
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Nil => write!(f, "nil"),

            Value::Function(func) => write!(f, "<fn {}>", func.name()),

            Value::NativeFunction { name, .. } => write!(f, "<native fn {}>", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_drop_integral_fraction() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(0.5).to_string(), "0.5");
        assert_eq!(Value::Number(-2.0).to_string(), "-2");
    }

    #[test]
    fn only_true_is_truthy() {
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Number(1.0).is_truthy());
        assert!(!Value::String("yes".into()).is_truthy());
        assert!(!Value::Nil.is_truthy());
    }
}
