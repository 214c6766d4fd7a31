use serde::Serialize;

use crate::token::Token;

/// Identity of a variable-reference node, assigned by the parser. The
/// resolver's distance table is keyed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

/// A literal constant that appears directly in the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    /// Stored as IEEE‑754 `f64`; `3` parses as `3.0`.
    Number(f64),

    /// String contents without the surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(LiteralValue),

    /// `"(" expression ")"`
    Grouping(Box<Expr>),

    /// `!x` or `-x`
    Unary {
        operator: Token,
        right: Box<Expr>,
    },

    /// Arithmetic, comparison and equality operators.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    Variable {
        id: NodeId,
        name: Token,
    },

    /// `name = value`; right‑associative.
    Assign {
        id: NodeId,
        name: Token,
        value: Box<Expr>,
    },

    Call {
        callee: Box<Expr>,
        /// The closing `)`; runtime errors for the call are reported here.
        paren: Token,
        arguments: Vec<Expr>,
    },
}
