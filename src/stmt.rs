use std::rc::Rc;

use serde::Serialize;

use crate::expr::Expr;
use crate::token::Token;

/// A function declaration. Shared behind an `Rc` so every closure created
/// from it points at the same body without copying the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

/// Statement nodes. A program is a `Vec<Stmt>`; `for` loops never appear
/// here because the parser desugars them into `While`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    Expression(Expr),

    Print(Expr),

    /// `"var" IDENT ("=" initializer)? ";"`
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    Function(Rc<FunctionDecl>),

    Return {
        /// The `return` keyword, kept for error locations.
        keyword: Token,
        /// Absent means `nil`.
        value: Option<Expr>,
    },
}
