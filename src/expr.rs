use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;

/// Stable identity for an expression node.
///
/// The resolver keys binding distances by node identity, not value.  Ids
/// come from a process-wide counter so nodes from different parses (REPL
/// lines) can never alias each other in the resolution table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(usize);

impl ExprId {
    pub fn fresh() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);

        ExprId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug)]
pub enum Expr {
    // Used to parse Binary expressions
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    // Short-circuiting 'and' / 'or'
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    // Used to parse Unary expressions
    Unary {
        operator: Token,
        right: Box<Expr>,
    },

    // Used to parse Literal expressions; the token carries the value
    Literal {
        value: Token,
    },

    // Used to parse parenthesized grouped expressions
    Grouping {
        expression: Box<Expr>,
    },

    // A variable read
    Variable {
        id: ExprId,
        name: Token,
    },

    // Assignment to a previously declared variable
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    // A call on anything callable: function, method, class
    Call {
        callee: Box<Expr>,
        paren: Token,
        arguments: Vec<Expr>,
    },

    // Field or method access on an instance
    Get {
        object: Box<Expr>,
        name: Token,
    },

    // Field write on an instance
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    This {
        id: ExprId,
        keyword: Token,
    },

    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },
}
