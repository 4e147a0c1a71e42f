use std::rc::Rc;

use crate::expr::Expr;
use crate::token::Token;

/// A function or method declaration.
///
/// Reference-counted because runtime function values point back at their
/// declaration: a closure returned out of a REPL line must outlive the
/// statement list that declared it.
#[derive(Debug)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Debug)]
pub enum Stmt {
    Expression(Expr),
    Print(Expr),
    Var(Token, Option<Expr>),
    Block(Vec<Stmt>),
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    While(Expr, Box<Stmt>),
    Return(Token, Option<Expr>),
    Function(Rc<FunctionDecl>),
    // superclass, when present, is an Expr::Variable naming it
    Class(Token, Option<Expr>, Vec<Rc<FunctionDecl>>),
}
