use crate::expr::Expr;
use crate::stmt::{FunctionDecl, Stmt};
use crate::token::TokenType;

/// Deterministic parenthesized printer for the AST.
///
/// Operator grouping is explicit in the output, so precedence and
/// associativity decisions made by the parser are visible in tests and in
/// `--parse-only` dumps.
pub struct Ast;

impl Ast {
    pub fn print(&self, expr: &Expr) -> String {
        match expr {
            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => {
                format!(
                    "({} {} {})",
                    operator.lexeme,
                    self.print(left),
                    self.print(right)
                )
            }

            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, self.print(right))
            }

            Expr::Literal { value } => match &value.token_type {
                TokenType::NUMBER(n) => {
                    if n.fract() == 0.0 {
                        format!("{:.1}", n)
                    } else {
                        n.to_string()
                    }
                }

                TokenType::STRING(s) => s.to_string(),

                TokenType::TRUE => "true".to_string(),

                TokenType::FALSE => "false".to_string(),

                TokenType::NIL => "nil".to_string(),

                _ => unreachable!("Invalid literal"),
            },

            Expr::Grouping { expression } => format!("(group {})", self.print(expression)),

            Expr::Variable { name, .. } => name.lexeme.to_string(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, self.print(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut out = format!("(call {}", self.print(callee));
                for arg in arguments {
                    out.push(' ');
                    out.push_str(&self.print(arg));
                }
                out.push(')');
                out
            }

            Expr::Get { object, name } => {
                format!("(get {} {})", self.print(object), name.lexeme)
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                format!(
                    "(set {} {} {})",
                    self.print(object),
                    name.lexeme,
                    self.print(value)
                )
            }

            Expr::This { .. } => "this".to_string(),

            Expr::Super { method, .. } => format!("(super {})", method.lexeme),
        }
    }

    pub fn print_stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("(expr {})", self.print(expr)),

            Stmt::Print(expr) => format!("(print {})", self.print(expr)),

            Stmt::Var(name, initializer) => match initializer {
                Some(init) => format!("(var {} {})", name.lexeme, self.print(init)),
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Block(statements) => {
                let mut out = String::from("(block");
                for statement in statements {
                    out.push(' ');
                    out.push_str(&self.print_stmt(statement));
                }
                out.push(')');
                out
            }

            Stmt::If(condition, then_branch, else_branch) => match else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    self.print(condition),
                    self.print_stmt(then_branch),
                    self.print_stmt(else_branch)
                ),
                None => format!(
                    "(if {} {})",
                    self.print(condition),
                    self.print_stmt(then_branch)
                ),
            },

            Stmt::While(condition, body) => {
                format!("(while {} {})", self.print(condition), self.print_stmt(body))
            }

            Stmt::Return(_, value) => match value {
                Some(value) => format!("(return {})", self.print(value)),
                None => "(return)".to_string(),
            },

            Stmt::Function(decl) => self.print_function(decl, "fun"),

            Stmt::Class(name, superclass, methods) => {
                let mut out = format!("(class {}", name.lexeme);
                if let Some(superclass) = superclass {
                    out.push_str(" < ");
                    out.push_str(&self.print(superclass));
                }
                for method in methods {
                    out.push(' ');
                    out.push_str(&self.print_function(method, "method"));
                }
                out.push(')');
                out
            }
        }
    }

    fn print_function(&self, decl: &FunctionDecl, kind: &str) -> String {
        let mut out = format!("({} {} (", kind, decl.name.lexeme);
        for (i, param) in decl.params.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&param.lexeme);
        }
        out.push(')');
        for statement in &decl.body {
            out.push(' ');
            out.push_str(&self.print_stmt(statement));
        }
        out.push(')');
        out
    }
}
