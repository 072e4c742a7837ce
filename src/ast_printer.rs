//! Lisp-style prefix printer for expression trees.
//!
//! Used by the `parse` subcommand and by parser tests: the printed form
//! makes grouping and precedence visible, so `1 + 2 * 3` renders as
//! `(+ 1.0 (* 2.0 3.0))` and leaves no ambiguity about tree shape.

use crate::ast::{Expr, LiteralValue};

pub struct AstPrinter;

impl AstPrinter {
    /// Render `expr` as a parenthesized prefix string.
    pub fn print(expr: &Expr<'_>) -> String {
        match expr {
            Expr::Literal(literal) => match literal {
                // `{:?}` keeps a trailing `.0` on integral values.
                LiteralValue::Number(n) => format!("{:?}", n),
                LiteralValue::Str(s) => s.clone(),
                LiteralValue::True => "true".to_string(),
                LiteralValue::False => "false".to_string(),
                LiteralValue::Nil => "nil".to_string(),
            },

            Expr::Grouping(inner) => Self::parenthesize("group", &[inner]),

            Expr::Unary { operator, right } => Self::parenthesize(operator.lexeme, &[right]),

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => Self::parenthesize(operator.lexeme, &[left, right]),

            Expr::Variable { name, .. } => name.lexeme.to_string(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, Self::print(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut out = format!("(call {}", Self::print(callee));

                for argument in arguments {
                    out.push(' ');
                    out.push_str(&Self::print(argument));
                }

                out.push(')');
                out
            }

            Expr::Get { object, name } => {
                format!("(. {} {})", Self::print(object), name.lexeme)
            }

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(=. {} {} {})",
                Self::print(object),
                name.lexeme,
                Self::print(value)
            ),

            Expr::This { .. } => "this".to_string(),

            Expr::Super { method, .. } => format!("(super {})", method.lexeme),
        }
    }

    fn parenthesize(name: &str, exprs: &[&Expr<'_>]) -> String {
        let mut out = String::from("(");
        out.push_str(name);

        for expr in exprs {
            out.push(' ');
            out.push_str(&Self::print(expr));
        }

        out.push(')');
        out
    }
}
