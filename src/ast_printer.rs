//! Lisp-style rendering of expression trees, for debugging the parser.

use crate::expr::*;
use crate::stmt::Stmt;

pub fn ast_to_string(expr: &Expr) -> String {
    match expr {
        Expr::Assign { name, value } => {
            parenthesize(&format!("= {}", name.lexeme), &[value.as_ref()])
        }
        Expr::Binary {
            left,
            operator,
            right,
        }
        | Expr::Logical {
            left,
            operator,
            right,
        } => parenthesize(&operator.lexeme, &[left.as_ref(), right.as_ref()]),
        Expr::Call {
            callee, arguments, ..
        } => {
            let mut exprs = vec![callee.as_ref()];
            exprs.extend(arguments.iter());
            parenthesize("call", &exprs)
        }
        Expr::Grouping(expr) => parenthesize("group", &[expr.as_ref()]),
        Expr::Literal(literal) => literal.to_string(),
        Expr::Ternary {
            test, pass, fail, ..
        } => parenthesize("?:", &[test.as_ref(), pass.as_ref(), fail.as_ref()]),
        Expr::Unary { operator, right } => parenthesize(&operator.lexeme, &[right.as_ref()]),
        Expr::Variable { name } => name.lexeme.clone(),
    }
}

/// One line per statement; blocks and bodies are flattened into a single parenthesized form.
pub fn stmt_to_string(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Block { statements } => wrap("block", statements),
        Stmt::Expression { expr } => format!("(; {})", ast_to_string(expr)),
        Stmt::Function(decl) => {
            let params: Vec<&str> = decl.params.iter().map(|p| p.lexeme.as_str()).collect();
            wrap(
                &format!("fn {}({})", decl.name.lexeme, params.join(" ")),
                &decl.body,
            )
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => match else_branch {
            Some(els) => format!(
                "(if {} {} {})",
                ast_to_string(condition),
                stmt_to_string(then_branch),
                stmt_to_string(els)
            ),
            None => format!(
                "(if {} {})",
                ast_to_string(condition),
                stmt_to_string(then_branch)
            ),
        },
        Stmt::Print { expr, .. } => format!("(print {})", ast_to_string(expr)),
        Stmt::Return { value, .. } => match value {
            Some(value) => format!("(return {})", ast_to_string(value)),
            None => String::from("(return)"),
        },
        Stmt::Var { name, initializer } => match initializer {
            Some(init) => format!("(var {} {})", name.lexeme, ast_to_string(init)),
            None => format!("(var {})", name.lexeme),
        },
        Stmt::While { condition, body } => format!(
            "(while {} {})",
            ast_to_string(condition),
            stmt_to_string(body)
        ),
    }
}

fn wrap(head: &str, statements: &[Stmt]) -> String {
    let mut builder = format!("({}", head);
    for stmt in statements {
        builder.push(' ');
        builder.push_str(&stmt_to_string(stmt));
    }
    builder.push(')');
    builder
}

fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
    let mut builder: String = String::with_capacity(2 + exprs.len() * 2);
    builder.push('(');
    builder.push_str(name);
    for expr in exprs {
        builder.push(' ');
        builder.push_str(&ast_to_string(expr));
    }
    builder.push(')');
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Literal, Token};
    use crate::token_type::TokenType;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    #[test]
    fn renders_nested_expression() {
        let expression = Expr::Binary {
            left: Box::new(Expr::Unary {
                operator: Rc::new(Token::new(TokenType::MINUS, String::from("-"), Literal::NIL, 1)),
                right: Box::new(Expr::Literal(Literal::NUMBER(123.0))),
            }),
            operator: Rc::new(Token::new(TokenType::STAR, String::from("*"), Literal::NIL, 1)),
            right: Box::new(Expr::Grouping(Box::new(Expr::Literal(Literal::NUMBER(45.67))))),
        };
        assert_eq!(ast_to_string(&expression), "(* (- 123) (group 45.67))");
    }
}
