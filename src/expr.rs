use crate::token::*;

#[derive(PartialEq, Clone, Debug)]
pub enum Expr {
    Assign {
        name: RcToken,
        value: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: RcToken,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        paren: RcToken,
        arguments: Vec<Expr>,
    },
    Grouping(Box<Expr>),
    Literal(Literal),
    /// Short-circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: RcToken,
        right: Box<Expr>,
    },
    Ternary {
        test: Box<Expr>,
        question: RcToken,
        pass: Box<Expr>,
        fail: Box<Expr>,
    },
    Unary {
        operator: RcToken,
        right: Box<Expr>,
    },
    Variable {
        name: RcToken,
    },
}
