use crate::callable::{Clock, LoxCallable};
use crate::environment::{Environment, SharedEnvironment};
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::expr::Expr;
use crate::lox_function::LoxFunction;
use crate::stack::ensure_sufficient_stack;
use crate::stmt::Stmt;
use crate::token::*;
use crate::token_type::TokenType;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

/// Denominators smaller than this in magnitude are treated as zero.
pub const DIVISION_EPSILON: f64 = 1e-13;

/// Nesting depth of Lox calls past which a call fails with `Stack overflow.`.
pub const MAX_CALL_DEPTH: usize = 4096;

/// A runtime value.
#[derive(Clone, Debug)]
pub enum ExprValue {
    Literal(Literal),
    LoxCallable(Box<dyn LoxCallable>),
}

impl ExprValue {
    fn get_number(&self) -> Option<f64> {
        match self {
            ExprValue::Literal(Literal::NUMBER(f)) => Some(*f),
            _ => None,
        }
    }
    fn get_string(&self) -> Option<&String> {
        match self {
            ExprValue::Literal(Literal::STRING(s)) => Some(s),
            _ => None,
        }
    }
    /// `nil` and `false` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(
            self,
            ExprValue::Literal(Literal::NIL) | ExprValue::Literal(Literal::BOOL(false))
        )
    }
}

impl PartialEq for ExprValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ExprValue::Literal(l1), ExprValue::Literal(l2)) => l1 == l2,
            (ExprValue::LoxCallable(c1), ExprValue::LoxCallable(c2)) => **c1 == **c2,
            _ => false,
        }
    }
}

impl fmt::Display for ExprValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprValue::Literal(l) => write!(f, "{}", l),
            ExprValue::LoxCallable(c) => write!(f, "{}", c),
        }
    }
}

/// How a statement finished. `Return` travels up through blocks and loops untouched
/// until the call that owns the function body unwraps it.
#[derive(Debug, PartialEq)]
pub enum Flow {
    Normal,
    Return(ExprValue),
}

pub type ExprValueResult = Result<ExprValue, RuntimeError>;
pub type ExecResult = Result<Flow, RuntimeError>;

macro_rules! operand_err {
    ($operator:expr) => {
        Err(RuntimeError::new(
            $operator,
            RuntimeErrorKind::OperandsMustBeNumbers($operator.lexeme.clone()),
        ))
    };
}

pub struct Interpreter {
    environment: SharedEnvironment,
    pub globals: SharedEnvironment,
    out: Box<dyn Write>,
    echo_expressions: bool,
    call_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An interpreter printing to stdout.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    pub fn with_output(out: Box<dyn Write>) -> Self {
        let globals = Environment::new_shared(None);
        globals.borrow_mut().define(
            String::from("clock"),
            Some(ExprValue::LoxCallable(Box::new(Clock))),
        );
        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            out,
            echo_expressions: false,
            call_depth: 0,
        }
    }

    /// When set, the value of every expression statement is printed too (REPL mode).
    pub fn set_echo_expressions(&mut self, echo: bool) {
        self.echo_expressions = echo;
    }

    /// Runs `statements` in order, stopping at the first runtime error. Bindings made
    /// before the error stay in the global scope.
    #[tracing::instrument(level = "debug", skip_all, fields(count = statements.len()))]
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for statement in statements {
            if let Flow::Return(_) = self.execute(statement)? {
                break;
            }
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        match stmt {
            Stmt::Block { statements } => {
                let environment = Environment::new_shared(Some(&self.environment));
                return self.execute_block(statements, environment);
            }
            Stmt::Expression { expr } => {
                let value = self.evaluate(expr)?;
                if self.echo_expressions {
                    if let Err(error) = writeln!(self.out, "{}", value) {
                        tracing::warn!(%error, "could not echo expression value");
                    }
                }
            }
            Stmt::Function(declaration) => {
                // The closure captures the scope the function is bound in, so the two keep
                // each other alive for the rest of the session.
                let function = LoxFunction::new(Rc::clone(declaration), Rc::clone(&self.environment));
                tracing::trace!(name = %declaration.name.lexeme, "define function");
                self.environment.borrow_mut().define(
                    declaration.name.lexeme.clone(),
                    Some(ExprValue::LoxCallable(Box::new(function))),
                );
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(els) = else_branch {
                    return self.execute(els);
                }
            }
            Stmt::Print { keyword, expr } => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value).map_err(|e| {
                    RuntimeError::new(keyword, RuntimeErrorKind::Output(e.to_string()))
                })?;
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => ExprValue::Literal(Literal::NIL),
                };
                return Ok(Flow::Return(value));
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => Some(self.evaluate(expr)?),
                    None => None,
                };
                self.environment
                    .borrow_mut()
                    .define(name.lexeme.clone(), value);
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
        }
        Ok(Flow::Normal)
    }

    /// Executes `statements` with `environment` as the current scope. The previous scope is
    /// restored however the block ends: normally, by `return`, or by an error.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: SharedEnvironment) -> ExecResult {
        let previous = std::mem::replace(&mut self.environment, environment);
        let result = self.execute_statements(statements);
        self.environment = previous;
        result
    }

    fn execute_statements(&mut self, statements: &[Stmt]) -> ExecResult {
        for statement in statements {
            if let Flow::Return(value) = self.execute(statement)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn evaluate(&mut self, expr: &Expr) -> ExprValueResult {
        match expr {
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.borrow_mut().assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => self.interpret_expr_binary(left, operator, right),
            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let eval_callee = self.evaluate(callee)?;

                let mut eval_arguments: Vec<ExprValue> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    eval_arguments.push(self.evaluate(argument)?);
                }
                let function = match eval_callee {
                    ExprValue::LoxCallable(function) => function,
                    ExprValue::Literal(_) => {
                        return Err(RuntimeError::new(paren, RuntimeErrorKind::NotCallable));
                    }
                };
                let arity = function.arity();
                if eval_arguments.len() != arity {
                    return Err(RuntimeError::new(
                        paren,
                        RuntimeErrorKind::ArityMismatch {
                            expected: arity,
                            got: eval_arguments.len(),
                        },
                    ));
                }
                if self.call_depth >= MAX_CALL_DEPTH {
                    tracing::debug!(depth = self.call_depth, line = paren.line, "call depth exceeded");
                    return Err(RuntimeError::new(paren, RuntimeErrorKind::StackOverflow));
                }
                tracing::trace!(callee = %function, arity, line = paren.line, "call");
                self.call_depth += 1;
                let result = ensure_sufficient_stack(|| function.call(self, eval_arguments));
                self.call_depth -= 1;
                result
            }
            Expr::Grouping(expr) => self.evaluate(expr),
            Expr::Literal(literal) => Ok(ExprValue::Literal(literal.clone())),
            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                if matches!(operator.type_, TokenType::OR) {
                    if left.is_truthy() {
                        return Ok(left);
                    }
                // AND operation
                } else if !left.is_truthy() {
                    return Ok(left);
                }
                self.evaluate(right)
            }
            Expr::Ternary {
                test,
                question,
                pass,
                fail,
            } => match self.evaluate(test)? {
                ExprValue::Literal(Literal::BOOL(true)) => self.evaluate(pass),
                ExprValue::Literal(Literal::BOOL(false)) => self.evaluate(fail),
                _ => Err(RuntimeError::new(question, RuntimeErrorKind::NonBooleanTest)),
            },
            Expr::Unary { operator, right } => self.interpret_expr_unary(operator, right),
            Expr::Variable { name } => self.environment.borrow().get(name),
        }
    }

    fn interpret_expr_unary(&mut self, operator: &RcToken, right: &Expr) -> ExprValueResult {
        let res = self.evaluate(right)?;
        match operator.type_ {
            TokenType::MINUS => match res.get_number() {
                Some(num) => Ok(ExprValue::Literal(Literal::NUMBER(-num))),
                None => Err(RuntimeError::new(
                    operator,
                    RuntimeErrorKind::OperandMustBeNumber(operator.lexeme.clone()),
                )),
            },
            TokenType::BANG => Ok(ExprValue::Literal(Literal::BOOL(!res.is_truthy()))),
            _ => unreachable!("Invalid unary operator"),
        }
    }

    fn interpret_expr_binary(
        &mut self,
        left: &Expr,
        operator: &RcToken,
        right: &Expr,
    ) -> ExprValueResult {
        let res_left = self.evaluate(left)?;
        let res_right = self.evaluate(right)?;
        macro_rules! binary_op_numeric_generic {
            ($op:tt, $type_:tt) => {
                if let (Some(num_left), Some(num_right)) = (res_left.get_number(), res_right.get_number()) {
                    return Ok(ExprValue::Literal(Literal::$type_(num_left $op num_right)));
                }
            };
        }
        macro_rules! binary_num_op {
            ($op:tt) => {
                binary_op_numeric_generic!($op, NUMBER)
            };
        }
        macro_rules! binary_bool_op {
            ($op:tt) => {
                binary_op_numeric_generic!($op, BOOL)
            };
        }
        match operator.type_ {
            TokenType::GREATER => {
                binary_bool_op!(>);
                operand_err!(operator)
            }
            TokenType::GREATER_EQUAL => {
                binary_bool_op!(>=);
                operand_err!(operator)
            }
            TokenType::LESS => {
                binary_bool_op!(<);
                operand_err!(operator)
            }
            TokenType::LESS_EQUAL => {
                binary_bool_op!(<=);
                operand_err!(operator)
            }
            TokenType::BANG_EQUAL => Ok(ExprValue::Literal(Literal::BOOL(res_left != res_right))),
            TokenType::EQUAL_EQUAL => Ok(ExprValue::Literal(Literal::BOOL(res_left == res_right))),
            TokenType::MINUS => {
                binary_num_op!(-);
                operand_err!(operator)
            }
            TokenType::PLUS => {
                binary_num_op!(+);
                if let (Some(str_left), Some(str_right)) =
                    (res_left.get_string(), res_right.get_string())
                {
                    return Ok(ExprValue::Literal(Literal::STRING(
                        str_left.to_owned() + str_right,
                    )));
                }
                Err(RuntimeError::new(
                    operator,
                    RuntimeErrorKind::OperandsMustBeNumbersOrStrings(operator.lexeme.clone()),
                ))
            }
            TokenType::SLASH => {
                if let Some(denominator) = res_right.get_number() {
                    if res_left.get_number().is_some() && denominator.abs() < DIVISION_EPSILON {
                        return Err(RuntimeError::new(operator, RuntimeErrorKind::DivisionByZero));
                    }
                }
                binary_num_op!(/);
                operand_err!(operator)
            }
            TokenType::STAR => {
                binary_num_op!(*);
                operand_err!(operator)
            }
            _ => unreachable!("invalid binary operator"),
        }
    }
}
