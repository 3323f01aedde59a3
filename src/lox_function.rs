use crate::callable::{CallableId, LoxCallable};
use crate::environment::{Environment, SharedEnvironment};
use crate::interpreter::{ExprValue, ExprValueResult, Flow, Interpreter};
use crate::stmt::FunctionDecl;
use crate::token::Literal;
use std::fmt;
use std::rc::Rc;

/// A user-defined function closed over the scope it was declared in.
#[derive(Clone)]
pub struct LoxFunction {
    pub declaration: Rc<FunctionDecl>,
    pub closure: SharedEnvironment,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: SharedEnvironment) -> Self {
        LoxFunction {
            declaration,
            closure,
        }
    }
}

impl LoxCallable for LoxFunction {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<ExprValue>) -> ExprValueResult {
        let environment = Environment::new_shared(Some(&self.closure));
        // Copy args into the fresh call scope.
        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment
                .borrow_mut()
                .define(param.lexeme.clone(), Some(argument));
        }
        match interpreter.execute_block(&self.declaration.body, environment)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(ExprValue::Literal(Literal::NIL)),
        }
    }

    fn id(&self) -> CallableId {
        CallableId::Function(
            Rc::as_ptr(&self.declaration) as usize,
            Rc::as_ptr(&self.closure) as usize,
        )
    }
}

impl fmt::Display for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

// The closure usually contains this function itself, so it is left out.
impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxFunction")
            .field("name", &self.declaration.name.lexeme)
            .field("arity", &self.arity())
            .finish_non_exhaustive()
    }
}
