use crate::error::RuntimeError;
use crate::interpreter::{ExprValue, ExprValueResult, Interpreter};
use crate::token::Literal;
use dyn_clone::{clone_trait_object, DynClone};
use std::fmt::{self, Debug, Display};
use std::time::{SystemTime, UNIX_EPOCH};

/// What makes two callable values "the same function" for `==`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallableId {
    Native(&'static str),
    /// Addresses of the shared declaration and of the captured scope.
    Function(usize, usize),
}

/// Anything that can appear in callee position: user functions and built-ins.
pub trait LoxCallable: Debug + Display + DynClone {
    fn arity(&self) -> usize;
    /// Invoked with exactly [`arity`](LoxCallable::arity) arguments.
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<ExprValue>) -> ExprValueResult;
    fn id(&self) -> CallableId;
}

clone_trait_object!(LoxCallable);

impl PartialEq for dyn LoxCallable {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

// BUILTINS

/// `clock()`: seconds since the Unix epoch, with sub-second precision.
#[derive(Clone, Debug)]
pub struct Clock;

impl LoxCallable for Clock {
    fn arity(&self) -> usize {
        0
    }
    fn call(
        &self,
        _interpreter: &mut Interpreter,
        _arguments: Vec<ExprValue>,
    ) -> Result<ExprValue, RuntimeError> {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Ok(ExprValue::Literal(Literal::NUMBER(duration.as_secs_f64())))
    }
    fn id(&self) -> CallableId {
        CallableId::Native("clock")
    }
}

impl Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clock_is_a_positive_number() {
        let mut interpreter = Interpreter::new();
        match Clock.call(&mut interpreter, Vec::new()) {
            Ok(ExprValue::Literal(Literal::NUMBER(seconds))) => assert!(seconds > 0.0),
            other => panic!("unexpected clock result {:?}", other),
        }
    }

    #[test]
    fn boxed_callables_clone_with_identity() {
        let boxed: Box<dyn LoxCallable> = Box::new(Clock);
        let copy = boxed.clone();
        assert_eq!(copy.id(), CallableId::Native("clock"));
        assert!(*boxed == *copy);
        assert_eq!(copy.to_string(), "<native fn>");
    }
}
