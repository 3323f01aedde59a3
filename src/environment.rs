use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::interpreter::ExprValue;
use crate::token::RcToken;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub type SharedEnvironment = Rc<RefCell<Environment>>;

/// One scope. A binding holding `None` has been declared but not yet assigned.
///
/// The enclosing link is set once in [`Environment::new`]; scopes only ever point outward.
#[derive(Debug, Default)]
pub struct Environment {
    enclosing: Option<SharedEnvironment>,
    values: HashMap<String, Option<ExprValue>>,
}

impl Environment {
    pub fn new(enclosing: Option<&SharedEnvironment>) -> Self {
        Environment {
            enclosing: enclosing.map(Rc::clone),
            values: HashMap::new(),
        }
    }

    pub fn new_shared(enclosing: Option<&SharedEnvironment>) -> SharedEnvironment {
        Rc::new(RefCell::new(Environment::new(enclosing)))
    }

    /// Binds `name` in this scope, replacing any earlier binding of the same name here.
    pub fn define(&mut self, name: String, value: Option<ExprValue>) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &RcToken) -> Result<ExprValue, RuntimeError> {
        match self.values.get(&name.lexeme) {
            Some(Some(value)) => Ok(value.clone()),
            Some(None) => Err(RuntimeError::new(
                name,
                RuntimeErrorKind::Uninitialized(name.lexeme.clone()),
            )),
            None => match &self.enclosing {
                Some(enclosing) => enclosing.borrow().get(name),
                None => Err(RuntimeError::new(
                    name,
                    RuntimeErrorKind::UndefinedVariable(name.lexeme.clone()),
                )),
            },
        }
    }

    /// Updates the nearest existing binding of `name`. Never creates one.
    pub fn assign(&mut self, name: &RcToken, value: ExprValue) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = Some(value);
            return Ok(());
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign(name, value),
            None => Err(RuntimeError::new(
                name,
                RuntimeErrorKind::UndefinedVariable(name.lexeme.clone()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Literal, Token};
    use crate::token_type::TokenType;
    use pretty_assertions::assert_eq;

    fn name(lexeme: &str) -> RcToken {
        Rc::new(Token::new(TokenType::IDENTIFIER, lexeme.to_string(), Literal::NIL, 1))
    }

    fn number(n: f64) -> ExprValue {
        ExprValue::Literal(Literal::NUMBER(n))
    }

    #[test]
    fn get_searches_outward() {
        let globals = Environment::new_shared(None);
        globals.borrow_mut().define(String::from("a"), Some(number(1.0)));
        let inner = Environment::new(Some(&globals));
        assert_eq!(inner.get(&name("a")), Ok(number(1.0)));
    }

    #[test]
    fn undefined_variable() {
        let env = Environment::new(None);
        let err = env.get(&name("nope")).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::UndefinedVariable(String::from("nope")));
    }

    #[test]
    fn declared_but_unassigned_fails_until_assigned() {
        let mut env = Environment::new(None);
        env.define(String::from("a"), None);
        let err = env.get(&name("a")).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::Uninitialized(String::from("a")));
        env.assign(&name("a"), number(2.0)).unwrap();
        assert_eq!(env.get(&name("a")), Ok(number(2.0)));
    }

    #[test]
    fn redefinition_overwrites() {
        let mut env = Environment::new(None);
        env.define(String::from("a"), Some(number(1.0)));
        env.define(String::from("a"), Some(number(2.0)));
        assert_eq!(env.get(&name("a")), Ok(number(2.0)));
    }

    #[test]
    fn assign_mutates_the_enclosing_binding() {
        let globals = Environment::new_shared(None);
        globals.borrow_mut().define(String::from("a"), Some(number(1.0)));
        let mut inner = Environment::new(Some(&globals));
        inner.assign(&name("a"), number(5.0)).unwrap();
        assert_eq!(globals.borrow().get(&name("a")), Ok(number(5.0)));
        assert!(inner.values.is_empty());
    }

    #[test]
    fn assign_never_creates_a_binding() {
        let globals = Environment::new_shared(None);
        let mut inner = Environment::new(Some(&globals));
        let err = inner.assign(&name("ghost"), number(1.0)).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::UndefinedVariable(String::from("ghost")));
        assert!(globals.borrow().values.is_empty());
    }

    #[test]
    fn shadowing_leaves_outer_binding_alone() {
        let globals = Environment::new_shared(None);
        globals.borrow_mut().define(String::from("a"), Some(number(1.0)));
        let inner = Environment::new_shared(Some(&globals));
        inner.borrow_mut().define(String::from("a"), Some(number(2.0)));
        inner.borrow_mut().assign(&name("a"), number(3.0)).unwrap();
        assert_eq!(inner.borrow().get(&name("a")), Ok(number(3.0)));
        assert_eq!(globals.borrow().get(&name("a")), Ok(number(1.0)));
    }
}
