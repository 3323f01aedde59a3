use crate::token_type::TokenType;
use std::fmt;
use std::rc::Rc;

/// The value carried by a literal token.
#[allow(non_camel_case_types)]
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    STRING(String),
    NUMBER(f64),
    BOOL(bool),
    NIL,
}

/// One lexical unit. Tokens are shared through [`RcToken`] and never mutated after scanning.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub type_: TokenType,
    pub lexeme: String,
    pub literal: Literal,
    pub line: usize,
}

impl Token {
    pub fn new(type_: TokenType, lexeme: String, literal: Literal, line: usize) -> Token {
        Token {
            type_,
            lexeme,
            literal,
            line,
        }
    }

    /// Where a diagnostic about this token points, as shown after `Error`.
    pub fn location(&self) -> String {
        if matches!(self.type_, TokenType::EOF) {
            String::from(" at end")
        } else {
            format!(" at '{}'", self.lexeme)
        }
    }
}

pub type RcToken = Rc<Token>;

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::STRING(st) => write!(f, "{}", st),
            // f64's Display already drops the ".0" of integral values.
            Literal::NUMBER(num) => write!(f, "{}", num),
            Literal::BOOL(bl) => write!(f, "{}", bl),
            Literal::NIL => write!(f, "nil"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn integral_numbers_print_without_fraction() {
        assert_eq!(Literal::NUMBER(3.0).to_string(), "3");
        assert_eq!(Literal::NUMBER(-12.0).to_string(), "-12");
        assert_eq!(Literal::NUMBER(2.5).to_string(), "2.5");
    }

    #[test]
    fn nil_bool_and_string_text() {
        assert_eq!(Literal::NIL.to_string(), "nil");
        assert_eq!(Literal::BOOL(false).to_string(), "false");
        assert_eq!(Literal::STRING(String::from("hi")).to_string(), "hi");
    }

    #[test]
    fn location_names_lexeme_or_end() {
        let semi = Token::new(TokenType::SEMICOLON, String::from(";"), Literal::NIL, 3);
        let eof = Token::new(TokenType::EOF, String::new(), Literal::NIL, 4);
        assert_eq!(semi.location(), " at ';'");
        assert_eq!(eof.location(), " at end");
    }
}
