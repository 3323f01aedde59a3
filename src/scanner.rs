use crate::error::Diagnostics;
use crate::token::{Literal, RcToken, Token};
use crate::token_type::TokenType;
use crate::token_type::TokenType::*;

use std::collections::HashMap;
use std::rc::Rc;

trait Alpha {
    fn is_identifier_start(&self) -> bool;
    fn is_identifier(&self) -> bool;
}

impl Alpha for char {
    fn is_identifier_start(&self) -> bool {
        self.is_ascii_alphabetic() || *self == '_'
    }
    fn is_identifier(&self) -> bool {
        self.is_ascii_alphanumeric() || *self == '_'
    }
}

pub struct Scanner {
    source: Vec<char>,
    pub tokens: Vec<RcToken>,
    start: usize,
    current: usize,
    line: usize,

    keywords: HashMap<&'static str, TokenType>,
}

macro_rules! match_ {
    ($self:ident, $expected:literal) => {
        if $self.is_at_end() || $self.source[$self.current] != $expected {
            false
        } else {
            $self.current += 1;
            true
        }
    };
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Scanner {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            keywords: HashMap::from([
                ("and", AND),
                ("class", CLASS),
                ("else", ELSE),
                ("false", FALSE),
                ("for", FOR),
                ("fn", FUN),
                ("if", IF),
                ("nil", NIL),
                ("or", OR),
                ("print", PRINT),
                ("return", RETURN),
                ("super", SUPER),
                ("this", THIS),
                ("true", TRUE),
                ("var", VAR),
                ("while", WHILE),
            ]),
        }
    }

    /// Scans the whole source. Lexical errors go to `diagnostics` and scanning carries on
    /// with the next character, so one pass reports all of them.
    pub fn scan_tokens(&mut self, diagnostics: &mut Diagnostics) {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token(diagnostics);
        }
        self.tokens.push(Rc::new(Token::new(
            EOF,
            String::new(),
            Literal::NIL,
            self.line,
        )));
        tracing::trace!(count = self.tokens.len(), "scanned tokens");
    }

    pub fn into_tokens(self) -> Vec<RcToken> {
        self.tokens
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn scan_token(&mut self, diagnostics: &mut Diagnostics) {
        let c = self.advance();
        match c {
            '(' => self.add_token(LEFT_PAREN),
            ')' => self.add_token(RIGHT_PAREN),
            '{' => self.add_token(LEFT_BRACE),
            '}' => self.add_token(RIGHT_BRACE),
            ',' => self.add_token(COMMA),
            '.' => self.add_token(DOT),
            '-' => self.add_token(MINUS),
            '+' => self.add_token(PLUS),
            ';' => self.add_token(SEMICOLON),
            '*' => self.add_token(STAR),
            '?' => self.add_token(QUESTION),
            ':' => self.add_token(COLON),
            '!' => {
                let matches = match_!(self, '=');
                self.add_token(if matches { BANG_EQUAL } else { BANG })
            }
            '=' => {
                let matches = match_!(self, '=');
                self.add_token(if matches { EQUAL_EQUAL } else { EQUAL })
            }
            '<' => {
                let matches = match_!(self, '=');
                self.add_token(if matches { LESS_EQUAL } else { LESS })
            }
            '>' => {
                let matches = match_!(self, '=');
                self.add_token(if matches { GREATER_EQUAL } else { GREATER })
            }
            '/' => {
                let matches = match_!(self, '/');
                // a comment -- //
                if matches {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(SLASH);
                }
            }
            // ignore whitespace
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,
            '"' => self.string(diagnostics),
            '0'..='9' => self.number(diagnostics),
            c if c.is_identifier_start() => self.identifier(),
            c => diagnostics.scan_error(self.line, format!("Unexpected character '{}'.", c)),
        }
    }

    fn advance(&mut self) -> char {
        let res = self.source[self.current];
        self.current += 1;
        res
    }

    fn text(&self, start: usize, stop: usize) -> String {
        self.source[start..stop].iter().collect()
    }

    fn add_token_literal(&mut self, type_: TokenType, literal: Literal) {
        let text = self.text(self.start, self.current);
        self.tokens
            .push(Rc::new(Token::new(type_, text, literal, self.line)));
    }

    fn add_token(&mut self, type_: TokenType) {
        self.add_token_literal(type_, Literal::NIL);
    }

    #[inline(always)]
    fn peek(&self) -> char {
        if self.is_at_end() {
            return '\0';
        }
        self.source[self.current]
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.source.len() {
            return '\0';
        }
        self.source[self.current + 1]
    }

    fn string(&mut self, diagnostics: &mut Diagnostics) {
        // read till closing quote
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            diagnostics.scan_error(self.line, "Unterminated string.");
            return;
        }
        // the closing "
        self.advance();
        // Trim the surrounding quotes.
        let value = self.text(self.start + 1, self.current - 1);
        self.add_token_literal(STRING, Literal::STRING(value));
    }

    fn number(&mut self, diagnostics: &mut Diagnostics) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        let digits_end = self.current;
        // look for fractional part .
        if self.peek() == '.' {
            if self.peek_next().is_ascii_digit() {
                self.advance();
                while self.peek().is_ascii_digit() {
                    self.advance();
                }
            } else {
                self.advance();
                diagnostics.scan_error(self.line, "Expect digit after '.' in number.");
            }
        }
        let end = if self.source[self.current - 1] == '.' {
            digits_end
        } else {
            self.current
        };
        let text = self.text(self.start, end);
        match text.parse::<f64>() {
            Ok(value) => self.tokens.push(Rc::new(Token::new(
                NUMBER,
                text,
                Literal::NUMBER(value),
                self.line,
            ))),
            Err(_) => diagnostics.scan_error(self.line, format!("Invalid number '{}'.", text)),
        }
    }

    fn identifier(&mut self) {
        while self.peek().is_identifier() {
            self.advance();
        }
        let text = self.text(self.start, self.current);
        let token_type = self
            .keywords
            .get(text.as_str())
            .copied()
            .unwrap_or(IDENTIFIER);
        self.add_token(token_type);
    }
}
