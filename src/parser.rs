use crate::error::{Diagnostics, StaticError};
use crate::expr::*;
use crate::stmt::{FunctionDecl, Stmt};
use crate::token::*;
use crate::token_type::TokenType::*;
use std::rc::Rc;

/// Calls and function declarations accept at most this many arguments / parameters.
pub const MAX_ARGUMENTS: usize = 255;

pub struct Parser<'a> {
    diagnostics: &'a mut Diagnostics,
    tokens: Vec<RcToken>,
    current: usize,
    function_depth: usize,
}

type ExprResult = Result<Expr, StaticError>;

type StmtResult = Result<Stmt, StaticError>;

macro_rules! check {
    ($self:ident, $types:pat) => {
        if $self.is_at_end() {
            false
        } else {
            matches!(&$self.peek().type_, $types)
        }
    };
}

macro_rules! match_ {
    ($self:ident, $types:pat) => {
        if check!($self, $types) {
            $self.advance();
            true
        } else {
            false
        }
    };
}

macro_rules! consume {
    ($self:ident, $type_:pat, $message:expr) => {
        if check!($self, $type_) {
            Ok($self.advance())
        } else {
            Err(Parser::error($self.peek(), String::from($message)))
        }
    };
    ($self:ident, $type_:pat, $message:literal, $($args: tt) *) => {
        if check!($self, $type_) {
            Ok($self.advance())
        } else {
            Err(Parser::error($self.peek(), format!($message, $($args,) *)))
        }
    };
}

impl<'a> Parser<'a> {
    pub fn new(diagnostics: &'a mut Diagnostics, mut tokens: Vec<RcToken>) -> Parser<'a> {
        if !matches!(tokens.last(), Some(token) if token.type_ == EOF) {
            let line = tokens.last().map_or(1, |token| token.line);
            tokens.push(Rc::new(Token::new(EOF, String::new(), Literal::NIL, line)));
        }
        Parser {
            diagnostics,
            tokens,
            current: 0,
            function_depth: 0,
        }
    }

    /// Parses every declaration in the token stream. Declarations that fail to parse are
    /// reported to the diagnostics and left out of the result.
    #[tracing::instrument(level = "debug", skip_all, fields(tokens = self.tokens.len()))]
    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements: Vec<Stmt> = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        tracing::debug!(count = statements.len(), "parsed statements");
        statements
    }

    fn expression(&mut self) -> ExprResult {
        self.assignment()
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let res = if match_!(self, FUN) {
            self.function("function")
        } else if match_!(self, VAR) {
            self.var_declaration()
        } else {
            self.statement()
        };
        match res {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                self.diagnostics.push(error);
                self.synchronize();
                None
            }
        }
    }

    fn statement(&mut self) -> StmtResult {
        if match_!(self, FOR) {
            return self.for_statement();
        }
        if match_!(self, IF) {
            return self.if_statement();
        }
        if match_!(self, PRINT) {
            return self.print_statement();
        }
        if match_!(self, RETURN) {
            return self.return_statement();
        }
        if match_!(self, WHILE) {
            return self.while_statement();
        }
        if match_!(self, LEFT_BRACE) {
            return Ok(Stmt::Block {
                statements: self.block()?,
            });
        }
        self.expression_statement()
    }

    fn for_statement(&mut self) -> StmtResult {
        consume!(self, LEFT_PAREN, "Expect '(' after 'for'.")?;

        let initializer = if match_!(self, SEMICOLON) {
            None
        } else if match_!(self, VAR) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };
        let condition = if check!(self, SEMICOLON) {
            Expr::Literal(Literal::BOOL(true))
        } else {
            self.expression()?
        };
        consume!(self, SEMICOLON, "Expect ';' after loop condition.")?;

        let increment = if check!(self, RIGHT_PAREN) {
            None
        } else {
            Some(self.expression()?)
        };
        consume!(self, RIGHT_PAREN, "Expect ')' after for clauses.")?;
        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block {
                statements: vec![body, Stmt::Expression { expr: increment }],
            }
        }
        body = Stmt::While {
            condition,
            body: Box::new(body),
        };
        if let Some(initializer) = initializer {
            body = Stmt::Block {
                statements: vec![initializer, body],
            };
        }
        Ok(body)
    }

    fn if_statement(&mut self) -> StmtResult {
        consume!(self, LEFT_PAREN, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        consume!(self, RIGHT_PAREN, "Expect ')' after if condition.")?;

        let then_branch = self.statement()?;
        let else_branch = if match_!(self, ELSE) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }

    fn print_statement(&mut self) -> StmtResult {
        let keyword = self.previous();
        let expr = self.expression()?;
        consume!(self, SEMICOLON, "Expect ';' after value.")?;
        Ok(Stmt::Print { keyword, expr })
    }

    fn return_statement(&mut self) -> StmtResult {
        let keyword = self.previous();
        if self.function_depth == 0 {
            self.report(&keyword, "Can't return from top-level code.");
        }
        let value = if check!(self, SEMICOLON) {
            None
        } else {
            Some(self.expression()?)
        };

        consume!(self, SEMICOLON, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn var_declaration(&mut self) -> StmtResult {
        let name = consume!(self, IDENTIFIER, "Expect variable name.")?;
        let initializer = if match_!(self, EQUAL) {
            Some(self.expression()?)
        } else {
            None
        };
        consume!(self, SEMICOLON, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var { name, initializer })
    }

    fn while_statement(&mut self) -> StmtResult {
        consume!(self, LEFT_PAREN, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        consume!(self, RIGHT_PAREN, "Expect ')' after condition.")?;
        let body = self.statement()?;
        Ok(Stmt::While {
            condition,
            body: Box::new(body),
        })
    }

    fn expression_statement(&mut self) -> StmtResult {
        let expr = self.expression()?;
        consume!(self, SEMICOLON, "Expect ';' after expression.")?;
        Ok(Stmt::Expression { expr })
    }

    fn function(&mut self, kind: &'static str) -> StmtResult {
        let name = consume!(self, IDENTIFIER, "Expect {} name.", kind)?;
        consume!(self, LEFT_PAREN, "Expect '(' after {} name.", kind)?;
        let mut params: Vec<RcToken> = Vec::new();
        if !check!(self, RIGHT_PAREN) {
            loop {
                if params.len() >= MAX_ARGUMENTS {
                    let token = Rc::clone(self.peek());
                    self.report(&token, "Can't have more than 255 parameters.");
                }
                params.push(consume!(self, IDENTIFIER, "Expect parameter name.")?);
                if !match_!(self, COMMA) {
                    break;
                }
            }
        }
        consume!(self, RIGHT_PAREN, "Expect ')' after parameters.")?;

        consume!(self, LEFT_BRACE, "Expect '{{' before {} body.", kind)?;
        self.function_depth += 1;
        let body = self.block();
        self.function_depth -= 1;
        Ok(Stmt::Function(Rc::new(FunctionDecl {
            name,
            params,
            body: body?,
        })))
    }

    fn block(&mut self) -> Result<Vec<Stmt>, StaticError> {
        let mut statements = Vec::<Stmt>::new();
        while !check!(self, RIGHT_BRACE) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        consume!(self, RIGHT_BRACE, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn assignment(&mut self) -> ExprResult {
        let expr = self.ternary()?;
        if match_!(self, EQUAL) {
            let equals = self.previous();
            let value = self.assignment()?;
            return match expr {
                Expr::Variable { name } => Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                }),
                _ => {
                    self.report(&equals, "Invalid assignment target.");
                    Ok(value)
                }
            };
        }
        Ok(expr)
    }

    fn ternary(&mut self) -> ExprResult {
        let test = self.or()?;
        if match_!(self, QUESTION) {
            let question = self.previous();
            let pass = self.expression()?;
            consume!(self, COLON, "Expect ':' after then branch of ternary expression.")?;
            let fail = self.expression()?;
            return Ok(Expr::Ternary {
                test: Box::new(test),
                question,
                pass: Box::new(pass),
                fail: Box::new(fail),
            });
        }
        Ok(test)
    }

    fn or(&mut self) -> ExprResult {
        let mut expr = self.and()?;
        while match_!(self, OR) {
            let operator = self.previous();
            let right = self.and()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn and(&mut self) -> ExprResult {
        let mut expr = self.equality()?;
        while match_!(self, AND) {
            let operator = self.previous();
            let right = self.equality()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ExprResult {
        let mut expr = self.comparison()?;
        while match_!(self, BANG_EQUAL | EQUAL_EQUAL) {
            let operator = self.previous();
            let right = self.comparison()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> ExprResult {
        let mut expr: Expr = self.term()?;
        while match_!(self, GREATER | GREATER_EQUAL | LESS | LESS_EQUAL) {
            let operator = self.previous();
            let right = self.term()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn term(&mut self) -> ExprResult {
        let mut expr: Expr = self.factor()?;
        while match_!(self, MINUS | PLUS) {
            let operator = self.previous();
            let right = self.factor()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn factor(&mut self) -> ExprResult {
        let mut expr: Expr = self.unary()?;
        while match_!(self, SLASH | STAR) {
            let operator = self.previous();
            let right = self.unary()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ExprResult {
        if match_!(self, BANG | MINUS) {
            let operator = self.previous();
            let right = self.unary()?;
            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }
        self.call()
    }

    fn finish_call(&mut self, callee: Expr) -> ExprResult {
        let mut arguments = Vec::<Expr>::new();
        if !check!(self, RIGHT_PAREN) {
            loop {
                if arguments.len() >= MAX_ARGUMENTS {
                    let token = Rc::clone(self.peek());
                    self.report(&token, "Can't have more than 255 arguments.");
                }
                arguments.push(self.expression()?);
                if !match_!(self, COMMA) {
                    break;
                }
            }
        }
        let paren = consume!(self, RIGHT_PAREN, "Expect ')' after arguments.")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn call(&mut self) -> ExprResult {
        let mut expr = self.primary()?;
        while match_!(self, LEFT_PAREN) {
            expr = self.finish_call(expr)?;
        }
        Ok(expr)
    }

    fn primary(&mut self) -> ExprResult {
        if match_!(self, FALSE) {
            return Ok(Expr::Literal(Literal::BOOL(false)));
        }
        if match_!(self, TRUE) {
            return Ok(Expr::Literal(Literal::BOOL(true)));
        }
        if match_!(self, NIL) {
            return Ok(Expr::Literal(Literal::NIL));
        }
        if match_!(self, NUMBER | STRING) {
            return Ok(Expr::Literal(self.previous().literal.clone()));
        }
        if match_!(self, IDENTIFIER) {
            return Ok(Expr::Variable {
                name: self.previous(),
            });
        }
        if match_!(self, LEFT_PAREN) {
            let expr = self.expression()?;
            consume!(self, RIGHT_PAREN, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }
        Err(Parser::error(self.peek(), String::from("Expect expression.")))
    }

    /* Non-production rule functions */
    #[inline(always)]
    fn is_at_end(&self) -> bool {
        matches!(self.peek().type_, EOF)
    }
    #[inline(always)]
    fn peek(&self) -> &RcToken {
        &self.tokens[self.current]
    }
    #[inline(always)]
    fn previous(&self) -> RcToken {
        Rc::clone(&self.tokens[self.current - 1])
    }
    fn advance(&mut self) -> RcToken {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }
    fn error(token: &RcToken, message: String) -> StaticError {
        StaticError::ParseError {
            token: Rc::clone(token),
            message,
        }
    }
    /// Records an error without unwinding the current production.
    fn report(&mut self, token: &RcToken, message: &str) {
        self.diagnostics
            .push(Parser::error(token, String::from(message)));
    }
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if matches!(self.previous().type_, SEMICOLON) {
                return;
            }

            match self.peek().type_ {
                CLASS | FUN | VAR | FOR | IF | WHILE | PRINT | RETURN => return,
                _ => self.advance(),
            };
        }
    }
}
