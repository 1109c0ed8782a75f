//! A parser for the Monkey programming language from <https://interpreterbook.com/>.

use crate::ast;
use crate::lexer::Lexer;
use crate::token::Token;

use std::fmt;
use std::mem;
use std::num;
use std::result;

use log::debug;
use thiserror::Error;

/// The precedence of an operator, from loosest to tightest binding.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

impl Precedence {
    /// Determines the infix binding power of a `Token`.
    fn of(tok: &Token) -> Self {
        match tok {
            Token::Equal | Token::NotEqual => Precedence::Equals,
            Token::LessThan | Token::GreaterThan => Precedence::LessGreater,
            Token::Plus | Token::Minus => Precedence::Sum,
            Token::Asterisk | Token::Slash => Precedence::Product,
            Token::LeftParen => Precedence::Call,
            Token::LeftBracket => Precedence::Index,

            _ => Precedence::Lowest,
        }
    }
}

// The prefix and infix parsing functions registered for token kinds.
type PrefixParseFn<'a> = fn(&mut Parser<'a>) -> Option<ast::Expression>;
type InfixParseFn<'a> = fn(&mut Parser<'a>, ast::Expression) -> Option<ast::Expression>;

/// Parses `Token`s and produces an `ast::Program` for the Monkey programming
/// language.
pub struct Parser<'a> {
    lexer: Lexer<'a>,

    current: Token,
    peek: Token,

    errors: Vec<Error>,
}

impl<'a> Parser<'a> {
    /// Creates a new `Parser` by accepting a `Lexer`.
    pub fn new(lexer: Lexer<'a>) -> Self {
        let mut p = Parser {
            lexer,

            current: Token::Eof,
            peek: Token::Eof,

            errors: vec![],
        };

        // Read two tokens so current and peek are both set.
        p.next_token();
        p.next_token();

        p
    }

    /// Parses the input `Token` stream and creates an `ast::Program`, failing
    /// with every error found if the input is malformed.
    pub fn parse(&mut self) -> result::Result<ast::Program, Errors> {
        let prog = self.parse_program();

        if self.errors.is_empty() {
            Ok(prog)
        } else {
            Err(Errors(mem::take(&mut self.errors)))
        }
    }

    /// Parses the input `Token` stream and creates an `ast::Program` from all
    /// well-formed statements. Problems are recorded and can be inspected with
    /// `errors` afterwards.
    pub fn parse_program(&mut self) -> ast::Program {
        let mut prog = ast::Program::new();

        while self.current != Token::Eof {
            if let Some(stmt) = self.parse_statement() {
                prog.statements.push(stmt);
            }

            self.next_token();
        }

        prog
    }

    /// The errors recorded while parsing.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Advances the parser once in its `Token` stream.
    fn next_token(&mut self) {
        // current takes the value of peek, and peek is overwritten immediately
        // after by the next token.
        self.current = mem::replace(&mut self.peek, self.lexer.next_token());
    }

    /// Peeks at the next `Token` and determines if it is the same as `tok`.
    fn peek_is(&self, tok: &Token) -> bool {
        self.peek == *tok
    }

    /// Advances if the next `Token` is `tok`, or records an error if not.
    fn expect_peek(&mut self, tok: Token) -> Option<()> {
        if self.peek_is(&tok) {
            self.next_token();
            Some(())
        } else {
            let got = self.peek.clone();
            self.error(Error::UnexpectedToken {
                want: tok.to_string(),
                got,
            });
            None
        }
    }

    /// Advances past a `Token::Identifier` and extracts its value, or records
    /// an error if the next `Token` is of a different type.
    fn expect_peek_identifier(&mut self) -> Option<String> {
        if let Token::Identifier(id) = &self.peek {
            let id = id.clone();
            self.next_token();
            Some(id)
        } else {
            let got = self.peek.clone();
            self.error(Error::UnexpectedToken {
                want: "identifier".to_string(),
                got,
            });
            None
        }
    }

    /// Records a parsing error and continues.
    fn error(&mut self, err: Error) {
        debug!("parser error: {}", err);
        self.errors.push(err);
    }

    /// Parses a statement.
    fn parse_statement(&mut self) -> Option<ast::Statement> {
        match self.current {
            Token::Let => self.parse_let_statement(),
            Token::Return => self.parse_return_statement(),

            _ => self.parse_expression_statement(),
        }
    }

    /// Parses a let statement.
    fn parse_let_statement(&mut self) -> Option<ast::Statement> {
        let name = self.expect_peek_identifier()?;
        self.expect_peek(Token::Assign)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Some(ast::Statement::Let(ast::LetStatement { name, value }))
    }

    /// Parses a return statement.
    fn parse_return_statement(&mut self) -> Option<ast::Statement> {
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Some(ast::Statement::Return(ast::ReturnStatement { value }))
    }

    /// Parses an expression statement.
    fn parse_expression_statement(&mut self) -> Option<ast::Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Some(ast::Statement::Expression(expr))
    }

    // Semicolons are optional at the end of a statement.
    fn skip_semicolon(&mut self) {
        if self.peek_is(&Token::Semicolon) {
            self.next_token();
        }
    }

    /// Parses an expression whose operators bind tighter than `precedence`.
    fn parse_expression(&mut self, precedence: Precedence) -> Option<ast::Expression> {
        let prefix = match self.prefix_parse_fn() {
            Some(prefix) => prefix,
            None => {
                let tok = self.current.clone();
                self.error(Error::NoPrefixParser(tok));
                return None;
            }
        };

        let mut left = prefix(self)?;

        while !self.peek_is(&Token::Semicolon) && precedence < Precedence::of(&self.peek) {
            let infix = match self.infix_parse_fn() {
                Some(infix) => infix,
                None => return Some(left),
            };

            self.next_token();
            left = infix(self, left)?;
        }

        Some(left)
    }

    /// Looks up the prefix parsing function for the current `Token`.
    fn prefix_parse_fn(&self) -> Option<PrefixParseFn<'a>> {
        let f: PrefixParseFn<'a> = match self.current {
            Token::Identifier(_) => Parser::parse_identifier,
            Token::Integer(_) => Parser::parse_integer,
            Token::String(_) => Parser::parse_string,
            Token::True | Token::False => Parser::parse_boolean,
            Token::Bang | Token::Minus => Parser::parse_prefix_expression,
            Token::LeftParen => Parser::parse_grouped_expression,
            Token::If => Parser::parse_if_expression,
            Token::Function => Parser::parse_function_literal,
            Token::LeftBracket => Parser::parse_array_literal,
            Token::LeftBrace => Parser::parse_hash_literal,

            _ => return None,
        };

        Some(f)
    }

    /// Looks up the infix parsing function for the peek `Token`.
    fn infix_parse_fn(&self) -> Option<InfixParseFn<'a>> {
        let f: InfixParseFn<'a> = match self.peek {
            Token::Plus
            | Token::Minus
            | Token::Asterisk
            | Token::Slash
            | Token::Equal
            | Token::NotEqual
            | Token::LessThan
            | Token::GreaterThan => Parser::parse_infix_expression,
            Token::LeftParen => Parser::parse_call_expression,
            Token::LeftBracket => Parser::parse_index_expression,

            _ => return None,
        };

        Some(f)
    }

    fn parse_identifier(&mut self) -> Option<ast::Expression> {
        match &self.current {
            Token::Identifier(id) => Some(ast::Expression::Identifier(id.clone())),
            _ => None,
        }
    }

    fn parse_integer(&mut self) -> Option<ast::Expression> {
        let literal = match &self.current {
            Token::Integer(i) => i.clone(),
            _ => return None,
        };

        match literal.parse::<i64>() {
            Ok(i) => Some(ast::Expression::Integer(i)),
            Err(source) => {
                self.error(Error::IllegalInteger { literal, source });
                None
            }
        }
    }

    fn parse_string(&mut self) -> Option<ast::Expression> {
        match &self.current {
            Token::String(s) => Some(ast::Expression::String(s.clone())),
            _ => None,
        }
    }

    fn parse_boolean(&mut self) -> Option<ast::Expression> {
        Some(ast::Expression::Boolean(self.current == Token::True))
    }

    fn parse_prefix_expression(&mut self) -> Option<ast::Expression> {
        let operator = self.current.clone();
        self.next_token();

        let right = self.parse_expression(Precedence::Prefix)?;

        Some(ast::Expression::Prefix(ast::PrefixExpression {
            operator,
            right: Box::new(right),
        }))
    }

    fn parse_infix_expression(&mut self, left: ast::Expression) -> Option<ast::Expression> {
        let operator = self.current.clone();
        let precedence = Precedence::of(&operator);
        self.next_token();

        let right = self.parse_expression(precedence)?;

        Some(ast::Expression::Infix(ast::InfixExpression {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }))
    }

    fn parse_grouped_expression(&mut self) -> Option<ast::Expression> {
        self.next_token();

        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Token::RightParen)?;

        Some(expr)
    }

    fn parse_if_expression(&mut self) -> Option<ast::Expression> {
        self.expect_peek(Token::LeftParen)?;
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Token::RightParen)?;
        self.expect_peek(Token::LeftBrace)?;

        let consequence = self.parse_block_statement();

        let alternative = if self.peek_is(&Token::Else) {
            self.next_token();
            self.expect_peek(Token::LeftBrace)?;

            Some(self.parse_block_statement())
        } else {
            None
        };

        Some(ast::Expression::If(ast::IfExpression {
            condition: Box::new(condition),
            consequence,
            alternative,
        }))
    }

    /// Parses statements until the closing brace of a block.
    fn parse_block_statement(&mut self) -> ast::BlockStatement {
        let mut block = ast::BlockStatement::default();
        self.next_token();

        while self.current != Token::RightBrace && self.current != Token::Eof {
            if let Some(stmt) = self.parse_statement() {
                block.statements.push(stmt);
            }

            self.next_token();
        }

        block
    }

    fn parse_function_literal(&mut self) -> Option<ast::Expression> {
        self.expect_peek(Token::LeftParen)?;

        let parameters = self.parse_function_parameters()?;
        self.expect_peek(Token::LeftBrace)?;

        let body = self.parse_block_statement();

        Some(ast::Expression::Function(ast::FunctionLiteral {
            parameters,
            body,
        }))
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<String>> {
        let mut parameters = vec![];

        // No parameters.
        if self.peek_is(&Token::RightParen) {
            self.next_token();
            return Some(parameters);
        }

        parameters.push(self.expect_peek_identifier()?);

        while self.peek_is(&Token::Comma) {
            self.next_token();
            parameters.push(self.expect_peek_identifier()?);
        }

        self.expect_peek(Token::RightParen)?;

        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: ast::Expression) -> Option<ast::Expression> {
        let arguments = self.parse_expression_list(Token::RightParen)?;

        Some(ast::Expression::Call(ast::CallExpression {
            function: Box::new(function),
            arguments,
        }))
    }

    fn parse_array_literal(&mut self) -> Option<ast::Expression> {
        let elements = self.parse_expression_list(Token::RightBracket)?;

        Some(ast::Expression::Array(ast::ArrayLiteral { elements }))
    }

    /// Parses a comma-separated list of expressions terminated by `end`.
    fn parse_expression_list(&mut self, end: Token) -> Option<Vec<ast::Expression>> {
        let mut list = vec![];

        // Empty list.
        if self.peek_is(&end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_is(&Token::Comma) {
            // Skip the comma and move to the next expression.
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;

        Some(list)
    }

    fn parse_index_expression(&mut self, left: ast::Expression) -> Option<ast::Expression> {
        self.next_token();

        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Token::RightBracket)?;

        Some(ast::Expression::Index(ast::IndexExpression {
            left: Box::new(left),
            index: Box::new(index),
        }))
    }

    fn parse_hash_literal(&mut self) -> Option<ast::Expression> {
        let mut pairs = vec![];

        while !self.peek_is(&Token::RightBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;

            self.expect_peek(Token::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;

            pairs.push((key, value));

            // Either the hash ends here, or another pair follows a comma.
            if !self.peek_is(&Token::RightBrace) {
                self.expect_peek(Token::Comma)?;
            }
        }

        self.expect_peek(Token::RightBrace)?;

        Some(ast::Expression::Hash(ast::HashLiteral { pairs }))
    }
}

/// Specifies the different classes of errors which may occur while parsing.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("expected next token to be {want}, got {got} instead")]
    UnexpectedToken { want: String, got: Token },
    #[error("no prefix parse function for {0}")]
    NoPrefixParser(Token),
    #[error("could not parse {literal:?} as integer: {source}")]
    IllegalInteger {
        literal: String,
        source: num::ParseIntError,
    },
}

/// Every `Error` found while parsing a program, reported as a batch.
#[derive(Debug, Error, PartialEq)]
pub struct Errors(pub Vec<Error>);

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let errors: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();

        write!(f, "parser errors: {}", errors.join("; "))
    }
}
