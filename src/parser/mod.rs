// License: MIT

use crate::IvoryError;
use crate::ast::RawDocument;
use crate::lexer::{Lexer, Token};

mod document;
mod interp;
mod value;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    peek: Option<Token>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Result<Self, IvoryError> {
        let mut lexer = Lexer::new(input);
        let peek = Some(lexer.next_token()?);
        Ok(Self { lexer, peek })
    }

    pub(crate) fn bump(&mut self) -> Result<Token, IvoryError> {
        let curr = self.peek.take().ok_or(IvoryError::UnexpectedEof {
            message: "Unexpected end of input".into(),
            line: self.lexer.line(),
            column: self.lexer.column(),
        })?;
        self.peek = Some(self.lexer.next_token()?);
        Ok(curr)
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.peek.as_ref()
    }

    pub(crate) fn expect(&mut self, expected: Token) -> Result<Token, IvoryError> {
        let token = self.bump()?;
        if token != expected {
            return Err(IvoryError::SyntaxError {
                message: format!("Expected {:?}, got {:?}", expected, token),
                line: self.lexer.line(),
                column: self.lexer.column(),
                hint: Some("Check your syntax".into()),
            });
        }
        Ok(token)
    }

    pub(crate) fn expect_ident(&mut self, what: &str) -> Result<String, IvoryError> {
        match self.bump()? {
            Token::Ident(name) => Ok(name),
            token => Err(IvoryError::SyntaxError {
                message: format!("Expected {}, got {:?}", what, token),
                line: self.lexer.line(),
                column: self.lexer.column(),
                hint: None,
            }),
        }
    }

    pub(crate) fn line(&self) -> usize {
        self.lexer.line()
    }

    pub(crate) fn column(&self) -> usize {
        self.lexer.column()
    }

    /// Parse a whole configuration text into its raw, unresolved form.
    pub fn parse_document(&mut self) -> Result<RawDocument, IvoryError> {
        document::parse_document(self)
    }
}

#[cfg(test)]
mod tests;
