//! Ash Parser
//!
//! Recursive descent parser producing the untyped program AST.
//! Binary expressions use precedence climbing; everything else is
//! predictive with single-token lookahead.

mod expr;
mod stmt;

#[cfg(test)]
mod parser_tests;

use ash_ast::*;
use ash_lexer::{tokenize, LexError, SpannedToken, Token};
use thiserror::Error;

/// Error type for parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Unexpected token encountered during parsing
    #[error("Unexpected token '{found}', expected {expected}")]
    UnexpectedToken {
        /// Rendered form of the token that was found
        found: String,
        /// Source location of the unexpected token
        span: Span,
        /// Description of what was expected
        expected: String,
    },
    /// Unexpected end of file while parsing
    #[error("Unexpected end of file")]
    UnexpectedEof {
        /// Location where EOF was encountered
        span: Span,
    },
    /// The lexer rejected a character
    #[error("Unexpected character in input")]
    InvalidCharacter { span: Span },
}

impl ParseError {
    /// Get the span associated with this error
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::UnexpectedToken { span, .. } => Some(*span),
            ParseError::UnexpectedEof { span } => Some(*span),
            ParseError::InvalidCharacter { span } => Some(*span),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &str {
        match self {
            ParseError::UnexpectedToken { .. } => "P001",
            ParseError::UnexpectedEof { .. } => "P002",
            ParseError::InvalidCharacter { .. } => "P003",
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::InvalidCharacter { span: err.span() }
    }
}

pub(crate) type ParseResult<T> = Result<T, ParseError>;

/// Tokenize and parse a complete source file.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let tokens = tokenize(source)?;
    Parser::new(tokens).parse_program()
}

/// Recursive descent parser for Ash source code.
pub struct Parser {
    /// Token stream to parse
    tokens: Vec<SpannedToken>,
    /// Current position in the token stream
    pos: usize,
}

impl Parser {
    /// Creates a new parser from a token stream.
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parses a complete program (top-level items).
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut items = Vec::new();

        while !self.is_at_end() {
            items.push(self.parse_item()?);
        }

        Ok(Program { items })
    }

    /// Parse a top-level item
    fn parse_item(&mut self) -> ParseResult<Spanned<Item>> {
        let start = self.current_span();

        let item = if self.check(&Token::Struct) {
            self.advance();
            Item::Struct(self.parse_struct()?)
        } else if self.check(&Token::Resource) {
            self.advance();
            Item::Resource(self.parse_resource()?)
        } else if self.check(&Token::Fn) {
            self.advance();
            Item::Function(self.parse_function()?)
        } else {
            return Err(self.unexpected("struct, resource, or fn"));
        };

        let span = start.merge(self.prev_span());
        Ok(Spanned::new(item, span))
    }

    /// Parse struct: `Name { field: type, ... }`
    fn parse_struct(&mut self) -> ParseResult<StructDef> {
        let name = self.parse_ident()?;

        self.expect(&Token::LBrace)?;
        let fields = self.parse_fields()?;
        self.expect(&Token::RBrace)?;

        Ok(StructDef { name, fields })
    }

    /// Parse resource: `Name { field: type, ... cleanup { stmts } }`
    fn parse_resource(&mut self) -> ParseResult<ResourceDef> {
        let name = self.parse_ident()?;

        self.expect(&Token::LBrace)?;
        let fields = self.parse_fields()?;

        let cleanup = if self.check(&Token::Cleanup) {
            self.advance();
            self.expect(&Token::LBrace)?;
            let stmts = self.parse_block_contents()?;
            self.expect(&Token::RBrace)?;
            Some(stmts)
        } else {
            None
        };

        self.expect(&Token::RBrace)?;

        Ok(ResourceDef {
            name,
            fields,
            cleanup,
        })
    }

    /// Parse a comma-separated field list, stopping before `}` or `cleanup`
    fn parse_fields(&mut self) -> ParseResult<Vec<FieldDef>> {
        let mut fields = Vec::new();

        while !self.check(&Token::RBrace) && !self.check(&Token::Cleanup) && !self.is_at_end() {
            let name = self.parse_ident()?;
            self.expect(&Token::Colon)?;
            let ty = self.parse_type()?;
            fields.push(FieldDef { name, ty });

            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        Ok(fields)
    }

    /// Parse function: `name(params) -> ret { ... }`
    fn parse_function(&mut self) -> ParseResult<FuncDef> {
        let name = self.parse_ident()?;

        self.expect(&Token::LParen)?;
        let params = self.parse_params()?;
        self.expect(&Token::RParen)?;

        let ret_type = if self.check(&Token::Arrow) {
            self.advance();
            Some(self.parse_type()?)
        } else {
            None
        };

        self.expect(&Token::LBrace)?;
        let body = self.parse_block_contents()?;
        self.expect(&Token::RBrace)?;

        Ok(FuncDef {
            name,
            params,
            ret_type,
            body,
        })
    }

    /// Parse parameter list: `name: [ref|inout|mut] type, ...`
    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();

        while !self.check(&Token::RParen) && !self.is_at_end() {
            let name = self.parse_ident()?;
            self.expect(&Token::Colon)?;

            let mode = if self.check(&Token::Ref) {
                self.advance();
                PassMode::Ref
            } else if self.check(&Token::Inout) {
                self.advance();
                PassMode::Inout
            } else if self.check(&Token::Mut) {
                self.advance();
                PassMode::Move { mutable: true }
            } else {
                PassMode::Move { mutable: false }
            };

            let ty = self.parse_type()?;
            params.push(Param { name, mode, ty });

            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        Ok(params)
    }

    /// Parse a type: `int`, `bool`, `unit`, `Name`, `managed T`
    pub(crate) fn parse_type(&mut self) -> ParseResult<Spanned<Type>> {
        let start = self.current_span();

        let ty = if self.check(&Token::Int) {
            self.advance();
            Type::Int
        } else if self.check(&Token::Bool) {
            self.advance();
            Type::Bool
        } else if self.check(&Token::Unit) {
            self.advance();
            Type::Unit
        } else if self.check(&Token::Managed) {
            self.advance();
            let inner = self.parse_type()?;
            Type::Managed(Box::new(inner))
        } else if let Some(SpannedToken {
            token: Token::Ident(name),
            ..
        }) = self.peek()
        {
            let name = name.clone();
            self.advance();
            Type::Named(name)
        } else {
            return Err(self.unexpected("a type"));
        };

        let span = start.merge(self.prev_span());
        Ok(Spanned::new(ty, span))
    }

    // --- Token helpers ---

    pub(crate) fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn advance(&mut self) {
        self.pos += 1;
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        self.peek().map(|t| &t.token == token).unwrap_or(false)
    }

    pub(crate) fn expect(&mut self, token: &Token) -> ParseResult<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&token.to_string()))
        }
    }

    /// Parse an identifier token
    pub(crate) fn parse_ident(&mut self) -> ParseResult<Spanned<String>> {
        if let Some(SpannedToken {
            token: Token::Ident(name),
            span,
        }) = self.peek()
        {
            let spanned = Spanned::new(name.clone(), *span);
            self.advance();
            Ok(spanned)
        } else {
            Err(self.unexpected("an identifier"))
        }
    }

    /// Span of the current token, or of the end of input
    pub(crate) fn current_span(&self) -> Span {
        match self.peek() {
            Some(t) => t.span,
            None => self.prev_span(),
        }
    }

    /// Span of the previously consumed token
    pub(crate) fn prev_span(&self) -> Span {
        if self.pos == 0 {
            return Span::default();
        }
        self.tokens
            .get(self.pos - 1)
            .map(|t| t.span)
            .unwrap_or_default()
    }

    /// Build an error for the current position
    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(t) => ParseError::UnexpectedToken {
                found: t.token.to_string(),
                span: t.span,
                expected: expected.to_string(),
            },
            None => ParseError::UnexpectedEof {
                span: self.prev_span(),
            },
        }
    }
}
