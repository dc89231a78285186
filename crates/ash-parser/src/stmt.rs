//! Statement parsing for the Ash language.

use ash_ast::*;
use ash_lexer::Token;

use crate::{ParseResult, Parser};

impl Parser {
    /// Parse block contents (statements up to the closing brace)
    pub(crate) fn parse_block_contents(&mut self) -> ParseResult<Vec<Spanned<Stmt>>> {
        let mut stmts = Vec::new();

        while !self.check(&Token::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_stmt()?);
        }

        Ok(stmts)
    }

    /// Parse statement
    pub(crate) fn parse_stmt(&mut self) -> ParseResult<Spanned<Stmt>> {
        let start = self.current_span();

        let stmt = if self.check(&Token::Let) {
            self.advance();
            let stmt = self.parse_let_stmt()?;
            self.expect(&Token::Semi)?;
            stmt
        } else if self.check(&Token::Return) {
            self.advance();
            let expr = if self.check(&Token::Semi) {
                None
            } else {
                Some(self.parse_expr()?)
            };
            self.expect(&Token::Semi)?;
            Stmt::Return(expr)
        } else if self.check(&Token::LBrace) {
            self.advance();
            let stmts = self.parse_block_contents()?;
            self.expect(&Token::RBrace)?;
            Stmt::Block(stmts)
        } else {
            let expr = self.parse_expr()?;
            // `expr = value` is an assignment statement
            let stmt = if self.check(&Token::Eq) {
                self.advance();
                let value = self.parse_expr()?;
                Stmt::Assign {
                    target: expr,
                    value,
                }
            } else {
                Stmt::Expr(expr)
            };
            self.expect(&Token::Semi)?;
            stmt
        };

        let span = start.merge(self.prev_span());
        Ok(Spanned::new(stmt, span))
    }

    /// Parse let statement after the keyword: `[mut] name [: ty] = expr`
    fn parse_let_stmt(&mut self) -> ParseResult<Stmt> {
        let is_mut = self.check(&Token::Mut);
        if is_mut {
            self.advance();
        }

        let name = self.parse_ident()?;

        let ty = if self.check(&Token::Colon) {
            self.advance();
            Some(self.parse_type()?)
        } else {
            None
        };

        self.expect(&Token::Eq)?;
        let value = self.parse_expr()?;

        Ok(Stmt::Let {
            name,
            ty,
            value,
            is_mut,
        })
    }
}
