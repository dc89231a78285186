//! Expression parsing for the Ash language.
//!
//! Binary operators are parsed with precedence climbing over a fixed
//! three-level table (equality < comparison < additive). Postfix forms
//! are field access and call.

use ash_ast::*;
use ash_lexer::Token;

use crate::{ParseResult, Parser};

/// Binary operator for a token, with its precedence level
fn binop_for(token: &Token) -> Option<(BinOp, u8)> {
    match token {
        Token::EqEq => Some((BinOp::Eq, 1)),
        Token::Ne => Some((BinOp::Ne, 1)),
        Token::Lt => Some((BinOp::Lt, 2)),
        Token::Le => Some((BinOp::Le, 2)),
        Token::Gt => Some((BinOp::Gt, 2)),
        Token::Ge => Some((BinOp::Ge, 2)),
        Token::Plus => Some((BinOp::Add, 3)),
        Token::Minus => Some((BinOp::Sub, 3)),
        _ => None,
    }
}

impl Parser {
    /// Parse expression
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Spanned<Expr>> {
        self.parse_binary(0)
    }

    /// Precedence climbing over binary operators
    fn parse_binary(&mut self, min_prec: u8) -> ParseResult<Spanned<Expr>> {
        let mut left = self.parse_postfix()?;

        while let Some((op, prec)) = self.peek().and_then(|t| binop_for(&t.token)) {
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(prec + 1)?;
            let span = left.span.merge(right.span);
            left = Spanned::new(
                Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    /// Parse postfix forms: field access and calls
    fn parse_postfix(&mut self) -> ParseResult<Spanned<Expr>> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check(&Token::Dot) {
                self.advance();
                let field = self.parse_ident()?;
                let span = expr.span.merge(field.span);
                expr = Spanned::new(
                    Expr::Field {
                        object: Box::new(expr),
                        field,
                    },
                    span,
                );
            } else if self.check(&Token::LParen) {
                self.advance();
                let args = self.parse_args()?;
                self.expect(&Token::RParen)?;
                let span = expr.span.merge(self.prev_span());
                expr = Spanned::new(
                    Expr::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    span,
                );
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse a comma-separated argument list (terminator not consumed)
    fn parse_args(&mut self) -> ParseResult<Vec<Spanned<Expr>>> {
        let mut args = Vec::new();

        while !self.check(&Token::RParen) && !self.is_at_end() {
            args.push(self.parse_expr()?);
            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        Ok(args)
    }

    /// Parse a primary expression
    fn parse_primary(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.current_span();

        if let Some(tok) = self.peek() {
            match &tok.token {
                Token::IntLit(n) => {
                    let n = *n;
                    self.advance();
                    return Ok(Spanned::new(Expr::Int(n), start));
                }
                Token::True => {
                    self.advance();
                    return Ok(Spanned::new(Expr::Bool(true), start));
                }
                Token::False => {
                    self.advance();
                    return Ok(Spanned::new(Expr::Bool(false), start));
                }
                Token::LParen => {
                    self.advance();
                    let inner = self.parse_expr()?;
                    self.expect(&Token::RParen)?;
                    return Ok(inner);
                }
                Token::Managed => {
                    self.advance();
                    let name = self.parse_ident()?;
                    self.expect(&Token::LBrace)?;
                    let fields = self.parse_lit_fields()?;
                    self.expect(&Token::RBrace)?;
                    let span = start.merge(self.prev_span());
                    return Ok(Spanned::new(
                        Expr::StructLit {
                            name,
                            fields,
                            managed: true,
                        },
                        span,
                    ));
                }
                Token::Println | Token::Print => {
                    let newline = tok.token == Token::Println;
                    self.advance();
                    return self.parse_println(newline, start);
                }
                Token::Ident(name) => {
                    let name = Spanned::new(name.clone(), tok.span);
                    self.advance();
                    // `Name {` starts a struct literal
                    if self.check(&Token::LBrace) {
                        self.advance();
                        let fields = self.parse_lit_fields()?;
                        self.expect(&Token::RBrace)?;
                        let span = start.merge(self.prev_span());
                        return Ok(Spanned::new(
                            Expr::StructLit {
                                name,
                                fields,
                                managed: false,
                            },
                            span,
                        ));
                    }
                    return Ok(Spanned::new(Expr::Ident(name.node), start));
                }
                _ => {}
            }
        }

        Err(self.unexpected("an expression"))
    }

    /// Parse struct literal fields: `name: expr, ...`
    fn parse_lit_fields(&mut self) -> ParseResult<Vec<(Spanned<String>, Spanned<Expr>)>> {
        let mut fields = Vec::new();

        while !self.check(&Token::RBrace) && !self.is_at_end() {
            let name = self.parse_ident()?;
            self.expect(&Token::Colon)?;
            let value = self.parse_expr()?;
            fields.push((name, value));

            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        Ok(fields)
    }

    /// Parse `println("fmt", args)` after the keyword
    fn parse_println(&mut self, newline: bool, start: ash_ast::Span) -> ParseResult<Spanned<Expr>> {
        self.expect(&Token::LParen)?;

        let format = if let Some(tok) = self.peek() {
            if let Token::StringLit(s) = &tok.token {
                let spanned = Spanned::new(s.clone(), tok.span);
                self.advance();
                spanned
            } else {
                return Err(self.unexpected("a format string"));
            }
        } else {
            return Err(self.unexpected("a format string"));
        };

        let mut args = Vec::new();
        while self.check(&Token::Comma) {
            self.advance();
            args.push(self.parse_expr()?);
        }
        self.expect(&Token::RParen)?;

        let span = start.merge(self.prev_span());
        Ok(Spanned::new(
            Expr::Println {
                newline,
                format,
                args,
            },
            span,
        ))
    }
}
