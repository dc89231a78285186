//! Ash Lexer
//!
//! Tokenizer for the Ash surface syntax, built on logos.

use ash_ast::Span;
use logos::Logos;
use std::fmt;

/// Token types for Ash
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")] // Skip whitespace
#[logos(skip r"//[^\n]*")] // Skip line comments
pub enum Token {
    // === Keywords ===
    #[token("struct")]
    Struct,
    #[token("resource")]
    Resource,
    #[token("fn")]
    Fn,
    #[token("let")]
    Let,
    #[token("mut")]
    Mut,
    #[token("managed")]
    Managed,
    #[token("ref")]
    Ref,
    #[token("inout")]
    Inout,
    #[token("return")]
    Return,
    #[token("cleanup")]
    Cleanup,
    #[token("println")]
    Println,
    #[token("print")]
    Print,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // === Primitive type names ===
    #[token("int")]
    Int,
    #[token("bool")]
    Bool,
    #[token("unit")]
    Unit,

    // === Literals ===
    #[regex(r"[0-9][0-9_]*", |lex| lex.slice().replace('_', "").parse::<i64>().ok())]
    IntLit(i64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        Some(s[1..s.len()-1].to_string())
    })]
    StringLit(String),

    // === Identifiers ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("==")]
    EqEq,
    #[token("!=")]
    Ne,
    #[token("=")]
    Eq,
    #[token("->")]
    Arrow,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Struct => write!(f, "struct"),
            Token::Resource => write!(f, "resource"),
            Token::Fn => write!(f, "fn"),
            Token::Let => write!(f, "let"),
            Token::Mut => write!(f, "mut"),
            Token::Managed => write!(f, "managed"),
            Token::Ref => write!(f, "ref"),
            Token::Inout => write!(f, "inout"),
            Token::Return => write!(f, "return"),
            Token::Cleanup => write!(f, "cleanup"),
            Token::Println => write!(f, "println"),
            Token::Print => write!(f, "print"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Int => write!(f, "int"),
            Token::Bool => write!(f, "bool"),
            Token::Unit => write!(f, "unit"),
            Token::IntLit(n) => write!(f, "{}", n),
            Token::StringLit(s) => write!(f, "\"{}\"", s),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::EqEq => write!(f, "=="),
            Token::Ne => write!(f, "!="),
            Token::Eq => write!(f, "="),
            Token::Arrow => write!(f, "->"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
            Token::Semi => write!(f, ";"),
            Token::Dot => write!(f, "."),
        }
    }
}

/// Token with full source location
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Lexer error
#[derive(Debug, Clone, thiserror::Error)]
pub enum LexError {
    #[error("Unexpected character at line {line}, column {column}")]
    InvalidToken {
        line: u32,
        column: u32,
        position: usize,
    },
}

impl LexError {
    /// Source location of the offending character
    pub fn span(&self) -> Span {
        match self {
            LexError::InvalidToken {
                line,
                column,
                position,
            } => Span::new(*line, *column, *position, *position + 1),
        }
    }
}

/// Byte offsets of each line start, for offset -> (line, column) mapping
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (idx, ch) in source.char_indices() {
            if ch == '\n' {
                starts.push(idx + 1);
            }
        }
        Self { starts }
    }

    fn locate(&self, offset: usize) -> (u32, u32) {
        let line = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let column = offset - self.starts[line] + 1;
        (line as u32 + 1, column as u32)
    }
}

/// Tokenize source code
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, LexError> {
    let index = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let (line, column) = index.locate(range.start);
        match result {
            Ok(token) => {
                tokens.push(SpannedToken {
                    token,
                    span: Span::new(line, column, range.start, range.end),
                });
            }
            Err(_) => {
                return Err(LexError::InvalidToken {
                    line,
                    column,
                    position: range.start,
                });
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_def() {
        let source = "struct Point{x:int,y:int}";
        let tokens = tokenize(source).unwrap();

        assert_eq!(tokens[0].token, Token::Struct);
        assert_eq!(tokens[1].token, Token::Ident("Point".to_string()));
        assert_eq!(tokens[2].token, Token::LBrace);
        assert_eq!(tokens[3].token, Token::Ident("x".to_string()));
        assert_eq!(tokens[4].token, Token::Colon);
        assert_eq!(tokens[5].token, Token::Int);
    }

    #[test]
    fn test_function_def() {
        let source = "fn main() -> unit { let mut p = Point { x: 10, y: 20 }; }";
        let tokens = tokenize(source).unwrap();

        assert_eq!(tokens[0].token, Token::Fn);
        assert_eq!(tokens[1].token, Token::Ident("main".to_string()));
        assert!(tokens.iter().any(|t| t.token == Token::Arrow));
        assert!(tokens.iter().any(|t| t.token == Token::Mut));
    }

    #[test]
    fn test_managed_keyword() {
        let source = "let foo = managed Foo { bar: b };";
        let tokens = tokenize(source).unwrap();

        assert!(tokens.iter().any(|t| t.token == Token::Managed));
    }

    #[test]
    fn test_param_modes() {
        let source = "fn f(a: ref Point, b: inout Point, c: mut Point) -> unit {}";
        let tokens = tokenize(source).unwrap();

        assert!(tokens.iter().any(|t| t.token == Token::Ref));
        assert!(tokens.iter().any(|t| t.token == Token::Inout));
        assert!(tokens.iter().any(|t| t.token == Token::Mut));
    }

    #[test]
    fn test_comparison_operators() {
        let source = "a <= b >= c == d != e < f > g";
        let tokens = tokenize(source).unwrap();

        let ops: Vec<_> = tokens
            .iter()
            .filter(|t| !matches!(t.token, Token::Ident(_)))
            .map(|t| t.token.clone())
            .collect();
        assert_eq!(
            ops,
            vec![
                Token::Le,
                Token::Ge,
                Token::EqEq,
                Token::Ne,
                Token::Lt,
                Token::Gt
            ]
        );
    }

    #[test]
    fn test_string_literal() {
        let source = r#"println("x is {}", x)"#;
        let tokens = tokenize(source).unwrap();

        assert_eq!(tokens[0].token, Token::Println);
        assert_eq!(tokens[2].token, Token::StringLit("x is {}".to_string()));
    }

    #[test]
    fn test_numbers() {
        let source = "42 1_000_000";
        let tokens = tokenize(source).unwrap();

        assert_eq!(tokens[0].token, Token::IntLit(42));
        assert_eq!(tokens[1].token, Token::IntLit(1000000));
    }

    #[test]
    fn test_comments_skipped() {
        let source = "let x = 1; // trailing comment\nlet y = 2;";
        let tokens = tokenize(source).unwrap();

        let has_comment_word = tokens
            .iter()
            .any(|t| matches!(&t.token, Token::Ident(s) if s.contains("comment")));
        assert!(!has_comment_word);
    }

    #[test]
    fn test_line_and_column() {
        let source = "let a = 1;\nlet b = 2;";
        let tokens = tokenize(source).unwrap();

        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[0].span.column, 1);
        let second_let = &tokens[5];
        assert_eq!(second_let.token, Token::Let);
        assert_eq!(second_let.span.line, 2);
        assert_eq!(second_let.span.column, 1);
    }

    #[test]
    fn test_invalid_character() {
        let source = "let a = $;";
        let err = tokenize(source).unwrap_err();

        let LexError::InvalidToken { line, column, .. } = err;
        assert_eq!(line, 1);
        assert_eq!(column, 9);
    }

    #[test]
    fn test_keyword_vs_ident() {
        let source = "lettuce refx managedx";
        let tokens = tokenize(source).unwrap();

        assert!(tokens
            .iter()
            .all(|t| matches!(&t.token, Token::Ident(_))));
    }
}
