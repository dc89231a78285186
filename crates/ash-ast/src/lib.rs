//! Ash Abstract Syntax Tree
//!
//! Untyped AST produced by the parser and consumed by the checker.

/// Source location for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// 1-indexed source line
    pub line: u32,
    /// 1-indexed column (bytes from the start of the line)
    pub column: u32,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
}

impl Span {
    pub fn new(line: u32, column: u32, start: usize, end: usize) -> Self {
        Self {
            line,
            column,
            start,
            end,
        }
    }

    /// Combine two spans, keeping the position of the earlier one.
    pub fn merge(self, other: Span) -> Span {
        let (line, column, start) = if self.start <= other.start {
            (self.line, self.column, self.start)
        } else {
            (other.line, other.column, other.start)
        };
        Span {
            line,
            column,
            start,
            end: self.end.max(other.end),
        }
    }
}

/// AST node with span information
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Top-level program
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Spanned<Item>>,
}

/// Top-level items
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// `struct Name { fields }`
    Struct(StructDef),
    /// `resource Name { fields, cleanup {...} }`
    Resource(ResourceDef),
    /// `fn name(params) -> ret { ... }`
    Function(FuncDef),
}

/// Struct definition
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: Spanned<String>,
    pub fields: Vec<FieldDef>,
}

/// A single declared field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: Spanned<String>,
    pub ty: Spanned<Type>,
}

/// Resource definition. Structurally a struct, plus an optional cleanup
/// block that runs when the value is destroyed. Resources are linear and
/// may never live on the managed heap.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDef {
    pub name: Spanned<String>,
    pub fields: Vec<FieldDef>,
    pub cleanup: Option<Vec<Spanned<Stmt>>>,
}

/// Function definition
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub name: Spanned<String>,
    pub params: Vec<Param>,
    pub ret_type: Option<Spanned<Type>>,
    pub body: Vec<Spanned<Stmt>>,
}

/// Function parameter with its passing mode
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Spanned<String>,
    pub mode: PassMode,
    pub ty: Spanned<Type>,
}

/// How an argument is handed to a callee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassMode {
    /// By value, transferring ownership for move-kind types
    Move { mutable: bool },
    /// Immutable borrow for the duration of the call
    Ref,
    /// Mutable borrow for the duration of the call
    Inout,
}

/// Type expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// `int`
    Int,
    /// `bool`
    Bool,
    /// `unit`
    Unit,
    /// A user-defined struct or resource
    Named(String),
    /// `managed T` - handle to a value on the managed heap
    Managed(Box<Spanned<Type>>),
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `let [mut] name [: ty] = value;`
    Let {
        name: Spanned<String>,
        ty: Option<Spanned<Type>>,
        value: Spanned<Expr>,
        is_mut: bool,
    },
    /// `place = value;`
    Assign {
        target: Spanned<Expr>,
        value: Spanned<Expr>,
    },
    /// Expression statement
    Expr(Spanned<Expr>),
    /// `return [expr];`
    Return(Option<Spanned<Expr>>),
    /// `{ stmts }`
    Block(Vec<Spanned<Stmt>>),
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Integer literal
    Int(i64),
    /// Boolean literal
    Bool(bool),
    /// Variable reference
    Ident(String),
    /// Binary operation
    Binary {
        op: BinOp,
        left: Box<Spanned<Expr>>,
        right: Box<Spanned<Expr>>,
    },
    /// Field access: `obj.field`
    Field {
        object: Box<Spanned<Expr>>,
        field: Spanned<String>,
    },
    /// Function call: `f(args)`
    Call {
        callee: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
    },
    /// Struct literal: `Point{x:1,y:2}`, optionally `managed Point{...}`
    StructLit {
        name: Spanned<String>,
        fields: Vec<(Spanned<String>, Spanned<Expr>)>,
        managed: bool,
    },
    /// `println("fmt {}", args)` / `print(...)`
    Println {
        newline: bool,
        format: Spanned<String>,
        args: Vec<Spanned<Expr>>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl BinOp {
    /// True for `+` and `-`
    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub)
    }

    /// True for `<`, `<=`, `>`, `>=`
    pub fn is_comparison(self) -> bool {
        matches!(self, BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge)
    }

    /// True for `==` and `!=`
    pub fn is_equality(self) -> bool {
        matches!(self, BinOp::Eq | BinOp::Ne)
    }
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
        };
        write!(f, "{}", s)
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::Unit => write!(f, "unit"),
            Type::Named(name) => write!(f, "{}", name),
            Type::Managed(inner) => write!(f, "managed {}", inner.node),
        }
    }
}
