//! Typed program produced by the checker.
//!
//! Every expression carries its final type; struct constructions are
//! tagged with their allocation kind and field accesses record the raw
//! declared field type next to the (possibly lifted) result type. The
//! emitter picks `.` vs `->` and heap-vs-aggregate construction from
//! these tags.

use ash_ast::{BinOp, PassMode};

use crate::types::ResolvedType;

/// Fully checked program
#[derive(Debug, Clone, PartialEq)]
pub struct TypedProgram {
    pub structs: Vec<TypedStruct>,
    pub resources: Vec<TypedResource>,
    pub functions: Vec<TypedFunction>,
}

/// A struct with resolved field types, declaration order preserved
#[derive(Debug, Clone, PartialEq)]
pub struct TypedStruct {
    pub name: String,
    pub fields: Vec<(String, ResolvedType)>,
}

/// A resource with resolved field types and its typed cleanup block
#[derive(Debug, Clone, PartialEq)]
pub struct TypedResource {
    pub name: String,
    pub fields: Vec<(String, ResolvedType)>,
    pub cleanup: Option<Vec<TypedStmt>>,
}

/// A function with a typed body
#[derive(Debug, Clone, PartialEq)]
pub struct TypedFunction {
    pub name: String,
    pub params: Vec<TypedParam>,
    pub ret: ResolvedType,
    pub body: Vec<TypedStmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedParam {
    pub name: String,
    pub mode: PassMode,
    pub ty: ResolvedType,
}

/// Typed statements
#[derive(Debug, Clone, PartialEq)]
pub enum TypedStmt {
    Let {
        name: String,
        ty: ResolvedType,
        value: TypedExpr,
        is_mut: bool,
    },
    Assign {
        target: TypedExpr,
        value: TypedExpr,
    },
    Expr(TypedExpr),
    Return(Option<TypedExpr>),
    Block(Vec<TypedStmt>),
}

/// An expression annotated with its final type
#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr {
    pub kind: TypedExprKind,
    pub ty: ResolvedType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedExprKind {
    Int(i64),
    Bool(bool),
    Var(String),
    Binary {
        op: BinOp,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    /// Field access. `raw_ty` is the declared field type from the
    /// definition; the expression's `ty` is `Managed(raw_ty)` when the
    /// access went through a managed handle and the field is a user type.
    Field {
        object: Box<TypedExpr>,
        field: String,
        raw_ty: ResolvedType,
        via_managed: bool,
    },
    Call {
        callee: String,
        args: Vec<TypedExpr>,
    },
    StructLit {
        name: String,
        fields: Vec<(String, TypedExpr)>,
        alloc: AllocKind,
    },
    Println {
        newline: bool,
        format: String,
        args: Vec<TypedExpr>,
    },
}

/// How a struct construction is allocated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocKind {
    /// Stack value with single-owner semantics
    Linear,
    /// Heap value behind a managed handle
    Managed,
}
