//! Checker errors.
//!
//! A single `CheckError` kind is surfaced to callers; the variants keep an
//! internal taxonomy for tests. The check is fail-fast: the first error
//! aborts with no recovery. Message strings embed the `ResolvedType`
//! display form verbatim, so downstream tooling can string-match on them.

use ash_ast::Span;
use thiserror::Error;

/// Ownership/type checking error
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Duplicate {kind} definition: '{name}'")]
    DuplicateDefinition {
        kind: &'static str,
        name: String,
        span: Option<Span>,
    },

    #[error("Unknown type: {name}")]
    UnknownType { name: String, span: Option<Span> },

    #[error("Managed types cannot be nested: '{found}'")]
    NestedManagedType { found: String, span: Option<Span> },

    #[error("Unknown field '{field}' in literal of '{type_name}'")]
    UnknownFieldInStructLiteral {
        field: String,
        type_name: String,
        span: Option<Span>,
    },

    #[error("Field set mismatch in literal of '{type_name}': {detail}")]
    FieldSetMismatch {
        type_name: String,
        detail: String,
        span: Option<Span>,
    },

    #[error("No field '{field}' on type '{type_name}'")]
    UnknownField {
        field: String,
        type_name: String,
        span: Option<Span>,
    },

    #[error("Undefined variable: '{name}'")]
    UndefinedVariable { name: String, span: Option<Span> },

    #[error("Variable '{name}' is already defined in this scope")]
    DuplicateLocalBinding { name: String, span: Option<Span> },

    #[error("Use of moved value: '{name}'")]
    UseOfMovedValue {
        name: String,
        moved_at: Option<Span>,
        span: Option<Span>,
    },

    #[error("Expected {expected} but got {found}")]
    TypeMismatch {
        expected: String,
        found: String,
        span: Option<Span>,
    },

    #[error("Function '{name}' expects {expected} argument(s) but got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Option<Span>,
    },

    #[error("Dynamic calls are not supported: the callee must be a function name")]
    DynamicCallNotSupported { span: Option<Span> },

    #[error("No such function: '{name}'")]
    NoSuchFunction { name: String, span: Option<Span> },

    #[error("Cannot access field '{field}' on non-struct type '{found}'")]
    FieldAccessOnNonStruct {
        field: String,
        found: String,
        span: Option<Span>,
    },

    #[error("Cannot access field '{field}' on managed non-struct type '{found}'")]
    FieldAccessOnManagedNonStruct {
        field: String,
        found: String,
        span: Option<Span>,
    },

    #[error("Cannot assign to immutable variable '{name}'")]
    AssignToImmutable { name: String, span: Option<Span> },

    #[error("Cannot mutably borrow immutable variable '{name}'")]
    MutableBorrowOfImmutable { name: String, span: Option<Span> },

    #[error("Cannot assign: target is not a place expression")]
    AssignTargetNotAPlace { span: Option<Span> },

    #[error("Cannot move '{name}': it is currently borrowed")]
    MoveFromBorrowed { name: String, span: Option<Span> },

    #[error("Cannot move '{name}': value was already moved")]
    MoveAlreadyMoved {
        name: String,
        moved_at: Option<Span>,
        span: Option<Span>,
    },

    #[error("Cannot borrow '{name}': conflicting borrow")]
    BorrowConflict { name: String, span: Option<Span> },

    #[error("Cannot borrow '{name}': value was moved")]
    BorrowOfMoved {
        name: String,
        moved_at: Option<Span>,
        span: Option<Span>,
    },

    #[error("Cannot borrow a temporary value")]
    BorrowOfTemporary { span: Option<Span> },

    #[error("Resource '{name}' cannot be allocated as managed")]
    ResourceNotManageable { name: String, span: Option<Span> },

    #[error("Equality requires copy operands, got '{found}'")]
    EqualityOperandsNotCopyKind { found: String, span: Option<Span> },

    #[error("Operator '{op}' requires int operands, got {left} and {right}")]
    ArithmeticOperandsNotInt {
        op: String,
        left: String,
        right: String,
        span: Option<Span>,
    },

    #[error("Return statement outside of a function body")]
    ReturnOutsideFunction { span: Option<Span> },

    #[error("No 'main' function")]
    MainMissing,

    #[error("'main' function cannot have parameters")]
    MainHasParameters { span: Option<Span> },
}

impl CheckError {
    /// Get the span associated with this error, if available
    pub fn span(&self) -> Option<Span> {
        match self {
            CheckError::DuplicateDefinition { span, .. } => *span,
            CheckError::UnknownType { span, .. } => *span,
            CheckError::NestedManagedType { span, .. } => *span,
            CheckError::UnknownFieldInStructLiteral { span, .. } => *span,
            CheckError::FieldSetMismatch { span, .. } => *span,
            CheckError::UnknownField { span, .. } => *span,
            CheckError::UndefinedVariable { span, .. } => *span,
            CheckError::DuplicateLocalBinding { span, .. } => *span,
            CheckError::UseOfMovedValue { span, .. } => *span,
            CheckError::TypeMismatch { span, .. } => *span,
            CheckError::ArityMismatch { span, .. } => *span,
            CheckError::DynamicCallNotSupported { span } => *span,
            CheckError::NoSuchFunction { span, .. } => *span,
            CheckError::FieldAccessOnNonStruct { span, .. } => *span,
            CheckError::FieldAccessOnManagedNonStruct { span, .. } => *span,
            CheckError::AssignToImmutable { span, .. } => *span,
            CheckError::MutableBorrowOfImmutable { span, .. } => *span,
            CheckError::AssignTargetNotAPlace { span } => *span,
            CheckError::MoveFromBorrowed { span, .. } => *span,
            CheckError::MoveAlreadyMoved { span, .. } => *span,
            CheckError::BorrowConflict { span, .. } => *span,
            CheckError::BorrowOfMoved { span, .. } => *span,
            CheckError::BorrowOfTemporary { span } => *span,
            CheckError::ResourceNotManageable { span, .. } => *span,
            CheckError::EqualityOperandsNotCopyKind { span, .. } => *span,
            CheckError::ArithmeticOperandsNotInt { span, .. } => *span,
            CheckError::ReturnOutsideFunction { span } => *span,
            CheckError::MainMissing => None,
            CheckError::MainHasParameters { span } => *span,
        }
    }

    /// Secondary spans with labels for multi-location errors
    pub fn secondary_spans(&self) -> Vec<(Span, String)> {
        match self {
            CheckError::UseOfMovedValue {
                moved_at: Some(span),
                ..
            }
            | CheckError::MoveAlreadyMoved {
                moved_at: Some(span),
                ..
            }
            | CheckError::BorrowOfMoved {
                moved_at: Some(span),
                ..
            } => vec![(*span, "value moved here".to_string())],
            _ => vec![],
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &str {
        match self {
            CheckError::DuplicateDefinition { .. } => "A001",
            CheckError::UnknownType { .. } => "A002",
            CheckError::NestedManagedType { .. } => "A003",
            CheckError::UnknownFieldInStructLiteral { .. } => "A004",
            CheckError::FieldSetMismatch { .. } => "A005",
            CheckError::UnknownField { .. } => "A006",
            CheckError::UndefinedVariable { .. } => "A007",
            CheckError::DuplicateLocalBinding { .. } => "A008",
            CheckError::UseOfMovedValue { .. } => "A009",
            CheckError::TypeMismatch { .. } => "A010",
            CheckError::ArityMismatch { .. } => "A011",
            CheckError::DynamicCallNotSupported { .. } => "A012",
            CheckError::NoSuchFunction { .. } => "A013",
            CheckError::FieldAccessOnNonStruct { .. } => "A014",
            CheckError::FieldAccessOnManagedNonStruct { .. } => "A015",
            CheckError::AssignToImmutable { .. } => "A016",
            CheckError::MutableBorrowOfImmutable { .. } => "A017",
            CheckError::AssignTargetNotAPlace { .. } => "A018",
            CheckError::MoveFromBorrowed { .. } => "A019",
            CheckError::MoveAlreadyMoved { .. } => "A020",
            CheckError::BorrowConflict { .. } => "A021",
            CheckError::BorrowOfMoved { .. } => "A022",
            CheckError::BorrowOfTemporary { .. } => "A023",
            CheckError::ResourceNotManageable { .. } => "A024",
            CheckError::EqualityOperandsNotCopyKind { .. } => "A025",
            CheckError::ArithmeticOperandsNotInt { .. } => "A026",
            CheckError::ReturnOutsideFunction { .. } => "A027",
            CheckError::MainMissing => "A028",
            CheckError::MainHasParameters { .. } => "A029",
        }
    }

    /// Get a helpful message for this error
    pub fn help(&self) -> Option<String> {
        match self {
            CheckError::UseOfMovedValue { name, .. } => Some(format!(
                "'{}' was moved and can no longer be used; bind the value to a new name before the move if it is still needed",
                name
            )),
            CheckError::AssignToImmutable { name, .. } => Some(format!(
                "consider declaring '{}' as mutable: 'let mut {} = ...'",
                name, name
            )),
            CheckError::MutableBorrowOfImmutable { name, .. } => Some(format!(
                "'{}' must be a mutable binding to be passed as inout",
                name
            )),
            CheckError::ResourceNotManageable { name, .. } => Some(format!(
                "resources guarantee deterministic cleanup and may only be used linearly; allocate '{}' without 'managed'",
                name
            )),
            CheckError::MoveFromBorrowed { name, .. } => Some(format!(
                "'{}' is borrowed for the duration of the call and cannot be consumed",
                name
            )),
            CheckError::EqualityOperandsNotCopyKind { .. } => Some(
                "equality is defined for int, bool, unit, and managed handles only".to_string(),
            ),
            CheckError::DuplicateLocalBinding { name, .. } => Some(format!(
                "'{}' is already bound in this block; shadowing requires a nested block",
                name
            )),
            CheckError::MainHasParameters { .. } => {
                Some("declare the entry point as 'fn main() -> unit'".to_string())
            }
            _ => None,
        }
    }
}

/// Checking result
pub type CheckResult<T> = Result<T, CheckError>;
