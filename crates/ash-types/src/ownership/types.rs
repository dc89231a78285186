//! Per-variable state records

use crate::types::ResolvedType;
use ash_ast::Span;

/// Tracks the state of a variable's value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarState {
    /// Value is owned and valid
    Owned,
    /// Value has been moved out of this binding
    Moved { moved_at: Option<Span> },
    /// Binding is an immutable borrow (`ref` parameter)
    BorrowedRead,
    /// Binding is a mutable borrow (`inout` parameter)
    BorrowedWrite,
}

/// Information about a tracked variable
#[derive(Debug, Clone)]
pub struct VarInfo {
    /// The resolved type of the variable
    pub ty: ResolvedType,
    /// Current ownership state
    pub state: VarState,
    /// Whether the binding may be written through
    pub is_mut: bool,
    /// Where the variable was introduced
    pub def_site: Option<Span>,
    /// Scope depth at which the binding was introduced; used to permit
    /// shadowing across blocks while rejecting it within one block
    pub depth: u32,
}
