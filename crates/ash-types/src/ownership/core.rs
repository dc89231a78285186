//! Core OwnershipEngine struct, scope management, and state transitions

use std::collections::HashMap;

use ash_ast::Span;

use super::{VarInfo, VarState};
use crate::error::{CheckError, CheckResult};
use crate::types::ResolvedType;

/// The ownership engine: a scope-keyed mapping from variable name to state.
///
/// Entering a scope clones the innermost table, so a block sees (and may
/// shadow) the parent's bindings while its own transitions stay local to
/// the clone and are discarded on exit.
pub struct OwnershipEngine {
    scopes: Vec<HashMap<String, VarInfo>>,
}

impl Default for OwnershipEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OwnershipEngine {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    /// Current scope depth; the outermost (empty) scope is depth 0
    pub fn depth(&self) -> u32 {
        (self.scopes.len() - 1) as u32
    }

    /// Enter a block: deep-copy the innermost table
    pub fn enter_scope(&mut self) {
        let top = self.scopes.last().cloned().unwrap_or_default();
        self.scopes.push(top);
    }

    /// Leave a block: discard its table. The outermost scope is never
    /// popped, so the engine stays usable after unbalanced error paths.
    pub fn leave_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    fn top(&self) -> &HashMap<String, VarInfo> {
        self.scopes.last().expect("scope stack is never empty")
    }

    fn top_mut(&mut self) -> &mut HashMap<String, VarInfo> {
        self.scopes.last_mut().expect("scope stack is never empty")
    }

    /// Look up a variable in the current scope
    pub fn get(&self, name: &str) -> Option<&VarInfo> {
        self.top().get(name)
    }

    /// Introduce a binding. Rebinding a name introduced in the same block
    /// is rejected; shadowing a binding from an outer block is allowed.
    pub fn bind(
        &mut self,
        name: &str,
        ty: ResolvedType,
        state: VarState,
        is_mut: bool,
        def_site: Option<Span>,
    ) -> CheckResult<()> {
        let depth = self.depth();
        if let Some(existing) = self.top().get(name) {
            if existing.depth == depth {
                return Err(CheckError::DuplicateLocalBinding {
                    name: name.to_string(),
                    span: def_site,
                });
            }
        }
        self.top_mut().insert(
            name.to_string(),
            VarInfo {
                ty,
                state,
                is_mut,
                def_site,
                depth,
            },
        );
        Ok(())
    }

    /// Read a variable's value; any state except `Moved` permits reads.
    pub fn read(&self, name: &str, at: Option<Span>) -> CheckResult<ResolvedType> {
        let info = self.get(name).ok_or_else(|| CheckError::UndefinedVariable {
            name: name.to_string(),
            span: at,
        })?;
        if let VarState::Moved { moved_at } = &info.state {
            return Err(CheckError::UseOfMovedValue {
                name: name.to_string(),
                moved_at: *moved_at,
                span: at,
            });
        }
        Ok(info.ty.clone())
    }

    /// Move a variable's value out of its binding. Copy-kind values are
    /// duplicated instead and the binding is untouched.
    pub fn move_out(&mut self, name: &str, at: Option<Span>) -> CheckResult<()> {
        let (is_copy, state) = {
            let info = self.get(name).ok_or_else(|| CheckError::UndefinedVariable {
                name: name.to_string(),
                span: at,
            })?;
            (info.ty.is_copy(), info.state.clone())
        };

        if is_copy {
            return Ok(());
        }

        match state {
            VarState::Owned => {
                let entry = self
                    .top_mut()
                    .get_mut(name)
                    .expect("binding exists: just looked up");
                entry.state = VarState::Moved { moved_at: at };
                Ok(())
            }
            VarState::Moved { moved_at } => Err(CheckError::MoveAlreadyMoved {
                name: name.to_string(),
                moved_at,
                span: at,
            }),
            VarState::BorrowedRead | VarState::BorrowedWrite => {
                Err(CheckError::MoveFromBorrowed {
                    name: name.to_string(),
                    span: at,
                })
            }
        }
    }

    /// Validate an immutable borrow (`ref` argument) of a variable.
    /// Borrows only live for the callee's invocation, so nothing is
    /// recorded; the call site just has to be legal.
    pub fn borrow_shared(&self, name: &str, at: Option<Span>) -> CheckResult<()> {
        let info = self.get(name).ok_or_else(|| CheckError::UndefinedVariable {
            name: name.to_string(),
            span: at,
        })?;
        match &info.state {
            VarState::Owned | VarState::BorrowedRead => Ok(()),
            VarState::Moved { moved_at } => Err(CheckError::BorrowOfMoved {
                name: name.to_string(),
                moved_at: *moved_at,
                span: at,
            }),
            VarState::BorrowedWrite => Err(CheckError::BorrowConflict {
                name: name.to_string(),
                span: at,
            }),
        }
    }

    /// Validate a mutable borrow (`inout` argument) of a variable.
    pub fn borrow_mut(&self, name: &str, at: Option<Span>) -> CheckResult<()> {
        let info = self.get(name).ok_or_else(|| CheckError::UndefinedVariable {
            name: name.to_string(),
            span: at,
        })?;
        match &info.state {
            VarState::Moved { moved_at } => Err(CheckError::BorrowOfMoved {
                name: name.to_string(),
                moved_at: *moved_at,
                span: at,
            }),
            VarState::BorrowedRead | VarState::BorrowedWrite => Err(CheckError::BorrowConflict {
                name: name.to_string(),
                span: at,
            }),
            VarState::Owned => {
                if !info.is_mut {
                    return Err(CheckError::MutableBorrowOfImmutable {
                        name: name.to_string(),
                        span: at,
                    });
                }
                Ok(())
            }
        }
    }
}
