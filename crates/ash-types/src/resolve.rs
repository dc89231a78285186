//! Type resolution and validation.
//!
//! Pure once the global context exists: AST type nodes are turned into
//! [`ResolvedType`]s, validating user-type names and rejecting nested
//! managed types on the way.

use ash_ast::{Spanned, Type};

use crate::error::{CheckError, CheckResult};
use crate::types::ResolvedType;
use crate::{Checker, UserTypeDef};

impl Checker {
    /// Resolve and validate a written type.
    pub(crate) fn resolve_type(&self, ty: &Spanned<Type>) -> CheckResult<ResolvedType> {
        match &ty.node {
            Type::Int => Ok(ResolvedType::Int),
            Type::Bool => Ok(ResolvedType::Bool),
            Type::Unit => Ok(ResolvedType::Unit),
            Type::Named(name) => {
                if self.is_user_type(name) {
                    Ok(ResolvedType::Named(name.clone()))
                } else {
                    Err(CheckError::UnknownType {
                        name: name.clone(),
                        span: Some(ty.span),
                    })
                }
            }
            Type::Managed(inner) => {
                if matches!(inner.node, Type::Managed(_)) {
                    return Err(CheckError::NestedManagedType {
                        found: ty.node.to_string(),
                        span: Some(ty.span),
                    });
                }
                let resolved = self.resolve_type(inner)?;
                Ok(ResolvedType::Managed(Box::new(resolved)))
            }
        }
    }

    /// True iff the name is a declared struct or resource
    pub(crate) fn is_user_type(&self, name: &str) -> bool {
        self.structs.contains_key(name) || self.resources.contains_key(name)
    }

    /// True iff the type is `Named(n)` for a declared user type
    pub(crate) fn is_named_user_type(&self, ty: &ResolvedType) -> bool {
        ty.named().map(|n| self.is_user_type(n)).unwrap_or(false)
    }

    /// Definition of a struct or resource, whichever namespace holds it
    pub(crate) fn user_type_def(&self, name: &str) -> Option<&UserTypeDef> {
        self.structs.get(name).or_else(|| self.resources.get(name))
    }
}
