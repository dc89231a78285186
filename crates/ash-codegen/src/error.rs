//! Code generation error types

use thiserror::Error;

/// Error type for code generation failures.
///
/// The typed program is already validated; these errors cover layout
/// constraints the checker does not enforce and internal inconsistencies.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A cycle of by-value fields has no finite C++ layout
    #[error("Recursive value layout in type '{0}'")]
    RecursiveLayout(String),

    /// A construction names a type absent from the typed program
    #[error("Unknown user type in typed program: '{0}'")]
    UnknownType(String),
}

impl CodegenError {
    /// Get the error code for this codegen error
    pub fn error_code(&self) -> &str {
        match self {
            CodegenError::RecursiveLayout(_) => "C001",
            CodegenError::UnknownType(_) => "C002",
        }
    }

    /// Get a help message for this error
    pub fn help(&self) -> Option<String> {
        match self {
            CodegenError::RecursiveLayout(name) => Some(format!(
                "'{}' contains itself by value; break the cycle with a managed handle",
                name
            )),
            CodegenError::UnknownType(_) => None,
        }
    }
}
