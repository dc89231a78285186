//! Ash Type System
//!
//! The ownership/type checker: builds the global context, resolves and
//! validates types, tracks per-variable ownership state, enforces the
//! managed boundary, and produces a fully typed program for the emitter.
//!
//! The check is single-threaded, deterministic, and fail-fast: the first
//! violation aborts with a [`CheckError`].
//!
//! # Examples
//!
//! ```
//! use ash_parser::parse;
//! use ash_types::Checker;
//!
//! let source = "fn main() -> unit { let a = 1 + 2; }";
//! let program = parse(source).unwrap();
//!
//! let typed = Checker::new().check_program(&program).unwrap();
//! assert_eq!(typed.functions.len(), 1);
//! ```

pub mod error;
pub mod error_report;
pub mod typed;
pub mod types;

mod checker_expr;
mod checker_stmt;
mod ownership;
mod resolve;


use std::collections::HashMap;

use ash_ast::*;

pub use error::{CheckError, CheckResult};
pub use ownership::{OwnershipEngine, VarInfo, VarState};
pub use typed::{
    AllocKind, TypedExpr, TypedExprKind, TypedFunction, TypedParam, TypedProgram, TypedResource,
    TypedStmt, TypedStruct,
};
pub use types::ResolvedType;

/// Resolved definition of a user struct or resource
#[derive(Debug, Clone, Default)]
pub(crate) struct UserTypeDef {
    /// Fields in declaration order
    pub fields: Vec<(String, ResolvedType)>,
}

impl UserTypeDef {
    pub(crate) fn field_ty(&self, name: &str) -> Option<&ResolvedType> {
        self.fields
            .iter()
            .find(|(f, _)| f == name)
            .map(|(_, ty)| ty)
    }
}

/// Resolved function signature
#[derive(Debug, Clone, Default)]
pub(crate) struct FnSig {
    pub params: Vec<(String, PassMode, ResolvedType)>,
    pub ret: ResolvedType,
}

/// The ownership/type checker.
///
/// Consumes an untyped [`Program`] and produces a [`TypedProgram`] in which
/// every expression is annotated with its final type and every struct
/// construction is tagged linear or managed.
pub struct Checker {
    /// User structs by name
    pub(crate) structs: HashMap<String, UserTypeDef>,
    /// User resources by name; structurally like structs but barred from
    /// the managed heap
    pub(crate) resources: HashMap<String, UserTypeDef>,
    /// Function signatures by name
    pub(crate) functions: HashMap<String, FnSig>,
    /// Per-variable ownership state
    pub(crate) engine: OwnershipEngine,
    /// Return type of the function currently being checked
    pub(crate) current_ret: Option<ResolvedType>,
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker {
    pub fn new() -> Self {
        Self {
            structs: HashMap::new(),
            resources: HashMap::new(),
            functions: HashMap::new(),
            engine: OwnershipEngine::new(),
            current_ret: None,
        }
    }

    /// Check a whole program. Global definitions are built once; bodies
    /// are then checked top to bottom. Checking the same program again
    /// starts from a clean slate and reproduces the same outcome.
    pub fn check_program(&mut self, program: &Program) -> CheckResult<TypedProgram> {
        self.structs.clear();
        self.resources.clear();
        self.functions.clear();
        self.engine = OwnershipEngine::new();
        self.current_ret = None;

        self.collect_names(program)?;
        self.resolve_definitions(program)?;
        self.check_main_discipline(program)?;

        let mut typed = TypedProgram {
            structs: Vec::new(),
            resources: Vec::new(),
            functions: Vec::new(),
        };

        for item in &program.items {
            match &item.node {
                Item::Struct(s) => {
                    let def = &self.structs[&s.name.node];
                    typed.structs.push(TypedStruct {
                        name: s.name.node.clone(),
                        fields: def.fields.clone(),
                    });
                }
                Item::Resource(r) => {
                    let resource = self.check_resource(r)?;
                    typed.resources.push(resource);
                }
                Item::Function(f) => {
                    let function = self.check_function(f)?;
                    typed.functions.push(function);
                }
            }
        }

        Ok(typed)
    }

    /// First pass: register every top-level name, rejecting duplicates
    /// within each namespace. The error points at the second occurrence.
    fn collect_names(&mut self, program: &Program) -> CheckResult<()> {
        for item in &program.items {
            match &item.node {
                Item::Struct(s) => {
                    if self.structs.contains_key(&s.name.node) {
                        return Err(CheckError::DuplicateDefinition {
                            kind: "struct",
                            name: s.name.node.clone(),
                            span: Some(s.name.span),
                        });
                    }
                    self.structs.insert(s.name.node.clone(), UserTypeDef::default());
                }
                Item::Resource(r) => {
                    if self.resources.contains_key(&r.name.node) {
                        return Err(CheckError::DuplicateDefinition {
                            kind: "resource",
                            name: r.name.node.clone(),
                            span: Some(r.name.span),
                        });
                    }
                    self.resources
                        .insert(r.name.node.clone(), UserTypeDef::default());
                }
                Item::Function(f) => {
                    if self.functions.contains_key(&f.name.node) {
                        return Err(CheckError::DuplicateDefinition {
                            kind: "function",
                            name: f.name.node.clone(),
                            span: Some(f.name.span),
                        });
                    }
                    self.functions.insert(f.name.node.clone(), FnSig::default());
                }
            }
        }
        Ok(())
    }

    /// Second pass: resolve every declared field, parameter, and return
    /// type now that all names are known. Errors point at the written
    /// type, not at the declaration that happens to use it.
    fn resolve_definitions(&mut self, program: &Program) -> CheckResult<()> {
        for item in &program.items {
            match &item.node {
                Item::Struct(s) => {
                    let def = self.resolve_fields(&s.fields)?;
                    self.structs.insert(s.name.node.clone(), def);
                }
                Item::Resource(r) => {
                    let def = self.resolve_fields(&r.fields)?;
                    self.resources.insert(r.name.node.clone(), def);
                }
                Item::Function(f) => {
                    let mut params = Vec::new();
                    for param in &f.params {
                        let ty = self.resolve_type(&param.ty)?;
                        params.push((param.name.node.clone(), param.mode, ty));
                    }
                    let ret = match &f.ret_type {
                        Some(ty) => self.resolve_type(ty)?,
                        None => ResolvedType::Unit,
                    };
                    self.functions
                        .insert(f.name.node.clone(), FnSig { params, ret });
                }
            }
        }
        Ok(())
    }

    fn resolve_fields(&self, fields: &[FieldDef]) -> CheckResult<UserTypeDef> {
        let mut resolved = Vec::new();
        for field in fields {
            let ty = self.resolve_type(&field.ty)?;
            resolved.push((field.name.node.clone(), ty));
        }
        Ok(UserTypeDef { fields: resolved })
    }

    /// A program must contain exactly one `main` with zero parameters.
    fn check_main_discipline(&self, program: &Program) -> CheckResult<()> {
        let sig = self.functions.get("main").ok_or(CheckError::MainMissing)?;
        if !sig.params.is_empty() {
            let span = program.items.iter().find_map(|item| match &item.node {
                Item::Function(f) if f.name.node == "main" => Some(f.name.span),
                _ => None,
            });
            return Err(CheckError::MainHasParameters { span });
        }
        Ok(())
    }

    /// Check a function body with parameters introduced per passing mode.
    fn check_function(&mut self, f: &FuncDef) -> CheckResult<TypedFunction> {
        let sig = self.functions[&f.name.node].clone();

        self.engine.enter_scope();
        let result = self.check_function_inner(f, &sig);
        self.engine.leave_scope();
        self.current_ret = None;

        result
    }

    fn check_function_inner(&mut self, f: &FuncDef, sig: &FnSig) -> CheckResult<TypedFunction> {
        let mut params = Vec::new();
        for (param, (name, mode, ty)) in f.params.iter().zip(&sig.params) {
            let (state, is_mut) = match mode {
                PassMode::Move { mutable } => (VarState::Owned, *mutable),
                PassMode::Ref => (VarState::BorrowedRead, false),
                PassMode::Inout => (VarState::BorrowedWrite, true),
            };
            self.engine
                .bind(name, ty.clone(), state, is_mut, Some(param.name.span))?;
            params.push(TypedParam {
                name: name.clone(),
                mode: *mode,
                ty: ty.clone(),
            });
        }

        self.current_ret = Some(sig.ret.clone());
        let body = self.check_block(&f.body)?;

        Ok(TypedFunction {
            name: f.name.node.clone(),
            params,
            ret: sig.ret.clone(),
            body,
        })
    }

    /// Check a resource's cleanup block. Every declared field is in scope
    /// as an owned, mutable binding; `return` is a structural error here.
    fn check_resource(&mut self, r: &ResourceDef) -> CheckResult<TypedResource> {
        let def = self.resources[&r.name.node].clone();

        let cleanup = match &r.cleanup {
            None => None,
            Some(stmts) => {
                self.engine.enter_scope();
                let result = (|| {
                    for (name, ty) in &def.fields {
                        self.engine.bind(
                            name,
                            ty.clone(),
                            VarState::Owned,
                            true,
                            Some(r.name.span),
                        )?;
                    }
                    self.current_ret = None;
                    self.check_stmts(stmts)
                })();
                self.engine.leave_scope();
                Some(result?)
            }
        };

        Ok(TypedResource {
            name: r.name.node.clone(),
            fields: def.fields,
            cleanup,
        })
    }
}
