//! Expression checking.
//!
//! Each expression yields a [`TypedExpr`] with a concrete type. Ownership
//! side effects are applied at move sinks only (struct-literal fields,
//! call arguments, let/assign/return values); plain reads never move.
//!
//! The managed boundary is threaded as an `in_managed` flag: it is set
//! while checking the field initializers of a managed literal and
//! distributes into struct literals written directly in that position,
//! and nowhere else. The field-access lift is derived purely from the
//! observed object type, never from the ambient flag.

use std::collections::HashSet;

use ash_ast::{Expr, Spanned};

use crate::error::{CheckError, CheckResult};
use crate::typed::{AllocKind, TypedExpr, TypedExprKind};
use crate::types::ResolvedType;
use crate::Checker;

impl Checker {
    pub(crate) fn check_expr(
        &mut self,
        expr: &Spanned<Expr>,
        in_managed: bool,
    ) -> CheckResult<TypedExpr> {
        match &expr.node {
            Expr::Int(n) => Ok(TypedExpr {
                kind: TypedExprKind::Int(*n),
                ty: ResolvedType::Int,
            }),

            Expr::Bool(b) => Ok(TypedExpr {
                kind: TypedExprKind::Bool(*b),
                ty: ResolvedType::Bool,
            }),

            Expr::Ident(name) => {
                let ty = self.engine.read(name, Some(expr.span))?;
                Ok(TypedExpr {
                    kind: TypedExprKind::Var(name.clone()),
                    ty,
                })
            }

            Expr::Binary { op, left, right } => self.check_binary(*op, left, right),

            Expr::Field { object, field } => {
                let object = self.check_expr(object, false)?;
                self.field_access(object, field)
            }

            Expr::Call { callee, args } => self.check_call(callee, args, expr),

            Expr::StructLit {
                name,
                fields,
                managed,
            } => self.check_struct_lit(name, fields, *managed || in_managed, expr),

            Expr::Println {
                newline,
                format,
                args,
            } => {
                // Arguments are observable reads: any type is accepted and
                // no move or borrow rule is applied.
                let mut typed_args = Vec::new();
                for arg in args {
                    typed_args.push(self.check_expr(arg, false)?);
                }
                Ok(TypedExpr {
                    kind: TypedExprKind::Println {
                        newline: *newline,
                        format: format.node.clone(),
                        args: typed_args,
                    },
                    ty: ResolvedType::Unit,
                })
            }
        }
    }

    fn check_binary(
        &mut self,
        op: ash_ast::BinOp,
        left: &Spanned<Expr>,
        right: &Spanned<Expr>,
    ) -> CheckResult<TypedExpr> {
        let span = left.span.merge(right.span);
        let lhs = self.check_expr(left, false)?;
        let rhs = self.check_expr(right, false)?;

        let ty = if op.is_equality() {
            if lhs.ty != rhs.ty {
                return Err(CheckError::TypeMismatch {
                    expected: lhs.ty.to_string(),
                    found: rhs.ty.to_string(),
                    span: Some(right.span),
                });
            }
            if !lhs.ty.is_copy() {
                return Err(CheckError::EqualityOperandsNotCopyKind {
                    found: lhs.ty.to_string(),
                    span: Some(span),
                });
            }
            ResolvedType::Bool
        } else {
            // Arithmetic and ordering both demand int operands
            if lhs.ty != ResolvedType::Int || rhs.ty != ResolvedType::Int {
                return Err(CheckError::ArithmeticOperandsNotInt {
                    op: op.to_string(),
                    left: lhs.ty.to_string(),
                    right: rhs.ty.to_string(),
                    span: Some(span),
                });
            }
            if op.is_arithmetic() {
                ResolvedType::Int
            } else {
                ResolvedType::Bool
            }
        };

        Ok(TypedExpr {
            kind: TypedExprKind::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
            },
            ty,
        })
    }

    /// Type a field access on an already-checked object expression.
    /// Shared between expression checking and place validation.
    pub(crate) fn field_access(
        &self,
        object: TypedExpr,
        field: &Spanned<String>,
    ) -> CheckResult<TypedExpr> {
        let (type_name, via_managed) = match (&object.ty, object.ty.managed_named()) {
            (ResolvedType::Named(name), _) => (name.clone(), false),
            (ResolvedType::Managed(_), Some(name)) => (name.to_string(), true),
            (ResolvedType::Managed(_), None) => {
                return Err(CheckError::FieldAccessOnManagedNonStruct {
                    field: field.node.clone(),
                    found: object.ty.to_string(),
                    span: Some(field.span),
                });
            }
            _ => {
                return Err(CheckError::FieldAccessOnNonStruct {
                    field: field.node.clone(),
                    found: object.ty.to_string(),
                    span: Some(field.span),
                });
            }
        };

        let def = self
            .user_type_def(&type_name)
            .expect("Internal compiler error: typed object names an undeclared user type");
        let raw_ty = def
            .field_ty(&field.node)
            .cloned()
            .ok_or_else(|| CheckError::UnknownField {
                field: field.node.clone(),
                type_name: type_name.clone(),
                span: Some(field.span),
            })?;

        // Managed-field lift: reading a user-typed field through a managed
        // handle yields a managed handle, not the bare value.
        let ty = if via_managed && self.is_named_user_type(&raw_ty) {
            ResolvedType::Managed(Box::new(raw_ty.clone()))
        } else {
            raw_ty.clone()
        };

        Ok(TypedExpr {
            kind: TypedExprKind::Field {
                object: Box::new(object),
                field: field.node.clone(),
                raw_ty,
                via_managed,
            },
            ty,
        })
    }

    fn check_call(
        &mut self,
        callee: &Spanned<Expr>,
        args: &[Spanned<Expr>],
        call: &Spanned<Expr>,
    ) -> CheckResult<TypedExpr> {
        let name = match &callee.node {
            Expr::Ident(name) => name.clone(),
            _ => {
                return Err(CheckError::DynamicCallNotSupported {
                    span: Some(callee.span),
                });
            }
        };

        let sig = self
            .functions
            .get(&name)
            .cloned()
            .ok_or_else(|| CheckError::NoSuchFunction {
                name: name.clone(),
                span: Some(callee.span),
            })?;

        if args.len() != sig.params.len() {
            return Err(CheckError::ArityMismatch {
                name,
                expected: sig.params.len(),
                found: args.len(),
                span: Some(call.span),
            });
        }

        let mut typed_args = Vec::new();
        for (arg, (_, mode, param_ty)) in args.iter().zip(&sig.params) {
            let typed = self.check_expr(arg, false)?;
            if typed.ty != *param_ty {
                return Err(CheckError::TypeMismatch {
                    expected: param_ty.to_string(),
                    found: typed.ty.to_string(),
                    span: Some(arg.span),
                });
            }

            match mode {
                ash_ast::PassMode::Move { .. } => {
                    if typed.ty.is_move() {
                        self.move_if_variable(arg)?;
                    }
                }
                ash_ast::PassMode::Ref => match place_root(arg) {
                    Some(root) => self.engine.borrow_shared(root, Some(arg.span))?,
                    None => {
                        return Err(CheckError::BorrowOfTemporary {
                            span: Some(arg.span),
                        });
                    }
                },
                ash_ast::PassMode::Inout => match place_root(arg) {
                    Some(root) => self.engine.borrow_mut(root, Some(arg.span))?,
                    None => {
                        return Err(CheckError::BorrowOfTemporary {
                            span: Some(arg.span),
                        });
                    }
                },
            }
            typed_args.push(typed);
        }

        Ok(TypedExpr {
            kind: TypedExprKind::Call {
                callee: name,
                args: typed_args,
            },
            ty: sig.ret,
        })
    }

    fn check_struct_lit(
        &mut self,
        name: &Spanned<String>,
        fields: &[(Spanned<String>, Spanned<Expr>)],
        managed: bool,
        lit: &Spanned<Expr>,
    ) -> CheckResult<TypedExpr> {
        if managed && self.resources.contains_key(&name.node) {
            return Err(CheckError::ResourceNotManageable {
                name: name.node.clone(),
                span: Some(lit.span),
            });
        }

        let def = self
            .user_type_def(&name.node)
            .cloned()
            .ok_or_else(|| CheckError::UnknownType {
                name: name.node.clone(),
                span: Some(name.span),
            })?;

        let mut seen = HashSet::new();
        let mut typed_fields = Vec::new();
        for (field_name, value) in fields {
            let raw_ty = def.field_ty(&field_name.node).cloned().ok_or_else(|| {
                CheckError::UnknownFieldInStructLiteral {
                    field: field_name.node.clone(),
                    type_name: name.node.clone(),
                    span: Some(field_name.span),
                }
            })?;
            if !seen.insert(field_name.node.clone()) {
                return Err(CheckError::FieldSetMismatch {
                    type_name: name.node.clone(),
                    detail: format!("duplicate field '{}'", field_name.node),
                    span: Some(field_name.span),
                });
            }

            // Inside a managed literal, declared user-type fields expect a
            // managed handle; struct literals written here are themselves
            // checked as managed, but a pre-existing linear value cannot be
            // coerced.
            let expected = if managed && self.is_named_user_type(&raw_ty) {
                ResolvedType::Managed(Box::new(raw_ty))
            } else {
                raw_ty
            };

            let typed = self.check_expr(value, managed)?;
            if typed.ty != expected {
                return Err(CheckError::TypeMismatch {
                    expected: expected.to_string(),
                    found: typed.ty.to_string(),
                    span: Some(value.span),
                });
            }

            if typed.ty.is_move() {
                self.move_if_variable(value)?;
            }
            typed_fields.push((field_name.node.clone(), typed));
        }

        if seen.len() != def.fields.len() {
            let missing: Vec<&str> = def
                .fields
                .iter()
                .map(|(f, _)| f.as_str())
                .filter(|f| !seen.contains(*f))
                .collect();
            return Err(CheckError::FieldSetMismatch {
                type_name: name.node.clone(),
                detail: format!("missing field(s) {}", missing.join(", ")),
                span: Some(lit.span),
            });
        }

        let (ty, alloc) = if managed {
            (
                ResolvedType::Managed(Box::new(ResolvedType::Named(name.node.clone()))),
                AllocKind::Managed,
            )
        } else {
            (ResolvedType::Named(name.node.clone()), AllocKind::Linear)
        };

        Ok(TypedExpr {
            kind: TypedExprKind::StructLit {
                name: name.node.clone(),
                fields: typed_fields,
                alloc,
            },
            ty,
        })
    }

    /// Apply a move to the source variable of a move sink. Temporaries
    /// (literals, call results) and field projections have no source
    /// record, so moving them is a no-op on the engine.
    pub(crate) fn move_if_variable(&mut self, expr: &Spanned<Expr>) -> CheckResult<()> {
        if let Expr::Ident(name) = &expr.node {
            self.engine.move_out(name, Some(expr.span))?;
        }
        Ok(())
    }
}

/// Root variable of a place expression (`x`, `x.f`, `x.f.g`), if any.
/// Borrowing a field reduces to borrowing its base variable.
pub(crate) fn place_root(expr: &Spanned<Expr>) -> Option<&str> {
    match &expr.node {
        Expr::Ident(name) => Some(name),
        Expr::Field { object, .. } => place_root(object),
        _ => None,
    }
}
