//! Statement checking and place validation.
//!
//! Blocks clone the current scope table and discard it on exit, including
//! error exits, so block-local ownership transitions never leak outward.

use ash_ast::{Expr, Spanned, Stmt};

use crate::error::{CheckError, CheckResult};
use crate::typed::{TypedExpr, TypedExprKind, TypedStmt};
use crate::types::ResolvedType;
use crate::{Checker, VarState};

impl Checker {
    /// Check a block: clone the scope, check children, discard the clone.
    pub(crate) fn check_block(&mut self, stmts: &[Spanned<Stmt>]) -> CheckResult<Vec<TypedStmt>> {
        self.engine.enter_scope();
        let result = self.check_stmts(stmts);
        self.engine.leave_scope();
        result
    }

    /// Check a statement list in the current scope.
    pub(crate) fn check_stmts(&mut self, stmts: &[Spanned<Stmt>]) -> CheckResult<Vec<TypedStmt>> {
        let mut typed = Vec::new();
        for stmt in stmts {
            typed.push(self.check_stmt(stmt)?);
        }
        Ok(typed)
    }

    fn check_stmt(&mut self, stmt: &Spanned<Stmt>) -> CheckResult<TypedStmt> {
        match &stmt.node {
            Stmt::Block(stmts) => Ok(TypedStmt::Block(self.check_block(stmts)?)),

            Stmt::Expr(expr) => {
                // The value is discarded; ownership side effects remain.
                let typed = self.check_expr(expr, false)?;
                Ok(TypedStmt::Expr(typed))
            }

            Stmt::Let {
                name,
                ty,
                value,
                is_mut,
            } => {
                let typed_value = self.check_expr(value, false)?;

                let final_ty = match ty {
                    Some(annotation) => {
                        let annotated = self.resolve_type(annotation)?;
                        if annotated != typed_value.ty {
                            return Err(CheckError::TypeMismatch {
                                expected: annotated.to_string(),
                                found: typed_value.ty.to_string(),
                                span: Some(value.span),
                            });
                        }
                        annotated
                    }
                    None => typed_value.ty.clone(),
                };

                if final_ty.is_move() {
                    self.move_if_variable(value)?;
                }

                self.engine.bind(
                    &name.node,
                    final_ty.clone(),
                    VarState::Owned,
                    *is_mut,
                    Some(name.span),
                )?;

                Ok(TypedStmt::Let {
                    name: name.node.clone(),
                    ty: final_ty,
                    value: typed_value,
                    is_mut: *is_mut,
                })
            }

            Stmt::Assign { target, value } => {
                let typed_target = self.check_place(target)?;
                let typed_value = self.check_expr(value, false)?;

                if typed_value.ty != typed_target.ty {
                    return Err(CheckError::TypeMismatch {
                        expected: typed_target.ty.to_string(),
                        found: typed_value.ty.to_string(),
                        span: Some(value.span),
                    });
                }

                if typed_value.ty.is_move() {
                    self.move_if_variable(value)?;
                }

                Ok(TypedStmt::Assign {
                    target: typed_target,
                    value: typed_value,
                })
            }

            Stmt::Return(expr) => {
                let expected = match &self.current_ret {
                    Some(ret) => ret.clone(),
                    None => {
                        return Err(CheckError::ReturnOutsideFunction {
                            span: Some(stmt.span),
                        });
                    }
                };

                match expr {
                    Some(value) => {
                        let typed = self.check_expr(value, false)?;
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
                        Ok(TypedStmt::Return(Some(typed)))
                    }
                    None => {
                        if expected != ResolvedType::Unit {
                            return Err(CheckError::TypeMismatch {
                                expected: expected.to_string(),
                                found: ResolvedType::Unit.to_string(),
                                span: Some(stmt.span),
                            });
                        }
                        Ok(TypedStmt::Return(None))
                    }
                }
            }
        }
    }

    /// Validate an assignment target as a place: a variable, or a field
    /// chain rooted in one. Mutability is required at the root; the state
    /// machine forbids writing through a moved binding.
    fn check_place(&mut self, expr: &Spanned<Expr>) -> CheckResult<TypedExpr> {
        match &expr.node {
            Expr::Ident(name) => {
                let info =
                    self.engine
                        .get(name)
                        .ok_or_else(|| CheckError::UndefinedVariable {
                            name: name.clone(),
                            span: Some(expr.span),
                        })?;
                if let VarState::Moved { moved_at } = &info.state {
                    return Err(CheckError::UseOfMovedValue {
                        name: name.clone(),
                        moved_at: *moved_at,
                        span: Some(expr.span),
                    });
                }
                if !info.is_mut {
                    return Err(CheckError::AssignToImmutable {
                        name: name.clone(),
                        span: Some(expr.span),
                    });
                }
                Ok(TypedExpr {
                    kind: TypedExprKind::Var(name.clone()),
                    ty: info.ty.clone(),
                })
            }
            Expr::Field { object, field } => {
                let object = self.check_place(object)?;
                self.field_access(object, field)
            }
            _ => Err(CheckError::AssignTargetNotAPlace {
                span: Some(expr.span),
            }),
        }
    }
}
