use super::*;
use crate::error::CheckError;
use crate::types::ResolvedType;

fn named(name: &str) -> ResolvedType {
    ResolvedType::Named(name.to_string())
}

fn managed(name: &str) -> ResolvedType {
    ResolvedType::Managed(Box::new(named(name)))
}

#[test]
fn bind_and_read() {
    let mut engine = OwnershipEngine::new();
    engine
        .bind("x", ResolvedType::Int, VarState::Owned, false, None)
        .unwrap();

    assert_eq!(engine.read("x", None).unwrap(), ResolvedType::Int);
}

#[test]
fn read_undefined() {
    let engine = OwnershipEngine::new();
    assert!(matches!(
        engine.read("nope", None),
        Err(CheckError::UndefinedVariable { .. })
    ));
}

#[test]
fn duplicate_binding_in_same_block() {
    let mut engine = OwnershipEngine::new();
    engine
        .bind("x", ResolvedType::Int, VarState::Owned, false, None)
        .unwrap();

    let result = engine.bind("x", ResolvedType::Bool, VarState::Owned, false, None);
    assert!(matches!(
        result,
        Err(CheckError::DuplicateLocalBinding { .. })
    ));
}

#[test]
fn shadowing_across_blocks() {
    let mut engine = OwnershipEngine::new();
    engine.enter_scope();
    engine
        .bind("x", ResolvedType::Int, VarState::Owned, false, None)
        .unwrap();

    engine.enter_scope();
    assert!(engine
        .bind("x", ResolvedType::Bool, VarState::Owned, false, None)
        .is_ok());
    assert_eq!(engine.read("x", None).unwrap(), ResolvedType::Bool);
    engine.leave_scope();

    // The outer binding is untouched
    assert_eq!(engine.read("x", None).unwrap(), ResolvedType::Int);
}

#[test]
fn move_invalidates_source() {
    let mut engine = OwnershipEngine::new();
    engine
        .bind("p", named("Point"), VarState::Owned, false, None)
        .unwrap();

    engine.move_out("p", None).unwrap();
    assert!(matches!(
        engine.read("p", None),
        Err(CheckError::UseOfMovedValue { .. })
    ));
}

#[test]
fn move_twice_is_an_error() {
    let mut engine = OwnershipEngine::new();
    engine
        .bind("p", named("Point"), VarState::Owned, false, None)
        .unwrap();

    engine.move_out("p", None).unwrap();
    assert!(matches!(
        engine.move_out("p", None),
        Err(CheckError::MoveAlreadyMoved { .. })
    ));
}

#[test]
fn copy_kind_never_moves() {
    let mut engine = OwnershipEngine::new();
    engine
        .bind("n", ResolvedType::Int, VarState::Owned, false, None)
        .unwrap();
    engine
        .bind("h", managed("Point"), VarState::Owned, false, None)
        .unwrap();

    engine.move_out("n", None).unwrap();
    engine.move_out("n", None).unwrap();
    engine.move_out("h", None).unwrap();
    engine.move_out("h", None).unwrap();

    assert!(engine.read("n", None).is_ok());
    assert!(engine.read("h", None).is_ok());
}

#[test]
fn move_from_borrowed_rejected() {
    let mut engine = OwnershipEngine::new();
    engine
        .bind("r", named("Point"), VarState::BorrowedRead, false, None)
        .unwrap();
    engine
        .bind("w", named("Point"), VarState::BorrowedWrite, true, None)
        .unwrap();

    assert!(matches!(
        engine.move_out("r", None),
        Err(CheckError::MoveFromBorrowed { .. })
    ));
    assert!(matches!(
        engine.move_out("w", None),
        Err(CheckError::MoveFromBorrowed { .. })
    ));
}

#[test]
fn borrow_rules() {
    let mut engine = OwnershipEngine::new();
    engine
        .bind("o", named("Point"), VarState::Owned, true, None)
        .unwrap();
    engine
        .bind("frozen", named("Point"), VarState::Owned, false, None)
        .unwrap();
    engine
        .bind("r", named("Point"), VarState::BorrowedRead, false, None)
        .unwrap();
    engine
        .bind("w", named("Point"), VarState::BorrowedWrite, true, None)
        .unwrap();

    // Owned: both borrows fine when mutable
    assert!(engine.borrow_shared("o", None).is_ok());
    assert!(engine.borrow_mut("o", None).is_ok());

    // Owned but immutable binding: no mutable borrow
    assert!(engine.borrow_shared("frozen", None).is_ok());
    assert!(matches!(
        engine.borrow_mut("frozen", None),
        Err(CheckError::MutableBorrowOfImmutable { .. })
    ));

    // BorrowedRead: shared re-borrow fine, mutable rejected
    assert!(engine.borrow_shared("r", None).is_ok());
    assert!(matches!(
        engine.borrow_mut("r", None),
        Err(CheckError::BorrowConflict { .. })
    ));

    // BorrowedWrite: any further borrow rejected
    assert!(matches!(
        engine.borrow_shared("w", None),
        Err(CheckError::BorrowConflict { .. })
    ));
    assert!(matches!(
        engine.borrow_mut("w", None),
        Err(CheckError::BorrowConflict { .. })
    ));
}

#[test]
fn borrow_of_moved_rejected() {
    let mut engine = OwnershipEngine::new();
    engine
        .bind("p", named("Point"), VarState::Owned, true, None)
        .unwrap();
    engine.move_out("p", None).unwrap();

    assert!(matches!(
        engine.borrow_shared("p", None),
        Err(CheckError::BorrowOfMoved { .. })
    ));
    assert!(matches!(
        engine.borrow_mut("p", None),
        Err(CheckError::BorrowOfMoved { .. })
    ));
}

#[test]
fn block_local_move_does_not_leak() {
    let mut engine = OwnershipEngine::new();
    engine.enter_scope();
    engine
        .bind("p", named("Point"), VarState::Owned, false, None)
        .unwrap();

    engine.enter_scope();
    engine.move_out("p", None).unwrap();
    assert!(engine.read("p", None).is_err());
    engine.leave_scope();

    // Parent scope still sees the variable as owned
    assert!(engine.read("p", None).is_ok());
}

#[test]
fn leave_scope_never_pops_root() {
    let mut engine = OwnershipEngine::new();
    engine.leave_scope();
    engine.leave_scope();
    assert_eq!(engine.depth(), 0);
    assert!(engine
        .bind("x", ResolvedType::Int, VarState::Owned, false, None)
        .is_ok());
}
