use crate::{parse, ParseError};
use ash_ast::*;
use pretty_assertions::assert_eq;

fn first_function(program: &Program) -> &FuncDef {
    program
        .items
        .iter()
        .find_map(|item| match &item.node {
            Item::Function(f) => Some(f),
            _ => None,
        })
        .expect("program has no function")
}

#[test]
fn parse_struct_def() {
    let program = parse("struct Point { x: int, y: int }").unwrap();

    assert_eq!(program.items.len(), 1);
    match &program.items[0].node {
        Item::Struct(s) => {
            assert_eq!(s.name.node, "Point");
            assert_eq!(s.fields.len(), 2);
            assert_eq!(s.fields[0].name.node, "x");
            assert_eq!(s.fields[0].ty.node, Type::Int);
        }
        other => panic!("expected struct, got {:?}", other),
    }
}

#[test]
fn parse_resource_with_cleanup() {
    let source = r#"
        resource File {
            fd: int,
            cleanup {
                println("closing {}", fd);
            }
        }
    "#;
    let program = parse(source).unwrap();

    match &program.items[0].node {
        Item::Resource(r) => {
            assert_eq!(r.name.node, "File");
            assert_eq!(r.fields.len(), 1);
            let cleanup = r.cleanup.as_ref().expect("cleanup block");
            assert_eq!(cleanup.len(), 1);
        }
        other => panic!("expected resource, got {:?}", other),
    }
}

#[test]
fn parse_resource_without_cleanup() {
    let program = parse("resource F { fd: int }").unwrap();

    match &program.items[0].node {
        Item::Resource(r) => assert!(r.cleanup.is_none()),
        other => panic!("expected resource, got {:?}", other),
    }
}

#[test]
fn parse_function_with_modes() {
    let source = "fn f(a: Point, b: mut Point, c: ref Point, d: inout Point) -> unit {}";
    let program = parse(source).unwrap();
    let f = first_function(&program);

    assert_eq!(f.params.len(), 4);
    assert_eq!(f.params[0].mode, PassMode::Move { mutable: false });
    assert_eq!(f.params[1].mode, PassMode::Move { mutable: true });
    assert_eq!(f.params[2].mode, PassMode::Ref);
    assert_eq!(f.params[3].mode, PassMode::Inout);
    assert_eq!(f.ret_type.as_ref().unwrap().node, Type::Unit);
}

#[test]
fn parse_function_without_return_type() {
    let program = parse("fn f() {}").unwrap();
    let f = first_function(&program);
    assert!(f.ret_type.is_none());
}

#[test]
fn parse_let_forms() {
    let source = r#"
        fn main() -> unit {
            let a = 1;
            let mut b = 2;
            let c: bool = true;
            let d: managed Bar = foo;
        }
    "#;
    let program = parse(source).unwrap();
    let f = first_function(&program);

    assert_eq!(f.body.len(), 4);
    match &f.body[1].node {
        Stmt::Let { is_mut, .. } => assert!(*is_mut),
        other => panic!("expected let, got {:?}", other),
    }
    match &f.body[3].node {
        Stmt::Let { ty: Some(ty), .. } => match &ty.node {
            Type::Managed(inner) => assert_eq!(inner.node, Type::Named("Bar".to_string())),
            other => panic!("expected managed type, got {:?}", other),
        },
        other => panic!("expected annotated let, got {:?}", other),
    }
}

#[test]
fn parse_managed_type_annotation_span() {
    // The inner type's span is a sub-range of the whole annotation
    let program = parse("fn f() { let d: managed Bar = x; }").unwrap();
    let f = first_function(&program);
    match &f.body[0].node {
        Stmt::Let { ty: Some(ty), .. } => match &ty.node {
            Type::Managed(inner) => {
                assert_eq!(inner.node, Type::Named("Bar".to_string()));
                assert!(inner.span.start > ty.span.start);
            }
            other => panic!("expected managed type, got {:?}", other),
        },
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn parse_struct_literal_and_assignment() {
    let source = r#"
        fn main() -> unit {
            let mut p = Point { x: 10, y: 20 };
            p.x = 30;
        }
    "#;
    let program = parse(source).unwrap();
    let f = first_function(&program);

    match &f.body[0].node {
        Stmt::Let { value, .. } => match &value.node {
            Expr::StructLit {
                name,
                fields,
                managed,
            } => {
                assert_eq!(name.node, "Point");
                assert_eq!(fields.len(), 2);
                assert!(!managed);
            }
            other => panic!("expected struct literal, got {:?}", other),
        },
        other => panic!("expected let, got {:?}", other),
    }
    match &f.body[1].node {
        Stmt::Assign { target, .. } => match &target.node {
            Expr::Field { field, .. } => assert_eq!(field.node, "x"),
            other => panic!("expected field target, got {:?}", other),
        },
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn parse_managed_literal() {
    let source = "fn main() -> unit { let foo = managed Foo { bar: Bar { val: 42 } }; }";
    let program = parse(source).unwrap();
    let f = first_function(&program);

    match &f.body[0].node {
        Stmt::Let { value, .. } => match &value.node {
            Expr::StructLit {
                managed, fields, ..
            } => {
                assert!(*managed);
                match &fields[0].1.node {
                    Expr::StructLit { managed, .. } => assert!(!*managed),
                    other => panic!("expected nested literal, got {:?}", other),
                }
            }
            other => panic!("expected managed literal, got {:?}", other),
        },
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn parse_binary_precedence() {
    let program = parse("fn f() -> bool { return a + b < c == d; }").unwrap();
    let f = first_function(&program);

    // ((a + b) < c) == d
    match &f.body[0].node {
        Stmt::Return(Some(expr)) => match &expr.node {
            Expr::Binary { op, left, .. } => {
                assert_eq!(*op, BinOp::Eq);
                match &left.node {
                    Expr::Binary { op, left, .. } => {
                        assert_eq!(*op, BinOp::Lt);
                        match &left.node {
                            Expr::Binary { op, .. } => assert_eq!(*op, BinOp::Add),
                            other => panic!("expected addition, got {:?}", other),
                        }
                    }
                    other => panic!("expected comparison, got {:?}", other),
                }
            }
            other => panic!("expected binary, got {:?}", other),
        },
        other => panic!("expected return, got {:?}", other),
    }
}

#[test]
fn parse_call_and_field_chain() {
    let program = parse("fn f() { g(a, b.c); }").unwrap();
    let f = first_function(&program);

    match &f.body[0].node {
        Stmt::Expr(expr) => match &expr.node {
            Expr::Call { callee, args } => {
                assert_eq!(callee.node, Expr::Ident("g".to_string()));
                assert_eq!(args.len(), 2);
                assert!(matches!(args[1].node, Expr::Field { .. }));
            }
            other => panic!("expected call, got {:?}", other),
        },
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn parse_println() {
    let program = parse(r#"fn f() { println("x is {}", x); print("y"); }"#).unwrap();
    let f = first_function(&program);

    match &f.body[0].node {
        Stmt::Expr(expr) => match &expr.node {
            Expr::Println {
                newline,
                format,
                args,
            } => {
                assert!(*newline);
                assert_eq!(format.node, "x is {}");
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected println, got {:?}", other),
        },
        other => panic!("expected expression statement, got {:?}", other),
    }
    match &f.body[1].node {
        Stmt::Expr(expr) => match &expr.node {
            Expr::Println { newline, .. } => assert!(!newline),
            other => panic!("expected print, got {:?}", other),
        },
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn parse_nested_block() {
    let program = parse("fn f() { { let a = 1; } }").unwrap();
    let f = first_function(&program);
    assert!(matches!(&f.body[0].node, Stmt::Block(stmts) if stmts.len() == 1));
}

#[test]
fn parse_spans_track_lines() {
    let source = "struct P { x: int }\nfn main() -> unit { }";
    let program = parse(source).unwrap();

    assert_eq!(program.items[0].span.line, 1);
    assert_eq!(program.items[1].span.line, 2);
}

#[test]
fn error_on_missing_semicolon() {
    let err = parse("fn f() { let a = 1 }").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    assert_eq!(err.error_code(), "P001");
}

#[test]
fn error_on_unclosed_brace() {
    let err = parse("fn f() { let a = 1;").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedEof { .. }));
}

#[test]
fn error_on_top_level_expression() {
    let err = parse("let a = 1;").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedToken { .. }));
}

#[test]
fn error_on_bad_character() {
    let err = parse("fn f() { let a = $; }").unwrap_err();
    assert_eq!(err.error_code(), "P003");
    assert!(err.span().is_some());
}
