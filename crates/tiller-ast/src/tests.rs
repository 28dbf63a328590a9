use crate::*;

fn ident(name: &str) -> Expr {
    Expr::new(ExprKind::Identifier(name.into()), Span::line(1))
}

fn int(text: &str) -> Expr {
    Expr::new(ExprKind::Literal(Literal::Integer(text.into())), Span::line(1))
}

#[test]
fn test_shape_of_containers() {
    let list = TypeRef::generic("List", vec![TypeRef::named("int")]);
    let dict = TypeRef::generic(
        "System.Collections.Generic.Dictionary",
        vec![TypeRef::named("string"), TypeRef::named("int")],
    );
    let set = TypeRef::generic("HashSet", vec![TypeRef::named("int")]);
    let array = TypeRef::Array(Box::new(TypeRef::named("int")));

    assert_eq!(list.shape(), Some(ContainerShape::List));
    assert_eq!(dict.shape(), Some(ContainerShape::Map));
    assert_eq!(set.shape(), Some(ContainerShape::Set));
    assert_eq!(array.shape(), Some(ContainerShape::List));
    assert_eq!(TypeRef::named("Farm").shape(), None);
    assert_eq!(TypeRef::Var.shape(), None);
}

#[test]
fn test_simple_name_strips_qualifier() {
    assert_eq!(TypeRef::named("System.Int32").simple_name(), Some("Int32"));
    assert_eq!(
        TypeRef::Nullable(Box::new(TypeRef::named("int"))).simple_name(),
        Some("int")
    );
    assert_eq!(TypeRef::Var.simple_name(), None);
}

#[test]
fn test_default_literals() {
    assert_eq!(TypeRef::named("int").default_literal(), "0");
    assert_eq!(TypeRef::named("double").default_literal(), "0.0");
    assert_eq!(TypeRef::named("bool").default_literal(), "False");
    assert_eq!(TypeRef::named("string").default_literal(), "\"\"");
    assert_eq!(TypeRef::named("Entity").default_literal(), "None");
    assert_eq!(
        TypeRef::Nullable(Box::new(TypeRef::named("int"))).default_literal(),
        "None"
    );
}

#[test]
fn test_int_literal_values() {
    assert_eq!(int("42").as_int_literal(), Some(42));
    assert_eq!(int("10L").as_int_literal(), Some(10));
    assert_eq!(int("0xFF").as_int_literal(), Some(255));
    assert_eq!(int("1_000").as_int_literal(), Some(1000));
    let neg = Expr::new(
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(int("3")),
        },
        Span::line(1),
    );
    assert_eq!(neg.as_int_literal(), Some(-3));
    assert_eq!(ident("n").as_int_literal(), None);
}

#[test]
fn test_unparen() {
    let wrapped = Expr::new(
        ExprKind::Paren(Box::new(Expr::new(
            ExprKind::Paren(Box::new(ident("x"))),
            Span::line(1),
        ))),
        Span::line(1),
    );
    assert_eq!(wrapped.as_identifier(), Some("x"));
}

#[test]
fn test_designation_names() {
    let pattern = Designation::Tuple(vec![
        Designation::Single("a".into()),
        Designation::Discard,
        Designation::Tuple(vec![
            Designation::Single("b".into()),
            Designation::Single("c".into()),
        ]),
    ]);
    assert_eq!(pattern.names(), vec!["a", "b", "c"]);
}

#[test]
fn test_operator_tokens() {
    assert_eq!(BinaryOp::from_token("??"), Some(BinaryOp::Coalesce));
    assert!(BinaryOp::from_token("<<").is_some_and(BinaryOp::is_bitwise));
    assert_eq!(BinaryOp::from_token("=>"), None);
    assert_eq!(AssignOp::from_token("-="), Some(AssignOp::Sub));
    assert_eq!(AssignOp::Shl.token(), "<<=");
}

#[test]
fn test_declared_types_through_namespaces() {
    let nested = ClassDecl {
        name: "Inner".into(),
        modifiers: vec![],
        members: vec![],
        is_struct: false,
    };
    let outer = ClassDecl {
        name: "Farm".into(),
        modifiers: vec!["public".into()],
        members: vec![Member {
            kind: MemberKind::NestedClass(nested),
            span: Span::line(2),
        }],
        is_struct: false,
    };
    let unit = CompilationUnit {
        items: vec![Item {
            kind: ItemKind::Namespace {
                name: "Game".into(),
                items: vec![Item {
                    kind: ItemKind::Class(outer),
                    span: Span::line(1),
                }],
            },
            span: Span::line(1),
        }],
    };
    assert_eq!(unit.declared_types(), vec!["Farm", "Inner"]);
    assert_eq!(unit.classes().len(), 1);
}

#[test]
fn test_tree_json_shape() {
    let stmt = Stmt::new(
        StmtKind::Expr(Expr::new(
            ExprKind::Assign {
                op: AssignOp::Assign,
                target: Box::new(ident("x")),
                value: Box::new(int("1")),
            },
            Span::line(3),
        )),
        Span::line(3),
    );
    let json = serde_json::to_value(&stmt).unwrap();
    assert_eq!(json["kind"]["expr"]["kind"]["assign"]["op"], "assign");
    assert_eq!(
        json["kind"]["expr"]["kind"]["assign"]["target"]["kind"]["identifier"],
        "x"
    );
    let back: Stmt = serde_json::from_value(json).unwrap();
    assert_eq!(back, stmt);
}
