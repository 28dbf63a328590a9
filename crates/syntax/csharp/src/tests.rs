//! Tests for the C# lowering.

use super::*;
use rhizome_tiller_ast::{
    BinaryOp, CompilationUnit, DeclKind, Designation, Expr, ExprKind, ForeachBinding, InitElement,
    InterpolationPart, ItemKind, Literal, MemberKind, MethodBody, Stmt, StmtKind, SwitchLabel,
    TypeRef, UnaryOp,
};

fn parse_ok(source: &str) -> CompilationUnit {
    parse(source).unwrap_or_else(|e| panic!("parse failed: {}\nsource: {}", e, source))
}

/// Statements of `M` in `class T { void M() { <body> } }`.
fn body(source: &str) -> Vec<Stmt> {
    let unit = parse_ok(&format!("class T {{ void M() {{ {} }} }}", source));
    let method = unit.classes()[0]
        .methods()
        .next()
        .expect("method")
        .clone();
    match method.body {
        MethodBody::Block(stmts) => stmts,
        other => panic!("expected block body, got {:?}", other),
    }
}

/// The expression in `return <source>;`.
fn expr(source: &str) -> Expr {
    match body(&format!("return {};", source)).remove(0).kind {
        StmtKind::Return(Some(expr)) => expr,
        other => panic!("expected return, got {:?}", other),
    }
}

fn ident(expr: &Expr) -> &str {
    expr.as_identifier().expect("identifier")
}

// =============================================================================
// Declarations
// =============================================================================

#[test]
fn test_class_members() {
    let unit = parse_ok(
        r#"
        public class Farm {
            static int size = 6;
            List<int> plots;
            public Farm() { size = 8; }
            public static void Main() { }
            int Area() => size * size;
            public int Score { get; set; }
        }
        "#,
    );
    let class = unit.classes()[0];
    assert_eq!(class.name, "Farm");
    assert_eq!(class.modifiers, vec!["public"]);
    assert!(!class.is_struct);

    let kinds: Vec<&MemberKind> = class.members.iter().map(|m| &m.kind).collect();
    assert_eq!(kinds.len(), 6);

    match kinds[0] {
        MemberKind::Field(field) => {
            assert_eq!(field.ty, TypeRef::named("int"));
            assert_eq!(field.modifiers, vec!["static"]);
            assert_eq!(field.declarators[0].name, "size");
            assert_eq!(
                field.declarators[0].init.as_ref().and_then(Expr::as_int_literal),
                Some(6)
            );
        }
        other => panic!("expected field, got {:?}", other),
    }
    match kinds[1] {
        MemberKind::Field(field) => {
            assert_eq!(field.ty, TypeRef::generic("List", vec![TypeRef::named("int")]));
            assert!(field.declarators[0].init.is_none());
        }
        other => panic!("expected field, got {:?}", other),
    }
    assert!(matches!(kinds[2], MemberKind::Constructor { params, .. } if params.is_empty()));
    match kinds[3] {
        MemberKind::Method(method) => {
            assert_eq!(method.name, "Main");
            assert!(method.is_static());
            assert_eq!(method.return_type, TypeRef::Void);
        }
        other => panic!("expected method, got {:?}", other),
    }
    assert!(matches!(
        kinds[4],
        MemberKind::Method(method) if matches!(method.body, MethodBody::Expression(_))
    ));
    assert!(matches!(
        kinds[5],
        MemberKind::Unsupported { kind: DeclKind::Property, name } if name == "Score"
    ));
}

#[test]
fn test_namespaces_and_declarations() {
    let unit = parse_ok(
        r#"
        using System;
        namespace Game.Farming {
            class Planner { class Step { } }
            struct Point { int x; }
            enum Crop { Grass, Bush }
            interface IRobot { }
        }
        "#,
    );
    assert_eq!(declarations(&unit), vec!["Planner", "Step", "Point"]);

    let ItemKind::Namespace { name, items } = &unit.items[0].kind else {
        panic!("expected namespace, got {:?}", unit.items[0].kind);
    };
    assert_eq!(name, "Game.Farming");
    assert!(matches!(&items[1].kind, ItemKind::Class(class) if class.is_struct));
    assert!(matches!(
        &items[2].kind,
        ItemKind::Ignored { kind: DeclKind::Enum, name } if name == "Crop"
    ));
    assert!(matches!(
        &items[3].kind,
        ItemKind::Ignored { kind: DeclKind::Interface, name } if name == "IRobot"
    ));
}

#[test]
fn test_top_level_statements() {
    let unit = parse_ok("int x = 1;\nHarvest();\n");
    assert_eq!(unit.items.len(), 2);
    assert!(matches!(
        &unit.items[0].kind,
        ItemKind::GlobalStatement(stmt) if matches!(stmt.kind, StmtKind::LocalDecl(_))
    ));
    assert_eq!(unit.items[1].span.start_line, 2);
}

#[test]
fn test_parameters() {
    let unit = parse_ok("class T { int Add(int a, int b = 3) { return a + b; } }");
    let method = unit.classes()[0].methods().next().expect("method");
    assert_eq!(method.params.len(), 2);
    assert_eq!(method.params[0].name, "a");
    assert_eq!(method.params[0].ty, TypeRef::named("int"));
    assert!(method.params[0].default.is_none());
    assert_eq!(
        method.params[1].default.as_ref().and_then(Expr::as_int_literal),
        Some(3)
    );
}

#[test]
fn test_syntax_error_position() {
    let err = parse("class T {\n  void M( {\n}\n").expect_err("should fail");
    match &err {
        ParseError::Syntax { line, column } => {
            assert!(*line >= 1 && *column >= 1);
            assert!(err.to_string().starts_with("syntax error at line"));
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_comments_are_skipped() {
    let stmts = body("// note\n int x = 1; /* more */ x++;");
    assert_eq!(stmts.len(), 2);
}

// =============================================================================
// Literals
// =============================================================================

#[test]
fn test_literals() {
    assert_eq!(expr("42").as_int_literal(), Some(42));
    assert_eq!(expr("1.5f").kind, ExprKind::Literal(Literal::Real("1.5f".into())));
    assert_eq!(expr("true").kind, ExprKind::Literal(Literal::Bool(true)));
    assert_eq!(expr("null").kind, ExprKind::Literal(Literal::Null));
    assert_eq!(expr("'c'").kind, ExprKind::Literal(Literal::Char('c')));
    assert_eq!(expr(r"'\n'").kind, ExprKind::Literal(Literal::Char('\n')));
}

#[test]
fn test_string_literals() {
    assert_eq!(
        expr(r#""a\tb""#).kind,
        ExprKind::Literal(Literal::Str("a\tb".into()))
    );
    assert_eq!(
        expr(r#"@"say ""hi""""#).kind,
        ExprKind::Literal(Literal::Str("say \"hi\"".into()))
    );
    assert_eq!(
        expr(r#""A""#).kind,
        ExprKind::Literal(Literal::Str("A".into()))
    );
}

#[test]
fn test_interpolated_string() {
    let ExprKind::Interpolated(parts) = expr(r#"$"x={x}!""#).kind else {
        panic!("expected interpolation");
    };
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], InterpolationPart::Text("x=".into()));
    assert!(matches!(&parts[1], InterpolationPart::Hole(hole) if ident(hole) == "x"));
    assert_eq!(parts[2], InterpolationPart::Text("!".into()));
}

#[test]
fn test_interpolation_format_clause_is_kept() {
    let ExprKind::Interpolated(parts) = expr(r#"$"{x,5:F2}""#).kind else {
        panic!("expected interpolation");
    };
    let [InterpolationPart::Formatted { value, clause }] = parts.as_slice() else {
        panic!("expected a formatted hole, got {:?}", parts);
    };
    assert_eq!(ident(value), "x");
    assert_eq!(clause, ",5:F2");
}

// =============================================================================
// Expressions
// =============================================================================

#[test]
fn test_binary_precedence() {
    let ExprKind::Binary { op, left, right } = expr("a + b * c").kind else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Add);
    assert_eq!(ident(&left), "a");
    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn test_unary_operators() {
    assert!(matches!(
        expr("!done").kind,
        ExprKind::Unary { op: UnaryOp::Not, .. }
    ));
    assert!(matches!(
        expr("-x").kind,
        ExprKind::Unary { op: UnaryOp::Neg, .. }
    ));
    assert!(matches!(
        expr("i++").kind,
        ExprKind::Unary { op: UnaryOp::PostInc, .. }
    ));
    assert!(matches!(
        expr("--i").kind,
        ExprKind::Unary { op: UnaryOp::PreDec, .. }
    ));
}

#[test]
fn test_invocation_arguments() {
    let ExprKind::Invoke { callee, args } = expr("Farm.TryPlant(1, out var placed)").kind else {
        panic!("expected invocation");
    };
    let ExprKind::Member { target, name } = &callee.kind else {
        panic!("expected member access");
    };
    assert_eq!(ident(target), "Farm");
    assert_eq!(name, "TryPlant");
    assert_eq!(args.len(), 2);
    assert!(args[0].modifier.is_none());
    assert_eq!(args[1].modifier.as_deref(), Some("out"));
    assert!(matches!(
        &args[1].value.kind,
        ExprKind::Declaration { ty: TypeRef::Var, designation: Designation::Single(n) } if n == "placed"
    ));
}

#[test]
fn test_generic_method_name() {
    let ExprKind::Invoke { callee, .. } = expr("Make<int>()").kind else {
        panic!("expected invocation");
    };
    assert_eq!(ident(&callee), "Make");
}

#[test]
fn test_conditional_and_cast() {
    assert!(matches!(
        expr("a ? 1 : 2").kind,
        ExprKind::Conditional { .. }
    ));
    let ExprKind::Cast { ty, value } = expr("(int)x").kind else {
        panic!("expected cast");
    };
    assert_eq!(ty, TypeRef::named("int"));
    assert_eq!(ident(&value), "x");
}

#[test]
fn test_null_checks() {
    assert!(matches!(
        expr("x is null").kind,
        ExprKind::IsNull { negated: false, .. }
    ));
    assert!(matches!(
        expr("x is not null").kind,
        ExprKind::IsNull { negated: true, .. }
    ));
    assert!(matches!(expr("x is int").kind, ExprKind::Unknown { .. }));
}

#[test]
fn test_object_creation_initializers() {
    let ExprKind::ObjectCreation { ty, args, init } =
        expr(r#"new Dictionary<string, int> { { "a", 1 }, ["b"] = 2 }"#).kind
    else {
        panic!("expected object creation");
    };
    assert_eq!(ty.simple_name(), Some("Dictionary"));
    assert!(args.is_empty());
    let init = init.expect("initializer");
    assert_eq!(init.len(), 2);
    for element in &init {
        assert!(matches!(element, InitElement::Pair { .. }), "{:?}", element);
    }
}

#[test]
fn test_array_creation() {
    let ExprKind::ArrayCreation { ty, sizes, init } = expr("new int[5]").kind else {
        panic!("expected array creation");
    };
    assert_eq!(ty, TypeRef::named("int"));
    assert_eq!(sizes.len(), 1);
    assert_eq!(sizes[0].as_int_literal(), Some(5));
    assert!(init.is_none());

    let ExprKind::ArrayCreation { init, .. } = expr("new int[] { 1, 2 }").kind else {
        panic!("expected array creation");
    };
    assert_eq!(init.map(|i| i.len()), Some(2));
}

#[test]
fn test_element_access_and_assignment() {
    let stmts = body("grid[x] += 2;");
    let StmtKind::Expr(assign) = &stmts[0].kind else {
        panic!("expected expression statement");
    };
    let ExprKind::Assign { op, target, .. } = &assign.kind else {
        panic!("expected assignment");
    };
    assert_eq!(op.token(), "+=");
    assert!(matches!(&target.kind, ExprKind::ElementAccess { index, .. } if index.len() == 1));
}

#[test]
fn test_lambda_is_opaque() {
    assert_eq!(expr("x => x + 1").kind, ExprKind::Lambda);
}

// =============================================================================
// Statements
// =============================================================================

#[test]
fn test_for_statement() {
    let stmts = body("for (int i = 0; i < n; i++) { Harvest(); }");
    let StmtKind::For {
        decl,
        init,
        cond,
        update,
        body,
    } = &stmts[0].kind
    else {
        panic!("expected for");
    };
    let decl = decl.as_ref().expect("declaration");
    assert_eq!(decl.declarators[0].name, "i");
    assert!(init.is_empty());
    assert!(matches!(
        cond.as_ref().map(|c| &c.kind),
        Some(ExprKind::Binary { op: BinaryOp::Lt, .. })
    ));
    assert_eq!(update.len(), 1);
    assert_eq!(body.as_block().len(), 1);
}

#[test]
fn test_foreach_bindings() {
    let stmts = body("foreach (var p in plots) { } foreach (var (a, b) in pairs) { }");
    assert!(matches!(
        &stmts[0].kind,
        StmtKind::Foreach { binding: ForeachBinding::Single { ty: TypeRef::Var, name }, .. } if name == "p"
    ));
    let StmtKind::Foreach { binding: ForeachBinding::Deconstruct(pattern), .. } = &stmts[1].kind
    else {
        panic!("expected deconstruction, got {:?}", stmts[1].kind);
    };
    assert_eq!(pattern.names(), vec!["a", "b"]);
}

#[test]
fn test_if_else_chain() {
    let stmts = body("if (a) x = 1; else if (b) x = 2; else x = 3;");
    let StmtKind::If { otherwise, .. } = &stmts[0].kind else {
        panic!("expected if");
    };
    let otherwise = otherwise.as_ref().expect("else branch");
    assert!(matches!(
        &otherwise.kind,
        StmtKind::If { otherwise: Some(_), .. }
    ));
}

#[test]
fn test_switch_sections() {
    let stmts = body(
        r#"
        switch (crop) {
            case 1:
            case 2:
                Plant();
                break;
            case int n when n > 5:
                break;
            default:
                Till();
                break;
        }
        "#,
    );
    let StmtKind::Switch { subject, sections } = &stmts[0].kind else {
        panic!("expected switch");
    };
    assert_eq!(ident(subject), "crop");
    assert_eq!(sections.len(), 3);

    assert_eq!(sections[0].labels.len(), 2);
    assert!(matches!(&sections[0].labels[0], SwitchLabel::Case(e) if e.as_int_literal() == Some(1)));
    assert_eq!(sections[0].body.len(), 2);

    assert!(matches!(
        &sections[1].labels[0],
        SwitchLabel::Pattern(text) if text.contains("when")
    ));
    assert_eq!(sections[2].labels, vec![SwitchLabel::Default]);
    assert_eq!(sections[2].body.len(), 2);
}

#[test]
fn test_try_catch_finally() {
    let stmts = body("try { A(); } catch (Exception e) { B(); } finally { C(); }");
    let StmtKind::Try {
        body,
        catches,
        finally,
    } = &stmts[0].kind
    else {
        panic!("expected try");
    };
    assert_eq!(body.as_block().len(), 1);
    assert_eq!(catches.len(), 1);
    assert!(finally.is_some());
}

#[test]
fn test_local_function() {
    let stmts = body("int Twice(int v) { return v * 2; }");
    let StmtKind::LocalFunction(function) = &stmts[0].kind else {
        panic!("expected local function, got {:?}", stmts[0].kind);
    };
    assert_eq!(function.name, "Twice");
    assert_eq!(function.return_type, TypeRef::named("int"));
    assert_eq!(function.params.len(), 1);
}

#[test]
fn test_misc_statements() {
    let stmts = body("while (true) { continue; } do { break; } while (x); throw new Exception(); ;");
    assert!(matches!(stmts[0].kind, StmtKind::While { .. }));
    assert!(matches!(stmts[1].kind, StmtKind::DoWhile { .. }));
    assert!(matches!(stmts[2].kind, StmtKind::Throw(Some(_))));
    assert_eq!(stmts[3].kind, StmtKind::Empty);
}

#[test]
fn test_spans_are_one_based() {
    let stmts = body("\nint x = 1;");
    assert_eq!(stmts[0].span.start_line, 2);
    assert!(stmts[0].span.start_col >= 1);
}
