//! Unit tests for the translator building blocks.

use rhizome_tiller_ast::{
    Argument, AssignOp, ClassDecl, CompilationUnit, Expr, ExprKind, Item, ItemKind, Literal,
    LocalDecl, Member, MemberKind, MethodBody, MethodDecl, Param, Span, Stmt, StmtKind, TypeRef,
    VarDeclarator,
};

use crate::globals::{Bindings, required_globals};
use crate::mappings::{builtin, direction, enum_prefix, host_function, is_mutating_method};
use crate::naming::{to_snake_case, to_target_name};
use crate::*;

// =============================================================================
// Tree helpers
// =============================================================================

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, Span::line(1))
}

fn ident(name: &str) -> Expr {
    expr(ExprKind::Identifier(name.to_string()))
}

fn int(value: i64) -> Expr {
    expr(ExprKind::Literal(Literal::Integer(value.to_string())))
}

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, Span::line(1))
}

fn assign(target: Expr, value: Expr) -> Stmt {
    stmt(StmtKind::Expr(expr(ExprKind::Assign {
        op: AssignOp::Assign,
        target: Box::new(target),
        value: Box::new(value),
    })))
}

fn call(target: Expr, method: &str, args: Vec<Expr>) -> Expr {
    expr(ExprKind::Invoke {
        callee: Box::new(expr(ExprKind::Member {
            target: Box::new(target),
            name: method.to_string(),
        })),
        args: args.into_iter().map(Argument::positional).collect(),
    })
}

fn local(name: &str, init: Expr) -> Stmt {
    stmt(StmtKind::LocalDecl(LocalDecl {
        ty: TypeRef::Var,
        declarators: vec![VarDeclarator {
            name: name.to_string(),
            init: Some(init),
        }],
    }))
}

fn method(name: &str, modifiers: &[&str], body: Vec<Stmt>) -> Member {
    Member {
        kind: MemberKind::Method(MethodDecl {
            name: name.to_string(),
            modifiers: modifiers.iter().map(|m| m.to_string()).collect(),
            return_type: TypeRef::Void,
            params: Vec::new(),
            body: MethodBody::Block(body),
        }),
        span: Span::line(1),
    }
}

fn unit_with_class(name: &str, members: Vec<Member>) -> CompilationUnit {
    CompilationUnit {
        items: vec![Item {
            kind: ItemKind::Class(ClassDecl {
                name: name.to_string(),
                modifiers: Vec::new(),
                members,
                is_struct: false,
            }),
            span: Span::line(1),
        }],
    }
}

// =============================================================================
// Naming
// =============================================================================

#[test]
fn test_snake_case() {
    assert_eq!(to_snake_case("HarvestAll"), "harvest_all");
    assert_eq!(to_snake_case("getPosX"), "get_pos_x");
    assert_eq!(to_snake_case("HTTPServer"), "http_server");
    assert_eq!(to_snake_case("MAX_SIZE"), "max_size");
    assert_eq!(to_snake_case("already_snake"), "already_snake");
    assert_eq!(to_snake_case("x"), "x");
}

#[test]
fn test_snake_case_idempotent() {
    for name in ["HarvestAll", "getPosX", "HTTPServer", "MAX_SIZE", "a1B2", "X"] {
        let once = to_snake_case(name);
        assert_eq!(to_snake_case(&once), once, "name: {}", name);
    }
}

#[test]
fn test_target_name_avoids_keywords() {
    assert_eq!(to_target_name("Import"), "_import");
    assert_eq!(to_target_name("@class"), "_class");
    assert_eq!(to_target_name("Lambda"), "_lambda");
    assert_eq!(to_target_name("_import"), "_import");
    assert_eq!(to_target_name("PlantAll"), "plant_all");
}

// =============================================================================
// Mapping tables
// =============================================================================

#[test]
fn test_mapping_tables() {
    assert_eq!(builtin("Harvest"), Some("harvest"));
    assert_eq!(builtin("GetPosX"), Some("get_pos_x"));
    assert_eq!(builtin("Frobnicate"), None);
    assert_eq!(enum_prefix("Entity"), Some("Entities"));
    assert_eq!(enum_prefix("Color"), None);
    assert_eq!(direction("Up"), Some("North"));
    assert_eq!(direction("Left"), Some("West"));
    assert_eq!(host_function("Math", "Max"), Some("max"));
    assert_eq!(host_function("Math", "Sqrt"), None);
    assert!(is_mutating_method("Add"));
    assert!(!is_mutating_method("Contains"));
}

// =============================================================================
// Output assembler
// =============================================================================

#[test]
fn test_output_indentation() {
    let mut out = OutputAssembler::new();
    out.line("def f():");
    out.indent();
    out.line("pass");
    out.dedent();
    out.line("f()");
    assert_eq!(out.finish(), "def f():\n\tpass\nf()\n");
}

#[test]
fn test_output_imports_deduplicated() {
    let mut out = OutputAssembler::new();
    out.import("import farm");
    out.line("x = 1");
    out.import("import farm");
    assert_eq!(out.finish(), "import farm\n\nx = 1\n");
}

#[test]
fn test_output_imports_after_existing_header() {
    let mut out = OutputAssembler::new();
    out.line("import tools");
    out.line("x = 1");
    out.import("import farm");
    out.import("import tools");
    assert_eq!(out.finish(), "import tools\nimport farm\n\nx = 1\n");
}

#[test]
fn test_output_helpers_once() {
    let mut out = OutputAssembler::new();
    out.import("import farm");
    out.helper("def h():\n\treturn 1");
    out.helper("def h():\n\treturn 1\n");
    out.line("x = h()");
    assert_eq!(out.finish(), "import farm\n\ndef h():\n\treturn 1\n\nx = h()\n");
}

#[test]
fn test_output_blank_lines_coalesced() {
    let mut out = OutputAssembler::new();
    out.blank();
    out.blank();
    out.line("a   ");
    out.blank();
    out.blank();
    out.line("b");
    out.blank();
    assert_eq!(out.finish(), "a\n\nb\n");
}

#[test]
fn test_output_empty() {
    assert_eq!(OutputAssembler::new().finish(), "\n");
}

#[test]
fn test_output_has_code_since() {
    let mut out = OutputAssembler::new();
    let mark = out.mark();
    out.line("# only a comment");
    out.blank();
    assert!(!out.has_code_since(mark));
    out.line("x = 1");
    assert!(out.has_code_since(mark));
}

// =============================================================================
// Resolver
// =============================================================================

#[test]
fn test_symbol_index_first_registration_wins() {
    let mut index = SymbolIndex::new();
    assert!(index.register("Foo", "bar").is_none());
    let collision = index.register("Foo", "Other").expect("collision");
    assert_eq!(collision.kind, DiagnosticKind::Collision);
    assert_eq!(index.module_of("Foo"), Some("bar"));
    assert!(index.register("Foo", "BAR").is_none());
    assert_eq!(index.len(), 1);
}

#[test]
fn test_symbol_index_iterates_in_type_order() {
    let mut index = SymbolIndex::new();
    index.register("Planner", "Farm");
    index.register("Crop", "Plants");
    let entries: Vec<(&str, &str)> = index.iter().collect();
    assert_eq!(entries, vec![("Crop", "Plants"), ("Planner", "Farm")]);
}

#[test]
fn test_qualification() {
    let mut index = SymbolIndex::new();
    index.register("Foo", "bar");
    index.register("Planner", "FarmUtils");

    let mut main = ModuleContext::new("main", &index);
    assert_eq!(main.resolve_type("Foo"), Qualification::Foreign("bar".to_string()));
    assert_eq!(main.qualify("Foo", "baz").as_deref(), Some("bar.baz"));
    assert_eq!(main.qualify("Planner", "plan").as_deref(), Some("farm_utils.plan"));
    assert_eq!(main.qualify("Unknown", "x"), None);
    assert_eq!(main.imports().collect::<Vec<_>>(), vec!["bar", "farm_utils"]);

    let mut bar = ModuleContext::new("bar", &index);
    assert_eq!(bar.qualify("Foo", "baz").as_deref(), Some("baz"));
    assert_eq!(bar.imports().count(), 0);

    bar.add_local_type("Helper");
    assert_eq!(bar.resolve_type("Helper"), Qualification::Local);
    assert!(!bar.is_type("Missing"));
}

// =============================================================================
// Global analysis
// =============================================================================

#[test]
fn test_bindings() {
    let body = vec![
        assign(ident("Score"), int(1)),
        local("y", int(2)),
        assign(ident("y"), int(3)),
        stmt(StmtKind::Expr(call(ident("items"), "Add", vec![int(1)]))),
        stmt(StmtKind::Expr(call(ident("items"), "Contains", vec![int(1)]))),
    ];
    let bindings = Bindings::of(&body);
    assert_eq!(bindings.mutated.iter().collect::<Vec<_>>(), vec!["items", "score", "y"]);
    assert_eq!(bindings.declared.iter().collect::<Vec<_>>(), vec!["y"]);
}

#[test]
fn test_required_globals() {
    let index = SymbolIndex::new();
    let mut ctx = ModuleContext::new("farm", &index);
    for name in ["score", "items", "size"] {
        ctx.add_module_binding(name);
    }
    let body = vec![
        assign(ident("size"), int(1)),
        assign(ident("score"), int(2)),
        assign(ident("temp"), int(3)),
    ];
    let params = vec![Param {
        name: "size".to_string(),
        ty: TypeRef::named("int"),
        default: None,
    }];
    assert_eq!(required_globals(&ctx, &params, &body), vec!["score"]);
    assert_eq!(required_globals(&ctx, &[], &body), vec!["score", "size"]);
}

// =============================================================================
// Diagnostics
// =============================================================================

#[test]
fn test_diagnostic_display() {
    let diagnostic = Diagnostic::unsupported(3, "ternary expression", "replaced with None placeholder");
    assert_eq!(
        diagnostic.to_string(),
        "line 3: unsupported ternary expression (replaced with None placeholder)"
    );
    let project = Diagnostic::new(DiagnosticKind::Collision, 0, "type `Foo`", "kept `bar`");
    assert_eq!(project.to_string(), "collision type `Foo` (kept `bar`)");
}

// =============================================================================
// Module driver
// =============================================================================

#[test]
fn test_entry_module_calls_main() {
    let harvest = call(ident("TFWR"), "Harvest", Vec::new());
    let unit = unit_with_class(
        "Program",
        vec![method("Main", &["static"], vec![stmt(StmtKind::Expr(harvest))])],
    );
    let index = SymbolIndex::new();

    let entry = translate_module(&unit, &index, &ModuleOptions::new("Program").entry(true));
    assert_eq!(entry.text, "def main():\n\tharvest()\n\nmain()\n");
    assert!(entry.diagnostics.is_empty());

    let library = translate_module(&unit, &index, &ModuleOptions::new("Program"));
    assert_eq!(library.text, "def main():\n\tharvest()\n");
}

#[test]
fn test_empty_method_gets_pass() {
    let unit = unit_with_class("Farm", vec![method("Idle", &[], Vec::new())]);
    let out = translate_module(&unit, &SymbolIndex::new(), &ModuleOptions::new("Farm"));
    assert_eq!(out.text, "def idle():\n\tpass\n");
}

#[test]
fn test_overloads_collide() {
    let unit = unit_with_class(
        "Farm",
        vec![method("Run", &[], Vec::new()), method("Run", &[], Vec::new())],
    );
    let out = translate_module(&unit, &SymbolIndex::new(), &ModuleOptions::new("Farm"));
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].kind, DiagnosticKind::Collision);
}

#[test]
fn test_translation_is_deterministic() {
    let body = vec![
        assign(ident("score"), int(1)),
        stmt(StmtKind::Expr(call(ident("Console"), "WriteLine", vec![ident("score")]))),
    ];
    let unit = unit_with_class("Farm", vec![method("Tick", &[], body)]);
    let index = SymbolIndex::new();
    let options = ModuleOptions::new("Farm");
    let first = translate_module(&unit, &index, &options);
    let second = translate_module(&unit, &index, &options);
    assert_eq!(first, second);
    assert_eq!(first.text, "def tick():\n\tscore = 1\n\tquick_print(score)\n");
}
