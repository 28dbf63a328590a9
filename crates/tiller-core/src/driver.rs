//! Module translation entry point.

use std::collections::HashSet;

use rhizome_tiller_ast::{
    ClassDecl, CompilationUnit, Item, ItemKind, MemberKind, MethodBody, MethodDecl, Stmt,
    StmtKind,
};
use serde::Serialize;
use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::globals::Bindings;
use crate::naming::to_target_name;
use crate::resolver::{ModuleContext, SymbolIndex};
use crate::translate::Translator;

/// Name of the method the entry module calls on completion.
const ENTRY_METHOD: &str = "Main";

/// Per-module translation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOptions {
    /// Source module name, usually the file stem.
    pub module_name: String,
    /// Whether the module is the program's entry module.
    pub is_entry: bool,
}

impl ModuleOptions {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            is_entry: false,
        }
    }

    pub fn entry(mut self, is_entry: bool) -> Self {
        self.is_entry = is_entry;
        self
    }
}

/// Result of translating one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    /// Target-dialect source, newline terminated.
    pub text: String,
    /// Everything that was degraded, guessed or skipped, in emission order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Translate one compilation unit.
///
/// Never fails: constructs without a target equivalent are degraded and
/// reported in [`Translation::diagnostics`]. Identical inputs always give
/// identical output.
pub fn translate_module(
    unit: &CompilationUnit,
    index: &SymbolIndex,
    options: &ModuleOptions,
) -> Translation {
    let mut ctx = ModuleContext::new(options.module_name.clone(), index);
    for name in unit.declared_types() {
        ctx.add_local_type(name);
    }

    let principal = principal_class(unit, &options.module_name);
    let mut module = ModuleEmitter {
        t: Translator::new(ctx),
        principal,
        is_entry: options.is_entry,
        defined: HashSet::new(),
        has_entry: false,
    };
    module.prepare(&unit.items);
    module.items(&unit.items);

    if module.has_entry {
        module.t.out.blank();
        module.t.emit(format!("{}()", to_target_name(ENTRY_METHOD)));
    }

    let imports: Vec<String> = module.t.ctx.imports().map(str::to_string).collect();
    for import in imports {
        module.t.out.import(format!("import {}", import));
    }

    let Translator {
        out, diagnostics, ..
    } = module.t;
    debug!(
        module = %options.module_name,
        diagnostics = diagnostics.len(),
        "translated module"
    );
    Translation {
        text: out.finish(),
        diagnostics,
    }
}

/// The class named after the module, else the first top-level class.
fn principal_class<'u>(unit: &'u CompilationUnit, module_name: &str) -> Option<&'u ClassDecl> {
    let classes = unit.classes();
    classes
        .iter()
        .find(|class| class.name.eq_ignore_ascii_case(module_name))
        .or(classes.first())
        .copied()
}

struct ModuleEmitter<'u, 'i> {
    t: Translator<'i>,
    principal: Option<&'u ClassDecl>,
    is_entry: bool,
    /// Function names already emitted at module level (target spelling).
    defined: HashSet<String>,
    has_entry: bool,
}

impl<'u> ModuleEmitter<'u, '_> {
    // -------------------------------------------------------------------------
    // Pre-pass
    // -------------------------------------------------------------------------

    /// Register module-level bindings and callable names before anything
    /// is emitted, so forward references resolve.
    fn prepare(&mut self, items: &[Item]) {
        for item in items {
            match &item.kind {
                ItemKind::Namespace { items, .. } => self.prepare(items),
                ItemKind::Class(class) => self.prepare_class(class),
                ItemKind::GlobalStatement(stmt) => {
                    let stmts = std::slice::from_ref(stmt);
                    for name in Bindings::of(stmts).declared {
                        self.t.ctx.add_module_binding(name);
                    }
                    self.prepare_functions(stmts);
                }
                ItemKind::Ignored { .. } => {}
            }
        }
    }

    fn prepare_class(&mut self, class: &ClassDecl) {
        for member in &class.members {
            match &member.kind {
                MemberKind::Field(field) => {
                    for declarator in &field.declarators {
                        self.t.ctx.add_module_binding(to_target_name(&declarator.name));
                        self.t.declare(&declarator.name, field.ty.clone());
                    }
                }
                MemberKind::Method(method) => {
                    self.t.add_function(method.name.clone());
                    if let MethodBody::Block(stmts) = &method.body {
                        self.prepare_functions(stmts);
                    }
                }
                MemberKind::Constructor { body, .. } => {
                    // Constructor bodies run at module level.
                    if let MethodBody::Block(stmts) = body {
                        for name in Bindings::of(stmts).declared {
                            self.t.ctx.add_module_binding(name);
                        }
                        self.prepare_functions(stmts);
                    }
                }
                MemberKind::NestedClass(nested) => self.prepare_class(nested),
                MemberKind::Unsupported { .. } => {}
            }
        }
    }

    /// Local functions, wherever they are nested.
    fn prepare_functions(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            match &stmt.kind {
                StmtKind::LocalFunction(method) => {
                    self.t.add_function(method.name.clone());
                    if let MethodBody::Block(body) = &method.body {
                        self.prepare_functions(body);
                    }
                }
                StmtKind::Block(body) => self.prepare_functions(body),
                StmtKind::If {
                    then, otherwise, ..
                } => {
                    self.prepare_functions(std::slice::from_ref(then));
                    if let Some(otherwise) = otherwise {
                        self.prepare_functions(std::slice::from_ref(otherwise));
                    }
                }
                StmtKind::While { body, .. }
                | StmtKind::DoWhile { body, .. }
                | StmtKind::For { body, .. }
                | StmtKind::Foreach { body, .. }
                | StmtKind::Try { body, .. }
                | StmtKind::Using { body }
                | StmtKind::Lock { body }
                | StmtKind::Labeled { body, .. }
                | StmtKind::Checked(body) => self.prepare_functions(std::slice::from_ref(body)),
                StmtKind::Switch { sections, .. } => {
                    for section in sections {
                        self.prepare_functions(&section.body);
                    }
                }
                _ => {}
            }
        }
    }

    // -------------------------------------------------------------------------
    // Emission
    // -------------------------------------------------------------------------

    fn items(&mut self, items: &'u [Item]) {
        for item in items {
            let line = item.span.start_line;
            match &item.kind {
                ItemKind::Namespace { items, .. } => self.items(items),
                ItemKind::Class(class) => self.class(class, line),
                ItemKind::GlobalStatement(stmt) => self.t.stmt(stmt),
                ItemKind::Ignored { kind, name } => {
                    self.t
                        .diagnose(Diagnostic::ignored(line, format!("{} `{}`", kind, name)));
                }
            }
        }
    }

    fn class(&mut self, class: &'u ClassDecl, line: u32) {
        if class.is_struct {
            self.t.diagnose(Diagnostic::new(
                DiagnosticKind::Ignored,
                line,
                format!("struct `{}`", class.name),
                "translated as a class",
            ));
        }
        let is_principal = self.principal.is_some_and(|p| std::ptr::eq(p, class));

        // Fields first, as module-level bindings.
        for member in &class.members {
            if let MemberKind::Field(field) = &member.kind {
                for declarator in &field.declarators {
                    let value = match &declarator.init {
                        Some(init) => self.t.expr_with(init, Some(field.ty.clone())),
                        None => field.ty.default_literal().to_string(),
                    };
                    let name = self.t.name(&declarator.name);
                    self.t.emit(format!("{} = {}", name, value));
                }
            }
        }

        // Constructor bodies are the module's initialization code.
        for member in &class.members {
            if let MemberKind::Constructor { params, body } = &member.kind {
                let line = member.span.start_line;
                if !params.is_empty() {
                    self.t.unsupported(
                        line,
                        format!("constructor parameters of `{}`", class.name),
                        "dropped",
                    );
                }
                self.t.out.blank();
                match body {
                    MethodBody::Block(stmts) => self.t.stmts(stmts),
                    MethodBody::Expression(expr) => {
                        let lines = self.t.expr_statement_lines(expr);
                        self.t.emit_lines(lines);
                    }
                    MethodBody::None => {}
                }
            }
        }

        for member in &class.members {
            let line = member.span.start_line;
            match &member.kind {
                MemberKind::Method(method) => {
                    let entry = is_principal && self.is_entry && is_entry_method(method);
                    self.method(method, entry, line);
                }
                MemberKind::NestedClass(nested) => self.class(nested, line),
                MemberKind::Unsupported { kind, name } => {
                    self.t
                        .diagnose(Diagnostic::ignored(line, format!("{} `{}`", kind, name)));
                }
                MemberKind::Field(_) | MemberKind::Constructor { .. } => {}
            }
        }
    }

    fn method(&mut self, method: &MethodDecl, entry: bool, line: u32) {
        let name = to_target_name(&method.name);
        if !self.defined.insert(name.clone()) {
            self.t.diagnose(Diagnostic::new(
                DiagnosticKind::Collision,
                line,
                format!("function `{}` defined more than once", name),
                "later definition wins",
            ));
        }
        self.t.out.blank();
        self.t.function(method, entry, line);
        self.has_entry |= entry;
    }
}

fn is_entry_method(method: &MethodDecl) -> bool {
    method.name == ENTRY_METHOD && method.is_static()
}
