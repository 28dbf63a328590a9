//! Pre-pass that finds which module-level bindings a function rebinds.
//!
//! The dialect treats any name assigned inside a function as local unless
//! the function declares it `global`. This pass runs over a body before
//! anything is emitted and produces the sorted declaration list.

use std::collections::BTreeSet;

use rhizome_tiller_ast::{
    Designation, Expr, ExprKind, ForeachBinding, InitElement, InterpolationPart, Param, Stmt,
    StmtKind, SwitchLabel,
};

use crate::mappings::is_mutating_method;
use crate::naming::to_target_name;
use crate::resolver::ModuleContext;

/// Names a statement list writes to and names it declares, target spelling.
#[derive(Debug, Default)]
pub(crate) struct Bindings {
    pub mutated: BTreeSet<String>,
    pub declared: BTreeSet<String>,
}

impl Bindings {
    pub fn of(stmts: &[Stmt]) -> Self {
        let mut bindings = Self::default();
        bindings.stmts(stmts);
        bindings
    }

    fn stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn declare(&mut self, name: &str) {
        self.declared.insert(to_target_name(name));
    }

    fn designation(&mut self, designation: &Designation) {
        for name in designation.names() {
            self.declare(name);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Block(stmts) => self.stmts(stmts),
            StmtKind::Expr(expr) => self.expr(expr),
            StmtKind::LocalDecl(decl) => {
                for declarator in &decl.declarators {
                    self.declare(&declarator.name);
                    if let Some(init) = &declarator.init {
                        self.expr(init);
                    }
                }
            }
            StmtKind::Deconstruct { pattern, value } => {
                self.designation(pattern);
                self.expr(value);
            }
            StmtKind::Return(value) | StmtKind::Throw(value) | StmtKind::Yield(value) => {
                if let Some(value) = value {
                    self.expr(value);
                }
            }
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                self.expr(cond);
                self.stmt(then);
                if let Some(otherwise) = otherwise {
                    self.stmt(otherwise);
                }
            }
            StmtKind::While { cond, body } | StmtKind::DoWhile { body, cond } => {
                self.expr(cond);
                self.stmt(body);
            }
            StmtKind::For {
                decl,
                init,
                cond,
                update,
                body,
            } => {
                if let Some(decl) = decl {
                    for declarator in &decl.declarators {
                        self.declare(&declarator.name);
                        if let Some(init) = &declarator.init {
                            self.expr(init);
                        }
                    }
                }
                init.iter().for_each(|e| self.expr(e));
                if let Some(cond) = cond {
                    self.expr(cond);
                }
                update.iter().for_each(|e| self.expr(e));
                self.stmt(body);
            }
            StmtKind::Foreach {
                binding,
                iterable,
                body,
            } => {
                match binding {
                    ForeachBinding::Single { name, .. } => self.declare(name),
                    ForeachBinding::Deconstruct(pattern) => self.designation(pattern),
                }
                self.expr(iterable);
                self.stmt(body);
            }
            StmtKind::Switch { subject, sections } => {
                self.expr(subject);
                for section in sections {
                    for label in &section.labels {
                        if let SwitchLabel::Case(expr) = label {
                            self.expr(expr);
                        }
                    }
                    self.stmts(&section.body);
                }
            }
            // Nested functions get their own analysis when emitted.
            StmtKind::LocalFunction(method) => self.declare(&method.name),
            StmtKind::Try {
                body,
                catches,
                finally,
            } => {
                self.stmt(body);
                self.stmts(catches);
                if let Some(finally) = finally {
                    self.stmt(finally);
                }
            }
            StmtKind::Using { body }
            | StmtKind::Lock { body }
            | StmtKind::Labeled { body, .. }
            | StmtKind::Checked(body) => self.stmt(body),
            StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Goto(_)
            | StmtKind::Empty
            | StmtKind::Unknown { .. } => {}
        }
    }

    /// Record an assignment target.
    fn target(&mut self, expr: &Expr) {
        match &expr.unparen().kind {
            ExprKind::Identifier(name) => {
                self.mutated.insert(to_target_name(name));
            }
            // `this.x` and `Class.x` both flatten to the module binding.
            ExprKind::Member { target, name }
                if matches!(target.unparen().kind, ExprKind::This | ExprKind::Identifier(_)) =>
            {
                self.mutated.insert(to_target_name(name));
            }
            ExprKind::Tuple(items) => items.iter().for_each(|item| self.target(item)),
            ExprKind::Declaration { designation, .. } => self.designation(designation),
            _ => {}
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Assign { target, value, .. } => {
                self.target(target);
                self.expr(target);
                self.expr(value);
            }
            ExprKind::Unary { op, operand } => {
                if op.is_step() {
                    self.target(operand);
                }
                self.expr(operand);
            }
            ExprKind::Invoke { callee, args } => {
                if let ExprKind::Member { target, name } = &callee.unparen().kind {
                    if is_mutating_method(name) {
                        self.target(target);
                    }
                }
                self.expr(callee);
                args.iter().for_each(|arg| self.expr(&arg.value));
            }
            ExprKind::Declaration { designation, .. } => self.designation(designation),
            ExprKind::Binary { left, right, .. } => {
                self.expr(left);
                self.expr(right);
            }
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                self.expr(cond);
                self.expr(then);
                self.expr(otherwise);
            }
            ExprKind::Cast { value, .. } => self.expr(value),
            ExprKind::Paren(inner) => self.expr(inner),
            ExprKind::Member { target, .. } => self.expr(target),
            ExprKind::ElementAccess { target, index } => {
                self.expr(target);
                index.iter().for_each(|arg| self.expr(&arg.value));
            }
            ExprKind::ObjectCreation { args, init, .. }
            | ExprKind::ImplicitObjectCreation { args, init } => {
                args.iter().for_each(|arg| self.expr(&arg.value));
                if let Some(init) = init {
                    self.init(init);
                }
            }
            ExprKind::ArrayCreation { sizes, init, .. } => {
                sizes.iter().for_each(|e| self.expr(e));
                if let Some(init) = init {
                    self.init(init);
                }
            }
            ExprKind::ImplicitArrayCreation(init) | ExprKind::Initializer(init) => self.init(init),
            ExprKind::Collection(items) | ExprKind::Tuple(items) => {
                items.iter().for_each(|e| self.expr(e))
            }
            ExprKind::Interpolated(parts) => {
                for part in parts {
                    match part {
                        InterpolationPart::Hole(expr)
                        | InterpolationPart::Formatted { value: expr, .. } => self.expr(expr),
                        InterpolationPart::Text(_) => {}
                    }
                }
            }
            ExprKind::IsNull { operand, .. } => self.expr(operand),
            ExprKind::Literal(_)
            | ExprKind::Identifier(_)
            | ExprKind::This
            | ExprKind::Default(_)
            | ExprKind::TypeOf(_)
            | ExprKind::Lambda
            | ExprKind::Unknown { .. } => {}
        }
    }

    fn init(&mut self, init: &[InitElement]) {
        for element in init {
            match element {
                InitElement::Value(value) => self.expr(value),
                InitElement::Pair { key, value } => {
                    self.expr(key);
                    self.expr(value);
                }
            }
        }
    }
}

/// Module-level names `body` rebinds, sorted, excluding its own parameters
/// and locals.
pub(crate) fn required_globals(
    ctx: &ModuleContext<'_>,
    params: &[Param],
    body: &[Stmt],
) -> Vec<String> {
    let bindings = Bindings::of(body);
    let params: BTreeSet<String> = params.iter().map(|p| to_target_name(&p.name)).collect();
    bindings
        .mutated
        .into_iter()
        .filter(|name| !bindings.declared.contains(name) && !params.contains(name))
        .filter(|name| ctx.is_module_binding(name))
        .collect()
}
