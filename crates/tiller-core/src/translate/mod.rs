//! Syntax-directed translation of one module's statements and expressions.
//!
//! A [`Translator`] owns everything one module translation touches: the
//! resolution context, the output buffer and the diagnostics. Nothing is
//! shared between modules.

mod expr;
mod invoke;
mod stmt;

use std::collections::{HashMap, HashSet};
use std::mem;

use rhizome_tiller_ast::{
    BinaryOp, Expr, ExprKind, Literal, MethodBody, MethodDecl, Param, Stmt, StmtKind, TypeRef,
    UnaryOp,
};
use tracing::debug;

use crate::diagnostics::Diagnostic;
use crate::globals::required_globals;
use crate::naming::to_target_name;
use crate::output::OutputAssembler;
use crate::resolver::ModuleContext;

/// Enclosing construct a `break` or `continue` refers to.
#[derive(Debug)]
enum Frame {
    /// Lines to run before `continue` (a desugared `for` update, or the
    /// condition check of a do-while).
    Loop { before_continue: Vec<String> },
    /// A switch arm; `break` there has no loop to leave.
    Switch,
}

pub(crate) struct Translator<'i> {
    pub ctx: ModuleContext<'i>,
    pub out: OutputAssembler,
    pub diagnostics: Vec<Diagnostic>,
    /// Declared types by source name, innermost scope last. The first
    /// scope holds module-level bindings.
    scopes: Vec<HashMap<String, TypeRef>>,
    /// Source names callable without qualification.
    functions: HashSet<String>,
    return_type: Option<TypeRef>,
    frames: Vec<Frame>,
    /// Statements hoisted out of the expression being translated.
    pre: Vec<String>,
    /// Trailing comments for the next emitted line.
    notes: Vec<String>,
}

impl<'i> Translator<'i> {
    pub fn new(ctx: ModuleContext<'i>) -> Self {
        Self {
            ctx,
            out: OutputAssembler::new(),
            diagnostics: Vec::new(),
            scopes: vec![HashMap::new()],
            functions: HashSet::new(),
            return_type: None,
            frames: Vec::new(),
            pre: Vec::new(),
            notes: Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Names and scopes
    // -------------------------------------------------------------------------

    pub fn name(&self, name: &str) -> String {
        to_target_name(name)
    }

    pub fn add_function(&mut self, name: impl Into<String>) {
        self.functions.insert(name.into());
    }

    pub fn is_function(&self, name: &str) -> bool {
        self.functions.contains(name)
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn declare(&mut self, name: &str, ty: TypeRef) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), ty);
        }
    }

    /// Declare a local, inferring `var` from its initializer where possible.
    pub fn declare_local(&mut self, name: &str, ty: &TypeRef, init: Option<&Expr>) {
        let ty = match (ty, init) {
            (TypeRef::Var, Some(init)) => self.type_of(init).unwrap_or(TypeRef::Var),
            _ => ty.clone(),
        };
        self.declare(name, ty);
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeRef> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn is_variable(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Best-effort static type of an expression.
    pub fn type_of(&self, expr: &Expr) -> Option<TypeRef> {
        match &expr.kind {
            ExprKind::Identifier(name) => self.lookup(name).filter(|t| !t.is_var()).cloned(),
            ExprKind::Member { target, name } if matches!(target.kind, ExprKind::This) => {
                self.lookup(name).filter(|t| !t.is_var()).cloned()
            }
            ExprKind::Literal(Literal::Str(_) | Literal::Char(_)) | ExprKind::Interpolated(_) => {
                Some(TypeRef::named("string"))
            }
            ExprKind::Literal(Literal::Integer(_)) => Some(TypeRef::named("int")),
            ExprKind::Literal(Literal::Real(_)) => Some(TypeRef::named("double")),
            ExprKind::Literal(Literal::Bool(_)) => Some(TypeRef::named("bool")),
            ExprKind::ObjectCreation { ty, .. } | ExprKind::Cast { ty, .. } => Some(ty.clone()),
            ExprKind::ArrayCreation { ty, .. } => Some(TypeRef::Array(Box::new(ty.clone()))),
            ExprKind::Paren(inner) => self.type_of(inner),
            ExprKind::ElementAccess { target, .. } => match self.type_of(target)? {
                TypeRef::Array(element) => Some(*element),
                TypeRef::Named { args, .. } => args.last().cloned(),
                _ => None,
            },
            ExprKind::Binary { op, left, right } => match op {
                BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Gt
                | BinaryOp::Ge
                | BinaryOp::And
                | BinaryOp::Or => Some(TypeRef::named("bool")),
                BinaryOp::Add => {
                    let (l, r) = (self.type_of(left), self.type_of(right));
                    if l.as_ref().is_some_and(TypeRef::is_string)
                        || r.as_ref().is_some_and(TypeRef::is_string)
                    {
                        Some(TypeRef::named("string"))
                    } else {
                        l.or(r)
                    }
                }
                _ => self.type_of(left),
            },
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Not => Some(TypeRef::named("bool")),
                _ => self.type_of(operand),
            },
            ExprKind::Invoke { callee, .. } => match &callee.unparen().kind {
                ExprKind::Member { name, .. } if name == "ToString" => {
                    Some(TypeRef::named("string"))
                }
                _ => None,
            },
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Diagnostics and line emission
    // -------------------------------------------------------------------------

    pub fn diagnose(&mut self, diagnostic: Diagnostic) {
        debug!(
            module = %self.ctx.module_name(),
            line = diagnostic.line,
            kind = %diagnostic.kind,
            construct = %diagnostic.construct,
            "diagnostic"
        );
        self.diagnostics.push(diagnostic);
    }

    pub fn unsupported(
        &mut self,
        line: u32,
        construct: impl Into<String>,
        action: impl Into<String>,
    ) {
        self.diagnose(Diagnostic::unsupported(line, construct, action));
    }

    /// Inert stand-in for an expression the dialect cannot express. The
    /// emitted line carries a comment asking for a manual rewrite.
    pub fn placeholder(&mut self, line: u32, construct: &str) -> String {
        self.unsupported(line, construct, "replaced with None placeholder");
        self.notes.push(format!("UNSUPPORTED: {}, rewrite manually", construct));
        "None".to_string()
    }

    fn take_notes(&mut self) -> String {
        if self.notes.is_empty() {
            return String::new();
        }
        let notes = mem::take(&mut self.notes);
        format!("  # {}", notes.join("; "))
    }

    /// Emit hoisted statements, then `text` with any pending notes.
    pub fn emit(&mut self, text: impl AsRef<str>) {
        self.flush_pre();
        let notes = self.take_notes();
        self.out.line(format!("{}{}", text.as_ref(), notes));
    }

    /// Emit several lines; notes attach to the first. Lines may carry
    /// leading tabs relative to the current depth.
    pub fn emit_lines(&mut self, lines: Vec<String>) {
        let mut lines = lines.into_iter();
        if let Some(first) = lines.next() {
            self.emit(first);
        }
        for line in lines {
            self.out.line(line);
        }
    }

    pub fn flush_pre(&mut self) {
        for line in mem::take(&mut self.pre) {
            self.out.line(line);
        }
    }

    pub fn comment(&mut self, text: impl AsRef<str>) {
        self.out.line(format!("# {}", text.as_ref()));
    }

    // -------------------------------------------------------------------------
    // Functions
    // -------------------------------------------------------------------------

    /// Emit `def name(params):` and its body.
    ///
    /// `entry` drops the parameter list: the module ends by calling the
    /// function with no arguments.
    pub fn function(&mut self, method: &MethodDecl, entry: bool, line: u32) {
        let name = self.name(&method.name);
        self.push_scope();

        let mut params = Vec::new();
        if entry && !method.params.is_empty() {
            self.unsupported(
                line,
                format!("parameters of entry method `{}`", method.name),
                "dropped",
            );
        }
        for param in &method.params {
            if !entry {
                let param_name = self.name(&param.name);
                match &param.default {
                    Some(default) => {
                        let value = self.expr_with(default, Some(param.ty.clone()));
                        params.push(format!("{} = {}", param_name, value));
                    }
                    None => params.push(param_name),
                }
            }
            self.declare(&param.name, param.ty.clone());
        }
        // Defaults are constants; anything they hoisted has nowhere to go.
        self.pre.clear();
        self.emit(format!("def {}({}):", name, params.join(", ")));

        let saved_return = self.return_type.replace(method.return_type.clone());
        let saved_frames = mem::take(&mut self.frames);
        self.out.indent();
        let mark = self.out.mark();

        match &method.body {
            MethodBody::Block(stmts) => {
                self.globals(&method.params, stmts);
                self.stmts(stmts);
            }
            MethodBody::Expression(expr) => {
                let as_stmt = Stmt::new(StmtKind::Expr(expr.clone()), expr.span);
                self.globals(&method.params, std::slice::from_ref(&as_stmt));
                self.expression_body(expr, &method.return_type);
            }
            MethodBody::None => {}
        }
        if !self.out.has_code_since(mark) {
            self.out.line("pass");
        }

        self.out.dedent();
        self.frames = saved_frames;
        self.return_type = saved_return;
        self.pop_scope();
    }

    fn globals(&mut self, params: &[Param], body: &[Stmt]) {
        for name in required_globals(&self.ctx, params, body) {
            self.out.line(format!("global {}", name));
        }
    }

    /// Body of `=> expr` methods.
    fn expression_body(&mut self, expr: &Expr, return_type: &TypeRef) {
        if return_type.is_void() {
            let lines = self.expr_statement_lines(expr);
            self.emit_lines(lines);
            return;
        }
        if let ExprKind::Unary { op, operand } = &expr.unparen().kind {
            if op.is_step() {
                let target = self.expr(operand);
                let step = if op.is_increment() { "+=" } else { "-=" };
                if matches!(op, UnaryOp::PostInc | UnaryOp::PostDec) {
                    self.emit(format!("_temp = {}", target));
                    self.emit(format!("{} {} 1", target, step));
                    self.emit("return _temp");
                } else {
                    self.emit(format!("{} {} 1", target, step));
                    self.emit(format!("return {}", target));
                }
                return;
            }
        }
        let value = self.return_value(expr);
        self.emit(format!("return {}", value));
    }
}
