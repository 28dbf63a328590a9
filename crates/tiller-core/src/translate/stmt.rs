//! Statement translation.

use std::mem;

use rhizome_tiller_ast::{
    AssignOp, BinaryOp, Expr, ExprKind, ForeachBinding, LocalDecl, Stmt, StmtKind, SwitchLabel,
    SwitchSection, TypeRef,
};

use super::expr::{snippet, wrap};
use super::{Frame, Translator};
use crate::globals::Bindings;
use crate::naming::to_target_name;

/// A `for` loop that maps onto `range`.
struct CountedLoop<'a> {
    var: &'a str,
    start: &'a Expr,
    bound: &'a Expr,
    op: BinaryOp,
    step: i64,
}

impl Translator<'_> {
    pub(crate) fn stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    /// Lines for an expression used as a statement, hoisted lines first.
    /// Pending notes are attached to the statement's own line.
    pub(crate) fn expr_statement_lines(&mut self, expr: &Expr) -> Vec<String> {
        let mut lines = match &expr.unparen().kind {
            ExprKind::Unary { op, operand } if op.is_step() => {
                let target = self.expr(operand);
                let step = if op.is_increment() { "+=" } else { "-=" };
                vec![format!("{} {} 1", target, step)]
            }
            ExprKind::Assign { op, target, value } => {
                self.assignment(*op, target, value, expr.span.start_line).1
            }
            _ => vec![self.expr(expr)],
        };
        let notes = self.take_notes();
        if let Some(first) = lines.first_mut() {
            first.push_str(&notes);
        }
        let mut out = mem::take(&mut self.pre);
        out.append(&mut lines);
        out
    }

    pub(crate) fn return_value(&mut self, expr: &Expr) -> String {
        if matches!(expr.unparen().kind, ExprKind::Tuple(_)) {
            return self.unpacked(expr);
        }
        let hint = self
            .return_type
            .clone()
            .filter(|ty| !ty.is_void() && !ty.is_var());
        self.expr_with(expr, hint)
    }

    pub(crate) fn stmt(&mut self, stmt: &Stmt) {
        let line = stmt.span.start_line;
        match &stmt.kind {
            StmtKind::Block(stmts) => {
                self.push_scope();
                self.stmts(stmts);
                self.pop_scope();
            }
            StmtKind::Expr(expr) => {
                let lines = self.expr_statement_lines(expr);
                self.emit_lines(lines);
            }
            StmtKind::LocalDecl(decl) => self.local_decl(decl),
            StmtKind::Deconstruct { pattern, value } => {
                let value = self.unpacked(value);
                for name in pattern.names() {
                    self.declare(name, TypeRef::Var);
                }
                let target = self.designation(pattern, true);
                self.emit(format!("{} = {}", target, value));
            }
            StmtKind::Return(None) => self.emit("return"),
            StmtKind::Return(Some(value)) => {
                let value = self.return_value(value);
                self.emit(format!("return {}", value));
            }
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                let cond = self.expr(cond);
                self.emit(format!("if {}:", cond));
                self.body(then);
                self.else_branch(otherwise.as_deref());
            }
            StmtKind::While { cond, body } => {
                let cond = self.expr(cond);
                if self.pre.is_empty() {
                    self.emit(format!("while {}:", cond));
                    self.loop_body(body, Vec::new(), Vec::new());
                } else {
                    let check = self.exit_check(&cond);
                    self.emit("while True:");
                    self.loop_body(body, check, Vec::new());
                }
            }
            StmtKind::DoWhile { body, cond } => {
                let cond = self.expr(cond);
                let check = self.exit_check(&cond);
                self.emit("while True:");
                self.loop_body(body, Vec::new(), check);
            }
            StmtKind::For {
                decl,
                init,
                cond,
                update,
                body,
            } => {
                self.push_scope();
                match counted_loop(decl.as_ref(), init, cond.as_ref(), update) {
                    Some(counted) if !mutates(body, counted.var) => {
                        let ty = decl
                            .as_ref()
                            .map(|d| d.ty.clone())
                            .filter(|ty| !ty.is_var())
                            .unwrap_or_else(|| TypeRef::named("int"));
                        self.counted_for(&counted, ty, body);
                    }
                    _ => self.while_for(decl.as_ref(), init, cond.as_ref(), update, body),
                }
                self.pop_scope();
            }
            StmtKind::Foreach {
                binding,
                iterable,
                body,
            } => match binding {
                ForeachBinding::Single { ty, name } => {
                    let element = match ty {
                        TypeRef::Var => self.element_type(iterable).unwrap_or(TypeRef::Var),
                        ty => ty.clone(),
                    };
                    let iterable = self.expr(iterable);
                    let name_text = self.name(name);
                    self.emit(format!("for {} in {}:", name_text, iterable));
                    self.push_scope();
                    self.declare(name, element);
                    self.loop_body(body, Vec::new(), Vec::new());
                    self.pop_scope();
                }
                ForeachBinding::Deconstruct(_) => {
                    self.unsupported(line, "foreach deconstruction", "loop dropped");
                    self.comment("UNSUPPORTED: foreach deconstruction");
                }
            },
            StmtKind::Switch { subject, sections } => self.switch(subject, sections, line),
            StmtKind::Break => {
                if matches!(self.frames.last(), Some(Frame::Switch)) {
                    self.unsupported(line, "`break` out of a switch arm", "dropped");
                    self.comment("UNSUPPORTED: break out of switch arm");
                } else {
                    self.emit("break");
                }
            }
            StmtKind::Continue => {
                let before = self
                    .frames
                    .iter()
                    .rev()
                    .find_map(|frame| match frame {
                        Frame::Loop { before_continue } => Some(before_continue.clone()),
                        Frame::Switch => None,
                    })
                    .unwrap_or_default();
                for line in before {
                    self.out.line(line);
                }
                self.emit("continue");
            }
            StmtKind::LocalFunction(method) => self.function(method, false, line),
            StmtKind::Try { body, finally, .. } => {
                self.unsupported(line, "try/catch", "catch clauses dropped");
                self.comment("UNSUPPORTED: try/catch, catch clauses dropped");
                self.inline(body);
                if let Some(finally) = finally {
                    self.inline(finally);
                }
            }
            StmtKind::Throw(_) => {
                self.unsupported(line, "throw statement", "replaced with a comment");
                self.comment("UNSUPPORTED: throw");
            }
            StmtKind::Using { body } => {
                self.unsupported(line, "using statement", "body kept, disposal dropped");
                self.inline(body);
            }
            StmtKind::Lock { body } => {
                self.unsupported(line, "lock statement", "body kept, lock dropped");
                self.inline(body);
            }
            StmtKind::Checked(body) => {
                self.unsupported(line, "checked block", "body kept, overflow checks dropped");
                self.inline(body);
            }
            StmtKind::Yield(_) => {
                self.unsupported(line, "yield statement", "replaced with a comment");
                self.comment("UNSUPPORTED: yield");
            }
            StmtKind::Goto(label) => {
                self.unsupported(line, format!("goto `{}`", label), "replaced with a comment");
                self.comment(format!("UNSUPPORTED: goto {}", label));
            }
            StmtKind::Labeled { label, body } => {
                self.unsupported(line, format!("label `{}`", label), "label dropped");
                self.stmt(body);
            }
            StmtKind::Empty => {}
            StmtKind::Unknown { kind, text } => {
                let construct = format!("{} `{}`", kind.replace('_', " "), snippet(text));
                self.unsupported(line, construct.clone(), "replaced with a comment");
                self.comment(format!("UNSUPPORTED: {}", construct));
            }
        }
    }

    fn local_decl(&mut self, decl: &LocalDecl) {
        let hint = (!decl.ty.is_var()).then(|| decl.ty.clone());
        for declarator in &decl.declarators {
            let value = match &declarator.init {
                Some(init) => self.expr_with(init, hint.clone()),
                None => "None".to_string(),
            };
            self.declare_local(&declarator.name, &decl.ty, declarator.init.as_ref());
            let name = self.name(&declarator.name);
            self.emit(format!("{} = {}", name, value));
        }
    }

    // -------------------------------------------------------------------------
    // Blocks
    // -------------------------------------------------------------------------

    /// Indented body of a compound statement in its own scope; `pass` when
    /// nothing executable was emitted.
    fn body(&mut self, stmt: &Stmt) {
        self.block(stmt.as_block(), &[], &[]);
    }

    fn block(&mut self, stmts: &[Stmt], head: &[String], tail: &[String]) {
        self.out.indent();
        let mark = self.out.mark();
        for line in head {
            self.out.line(line);
        }
        self.push_scope();
        self.stmts(stmts);
        self.pop_scope();
        for line in tail {
            self.out.line(line);
        }
        if !self.out.has_code_since(mark) {
            self.out.line("pass");
        }
        self.out.dedent();
    }

    /// Loop body. `head` runs first on every iteration, `tail` last and
    /// before every `continue`.
    fn loop_body(&mut self, body: &Stmt, head: Vec<String>, tail: Vec<String>) {
        self.frames.push(Frame::Loop {
            before_continue: tail.clone(),
        });
        self.block(body.as_block(), &head, &tail);
        self.frames.pop();
    }

    /// Statements of `stmt` at the current depth.
    fn inline(&mut self, stmt: &Stmt) {
        self.push_scope();
        self.stmts(stmt.as_block());
        self.pop_scope();
    }

    /// `if not cond: break` for a loop condition that needs hoisted lines.
    fn exit_check(&mut self, cond: &str) -> Vec<String> {
        let mut lines = mem::take(&mut self.pre);
        let notes = self.take_notes();
        lines.push(format!("if not {}:{}", wrap(cond), notes));
        lines.push("\tbreak".to_string());
        lines
    }

    fn else_branch(&mut self, mut otherwise: Option<&Stmt>) {
        while let Some(stmt) = otherwise {
            let StmtKind::If {
                cond,
                then,
                otherwise: next,
            } = &stmt.kind
            else {
                self.out.line("else:");
                self.body(stmt);
                return;
            };
            let cond = self.expr(cond);
            if !self.pre.is_empty() {
                // Hoisted lines need a statement position of their own.
                self.out.line("else:");
                self.out.indent();
                self.emit(format!("if {}:", cond));
                self.body(then);
                self.else_branch(next.as_deref());
                self.out.dedent();
                return;
            }
            self.emit(format!("elif {}:", cond));
            self.body(then);
            otherwise = next.as_deref();
        }
    }

    // -------------------------------------------------------------------------
    // Loops
    // -------------------------------------------------------------------------

    fn counted_for(&mut self, counted: &CountedLoop<'_>, ty: TypeRef, body: &Stmt) {
        let start = self.expr(counted.start);
        let end = self.range_end(counted.bound, counted.op);
        let args = if counted.step != 1 {
            format!("{}, {}, {}", start, end, counted.step)
        } else if counted.start.as_int_literal() == Some(0) {
            end
        } else {
            format!("{}, {}", start, end)
        };
        let var = self.name(counted.var);
        self.emit(format!("for {} in range({}):", var, args));
        self.declare(counted.var, ty);
        self.loop_body(body, Vec::new(), Vec::new());
    }

    /// Exclusive end for `range`; inclusive bounds move one step outward.
    fn range_end(&mut self, bound: &Expr, op: BinaryOp) -> String {
        let (literal_shift, cancel, fallback) = match op {
            BinaryOp::Le => (1, BinaryOp::Sub, "+"),
            BinaryOp::Ge => (-1, BinaryOp::Add, "-"),
            _ => return self.expr(bound),
        };
        if let Some(value) = bound.as_int_literal().and_then(|v| v.checked_add(literal_shift)) {
            return value.to_string();
        }
        if let ExprKind::Binary { op, left, right } = &bound.unparen().kind {
            if *op == cancel && right.as_int_literal() == Some(1) {
                return self.expr(left);
            }
        }
        let bound = self.expr(bound);
        format!("{} {} 1", bound, fallback)
    }

    /// General `for`: initializers, then a `while` loop whose updates run
    /// at the end of the body and before every `continue`.
    fn while_for(
        &mut self,
        decl: Option<&LocalDecl>,
        init: &[Expr],
        cond: Option<&Expr>,
        update: &[Expr],
        body: &Stmt,
    ) {
        if let Some(decl) = decl {
            self.local_decl(decl);
        }
        for expr in init {
            let lines = self.expr_statement_lines(expr);
            self.emit_lines(lines);
        }
        let mut tail = Vec::new();
        for expr in update {
            tail.extend(self.expr_statement_lines(expr));
        }
        let Some(cond) = cond else {
            self.emit("while True:");
            self.loop_body(body, Vec::new(), tail);
            return;
        };
        let cond = self.expr(cond);
        if self.pre.is_empty() {
            self.emit(format!("while {}:", cond));
            self.loop_body(body, Vec::new(), tail);
        } else {
            let check = self.exit_check(&cond);
            self.emit("while True:");
            self.loop_body(body, check, tail);
        }
    }

    fn element_type(&self, iterable: &Expr) -> Option<TypeRef> {
        match self.type_of(iterable)? {
            TypeRef::Array(element) => Some(*element),
            TypeRef::Named { args, .. } if args.len() == 1 => args.into_iter().next(),
            TypeRef::Named { name, .. } if name == "string" => Some(TypeRef::named("char")),
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Switch
    // -------------------------------------------------------------------------

    fn switch(&mut self, subject: &Expr, sections: &[SwitchSection], line: u32) {
        let subject = if is_plain(subject) {
            let text = self.expr(subject);
            self.flush_pre();
            text
        } else {
            // Evaluated once, as C# does, before the arms compare against it.
            let depth = self
                .frames
                .iter()
                .filter(|frame| matches!(frame, Frame::Switch))
                .count();
            let temp = match depth {
                0 => "_switch".to_string(),
                n => format!("_switch_{}", n + 1),
            };
            let value = self.expr(subject);
            self.emit(format!("{} = {}", temp, value));
            temp
        };

        let mut arms = Vec::new();
        let mut default = None;
        for section in sections {
            let mut conds = Vec::new();
            let mut is_default = false;
            for label in &section.labels {
                match label {
                    SwitchLabel::Case(value) => {
                        let value = self.expr(value);
                        conds.push(format!("{} == {}", subject, value));
                    }
                    SwitchLabel::Pattern(text) => {
                        self.unsupported(line, format!("pattern case label `{}`", text), "skipped");
                    }
                    SwitchLabel::Default => is_default = true,
                }
            }
            if is_default {
                default = Some(section.body.as_slice());
            } else if !conds.is_empty() {
                arms.push((conds.join(" or "), section.body.as_slice()));
            }
        }

        if arms.is_empty() {
            if let Some(body) = default {
                self.arm(body, false);
            }
            return;
        }
        for (i, (cond, body)) in arms.into_iter().enumerate() {
            let keyword = if i == 0 { "if" } else { "elif" };
            self.emit(format!("{} {}:", keyword, cond));
            self.arm(body, true);
        }
        if let Some(body) = default {
            self.out.line("else:");
            self.arm(body, true);
        }
    }

    /// One switch section. Its closing `break` has no counterpart.
    fn arm(&mut self, body: &[Stmt], indented: bool) {
        let body = match body {
            [single] => single.as_block(),
            _ => body,
        };
        self.frames.push(Frame::Switch);
        if indented {
            self.out.indent();
        }
        let mark = self.out.mark();
        self.push_scope();
        for stmt in body {
            if matches!(stmt.kind, StmtKind::Break) {
                break;
            }
            self.stmt(stmt);
        }
        self.pop_scope();
        if indented {
            if !self.out.has_code_since(mark) {
                self.out.line("pass");
            }
            self.out.dedent();
        }
        self.frames.pop();
    }
}

/// Match `for (i = a; i < b; i += k)` and its variants.
fn counted_loop<'a>(
    decl: Option<&'a LocalDecl>,
    init: &'a [Expr],
    cond: Option<&'a Expr>,
    update: &'a [Expr],
) -> Option<CountedLoop<'a>> {
    let (var, start) = match (decl, init) {
        (Some(decl), []) => match decl.declarators.as_slice() {
            [declarator] => (declarator.name.as_str(), declarator.init.as_ref()?),
            _ => return None,
        },
        (None, [expr]) => match &expr.unparen().kind {
            ExprKind::Assign {
                op: AssignOp::Assign,
                target,
                value,
            } => (target.as_identifier()?, &**value),
            _ => return None,
        },
        _ => return None,
    };

    let ExprKind::Binary { op, left, right } = &cond?.unparen().kind else {
        return None;
    };
    if left.as_identifier() != Some(var) {
        return None;
    }
    let step = match update {
        [update] => step_of(update, var)?,
        _ => return None,
    };
    let agrees = match op {
        BinaryOp::Lt | BinaryOp::Le => step > 0,
        BinaryOp::Gt | BinaryOp::Ge => step < 0,
        BinaryOp::Ne => step != 0,
        _ => false,
    };
    agrees.then_some(CountedLoop {
        var,
        start,
        bound: right,
        op: *op,
        step,
    })
}

/// Names, literals and constant paths such as `Farm.Mode`.
fn is_plain(expr: &Expr) -> bool {
    match &expr.unparen().kind {
        ExprKind::Identifier(_) | ExprKind::Literal(_) | ExprKind::This => true,
        ExprKind::Member { target, .. } => is_plain(target),
        _ => false,
    }
}

/// Constant step of `i++`, `i--`, `i += k` or `i -= k`.
fn step_of(expr: &Expr, var: &str) -> Option<i64> {
    match &expr.unparen().kind {
        ExprKind::Unary { op, operand } if op.is_step() && operand.as_identifier() == Some(var) => {
            Some(if op.is_increment() { 1 } else { -1 })
        }
        ExprKind::Assign { op, target, value } if target.as_identifier() == Some(var) => match op {
            AssignOp::Add => value.as_int_literal(),
            AssignOp::Sub => value.as_int_literal()?.checked_neg(),
            _ => None,
        },
        _ => None,
    }
}

/// Whether the loop body writes the induction variable.
fn mutates(body: &Stmt, var: &str) -> bool {
    Bindings::of(body.as_block())
        .mutated
        .contains(&to_target_name(var))
}
