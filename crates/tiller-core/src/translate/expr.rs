//! Expression translation.

use rhizome_tiller_ast::{
    Argument, AssignOp, BinaryOp, ContainerShape, Designation, Expr, ExprKind, InitElement,
    InterpolationPart, Literal, TypeRef, UnaryOp,
};

use super::Translator;
use crate::diagnostics::Diagnostic;
use crate::mappings::{direction, enum_prefix};

impl Translator<'_> {
    pub(crate) fn expr(&mut self, expr: &Expr) -> String {
        self.expr_with(expr, None)
    }

    /// Translate `expr`. `hint` is the type the surrounding context expects;
    /// target-typed forms (`new()`, `{ ... }`, `default`) resolve against it.
    pub(crate) fn expr_with(&mut self, expr: &Expr, hint: Option<TypeRef>) -> String {
        let line = expr.span.start_line;
        match &expr.kind {
            ExprKind::Literal(literal) => literal_text(literal),
            ExprKind::Identifier(name) => self.identifier(name),
            ExprKind::This => "self".to_string(),
            ExprKind::Binary { op, left, right } => self.binary(*op, left, right, line),
            ExprKind::Unary { op, operand } => self.unary(*op, operand, line),
            ExprKind::Assign { op, target, value } => {
                let (target, lines) = self.assignment(*op, target, value, line);
                self.pre.extend(lines);
                target
            }
            ExprKind::Conditional { .. } => self.placeholder(line, "ternary expression"),
            ExprKind::Cast { ty, value } => {
                let value = self.expr(value);
                if ty.is_string() {
                    format!("str({})", value)
                } else {
                    value
                }
            }
            ExprKind::Paren(inner) => {
                let text = self.expr_with(inner, hint);
                if matches!(inner.kind, ExprKind::Tuple(_)) {
                    text
                } else {
                    format!("({})", text)
                }
            }
            ExprKind::Invoke { callee, args } => self.invocation(callee, args, line),
            ExprKind::Member { target, name } => self.member(target, name),
            ExprKind::ElementAccess { target, index } => {
                let mut text = self.expr(target);
                for arg in index {
                    let index = self.expr(&arg.value);
                    text.push_str(&format!("[{}]", index));
                }
                text
            }
            ExprKind::ObjectCreation { ty, args, init } => {
                self.construct(ty, args, init.as_deref(), line)
            }
            ExprKind::ImplicitObjectCreation { args, init } => match hint {
                Some(ty) => self.construct(&ty, args, init.as_deref(), line),
                None => self.untyped_collection(init.as_deref().unwrap_or_default(), line),
            },
            ExprKind::ArrayCreation { ty, sizes, init } => {
                self.array(ty, sizes, init.as_deref(), line)
            }
            ExprKind::ImplicitArrayCreation(init) => {
                self.collection(ContainerShape::List, &[], Some(init), line)
            }
            ExprKind::Initializer(init) => self.target_typed(init, hint, line),
            ExprKind::Collection(items) => {
                let init: Vec<InitElement> = items.iter().cloned().map(InitElement::Value).collect();
                self.target_typed(&init, hint, line)
            }
            ExprKind::Interpolated(parts) => self.interpolation(parts),
            ExprKind::Tuple(items) => {
                let mut texts = Vec::with_capacity(items.len());
                for item in items {
                    texts.push(self.expr(item));
                }
                tuple_text(&texts)
            }
            ExprKind::Declaration { designation, .. } => self.designation(designation, false),
            ExprKind::Default(ty) => ty
                .as_ref()
                .or(hint.as_ref())
                .map_or("None", TypeRef::default_literal)
                .to_string(),
            ExprKind::TypeOf(ty) => format!("type({})", ty.simple_name().unwrap_or("None")),
            ExprKind::IsNull { operand, negated } => {
                let operand = self.expr(operand);
                let op = if *negated { "!=" } else { "==" };
                format!("{} {} None", operand, op)
            }
            ExprKind::Lambda => self.placeholder(line, "lambda expression"),
            ExprKind::Unknown { kind, text } => {
                let construct = format!("{} `{}`", kind.replace('_', " "), snippet(text));
                self.placeholder(line, &construct)
            }
        }
    }

    fn identifier(&self, name: &str) -> String {
        if !self.is_variable(name) {
            if let Some(canonical) = direction(name) {
                return canonical.to_string();
            }
        }
        self.name(name)
    }

    /// Translate a binary operand, parenthesizing `not` and `in` forms
    /// whose precedence differs from the source operator's.
    fn operand(&mut self, op: BinaryOp, expr: &Expr) -> String {
        let text = self.expr(expr);
        let loose = text.starts_with("not ") || text.contains(" in ");
        if loose && !matches!(op, BinaryOp::And | BinaryOp::Or) {
            format!("({})", text)
        } else {
            text
        }
    }

    /// `Some(true)` for a known string, `Some(false)` for a known non-string.
    fn stringness(&self, expr: &Expr) -> Option<bool> {
        self.type_of(expr).map(|ty| ty.is_string())
    }

    fn binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr, line: u32) -> String {
        if op == BinaryOp::Coalesce {
            return self.placeholder(line, "null-coalescing operator `??`");
        }
        let mut lhs = self.operand(op, left);
        let mut rhs = self.operand(op, right);

        // String concatenation stringifies the other side implicitly in C#.
        if op == BinaryOp::Add {
            match (self.stringness(left), self.stringness(right)) {
                (Some(true), Some(false)) => rhs = format!("str({})", rhs),
                (Some(false), Some(true)) => lhs = format!("str({})", lhs),
                _ => {}
            }
        }

        let symbol = match op {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => {
                if truncates_like_floor(left, right) {
                    "//"
                } else {
                    "/"
                }
            }
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Coalesce => "??",
        };
        if op.is_bitwise() {
            self.unsupported(
                line,
                format!("bitwise operator `{}`", symbol),
                "passed through unchanged",
            );
        }
        format!("{} {} {}", lhs, symbol, rhs)
    }

    fn unary(&mut self, op: UnaryOp, operand: &Expr, line: u32) -> String {
        let text = self.expr(operand);
        match op {
            UnaryOp::Not => format!("not {}", text),
            UnaryOp::Neg => format!("-{}", text),
            UnaryOp::Plus | UnaryOp::NullForgive => text,
            UnaryOp::BitNot => {
                self.unsupported(line, "bitwise operator `~`", "passed through unchanged");
                format!("~{}", text)
            }
            // Steps inside an expression run as a statement before the line
            // that uses them; postfix forms see the value from before.
            UnaryOp::PreInc => {
                self.pre.push(format!("{} += 1", text));
                text
            }
            UnaryOp::PreDec => {
                self.pre.push(format!("{} -= 1", text));
                text
            }
            UnaryOp::PostInc => {
                self.pre.push(format!("{} += 1", text));
                format!("({} - 1)", text)
            }
            UnaryOp::PostDec => {
                self.pre.push(format!("{} -= 1", text));
                format!("({} + 1)", text)
            }
        }
    }

    /// Translate an assignment. Returns the target's text and the
    /// statement lines that perform it.
    pub(crate) fn assignment(
        &mut self,
        op: AssignOp,
        target: &Expr,
        value: &Expr,
        line: u32,
    ) -> (String, Vec<String>) {
        if let ExprKind::Tuple(items) = &target.unparen().kind {
            let mut targets = Vec::with_capacity(items.len());
            for item in items {
                targets.push(self.expr(item));
            }
            let targets = targets.join(", ");
            let value = self.unpacked(value);
            let text = format!("{} = {}", targets, value);
            return (targets, vec![text]);
        }

        let hint = self.type_of(target);
        let target_text = self.expr(target);
        let text = match op {
            AssignOp::Assign => {
                let value = self.expr_with(value, hint);
                format!("{} = {}", target_text, value)
            }
            AssignOp::Coalesce => {
                let value = self.expr_with(value, hint);
                return (
                    target_text.clone(),
                    vec![
                        format!("if {} == None:", target_text),
                        format!("\t{} = {}", target_text, value),
                    ],
                );
            }
            _ => {
                let mut value_text = self.expr(value);
                let target_is_string = hint.as_ref().is_some_and(TypeRef::is_string);
                if op == AssignOp::Add && target_is_string && self.stringness(value) == Some(false) {
                    value_text = format!("str({})", value_text);
                }
                if matches!(
                    op,
                    AssignOp::BitAnd | AssignOp::BitOr | AssignOp::BitXor | AssignOp::Shl | AssignOp::Shr
                ) {
                    self.unsupported(
                        line,
                        format!("bitwise assignment `{}`", op.token()),
                        "passed through unchanged",
                    );
                }
                format!("{} {} {}", target_text, op.token(), value_text)
            }
        };
        (target_text, vec![text])
    }

    /// A tuple literal as bare comma-separated values, anything else as is.
    pub(crate) fn unpacked(&mut self, value: &Expr) -> String {
        match &value.unparen().kind {
            ExprKind::Tuple(items) => {
                let mut texts = Vec::with_capacity(items.len());
                for item in items {
                    texts.push(self.expr(item));
                }
                texts.join(", ")
            }
            _ => self.expr(value),
        }
    }

    fn member(&mut self, target: &Expr, name: &str) -> String {
        match &target.unparen().kind {
            ExprKind::This => return self.name(name),
            ExprKind::Identifier(class) if !self.is_variable(class) => {
                if class == "Direction" {
                    if let Some(canonical) = direction(name) {
                        return canonical.to_string();
                    }
                }
                if let Some(prefix) = enum_prefix(class) {
                    return format!("{}.{}", prefix, name);
                }
                let member = self.name(name);
                if let Some(qualified) = self.ctx.qualify(class, &member) {
                    return qualified;
                }
            }
            _ => {}
        }

        // Instances of project types are flattened into their module.
        if let Some(class) = self.type_of(target).as_ref().and_then(TypeRef::simple_name) {
            let class = class.to_string();
            let member = self.name(name);
            if let Some(qualified) = self.ctx.qualify(&class, &member) {
                return qualified;
            }
        }

        let receiver = self.expr(target);
        if let Some(index) = tuple_item(name) {
            return format!("{}[{}]", receiver, index);
        }
        match name {
            "Length" | "Count" => format!("len({})", receiver),
            "HasValue" => format!("({} != None)", receiver),
            // Nullable unwrap; values are never boxed in the dialect.
            "Value" => receiver,
            _ => format!("{}.{}", receiver, self.name(name)),
        }
    }

    pub(crate) fn arguments(&mut self, args: &[Argument], line: u32) -> Vec<String> {
        let mut texts = Vec::with_capacity(args.len());
        for arg in args {
            if let Some(modifier @ ("out" | "ref")) = arg.modifier.as_deref() {
                self.unsupported(line, format!("`{}` argument", modifier), "passed by value");
            }
            texts.push(self.expr(&arg.value));
        }
        texts
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    pub(crate) fn construct(
        &mut self,
        ty: &TypeRef,
        args: &[Argument],
        init: Option<&[InitElement]>,
        line: u32,
    ) -> String {
        if let Some(shape) = ty.shape() {
            return self.collection(shape, args, init, line);
        }
        if ty.is_tuple() {
            let items = self.arguments(args, line);
            return tuple_text(&items);
        }
        match ty.simple_name() {
            Some("Random") => {
                self.unsupported(line, "`Random` instance", "replaced with None; use random()");
                "None".to_string()
            }
            Some(name) => {
                let name = name.to_string();
                let args = self.arguments(args, line).join(", ");
                if init.is_some() {
                    self.unsupported(line, format!("object initializer for `{}`", name), "dropped");
                }
                self.unsupported(
                    line,
                    format!("instance of user type `{}`", name),
                    "passed through as a call",
                );
                format!("{}({})", name, args)
            }
            None => self.placeholder(line, "object creation"),
        }
    }

    /// `{ ... }`, `[ ... ]` and `new()` without an explicit type.
    fn target_typed(&mut self, init: &[InitElement], hint: Option<TypeRef>, line: u32) -> String {
        match hint {
            Some(ty) if !ty.is_var() => self.construct(&ty, &[], Some(init), line),
            _ => self.untyped_collection(init, line),
        }
    }

    fn untyped_collection(&mut self, init: &[InitElement], line: u32) -> String {
        if init.is_empty() {
            self.diagnose(Diagnostic::ambiguous(
                line,
                "empty collection literal of unknown type",
                "defaulted to a list",
            ));
            return "[]".to_string();
        }
        let shape = if init.iter().all(|e| matches!(e, InitElement::Pair { .. })) {
            ContainerShape::Map
        } else {
            ContainerShape::List
        };
        self.collection(shape, &[], Some(init), line)
    }

    fn collection(
        &mut self,
        shape: ContainerShape,
        args: &[Argument],
        init: Option<&[InitElement]>,
        line: u32,
    ) -> String {
        if let Some(init) = init.filter(|init| !init.is_empty()) {
            return match shape {
                ContainerShape::List => format!("[{}]", self.elements(init).join(", ")),
                ContainerShape::Set => format!("{{{}}}", self.elements(init).join(", ")),
                ContainerShape::Map => {
                    let mut entries = Vec::with_capacity(init.len());
                    for element in init {
                        match element {
                            InitElement::Pair { key, value } => {
                                let key = self.expr(key);
                                let value = self.expr(value);
                                entries.push(format!("{}: {}", key, value));
                            }
                            InitElement::Value(_) => {
                                self.unsupported(line, "dictionary entry without a key", "dropped")
                            }
                        }
                    }
                    format!("{{{}}}", entries.join(", "))
                }
            };
        }
        match args {
            [] => empty_literal(shape).to_string(),
            [arg] if self.is_capacity(&arg.value) => empty_literal(shape).to_string(),
            [arg] => {
                let source = self.expr(&arg.value);
                let convert = match shape {
                    ContainerShape::List => "list",
                    ContainerShape::Map => "dict",
                    ContainerShape::Set => "set",
                };
                format!("{}({})", convert, source)
            }
            _ => {
                self.unsupported(line, "collection constructor arguments", "dropped");
                empty_literal(shape).to_string()
            }
        }
    }

    /// A single integer argument to a collection constructor is a capacity.
    fn is_capacity(&self, expr: &Expr) -> bool {
        expr.as_int_literal().is_some()
            || self
                .type_of(expr)
                .is_some_and(|ty| matches!(ty.simple_name(), Some("int" | "long")))
    }

    fn elements(&mut self, init: &[InitElement]) -> Vec<String> {
        let mut texts = Vec::with_capacity(init.len());
        for element in init {
            texts.push(match element {
                InitElement::Value(value) => self.expr(value),
                InitElement::Pair { key, value } => {
                    let key = self.expr(key);
                    let value = self.expr(value);
                    format!("({}, {})", key, value)
                }
            });
        }
        texts
    }

    fn array(
        &mut self,
        element: &TypeRef,
        sizes: &[Expr],
        init: Option<&[InitElement]>,
        line: u32,
    ) -> String {
        if let Some(init) = init {
            return format!("[{}]", self.elements(init).join(", "));
        }
        match sizes {
            [] => "[]".to_string(),
            [size] => {
                let size = self.expr(size);
                format!("[{}] * {}", element.default_literal(), wrap(&size))
            }
            [size, ..] => {
                self.unsupported(line, "multi-dimensional array", "only the first dimension kept");
                let size = self.expr(size);
                format!("[None] * {}", wrap(&size))
            }
        }
    }

    fn interpolation(&mut self, parts: &[InterpolationPart]) -> String {
        let mut pieces = Vec::new();
        for part in parts {
            match part {
                InterpolationPart::Text(text) if text.is_empty() => {}
                InterpolationPart::Text(text) => pieces.push(quote(text)),
                InterpolationPart::Hole(expr) => {
                    let value = self.expr(expr);
                    pieces.push(format!("str({})", value));
                }
                InterpolationPart::Formatted { value, clause } => {
                    self.unsupported(
                        value.span.start_line,
                        format!("interpolation format `{}`", clause),
                        "formatting dropped",
                    );
                    let value = self.expr(value);
                    pieces.push(format!("str({})", value));
                }
            }
        }
        if pieces.is_empty() {
            "\"\"".to_string()
        } else {
            pieces.join(" + ")
        }
    }

    /// `a, (b, c)` at the top level; nested tuples keep their parentheses.
    pub(crate) fn designation(&self, designation: &Designation, top: bool) -> String {
        match designation {
            Designation::Single(name) => self.name(name),
            Designation::Discard => "_".to_string(),
            Designation::Tuple(items) => {
                let inner: Vec<String> = items.iter().map(|d| self.designation(d, false)).collect();
                if top {
                    inner.join(", ")
                } else {
                    format!("({})", inner.join(", "))
                }
            }
        }
    }
}

fn literal_text(literal: &Literal) -> String {
    match literal {
        Literal::Null => "None".to_string(),
        Literal::Bool(true) => "True".to_string(),
        Literal::Bool(false) => "False".to_string(),
        Literal::Integer(text) => text.trim_end_matches(['u', 'U', 'l', 'L']).to_string(),
        Literal::Real(text) => {
            let digits = text.trim_end_matches(['f', 'F', 'd', 'D', 'm', 'M']);
            if digits.contains(['.', 'e', 'E']) {
                digits.to_string()
            } else {
                format!("{}.0", digits)
            }
        }
        Literal::Str(value) => quote(value),
        Literal::Char(c) => quote(&c.to_string()),
    }
}

/// Double-quoted dialect string literal.
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub(crate) fn tuple_text(items: &[String]) -> String {
    match items {
        [single] => format!("({},)", single),
        _ => format!("({})", items.join(", ")),
    }
}

fn empty_literal(shape: ContainerShape) -> &'static str {
    match shape {
        ContainerShape::List => "[]",
        ContainerShape::Map => "{}",
        ContainerShape::Set => "set()",
    }
}

/// Integer literals whose truncated quotient equals the floored one. Floor
/// and truncation disagree when exactly one side is negative.
fn truncates_like_floor(left: &Expr, right: &Expr) -> bool {
    match (left.as_int_literal(), right.as_int_literal()) {
        (Some(a), Some(b)) => a.signum() * b.signum() >= 0 || a.checked_rem(b) == Some(0),
        _ => false,
    }
}

/// `Item1` -> 0
fn tuple_item(name: &str) -> Option<usize> {
    let index: usize = name.strip_prefix("Item")?.parse().ok()?;
    index.checked_sub(1)
}

/// Parenthesize anything that is not a single token.
pub(crate) fn wrap(text: &str) -> String {
    if text.contains(' ') {
        format!("({})", text)
    } else {
        text.to_string()
    }
}

/// First line of a source fragment, shortened for a comment.
pub(crate) fn snippet(text: &str) -> String {
    let line = text.lines().next().unwrap_or("").trim();
    if line.chars().count() > 40 {
        let cut: String = line.chars().take(40).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}
