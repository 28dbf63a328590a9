//! Call translation.

use rhizome_tiller_ast::{Argument, ContainerShape, Expr, ExprKind, TypeRef};

use super::Translator;
use super::expr::{quote, tuple_text};
use crate::diagnostics::Diagnostic;
use crate::mappings::{API_CLASS, builtin, host_function, is_bulk_query};

/// Whole number in `[low, high)`, the contract of `Random.Next`. The dialect
/// has one number type and indexes with whole values, so `// 1` suffices.
const RANDOM_INT: &str = "def _random_int(low, high):\n\treturn low + (high - low) * random() // 1";

impl Translator<'_> {
    pub(crate) fn invocation(&mut self, callee: &Expr, args: &[Argument], line: u32) -> String {
        match &callee.unparen().kind {
            ExprKind::Identifier(name) => self.call(name, args, line),
            ExprKind::Member { target, name } => self.method_call(target, name, args, line),
            _ => {
                let callee = self.expr(callee);
                let args = self.arguments(args, line).join(", ");
                self.unsupported(line, "call through an expression", "passed through unchanged");
                format!("{}({})", callee, args)
            }
        }
    }

    /// Call to a bare name: a function of this module or a game builtin.
    fn call(&mut self, name: &str, args: &[Argument], line: u32) -> String {
        if name == "nameof" {
            if let Some(segment) = args.first().and_then(|arg| last_segment(&arg.value)) {
                return quote(segment);
            }
        }

        let callee = if self.is_function(name) && !self.is_variable(name) {
            self.name(name)
        } else if let Some(builtin) = builtin(name) {
            builtin.to_string()
        } else {
            let construct = if self.is_variable(name) {
                format!("call through delegate `{}`", name)
            } else {
                format!("call to unknown function `{}`", name)
            };
            self.unsupported(line, construct, "passed through as a normalized call");
            self.name(name)
        };
        let args = self.arguments(args, line).join(", ");
        format!("{}({})", callee, args)
    }

    fn method_call(&mut self, target: &Expr, name: &str, args: &[Argument], line: u32) -> String {
        let receiver = target.unparen();
        match &receiver.kind {
            ExprKind::Identifier(class) if !self.is_variable(class) => {
                if let Some(text) = self.static_call(class, name, args, line) {
                    return text;
                }
            }
            ExprKind::This => {
                let callee = self.name(name);
                let args = self.arguments(args, line).join(", ");
                return format!("{}({})", callee, args);
            }
            ExprKind::ObjectCreation { ty, .. } => {
                if let Some(class) = ty.simple_name() {
                    let member = self.name(name);
                    if let Some(callee) = self.ctx.qualify(class, &member) {
                        let args = self.arguments(args, line).join(", ");
                        return format!("{}({})", callee, args);
                    }
                }
            }
            _ => {}
        }

        // Instance methods of project types are flattened into their module.
        let receiver_type = self.type_of(receiver);
        if let Some(class) = receiver_type.as_ref().and_then(TypeRef::simple_name) {
            let member = self.name(name);
            if let Some(callee) = self.ctx.qualify(class, &member) {
                let args = self.arguments(args, line).join(", ");
                return format!("{}({})", callee, args);
            }
        }
        self.value_call(receiver, receiver_type, name, args, line)
    }

    /// `Class.Method(..)` where `Class` names a type rather than a value.
    fn static_call(
        &mut self,
        class: &str,
        name: &str,
        args: &[Argument],
        line: u32,
    ) -> Option<String> {
        if class == API_CLASS {
            let callee = match builtin(name) {
                Some(builtin) => builtin.to_string(),
                None => {
                    self.unsupported(
                        line,
                        format!("unknown API method `{}.{}`", class, name),
                        "passed through as a normalized call",
                    );
                    self.name(name)
                }
            };
            let args = self.arguments(args, line).join(", ");
            return Some(format!("{}({})", callee, args));
        }

        match (class, name) {
            ("Console", "WriteLine" | "Write") => {
                let args = self.arguments(args, line).join(", ");
                Some(format!("quick_print({})", args))
            }
            ("Tuple" | "ValueTuple", "Create") => {
                let items = self.arguments(args, line);
                Some(tuple_text(&items))
            }
            ("Math", _) => {
                let callee = match host_function(class, name) {
                    Some(function) => function.to_string(),
                    None => {
                        self.unsupported(
                            line,
                            format!("`Math.{}`", name),
                            "passed through as a normalized call",
                        );
                        self.name(name)
                    }
                };
                let args = self.arguments(args, line).join(", ");
                Some(format!("{}({})", callee, args))
            }
            _ => {
                let member = self.name(name);
                let callee = self.ctx.qualify(class, &member)?;
                let args = self.arguments(args, line).join(", ");
                Some(format!("{}({})", callee, args))
            }
        }
    }

    /// Method call on a value: container operations and a few conversions.
    fn value_call(
        &mut self,
        target: &Expr,
        receiver_type: Option<TypeRef>,
        name: &str,
        args: &[Argument],
        line: u32,
    ) -> String {
        let shape = receiver_type.as_ref().and_then(TypeRef::shape);
        let type_name = receiver_type.as_ref().and_then(TypeRef::simple_name);
        let receiver = self.expr(target);
        let args = self.arguments(args, line);

        match (name, args.as_slice()) {
            ("ToString", _) => format!("str({})", receiver),
            ("Count", []) => format!("len({})", receiver),
            ("Equals", [other]) => format!("({} == {})", receiver, other),
            ("Add", [key, value]) => format!("{}[{}] = {}", receiver, key, value),
            ("Add", [item]) if shape == Some(ContainerShape::Set) => {
                format!("{}.add({})", receiver, item)
            }
            ("Add" | "Push" | "Enqueue", [item]) => format!("{}.append({})", receiver, item),
            ("Remove", [item]) if shape == Some(ContainerShape::Map) => {
                format!("{}.pop({})", receiver, item)
            }
            ("Remove", [item]) => format!("{}.remove({})", receiver, item),
            ("RemoveAt", [index]) => format!("{}.pop({})", receiver, index),
            ("Insert", [index, item]) => format!("{}.insert({}, {})", receiver, index, item),
            ("Clear", []) => {
                let empty = match shape {
                    Some(ContainerShape::Map) => "{}",
                    Some(ContainerShape::Set) => "set()",
                    Some(ContainerShape::List) => "[]",
                    None => {
                        self.diagnose(Diagnostic::ambiguous(
                            line,
                            format!("`Clear` on `{}` of unknown type", receiver),
                            "reset to an empty list",
                        ));
                        "[]"
                    }
                };
                format!("{} = {}", receiver, empty)
            }
            ("Contains" | "ContainsKey", [item]) => format!("{} in {}", item, receiver),
            ("Pop", []) => format!("{}.pop()", receiver),
            ("Dequeue", []) => format!("{}.pop(0)", receiver),
            ("Peek", []) if type_name == Some("Queue") => format!("{}[0]", receiver),
            ("Peek", []) => format!("{}[-1]", receiver),
            ("Next" | "NextDouble", []) if matches!(type_name, None | Some("Random")) => {
                "random()".to_string()
            }
            ("Next", [high]) if matches!(type_name, None | Some("Random")) => {
                self.out.helper(RANDOM_INT);
                format!("_random_int(0, {})", high)
            }
            ("Next", [low, high]) if matches!(type_name, None | Some("Random")) => {
                self.out.helper(RANDOM_INT);
                format!("_random_int({}, {})", low, high)
            }
            _ => {
                let construct = if is_bulk_query(name) {
                    format!("bulk query `{}`", name)
                } else {
                    format!("method `{}`", name)
                };
                self.unsupported(line, construct, "passed through as a normalized method call");
                format!("{}.{}({})", receiver, self.name(name), args.join(", "))
            }
        }
    }
}

/// `Foo` for `nameof(Foo)` and `nameof(a.Foo)`.
fn last_segment(expr: &Expr) -> Option<&str> {
    match &expr.unparen().kind {
        ExprKind::Identifier(name) => Some(name),
        ExprKind::Member { name, .. } => Some(name),
        _ => None,
    }
}
