//! Lowers the tree-sitter C# CST into the Tiller AST.

use rhizome_tiller_ast::{
    Argument, AssignOp, BinaryOp, ClassDecl, CompilationUnit, DeclKind, Designation, Expr,
    ExprKind, FieldDecl, ForeachBinding, InitElement, InterpolationPart, Item, ItemKind, Literal,
    LocalDecl, Member, MemberKind, MethodBody, MethodDecl, Param, Span, Stmt, StmtKind,
    SwitchLabel, SwitchSection, TupleElement, TypeRef, UnaryOp, VarDeclarator,
};
use thiserror::Error;
use tree_sitter::{Node, Parser};

/// Errors that prevent a source file from being lowered at all.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to load C# grammar: {0}")]
    Language(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
    #[error("malformed syntax tree: {0}")]
    Malformed(String),
}

/// Parse C# source into a [`CompilationUnit`].
///
/// Any error or missing node in the tree rejects the whole file; the
/// position reported is that of the first one in document order.
pub fn parse(source: &str) -> Result<CompilationUnit, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
        .map_err(|e| ParseError::Language(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::Parse("parser returned no tree".to_string()))?;
    let root = tree.root_node();

    if root.has_error() {
        let node = first_error(root).unwrap_or(root);
        let position = node.start_position();
        return Err(ParseError::Syntax {
            line: position.row + 1,
            column: position.column + 1,
        });
    }

    Lowering { source }.unit(root)
}

/// Names of every class and struct the unit declares, nested ones included.
pub fn declarations(unit: &CompilationUnit) -> Vec<String> {
    unit.declared_types()
}

fn first_error<'t>(node: Node<'t>) -> Option<Node<'t>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}

fn span(node: Node) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span::new(
        start.row as u32 + 1,
        start.column as u32 + 1,
        end.row as u32 + 1,
        end.column as u32 + 1,
    )
}

/// Named children without comments and preprocessor lines.
fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

fn first_named(node: Node) -> Result<Node, ParseError> {
    named_children(node)
        .into_iter()
        .next()
        .ok_or_else(|| ParseError::Malformed(format!("empty {}", node.kind())))
}

fn field<'t>(node: Node<'t>, name: &str) -> Result<Node<'t>, ParseError> {
    node.child_by_field_name(name)
        .ok_or_else(|| ParseError::Malformed(format!("{} without {}", node.kind(), name)))
}

fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Result<Node<'t>, ParseError> {
    named_children(node)
        .into_iter()
        .find(|child| child.kind() == kind)
        .ok_or_else(|| ParseError::Malformed(format!("{} without {}", node.kind(), kind)))
}

fn is_statement(kind: &str) -> bool {
    kind == "block" || kind.ends_with("_statement")
}

/// Declarations that are recognized but have no translation.
fn ignored_kind(kind: &str) -> Option<DeclKind> {
    Some(match kind {
        "enum_declaration" => DeclKind::Enum,
        "interface_declaration" => DeclKind::Interface,
        "record_declaration" => DeclKind::Record,
        "delegate_declaration" => DeclKind::Delegate,
        "property_declaration" => DeclKind::Property,
        "event_declaration" | "event_field_declaration" => DeclKind::Event,
        "indexer_declaration" => DeclKind::Indexer,
        "operator_declaration" => DeclKind::Operator,
        "conversion_operator_declaration" => DeclKind::Conversion,
        "destructor_declaration" => DeclKind::Destructor,
        _ => return None,
    })
}

struct Lowering<'a> {
    source: &'a str,
}

impl<'a> Lowering<'a> {
    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn unit(&self, root: Node) -> Result<CompilationUnit, ParseError> {
        Ok(CompilationUnit {
            items: self.items(root)?,
        })
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn items(&self, parent: Node) -> Result<Vec<Item>, ParseError> {
        let mut items = Vec::new();
        for node in named_children(parent) {
            let kind = match node.kind() {
                // File-scoped namespaces leave their declarations as siblings.
                "using_directive"
                | "extern_alias_directive"
                | "global_attribute"
                | "shebang_directive"
                | "attribute_list"
                | "file_scoped_namespace_declaration" => continue,
                "namespace_declaration" => ItemKind::Namespace {
                    name: self.text(field(node, "name")?).to_string(),
                    items: self.items(field(node, "body")?)?,
                },
                "class_declaration" | "struct_declaration" => ItemKind::Class(self.class(node)?),
                "global_statement" => ItemKind::GlobalStatement(self.stmt(first_named(node)?)?),
                kind => match ignored_kind(kind) {
                    Some(decl) => ItemKind::Ignored {
                        kind: decl,
                        name: self.decl_name(node),
                    },
                    None => ItemKind::GlobalStatement(self.unknown_stmt(node)),
                },
            };
            items.push(Item {
                kind,
                span: span(node),
            });
        }
        Ok(items)
    }

    fn decl_name(&self, node: Node) -> String {
        if let Some(name) = node.child_by_field_name("name") {
            return self.text(name).to_string();
        }
        match node.kind() {
            "indexer_declaration" => "this".to_string(),
            "operator_declaration" => node
                .child_by_field_name("operator")
                .map(|op| format!("operator {}", self.text(op)))
                .unwrap_or_default(),
            "conversion_operator_declaration" => node
                .child_by_field_name("type")
                .map(|ty| format!("operator {}", self.text(ty)))
                .unwrap_or_default(),
            "event_field_declaration" => child_of_kind(node, "variable_declaration")
                .ok()
                .and_then(|decl| child_of_kind(decl, "variable_declarator").ok())
                .and_then(|declarator| declarator.child_by_field_name("name"))
                .map(|name| self.text(name).to_string())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn modifiers(&self, node: Node) -> Vec<String> {
        named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "modifier")
            .map(|child| self.text(child).to_string())
            .collect()
    }

    fn class(&self, node: Node) -> Result<ClassDecl, ParseError> {
        let mut members = Vec::new();
        for child in named_children(field(node, "body")?) {
            let kind = match child.kind() {
                "field_declaration" => {
                    let decl = self.variable_declaration(child_of_kind(child, "variable_declaration")?)?;
                    MemberKind::Field(FieldDecl {
                        ty: decl.ty,
                        modifiers: self.modifiers(child),
                        declarators: decl.declarators,
                    })
                }
                "method_declaration" => MemberKind::Method(self.method(child, "returns")?),
                "constructor_declaration" => MemberKind::Constructor {
                    params: self.params(field(child, "parameters")?)?,
                    body: self.body(child)?,
                },
                "class_declaration" | "struct_declaration" => {
                    MemberKind::NestedClass(self.class(child)?)
                }
                kind => match ignored_kind(kind) {
                    Some(decl) => MemberKind::Unsupported {
                        kind: decl,
                        name: self.decl_name(child),
                    },
                    None => continue,
                },
            };
            members.push(Member {
                kind,
                span: span(child),
            });
        }

        Ok(ClassDecl {
            name: self.text(field(node, "name")?).to_string(),
            modifiers: self.modifiers(node),
            members,
            is_struct: node.kind() == "struct_declaration",
        })
    }

    /// Methods and local functions; they differ only in the return type field.
    fn method(&self, node: Node, return_field: &str) -> Result<MethodDecl, ParseError> {
        Ok(MethodDecl {
            name: self.text(field(node, "name")?).to_string(),
            modifiers: self.modifiers(node),
            return_type: self.type_ref(field(node, return_field)?),
            params: self.params(field(node, "parameters")?)?,
            body: self.body(node)?,
        })
    }

    fn body(&self, node: Node) -> Result<MethodBody, ParseError> {
        match node.child_by_field_name("body") {
            None => Ok(MethodBody::None),
            Some(block) if block.kind() == "block" => Ok(MethodBody::Block(self.block(block)?)),
            Some(arrow) => Ok(MethodBody::Expression(self.expr(first_named(arrow)?)?)),
        }
    }

    fn params(&self, list: Node) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();
        for param in named_children(list) {
            if param.kind() != "parameter" {
                continue;
            }
            let name = field(param, "name")?;
            let ty = param.child_by_field_name("type");
            let default = named_children(param).into_iter().find(|child| {
                !matches!(child.kind(), "attribute_list" | "modifier")
                    && child.id() != name.id()
                    && Some(child.id()) != ty.map(|ty| ty.id())
            });
            params.push(Param {
                name: self.text(name).to_string(),
                ty: ty.map_or(TypeRef::Var, |ty| self.type_ref(ty)),
                default: default.map(|d| self.expr(d)).transpose()?,
            });
        }
        Ok(params)
    }

    fn variable_declaration(&self, node: Node) -> Result<LocalDecl, ParseError> {
        let mut declarators = Vec::new();
        for declarator in named_children(node) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            declarators.push(VarDeclarator {
                name: declarator
                    .child_by_field_name("name")
                    .map(|name| self.text(name).to_string())
                    .unwrap_or_default(),
                init: self.declarator_init(declarator)?,
            });
        }
        Ok(LocalDecl {
            ty: self.type_ref(field(node, "type")?),
            declarators,
        })
    }

    fn declarator_init(&self, declarator: Node) -> Result<Option<Expr>, ParseError> {
        let name = declarator.child_by_field_name("name").map(|n| n.id());
        named_children(declarator)
            .into_iter()
            .find(|child| {
                Some(child.id()) != name
                    && !matches!(child.kind(), "tuple_pattern" | "bracketed_argument_list")
            })
            .map(|init| self.expr(init))
            .transpose()
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn type_ref(&self, node: Node) -> TypeRef {
        match node.kind() {
            "implicit_type" => TypeRef::Var,
            "predefined_type" => match self.text(node) {
                "void" => TypeRef::Void,
                name => TypeRef::named(name),
            },
            "identifier" => match self.text(node) {
                "var" => TypeRef::Var,
                name => TypeRef::named(name),
            },
            "generic_name" => {
                let children = named_children(node);
                let name = children
                    .iter()
                    .find(|child| child.kind() == "identifier")
                    .map_or("", |child| self.text(*child));
                let args = children
                    .iter()
                    .find(|child| child.kind() == "type_argument_list")
                    .map(|list| {
                        named_children(*list)
                            .into_iter()
                            .map(|arg| self.type_ref(arg))
                            .collect()
                    })
                    .unwrap_or_default();
                TypeRef::generic(name, args)
            }
            "qualified_name" => {
                match (
                    node.child_by_field_name("qualifier"),
                    node.child_by_field_name("name"),
                ) {
                    (Some(qualifier), Some(name)) => match self.type_ref(name) {
                        TypeRef::Named { name, args } => TypeRef::Named {
                            name: format!("{}.{}", self.text(qualifier), name),
                            args,
                        },
                        other => other,
                    },
                    _ => TypeRef::named(self.text(node)),
                }
            }
            "nullable_type" => match node.child_by_field_name("type") {
                Some(inner) => TypeRef::Nullable(Box::new(self.type_ref(inner))),
                None => TypeRef::named(self.text(node)),
            },
            "array_type" => match node.child_by_field_name("type") {
                Some(inner) => TypeRef::Array(Box::new(self.type_ref(inner))),
                None => TypeRef::named(self.text(node)),
            },
            "tuple_type" => TypeRef::Tuple(
                named_children(node)
                    .into_iter()
                    .filter(|child| child.kind() == "tuple_element")
                    .map(|element| TupleElement {
                        ty: element
                            .child_by_field_name("type")
                            .map_or(TypeRef::Var, |ty| self.type_ref(ty)),
                        name: element
                            .child_by_field_name("name")
                            .map(|name| self.text(name).to_string()),
                    })
                    .collect(),
            ),
            _ => TypeRef::named(self.text(node)),
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn block(&self, node: Node) -> Result<Vec<Stmt>, ParseError> {
        named_children(node)
            .into_iter()
            .map(|child| self.stmt(child))
            .collect()
    }

    fn boxed(&self, node: Node) -> Result<Box<Stmt>, ParseError> {
        self.stmt(node).map(Box::new)
    }

    fn optional_expr(&self, node: Node) -> Result<Option<Expr>, ParseError> {
        named_children(node)
            .into_iter()
            .next()
            .map(|child| self.expr(child))
            .transpose()
    }

    fn unknown_stmt(&self, node: Node) -> Stmt {
        Stmt::new(
            StmtKind::Unknown {
                kind: node.kind().to_string(),
                text: self.text(node).to_string(),
            },
            span(node),
        )
    }

    fn stmt(&self, node: Node) -> Result<Stmt, ParseError> {
        let kind = match node.kind() {
            "block" => StmtKind::Block(self.block(node)?),
            "expression_statement" => StmtKind::Expr(self.expr(first_named(node)?)?),
            "local_declaration_statement" => {
                self.local_declaration(child_of_kind(node, "variable_declaration")?)?
            }
            "return_statement" => StmtKind::Return(self.optional_expr(node)?),
            "if_statement" => StmtKind::If {
                cond: self.expr(field(node, "condition")?)?,
                then: self.boxed(field(node, "consequence")?)?,
                otherwise: node
                    .child_by_field_name("alternative")
                    .map(|alt| self.boxed(alt))
                    .transpose()?,
            },
            "while_statement" => StmtKind::While {
                cond: self.expr(field(node, "condition")?)?,
                body: self.boxed(field(node, "body")?)?,
            },
            "do_statement" => StmtKind::DoWhile {
                body: self.boxed(field(node, "body")?)?,
                cond: self.expr(field(node, "condition")?)?,
            },
            "for_statement" => self.for_stmt(node)?,
            "foreach_statement" => self.foreach(node)?,
            "switch_statement" => self.switch(node)?,
            "break_statement" => StmtKind::Break,
            "continue_statement" => StmtKind::Continue,
            "empty_statement" => StmtKind::Empty,
            "local_function_statement" => StmtKind::LocalFunction(self.method(node, "type")?),
            "try_statement" => {
                let children = named_children(node);
                let catches = children
                    .iter()
                    .filter(|child| child.kind() == "catch_clause")
                    .map(|clause| self.stmt(field(*clause, "body")?))
                    .collect::<Result<Vec<_>, _>>()?;
                let finally = children
                    .iter()
                    .find(|child| child.kind() == "finally_clause")
                    .map(|clause| first_named(*clause).and_then(|block| self.boxed(block)))
                    .transpose()?;
                StmtKind::Try {
                    body: self.boxed(field(node, "body")?)?,
                    catches,
                    finally,
                }
            }
            "throw_statement" => StmtKind::Throw(self.optional_expr(node)?),
            "yield_statement" => StmtKind::Yield(self.optional_expr(node)?),
            "using_statement" => StmtKind::Using {
                body: self.boxed(field(node, "body")?)?,
            },
            "lock_statement" => {
                let body = named_children(node)
                    .into_iter()
                    .rfind(|child| is_statement(child.kind()))
                    .ok_or_else(|| ParseError::Malformed("lock without body".to_string()))?;
                StmtKind::Lock {
                    body: self.boxed(body)?,
                }
            }
            "goto_statement" => StmtKind::Goto(
                self.text(node)
                    .trim_start_matches("goto")
                    .trim_end_matches(';')
                    .trim()
                    .to_string(),
            ),
            "labeled_statement" => match named_children(node).as_slice() {
                [label, body] => StmtKind::Labeled {
                    label: self.text(*label).to_string(),
                    body: self.boxed(*body)?,
                },
                _ => return Ok(self.unknown_stmt(node)),
            },
            "checked_statement" => StmtKind::Checked(self.boxed(first_named(node)?)?),
            _ => return Ok(self.unknown_stmt(node)),
        };
        Ok(Stmt::new(kind, span(node)))
    }

    fn local_declaration(&self, decl: Node) -> Result<StmtKind, ParseError> {
        let deconstruction = named_children(decl)
            .into_iter()
            .filter(|child| child.kind() == "variable_declarator")
            .find_map(|declarator| {
                let pattern = named_children(declarator)
                    .into_iter()
                    .find(|child| child.kind() == "tuple_pattern")?;
                Some((declarator, pattern))
            });

        if let Some((declarator, pattern)) = deconstruction {
            let value = self.declarator_init(declarator)?.ok_or_else(|| {
                ParseError::Malformed("deconstruction without a value".to_string())
            })?;
            return Ok(StmtKind::Deconstruct {
                pattern: self.designation(pattern),
                value,
            });
        }
        Ok(StmtKind::LocalDecl(self.variable_declaration(decl)?))
    }

    fn for_stmt(&self, node: Node) -> Result<StmtKind, ParseError> {
        let mut cursor = node.walk();
        let initializers: Vec<Node> = node
            .children_by_field_name("initializer", &mut cursor)
            .filter(|child| child.is_named() && !child.is_extra())
            .collect();
        let updates: Vec<Node> = node
            .children_by_field_name("update", &mut cursor)
            .filter(|child| child.is_named() && !child.is_extra())
            .collect();

        let mut decl = None;
        let mut init = Vec::new();
        for initializer in initializers {
            if initializer.kind() == "variable_declaration" {
                decl = Some(self.variable_declaration(initializer)?);
            } else {
                init.push(self.expr(initializer)?);
            }
        }

        Ok(StmtKind::For {
            decl,
            init,
            cond: node
                .child_by_field_name("condition")
                .map(|cond| self.expr(cond))
                .transpose()?,
            update: updates
                .into_iter()
                .map(|update| self.expr(update))
                .collect::<Result<_, _>>()?,
            body: self.boxed(field(node, "body")?)?,
        })
    }

    fn foreach(&self, node: Node) -> Result<StmtKind, ParseError> {
        let left = field(node, "left")?;
        let binding = match (node.child_by_field_name("type"), left.kind()) {
            (_, "tuple_pattern") => ForeachBinding::Deconstruct(self.designation(left)),
            (Some(ty), _) => ForeachBinding::Single {
                ty: self.type_ref(ty),
                name: self.text(left).to_string(),
            },
            (None, "tuple_expression") => ForeachBinding::Deconstruct(self.expr_designation(left)),
            (None, "declaration_expression") => ForeachBinding::Single {
                ty: self.type_ref(field(left, "type")?),
                name: self.text(field(left, "name")?).to_string(),
            },
            (None, _) => ForeachBinding::Single {
                ty: TypeRef::Var,
                name: self.text(left).to_string(),
            },
        };
        Ok(StmtKind::Foreach {
            binding,
            iterable: self.expr(field(node, "right")?)?,
            body: self.boxed(field(node, "body")?)?,
        })
    }

    fn switch(&self, node: Node) -> Result<StmtKind, ParseError> {
        let subject = self.expr(field(node, "value")?)?;
        let mut sections = Vec::new();

        for section in named_children(field(node, "body")?) {
            if section.kind() != "switch_section" {
                continue;
            }
            let mut labels = Vec::new();
            let mut body = Vec::new();
            let mut last_label: Option<Node> = None;

            let mut cursor = section.walk();
            for child in section.children(&mut cursor) {
                if child.is_extra() {
                    continue;
                }
                match child.kind() {
                    "default" if !child.is_named() => labels.push(SwitchLabel::Default),
                    "when_clause" => {
                        // A guarded label is no longer a plain constant.
                        if let Some(label) = last_label {
                            labels.pop();
                            let text = &self.source[label.start_byte()..child.end_byte()];
                            labels.push(SwitchLabel::Pattern(text.to_string()));
                        }
                    }
                    _ if !child.is_named() => {}
                    kind if is_statement(kind) => body.push(self.stmt(child)?),
                    kind => {
                        labels.push(self.switch_label(child, kind)?);
                        last_label = Some(child);
                    }
                }
            }
            sections.push(SwitchSection { labels, body });
        }

        Ok(StmtKind::Switch { subject, sections })
    }

    fn switch_label(&self, node: Node, kind: &str) -> Result<SwitchLabel, ParseError> {
        Ok(match kind {
            "constant_pattern" => SwitchLabel::Case(self.expr(first_named(node)?)?),
            // `case Direction.North:` can parse as a type pattern.
            "type_pattern" => {
                let ty = field(node, "type")?;
                match ty.kind() {
                    "identifier" | "qualified_name" => SwitchLabel::Case(self.expr(ty)?),
                    _ => SwitchLabel::Pattern(self.text(node).to_string()),
                }
            }
            kind if kind.ends_with("_pattern") || kind == "discard" => {
                SwitchLabel::Pattern(self.text(node).to_string())
            }
            _ => SwitchLabel::Case(self.expr(node)?),
        })
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn boxed_expr(&self, node: Node) -> Result<Box<Expr>, ParseError> {
        self.expr(node).map(Box::new)
    }

    fn unknown(&self, node: Node) -> ExprKind {
        ExprKind::Unknown {
            kind: node.kind().to_string(),
            text: self.text(node).to_string(),
        }
    }

    fn simple_name(&self, node: Node) -> String {
        match node.kind() {
            "generic_name" => child_of_kind(node, "identifier")
                .map(|ident| self.text(ident))
                .unwrap_or_else(|_| self.text(node))
                .to_string(),
            _ => self.text(node).to_string(),
        }
    }

    fn expr(&self, node: Node) -> Result<Expr, ParseError> {
        let kind = match node.kind() {
            "integer_literal" => ExprKind::Literal(Literal::Integer(self.text(node).to_string())),
            "real_literal" => ExprKind::Literal(Literal::Real(self.text(node).to_string())),
            "boolean_literal" => ExprKind::Literal(Literal::Bool(self.text(node) == "true")),
            "null_literal" => ExprKind::Literal(Literal::Null),
            "string_literal" => ExprKind::Literal(Literal::Str(self.string_literal(node))),
            "verbatim_string_literal" => {
                ExprKind::Literal(Literal::Str(verbatim(self.text(node))))
            }
            "raw_string_literal" => {
                let content: String = named_children(node)
                    .into_iter()
                    .filter(|child| child.kind() == "raw_string_content")
                    .map(|child| self.text(child))
                    .collect();
                ExprKind::Literal(Literal::Str(raw_string(&content)))
            }
            "character_literal" => ExprKind::Literal(Literal::Char(self.character(node))),

            "identifier" | "predefined_type" | "alias_qualified_name" => {
                ExprKind::Identifier(self.text(node).to_string())
            }
            "generic_name" => ExprKind::Identifier(self.simple_name(node)),
            "qualified_name" => ExprKind::Member {
                target: self.boxed_expr(field(node, "qualifier")?)?,
                name: self.simple_name(field(node, "name")?),
            },
            "this" | "base" => ExprKind::This,
            "parenthesized_expression" => ExprKind::Paren(self.boxed_expr(first_named(node)?)?),
            "checked_expression" => return self.expr(first_named(node)?),

            "binary_expression" => {
                match BinaryOp::from_token(self.text(field(node, "operator")?)) {
                    Some(op) => ExprKind::Binary {
                        op,
                        left: self.boxed_expr(field(node, "left")?)?,
                        right: self.boxed_expr(field(node, "right")?)?,
                    },
                    None => self.unknown(node),
                }
            }
            "prefix_unary_expression" | "postfix_unary_expression" => self.unary(node)?,
            "assignment_expression" => {
                match AssignOp::from_token(self.text(field(node, "operator")?)) {
                    Some(op) => ExprKind::Assign {
                        op,
                        target: self.boxed_expr(field(node, "left")?)?,
                        value: self.boxed_expr(field(node, "right")?)?,
                    },
                    None => self.unknown(node),
                }
            }
            "conditional_expression" => ExprKind::Conditional {
                cond: self.boxed_expr(field(node, "condition")?)?,
                then: self.boxed_expr(field(node, "consequence")?)?,
                otherwise: self.boxed_expr(field(node, "alternative")?)?,
            },
            "cast_expression" => ExprKind::Cast {
                ty: self.type_ref(field(node, "type")?),
                value: self.boxed_expr(field(node, "value")?)?,
            },
            "as_expression" => ExprKind::Cast {
                ty: self.type_ref(field(node, "right")?),
                value: self.boxed_expr(field(node, "left")?)?,
            },

            "invocation_expression" => ExprKind::Invoke {
                callee: self.boxed_expr(field(node, "function")?)?,
                args: self.arguments(field(node, "arguments")?)?,
            },
            "member_access_expression" => ExprKind::Member {
                target: self.boxed_expr(field(node, "expression")?)?,
                name: self.simple_name(field(node, "name")?),
            },
            "element_access_expression" => ExprKind::ElementAccess {
                target: self.boxed_expr(field(node, "expression")?)?,
                index: self.arguments(field(node, "subscript")?)?,
            },

            "object_creation_expression" => ExprKind::ObjectCreation {
                ty: self.type_ref(field(node, "type")?),
                args: node
                    .child_by_field_name("arguments")
                    .map(|args| self.arguments(args))
                    .transpose()?
                    .unwrap_or_default(),
                init: node
                    .child_by_field_name("initializer")
                    .map(|init| self.init_elements(init))
                    .transpose()?,
            },
            "implicit_object_creation_expression" => ExprKind::ImplicitObjectCreation {
                args: child_of_kind(node, "argument_list")
                    .ok()
                    .map(|args| self.arguments(args))
                    .transpose()?
                    .unwrap_or_default(),
                init: child_of_kind(node, "initializer_expression")
                    .ok()
                    .map(|init| self.init_elements(init))
                    .transpose()?,
            },
            "array_creation_expression" => {
                let array = field(node, "type")?;
                let element = self.type_ref(field(array, "type")?);
                let sizes = array
                    .child_by_field_name("rank")
                    .map(|rank| {
                        named_children(rank)
                            .into_iter()
                            .map(|size| self.expr(size))
                            .collect::<Result<Vec<_>, _>>()
                    })
                    .transpose()?
                    .unwrap_or_default();
                ExprKind::ArrayCreation {
                    ty: element,
                    sizes,
                    init: child_of_kind(node, "initializer_expression")
                        .ok()
                        .map(|init| self.init_elements(init))
                        .transpose()?,
                }
            }
            "implicit_array_creation_expression" => ExprKind::ImplicitArrayCreation(
                self.init_elements(child_of_kind(node, "initializer_expression")?)?,
            ),
            "initializer_expression" => ExprKind::Initializer(self.init_elements(node)?),

            "interpolated_string_expression" => ExprKind::Interpolated(self.interpolation(node)?),
            "tuple_expression" => ExprKind::Tuple(
                self.arguments(node)?
                    .into_iter()
                    .map(|arg| arg.value)
                    .collect(),
            ),
            "declaration_expression" => ExprKind::Declaration {
                ty: self.type_ref(field(node, "type")?),
                designation: Designation::Single(self.text(field(node, "name")?).to_string()),
            },
            "default_expression" => {
                ExprKind::Default(node.child_by_field_name("type").map(|ty| self.type_ref(ty)))
            }
            "typeof_expression" => ExprKind::TypeOf(self.type_ref(field(node, "type")?)),
            "is_pattern_expression" => self.is_pattern(node)?,
            "lambda_expression" | "anonymous_method_expression" => ExprKind::Lambda,
            _ => self.unknown(node),
        };
        Ok(Expr::new(kind, span(node)))
    }

    fn unary(&self, node: Node) -> Result<ExprKind, ParseError> {
        let operand = first_named(node)?;
        let mut cursor = node.walk();
        let token = node
            .children(&mut cursor)
            .find(|child| !child.is_named() && !child.is_extra())
            .map_or("", |child| child.kind());
        let postfix = node.kind() == "postfix_unary_expression";
        let op = match (postfix, token) {
            (false, "++") => UnaryOp::PreInc,
            (false, "--") => UnaryOp::PreDec,
            (false, "+") => UnaryOp::Plus,
            (false, "-") => UnaryOp::Neg,
            (false, "!") => UnaryOp::Not,
            (false, "~") => UnaryOp::BitNot,
            (true, "++") => UnaryOp::PostInc,
            (true, "--") => UnaryOp::PostDec,
            (true, "!") => UnaryOp::NullForgive,
            _ => return Ok(self.unknown(node)),
        };
        Ok(ExprKind::Unary {
            op,
            operand: self.boxed_expr(operand)?,
        })
    }

    /// Only null checks survive; other patterns have no translation.
    fn is_pattern(&self, node: Node) -> Result<ExprKind, ParseError> {
        let pattern = field(node, "pattern")?;
        let (pattern, negated) = match pattern.kind() {
            "negated_pattern" => (first_named(pattern)?, true),
            _ => (pattern, false),
        };
        let inner = match pattern.kind() {
            "constant_pattern" => first_named(pattern)?,
            _ => pattern,
        };
        if inner.kind() != "null_literal" {
            return Ok(self.unknown(node));
        }
        Ok(ExprKind::IsNull {
            operand: self.boxed_expr(field(node, "expression")?)?,
            negated,
        })
    }

    fn arguments(&self, list: Node) -> Result<Vec<Argument>, ParseError> {
        named_children(list)
            .into_iter()
            .filter(|child| child.kind() == "argument")
            .map(|arg| self.argument(arg))
            .collect()
    }

    fn argument(&self, node: Node) -> Result<Argument, ParseError> {
        let name = node.child_by_field_name("name");
        let mut modifier = None;
        let mut value = None;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.is_extra() {
                continue;
            }
            if !child.is_named() {
                if matches!(child.kind(), "ref" | "out" | "in") {
                    modifier = Some(child.kind().to_string());
                }
                continue;
            }
            if Some(child.id()) != name.map(|n| n.id()) {
                value = Some(child);
            }
        }

        let value = value.ok_or_else(|| ParseError::Malformed("argument without value".to_string()))?;
        Ok(Argument {
            name: name.map(|n| self.text(n).to_string()),
            modifier,
            value: self.expr(value)?,
        })
    }

    fn init_elements(&self, node: Node) -> Result<Vec<InitElement>, ParseError> {
        let mut elements = Vec::new();
        for child in named_children(node) {
            let element = match child.kind() {
                // `{ key, value }` inside a dictionary initializer
                "initializer_expression" => match named_children(child).as_slice() {
                    [key, value] => InitElement::Pair {
                        key: self.expr(*key)?,
                        value: self.expr(*value)?,
                    },
                    _ => InitElement::Value(self.expr(child)?),
                },
                // `[key] = value` or `Name = value`
                "assignment_expression" => {
                    let left = field(child, "left")?;
                    let key = if left.kind() == "element_binding_expression" {
                        self.argument(child_of_kind(left, "argument")?)?.value
                    } else {
                        self.expr(left)?
                    };
                    InitElement::Pair {
                        key,
                        value: self.expr(field(child, "right")?)?,
                    }
                }
                _ => InitElement::Value(self.expr(child)?),
            };
            elements.push(element);
        }
        Ok(elements)
    }

    fn interpolation(&self, node: Node) -> Result<Vec<InterpolationPart>, ParseError> {
        let children = named_children(node);
        let verbatim = children
            .first()
            .is_some_and(|start| start.kind() == "interpolation_start" && self.text(*start).contains('@'));

        let mut parts = Vec::new();
        for child in children {
            match child.kind() {
                "string_content" => {
                    let mut text = self.text(child).replace("{{", "{").replace("}}", "}");
                    if verbatim {
                        text = text.replace("\"\"", "\"");
                    }
                    push_text(&mut parts, &text);
                }
                "escape_sequence" => push_text(&mut parts, &unescape(self.text(child))),
                "interpolation" => {
                    let mut value = None;
                    let mut clause = String::new();
                    for part in named_children(child) {
                        match part.kind() {
                            "interpolation_brace" => {}
                            "interpolation_alignment_clause" | "interpolation_format_clause" => {
                                clause.push_str(self.text(part));
                            }
                            _ if value.is_none() => value = Some(part),
                            _ => {}
                        }
                    }
                    let value = value
                        .ok_or_else(|| ParseError::Malformed("empty interpolation".to_string()))?;
                    let value = self.expr(value)?;
                    parts.push(if clause.is_empty() {
                        InterpolationPart::Hole(value)
                    } else {
                        InterpolationPart::Formatted { value, clause }
                    });
                }
                _ => {}
            }
        }
        Ok(parts)
    }

    fn string_literal(&self, node: Node) -> String {
        let mut value = String::new();
        for child in named_children(node) {
            match child.kind() {
                "string_literal_content" => value.push_str(self.text(child)),
                "escape_sequence" => value.push_str(&unescape(self.text(child))),
                _ => {}
            }
        }
        value
    }

    fn character(&self, node: Node) -> char {
        let value = match first_named(node) {
            Ok(child) if child.kind() == "escape_sequence" => unescape(self.text(child)),
            Ok(child) => self.text(child).to_string(),
            Err(_) => String::new(),
        };
        value.chars().next().unwrap_or('\0')
    }

    // =========================================================================
    // Designations
    // =========================================================================

    fn designation(&self, node: Node) -> Designation {
        match node.kind() {
            "discard" => Designation::Discard,
            "tuple_pattern" | "parenthesized_variable_designation" => Designation::Tuple(
                named_children(node)
                    .into_iter()
                    .map(|child| self.designation(child))
                    .collect(),
            ),
            _ => match self.text(node) {
                "_" => Designation::Discard,
                name => Designation::Single(name.to_string()),
            },
        }
    }

    /// `foreach ((a, b) in pairs)` spells its targets as a tuple expression.
    fn expr_designation(&self, node: Node) -> Designation {
        match node.kind() {
            "tuple_expression" => Designation::Tuple(
                named_children(node)
                    .into_iter()
                    .map(|arg| self.expr_designation(arg))
                    .collect(),
            ),
            "argument" => named_children(node)
                .last()
                .map_or(Designation::Discard, |value| self.expr_designation(*value)),
            "declaration_expression" => node
                .child_by_field_name("name")
                .map_or(Designation::Discard, |name| self.designation(name)),
            _ => self.designation(node),
        }
    }
}

fn push_text(parts: &mut Vec<InterpolationPart>, text: &str) {
    if let Some(InterpolationPart::Text(last)) = parts.last_mut() {
        last.push_str(text);
    } else {
        parts.push(InterpolationPart::Text(text.to_string()));
    }
}

/// Decode one escape sequence; unknown ones are kept as written.
fn unescape(sequence: &str) -> String {
    let Some(body) = sequence.strip_prefix('\\') else {
        return sequence.to_string();
    };
    let simple = match body {
        "n" => Some('\n'),
        "t" => Some('\t'),
        "r" => Some('\r'),
        "0" => Some('\0'),
        "a" => Some('\x07'),
        "b" => Some('\x08'),
        "f" => Some('\x0c'),
        "v" => Some('\x0b'),
        "e" => Some('\x1b'),
        "\\" => Some('\\'),
        "\"" => Some('"'),
        "'" => Some('\''),
        _ => None,
    };
    simple
        .or_else(|| {
            body.strip_prefix(['x', 'u', 'U'])
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .and_then(char::from_u32)
        })
        .map_or_else(|| sequence.to_string(), |c| c.to_string())
}

/// `@"a ""b"""` -> `a "b"`
fn verbatim(text: &str) -> String {
    let body = text.strip_prefix('@').unwrap_or(text);
    let body = body.strip_suffix("u8").unwrap_or(body);
    let body = body.strip_prefix('"').unwrap_or(body);
    let body = body.strip_suffix('"').unwrap_or(body);
    body.replace("\"\"", "\"")
}

/// Multi-line raw strings drop their first and last line and the closing
/// line's indentation from every other line.
fn raw_string(content: &str) -> String {
    let lines: Vec<&str> = content
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .collect();
    match lines.as_slice() {
        [first, body @ .., last] if first.trim().is_empty() && last.trim().is_empty() => body
            .iter()
            .map(|line| line.strip_prefix(*last).unwrap_or_else(|| line.trim_start()))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => content.to_string(),
    }
}
