//! Declarations: compilation units, types, members.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Expr, Span, Stmt, TypeRef, VarDeclarator};

/// One source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Namespace { name: String, items: Vec<Item> },
    Class(ClassDecl),
    /// Top-level statement.
    GlobalStatement(Stmt),
    /// A declaration with no counterpart in the target.
    Ignored { kind: DeclKind, name: String },
}

/// Declaration kinds the target cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Enum,
    Interface,
    Struct,
    Record,
    Delegate,
    Property,
    Event,
    Indexer,
    Operator,
    Conversion,
    Destructor,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclKind::Enum => "enum",
            DeclKind::Interface => "interface",
            DeclKind::Struct => "struct",
            DeclKind::Record => "record",
            DeclKind::Delegate => "delegate",
            DeclKind::Property => "property",
            DeclKind::Event => "event",
            DeclKind::Indexer => "indexer",
            DeclKind::Operator => "operator overload",
            DeclKind::Conversion => "conversion operator",
            DeclKind::Destructor => "destructor",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    pub modifiers: Vec<String>,
    pub members: Vec<Member>,
    pub is_struct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub kind: MemberKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field(FieldDecl),
    Method(MethodDecl),
    Constructor { params: Vec<Param>, body: MethodBody },
    NestedClass(ClassDecl),
    Unsupported { kind: DeclKind, name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub ty: TypeRef,
    pub modifiers: Vec<String>,
    pub declarators: Vec<VarDeclarator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub modifiers: Vec<String>,
    pub return_type: TypeRef,
    pub params: Vec<Param>,
    pub body: MethodBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodBody {
    Block(Vec<Stmt>),
    /// `=> expr`
    Expression(Expr),
    /// Abstract or extern: no body.
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
    pub default: Option<Expr>,
}

impl MethodDecl {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    pub fn is_static(&self) -> bool {
        self.has_modifier("static")
    }
}

impl ClassDecl {
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|member| match &member.kind {
            MemberKind::Method(method) => Some(method),
            _ => None,
        })
    }
}

impl CompilationUnit {
    /// Top-level classes in declaration order, looking through namespaces.
    pub fn classes(&self) -> Vec<&ClassDecl> {
        fn walk<'a>(items: &'a [Item], out: &mut Vec<&'a ClassDecl>) {
            for item in items {
                match &item.kind {
                    ItemKind::Class(class) => out.push(class),
                    ItemKind::Namespace { items, .. } => walk(items, out),
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.items, &mut out);
        out
    }

    /// Names of every declared class, nested classes included.
    pub fn declared_types(&self) -> Vec<String> {
        fn walk_class(class: &ClassDecl, out: &mut Vec<String>) {
            out.push(class.name.clone());
            for member in &class.members {
                if let MemberKind::NestedClass(nested) = &member.kind {
                    walk_class(nested, out);
                }
            }
        }
        let mut out = Vec::new();
        for class in self.classes() {
            walk_class(class, &mut out);
        }
        out
    }
}
