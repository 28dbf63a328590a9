//! Statement nodes.

use serde::{Deserialize, Serialize};

use crate::{Designation, Expr, MethodDecl, Span, TypeRef};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDeclarator {
    pub name: String,
    pub init: Option<Expr>,
}

/// `T a = 1, b;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalDecl {
    pub ty: TypeRef,
    pub declarators: Vec<VarDeclarator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchLabel {
    Case(Expr),
    /// A pattern label such as `case int n when n > 0:`; source text only.
    Pattern(String),
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchSection {
    pub labels: Vec<SwitchLabel>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeachBinding {
    Single { ty: TypeRef, name: String },
    Deconstruct(Designation),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtKind {
    Block(Vec<Stmt>),
    Expr(Expr),
    LocalDecl(LocalDecl),
    /// `var (a, (b, c)) = value;`
    Deconstruct {
        pattern: Designation,
        value: Expr,
    },
    Return(Option<Expr>),
    If {
        cond: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        decl: Option<LocalDecl>,
        init: Vec<Expr>,
        cond: Option<Expr>,
        update: Vec<Expr>,
        body: Box<Stmt>,
    },
    Foreach {
        binding: ForeachBinding,
        iterable: Expr,
        body: Box<Stmt>,
    },
    Switch {
        subject: Expr,
        sections: Vec<SwitchSection>,
    },
    Break,
    Continue,
    LocalFunction(MethodDecl),
    Try {
        body: Box<Stmt>,
        catches: Vec<Stmt>,
        finally: Option<Box<Stmt>>,
    },
    Throw(Option<Expr>),
    Using {
        body: Box<Stmt>,
    },
    Lock {
        body: Box<Stmt>,
    },
    /// `yield return x` or `yield break` (None).
    Yield(Option<Expr>),
    Goto(String),
    Labeled {
        label: String,
        body: Box<Stmt>,
    },
    /// `checked { }` / `unchecked { }`
    Checked(Box<Stmt>),
    Empty,
    Unknown {
        kind: String,
        text: String,
    },
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Statements of a block, or the statement itself.
    pub fn as_block(&self) -> &[Stmt] {
        match &self.kind {
            StmtKind::Block(stmts) => stmts,
            _ => std::slice::from_ref(self),
        }
    }
}
