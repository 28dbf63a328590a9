//! Source tree types for Tiller.
//!
//! This crate defines the tree shape handed from a syntax frontend
//! (tree-sitter C#, or any producer that can emit JSON) to the
//! translator in `rhizome-tiller-core`.
//!
//! Every syntactic category is a closed enum with an `Unknown` arm, so a
//! frontend never has to fail on a construct it does not model and the
//! translator can match exhaustively.
//!
//! Example (JSON form of `x = 1;`):
//! ```json
//! {"kind": {"expr": {"kind": {"assign": {
//!     "op": "assign",
//!     "target": {"kind": {"identifier": "x"}, "span": {...}},
//!     "value": {"kind": {"literal": {"integer": "1"}}, "span": {...}}
//! }}, "span": {...}}}, "span": {...}}
//! ```

mod decl;
mod expr;
mod span;
mod stmt;
mod types;

pub use decl::{
    ClassDecl, CompilationUnit, DeclKind, FieldDecl, Item, ItemKind, Member, MemberKind,
    MethodBody, MethodDecl, Param,
};
pub use expr::{
    Argument, AssignOp, BinaryOp, Designation, Expr, ExprKind, InitElement, InterpolationPart,
    Literal, UnaryOp,
};
pub use span::Span;
pub use stmt::{ForeachBinding, LocalDecl, Stmt, StmtKind, SwitchLabel, SwitchSection, VarDeclarator};
pub use types::{ContainerShape, TupleElement, TypeRef};

#[cfg(test)]
mod tests;
