//! Expression nodes.

use serde::{Deserialize, Serialize};

use crate::{Span, TypeRef};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Literal tokens. Numeric literals keep their source text, suffix included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Null,
    Bool(bool),
    Integer(String),
    Real(String),
    /// Already unescaped string value.
    Str(String),
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Coalesce,
}

impl BinaryOp {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            "&" => BinaryOp::BitAnd,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            "??" => BinaryOp::Coalesce,
            _ => return None,
        })
    }

    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    /// Postfix `!`
    NullForgive,
}

impl UnaryOp {
    pub fn is_step(self) -> bool {
        matches!(
            self,
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec
        )
    }

    pub fn is_increment(self) -> bool {
        matches!(self, UnaryOp::PreInc | UnaryOp::PostInc)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Coalesce,
}

impl AssignOp {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "=" => AssignOp::Assign,
            "+=" => AssignOp::Add,
            "-=" => AssignOp::Sub,
            "*=" => AssignOp::Mul,
            "/=" => AssignOp::Div,
            "%=" => AssignOp::Mod,
            "&=" => AssignOp::BitAnd,
            "|=" => AssignOp::BitOr,
            "^=" => AssignOp::BitXor,
            "<<=" => AssignOp::Shl,
            ">>=" => AssignOp::Shr,
            "??=" => AssignOp::Coalesce,
            _ => return None,
        })
    }

    pub fn token(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitOr => "|=",
            AssignOp::BitXor => "^=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::Coalesce => "??=",
        }
    }
}

/// A call or subscript argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    /// `name: value`
    pub name: Option<String>,
    /// `ref`, `out` or `in`
    pub modifier: Option<String>,
    pub value: Expr,
}

impl Argument {
    pub fn positional(value: Expr) -> Self {
        Self {
            name: None,
            modifier: None,
            value,
        }
    }
}

/// One entry of a `{ ... }` initializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitElement {
    Value(Expr),
    /// `{k, v}` or `[k] = v`
    Pair { key: Expr, value: Expr },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationPart {
    Text(String),
    Hole(Expr),
    /// `{x,5}` or `{x:F2}`; `clause` is the source text after the value.
    Formatted { value: Expr, clause: String },
}

/// Names bound by a deconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Designation {
    Single(String),
    Discard,
    Tuple(Vec<Designation>),
}

impl Designation {
    /// Every bound name, depth first.
    pub fn names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Designation::Single(name) => out.push(name),
            Designation::Discard => {}
            Designation::Tuple(items) => items.iter().for_each(|d| d.collect_names(out)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    Literal(Literal),
    Identifier(String),
    This,
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// `c ? a : b`
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// `(T)x` and `x as T`
    Cast {
        ty: TypeRef,
        value: Box<Expr>,
    },
    Paren(Box<Expr>),
    Invoke {
        callee: Box<Expr>,
        args: Vec<Argument>,
    },
    Member {
        target: Box<Expr>,
        name: String,
    },
    ElementAccess {
        target: Box<Expr>,
        index: Vec<Argument>,
    },
    /// `new T(args) { init }`
    ObjectCreation {
        ty: TypeRef,
        args: Vec<Argument>,
        init: Option<Vec<InitElement>>,
    },
    /// Target-typed `new(args) { init }`
    ImplicitObjectCreation {
        args: Vec<Argument>,
        init: Option<Vec<InitElement>>,
    },
    /// `new T[n]`, `new T[] { ... }`; `ty` is the element type.
    ArrayCreation {
        ty: TypeRef,
        sizes: Vec<Expr>,
        init: Option<Vec<InitElement>>,
    },
    /// `new[] { ... }`
    ImplicitArrayCreation(Vec<InitElement>),
    /// Bare `{ ... }` in a declaration.
    Initializer(Vec<InitElement>),
    /// Collection expression `[a, b]`
    Collection(Vec<Expr>),
    Interpolated(Vec<InterpolationPart>),
    Tuple(Vec<Expr>),
    /// `out var x`, `out int x`, `var (a, b)`
    Declaration {
        ty: TypeRef,
        designation: Designation,
    },
    /// `default(T)` or `default`
    Default(Option<TypeRef>),
    TypeOf(TypeRef),
    /// `x is null`, `x is not null`
    IsNull {
        operand: Box<Expr>,
        negated: bool,
    },
    /// Lambdas and anonymous methods.
    Lambda,
    Unknown {
        kind: String,
        text: String,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Strip redundant parentheses.
    pub fn unparen(&self) -> &Expr {
        match &self.kind {
            ExprKind::Paren(inner) => inner.unparen(),
            _ => self,
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match &self.unparen().kind {
            ExprKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// An integer literal's value, ignoring suffixes.
    pub fn as_int_literal(&self) -> Option<i64> {
        match &self.unparen().kind {
            ExprKind::Literal(Literal::Integer(text)) => {
                let digits: String = text
                    .trim_end_matches(['u', 'U', 'l', 'L'])
                    .chars()
                    .filter(|c| *c != '_')
                    .collect();
                if let Some(hex) = digits.strip_prefix("0x").or(digits.strip_prefix("0X")) {
                    i64::from_str_radix(hex, 16).ok()
                } else if let Some(bin) = digits.strip_prefix("0b").or(digits.strip_prefix("0B")) {
                    i64::from_str_radix(bin, 2).ok()
                } else {
                    digits.parse().ok()
                }
            }
            ExprKind::Unary {
                op: UnaryOp::Neg,
                operand,
            } => operand.as_int_literal()?.checked_neg(),
            _ => None,
        }
    }
}
