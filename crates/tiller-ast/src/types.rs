//! Type references as written in source.

use serde::{Deserialize, Serialize};

/// A type as it appears in a declaration. No resolution happens here; the
/// name is whatever the source spelled, possibly dotted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    /// `int`, `string`, `Foo`, `List<int>`, `System.Collections.Generic.List<T>`
    Named { name: String, args: Vec<TypeRef> },
    /// `T?`
    Nullable(Box<TypeRef>),
    /// `T[]`, `T[,]`
    Array(Box<TypeRef>),
    /// `(int x, int y)`
    Tuple(Vec<TupleElement>),
    /// `var`
    Var,
    /// `void`
    Void,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TupleElement {
    pub ty: TypeRef,
    pub name: Option<String>,
}

/// The three container literal shapes the target dialect has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerShape {
    List,
    Map,
    Set,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args,
        }
    }

    /// Last segment of a named type (`System.Int32` -> `Int32`).
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            TypeRef::Named { name, .. } => Some(name.rsplit('.').next().unwrap_or(name)),
            TypeRef::Nullable(inner) => inner.simple_name(),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        match self {
            TypeRef::Void => true,
            TypeRef::Named { name, args } => name == "void" && args.is_empty(),
            _ => false,
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self, TypeRef::Var)
    }

    pub fn is_string(&self) -> bool {
        matches!(self.simple_name(), Some("string" | "String"))
    }

    pub fn is_tuple(&self) -> bool {
        match self {
            TypeRef::Tuple(_) => true,
            TypeRef::Named { .. } => matches!(self.simple_name(), Some("Tuple" | "ValueTuple")),
            TypeRef::Nullable(inner) => inner.is_tuple(),
            _ => false,
        }
    }

    /// Classify a container type by the literal shape it translates to.
    pub fn shape(&self) -> Option<ContainerShape> {
        match self {
            TypeRef::Array(_) => Some(ContainerShape::List),
            TypeRef::Nullable(inner) => inner.shape(),
            TypeRef::Named { .. } => match self.simple_name()? {
                "List" | "IList" | "IReadOnlyList" | "ICollection" | "IEnumerable" | "Queue"
                | "Stack" | "LinkedList" | "ArrayList" => Some(ContainerShape::List),
                "Dictionary" | "IDictionary" | "IReadOnlyDictionary" | "SortedDictionary"
                | "Hashtable" => Some(ContainerShape::Map),
                "HashSet" | "ISet" | "SortedSet" => Some(ContainerShape::Set),
                _ => None,
            },
            _ => None,
        }
    }

    /// Default value literal of this type in the target dialect.
    pub fn default_literal(&self) -> &'static str {
        match self.simple_name() {
            Some(_) if matches!(self, TypeRef::Nullable(_)) => "None",
            Some(
                "int" | "long" | "short" | "byte" | "uint" | "ulong" | "ushort" | "sbyte"
                | "Int32" | "Int64",
            ) => "0",
            Some("float" | "double" | "decimal" | "Single" | "Double") => "0.0",
            Some("bool" | "Boolean") => "False",
            Some("string" | "String") => "\"\"",
            _ => "None",
        }
    }
}
