//! Project-wide type index and per-module qualification.

use std::collections::{BTreeMap, BTreeSet};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::naming::to_target_name;

/// Type name -> owning module, built once per run by the caller's prescan.
///
/// The first registration of a name wins; later ones are reported.
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    types: BTreeMap<String, String>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `type_name` as declared in `module`.
    ///
    /// Returns a collision diagnostic when another module already owns the
    /// name; the existing mapping is kept.
    pub fn register(&mut self, type_name: &str, module: &str) -> Option<Diagnostic> {
        match self.types.get(type_name) {
            Some(owner) if same_module(owner, module) => None,
            Some(owner) => Some(Diagnostic::new(
                DiagnosticKind::Collision,
                0,
                format!("type `{}` declared in both `{}` and `{}`", type_name, owner, module),
                format!("kept `{}`", owner),
            )),
            None => {
                self.types.insert(type_name.to_string(), module.to_string());
                None
            }
        }
    }

    pub fn module_of(&self, type_name: &str) -> Option<&str> {
        self.types.get(type_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.types.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Module names come from file names, so compare them the way a
/// case-insensitive file system would.
fn same_module(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Where a type name lives relative to the module being translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualification {
    /// Declared in this module.
    Local,
    /// Declared in another module (the module's target name).
    Foreign(String),
    /// Not a known project type.
    Unknown,
}

/// Per-module resolution state. Created fresh for each module translation.
#[derive(Debug)]
pub struct ModuleContext<'i> {
    module_name: String,
    index: &'i SymbolIndex,
    local_types: BTreeSet<String>,
    module_bindings: BTreeSet<String>,
    imports: BTreeSet<String>,
}

impl<'i> ModuleContext<'i> {
    pub fn new(module_name: impl Into<String>, index: &'i SymbolIndex) -> Self {
        Self {
            module_name: module_name.into(),
            index,
            local_types: BTreeSet::new(),
            module_bindings: BTreeSet::new(),
            imports: BTreeSet::new(),
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn add_local_type(&mut self, name: impl Into<String>) {
        self.local_types.insert(name.into());
    }

    /// Record a module-level binding (target spelling).
    pub fn add_module_binding(&mut self, name: impl Into<String>) {
        self.module_bindings.insert(name.into());
    }

    pub fn is_module_binding(&self, name: &str) -> bool {
        self.module_bindings.contains(name)
    }

    pub fn is_type(&self, name: &str) -> bool {
        !matches!(self.resolve_type(name), Qualification::Unknown)
    }

    pub fn resolve_type(&self, name: &str) -> Qualification {
        if self.local_types.contains(name) {
            return Qualification::Local;
        }
        match self.index.module_of(name) {
            Some(module) if same_module(module, &self.module_name) => Qualification::Local,
            Some(module) => Qualification::Foreign(to_target_name(module)),
            None => Qualification::Unknown,
        }
    }

    /// Spell `member` of type `type_name` for this module.
    ///
    /// Members of local types are unqualified; members of foreign types are
    /// prefixed with their module, which is queued for import. Returns
    /// `None` when the type is unknown.
    pub fn qualify(&mut self, type_name: &str, member: &str) -> Option<String> {
        match self.resolve_type(type_name) {
            Qualification::Local => Some(member.to_string()),
            Qualification::Foreign(module) => {
                let qualified = format!("{}.{}", module, member);
                self.imports.insert(module);
                Some(qualified)
            }
            Qualification::Unknown => None,
        }
    }

    /// Modules referenced so far, sorted.
    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(String::as_str)
    }
}
