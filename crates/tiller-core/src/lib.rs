//! Translator from C# trees to the farming game's Python-like script dialect.
//!
//! The entry point is [`translate_module`], which turns one
//! [`CompilationUnit`](rhizome_tiller_ast::CompilationUnit) into dialect
//! source plus a list of [`Diagnostic`]s. Translation is total: anything
//! the dialect cannot express is degraded and reported, never rejected.
//!
//! Cross-module references are resolved against a [`SymbolIndex`] the
//! caller builds by prescanning every module of the project first.
//!
//! ```
//! use rhizome_tiller_ast::CompilationUnit;
//! use rhizome_tiller_core::{ModuleOptions, SymbolIndex, translate_module};
//!
//! let index = SymbolIndex::new();
//! let out = translate_module(&CompilationUnit::default(), &index, &ModuleOptions::new("Empty"));
//! assert_eq!(out.text, "\n");
//! assert!(out.diagnostics.is_empty());
//! ```

mod diagnostics;
mod driver;
mod globals;
pub mod mappings;
pub mod naming;
mod output;
mod resolver;
mod translate;

pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use driver::{ModuleOptions, Translation, translate_module};
pub use output::OutputAssembler;
pub use resolver::{ModuleContext, Qualification, SymbolIndex};

#[cfg(test)]
mod tests;
