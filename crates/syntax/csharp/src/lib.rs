//! C# frontend for Tiller.
//!
//! Uses tree-sitter for parsing C#, then lowers the CST into the
//! [`rhizome_tiller_ast`] tree the translator consumes.

mod lowering;

pub use lowering::{ParseError, declarations, parse};

#[cfg(test)]
mod tests;
