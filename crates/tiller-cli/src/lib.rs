//! Project handling behind the `tiller` command: configuration, prescan of
//! every input into a shared symbol index, translation and output naming.

pub mod config;
pub mod project;

pub use config::{CONFIG_FILE, Config, ConfigError};
pub use project::{CliError, Module, Output, Project, collect_sources, write_outputs};

#[cfg(test)]
mod tests;
