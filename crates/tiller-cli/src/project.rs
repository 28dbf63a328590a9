//! Multi-file projects: prescan, translation and output.

use std::fs;
use std::path::{Path, PathBuf};

use rhizome_tiller_ast::CompilationUnit;
use rhizome_tiller_core::{Diagnostic, ModuleOptions, SymbolIndex, Translation, translate_module};
use rhizome_tiller_syntax_csharp::{ParseError, declarations, parse};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigError};

/// Source file extension picked up from directories.
const SOURCE_EXTENSION: &str = "cs";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Parse { path: PathBuf, source: ParseError },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One parsed input file.
#[derive(Debug)]
pub struct Module {
    pub path: PathBuf,
    /// File stem, the name other modules import it by.
    pub name: String,
    pub unit: CompilationUnit,
}

/// One translated module and where it goes.
#[derive(Debug)]
pub struct Output {
    pub source: PathBuf,
    pub file_name: String,
    pub translation: Translation,
}

/// Every module of a project, parsed, with the index of declared types.
#[derive(Debug)]
pub struct Project {
    modules: Vec<Module>,
    index: SymbolIndex,
    collisions: Vec<Diagnostic>,
}

/// Expand directories to their `.cs` files (not recursive). The result is
/// sorted and free of duplicates.
pub fn collect_sources(paths: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    let mut sources = Vec::new();
    for path in paths {
        if !path.is_dir() {
            sources.push(path.clone());
            continue;
        }
        let entries = fs::read_dir(path).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
            let file = entry.path();
            if file.is_file() && file.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
                sources.push(file);
            }
        }
    }
    sources.sort();
    sources.dedup();
    Ok(sources)
}

fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Project {
    /// Parse every input and register the types each declares.
    ///
    /// Registration follows sorted path order, so the first file to declare
    /// a type keeps it.
    pub fn load(paths: &[PathBuf]) -> Result<Self, CliError> {
        let mut modules = Vec::new();
        for path in collect_sources(paths)? {
            let source = fs::read_to_string(&path).map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
            let unit = parse(&source).map_err(|source| CliError::Parse {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), items = unit.items.len(), "parsed");
            modules.push(Module {
                name: module_name(&path),
                path,
                unit,
            });
        }
        Ok(Self::from_modules(modules))
    }

    /// Build a project from modules that are already parsed.
    pub fn from_modules(modules: Vec<Module>) -> Self {
        let mut index = SymbolIndex::new();
        let mut collisions = Vec::new();
        for module in &modules {
            for type_name in declarations(&module.unit) {
                if let Some(collision) = index.register(&type_name, &module.name) {
                    warn!(path = %module.path.display(), "{}", collision);
                    collisions.push(collision);
                }
            }
        }
        for (type_name, module) in index.iter() {
            debug!(type_name, module, "registered type");
        }
        Self {
            modules,
            index,
            collisions,
        }
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn index(&self) -> &SymbolIndex {
        &self.index
    }

    /// Type names declared by more than one module.
    pub fn collisions(&self) -> &[Diagnostic] {
        &self.collisions
    }

    /// Translate every module. Diagnostics are logged, never fatal.
    pub fn translate(&self, config: &Config) -> Vec<Output> {
        self.modules
            .iter()
            .map(|module| {
                let options = ModuleOptions::new(module.name.clone()).entry(config.is_entry(&module.name));
                let translation = translate_module(&module.unit, &self.index, &options);
                for diagnostic in &translation.diagnostics {
                    warn!(path = %module.path.display(), "{}", diagnostic);
                }
                Output {
                    source: module.path.clone(),
                    file_name: config.output_name(&module.name),
                    translation,
                }
            })
            .collect()
    }
}

/// Write outputs into `out_dir`, or next to their sources when unset.
/// Returns the written paths in order.
pub fn write_outputs(outputs: &[Output], out_dir: Option<&Path>) -> Result<Vec<PathBuf>, CliError> {
    let mut written = Vec::with_capacity(outputs.len());
    for output in outputs {
        let dir = match out_dir {
            Some(dir) => dir.to_path_buf(),
            None => output
                .source
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(&dir).map_err(|source| CliError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        let path = dir.join(&output.file_name);
        fs::write(&path, &output.translation.text).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?;
        info!(
            "{} -> {} ({} diagnostics)",
            output.source.display(),
            path.display(),
            output.translation.diagnostics.len()
        );
        written.push(path);
    }
    Ok(written)
}
