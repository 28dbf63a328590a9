//! Tiller CLI entry point.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rhizome_tiller_cli::{CliError, Config, Project, write_outputs};
use rhizome_tiller_syntax_csharp::parse;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tiller")]
#[command(about = "Translate C# farming scripts to the game's script dialect")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate C# files to game scripts
    Transpile {
        /// Input files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Config file (default: ./tiller.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Entry module name
        #[arg(long)]
        entry: Option<String>,

        /// Write to stdout instead of files
        #[arg(long)]
        stdout: bool,
    },

    /// Print the lowered tree of a C# file as JSON
    Parse {
        /// Input C# file
        file: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("rhizome_tiller=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Transpile {
            paths,
            out,
            config,
            entry,
            stdout,
        } => {
            let mut config = match config {
                Some(path) => Config::from_file(&path)?,
                None => Config::discover(Path::new("."))?,
            };
            if let Some(entry) = entry {
                config.entry_module = entry;
            }
            if out.is_some() {
                config.out_dir = out;
            }

            let project = Project::load(&paths)?;
            info!(
                "{} modules, {} types",
                project.modules().len(),
                project.index().len()
            );
            let outputs = project.translate(&config);

            if stdout {
                for output in &outputs {
                    println!("# {}", output.file_name);
                    print!("{}", output.translation.text);
                }
            } else {
                write_outputs(&outputs, config.out_dir.as_deref())?;
            }
        }

        Commands::Parse { file } => {
            let source = fs::read_to_string(&file).map_err(|source| CliError::Io {
                path: file.clone(),
                source,
            })?;
            let unit = parse(&source).map_err(|source| CliError::Parse {
                path: file.clone(),
                source,
            })?;
            println!("{}", serde_json::to_string_pretty(&unit)?);
        }
    }

    Ok(())
}
