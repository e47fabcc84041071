use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

use ardebug::core::Engine;

#[derive(Parser)]
#[command(name = "ardebug")]
#[command(about = "Structure graph, findings and health score for a script file")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a file once and print the report
    Analyze {
        /// Source file to analyze
        file: PathBuf,

        /// Output format (text, json, markdown)
        #[arg(short, long)]
        format: Option<String>,

        /// Exit with an error when any finding is reported (useful for CI)
        #[arg(long)]
        fail_on_errors: bool,
    },

    /// Re-analyze a file whenever it changes
    Watch {
        /// Source file to watch
        file: PathBuf,

        /// Quiet period after the last edit, in milliseconds
        #[arg(long)]
        debounce_ms: Option<u64>,
    },

    /// Write a default configuration file
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub async fn execute(self, engine: Engine) -> Result<()> {
        match self.command {
            Commands::Analyze { file, format, fail_on_errors } => {
                engine.analyze(&file, format.as_deref(), fail_on_errors).await
            }
            Commands::Watch { file, debounce_ms } => {
                engine.watch(&file, debounce_ms).await
            }
            Commands::Init { path, force } => {
                engine.init(path, force).await.map(|_| ())
            }
        }
    }
}
