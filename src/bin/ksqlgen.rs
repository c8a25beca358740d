//! ksqlgen command line tool
//!
//! Compiles JSON statement documents into ksqlDB statement text, validates them, or submits
//! them to a ksqlDB server.
//!
//! Usage:
//!   ksqlgen compile statements.json
//!   ksqlgen validate a.json b.json
//!   ksqlgen execute pipeline.json --config ksqldb.yaml
//!   ksqlgen execute pipeline.json --server http://localhost:8088

use clap::{Parser, Subcommand};
use ksqlgen::{CompileError, CompileResult, KsqlDbClient, KsqlDbConfig, KsqlStatement};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "ksqlgen")]
#[command(about = "Typed ksqlDB statement compiler")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the compiled statement text of each document
    Compile {
        /// JSON documents holding one statement or an array of statements
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Check documents without printing statement text
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Compile a document and submit its statements to ksqlDB
    Execute {
        file: PathBuf,

        /// YAML client configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Server URL, overrides the configured host, port and protocol
        #[arg(short, long)]
        server: Option<String>,
    },
}

/// Decode every statement in a document. A bad element does not hide the others.
fn load_statements(path: &Path) -> Result<Vec<CompileResult<KsqlStatement>>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let document: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid JSON in {}: {}", path.display(), e))?;
    let elements = match document {
        serde_json::Value::Array(elements) => elements,
        single => vec![single],
    };
    Ok(elements
        .into_iter()
        .map(|element| serde_json::from_value(element).map_err(CompileError::from))
        .collect())
}

fn compile_files(files: &[PathBuf], print: bool) -> bool {
    let mut ok = true;
    for file in files {
        let statements = match load_statements(file) {
            Ok(statements) => statements,
            Err(message) => {
                eprintln!("❌ {}", message);
                ok = false;
                continue;
            }
        };
        for (index, statement) in statements.into_iter().enumerate() {
            match statement.and_then(|statement| ksqlgen::compile(&statement)) {
                Ok(sql) if print => println!("{}", sql),
                Ok(sql) => {
                    debug!("{} #{}: {}", file.display(), index + 1, sql);
                    println!("✅ {} #{}", file.display(), index + 1);
                }
                Err(error) => {
                    eprintln!("❌ {} #{}: {}", file.display(), index + 1, error);
                    ok = false;
                }
            }
        }
    }
    ok
}

fn load_config(config: Option<&Path>, server: Option<&str>) -> ksqlgen::KsqlDbResult<KsqlDbConfig> {
    let mut resolved = match config {
        Some(path) => KsqlDbConfig::from_yaml_file(path)?,
        None => KsqlDbConfig::default(),
    };
    resolved.apply_env_overrides()?;
    if let Some(url) = server {
        let target = KsqlDbConfig::from_url(url)?;
        resolved.host = target.host;
        resolved.port = target.port;
        resolved.protocol = target.protocol;
    }
    Ok(resolved)
}

async fn execute_file(
    file: &Path,
    config: Option<&Path>,
    server: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Nothing is sent unless every statement in the document compiles
    let statements = load_statements(file)?
        .into_iter()
        .collect::<CompileResult<Vec<_>>>()?;
    for statement in &statements {
        ksqlgen::validate(statement)?;
    }

    let client = KsqlDbClient::new(load_config(config, server)?)?;
    info!("Submitting {} statement(s) to {}", statements.len(), client.base_url());

    for statement in &statements {
        for entity in client.execute(statement).await? {
            match &entity.command_status {
                Some(status) => println!(
                    "{} {}{}",
                    status.status,
                    status.message,
                    status
                        .query_id
                        .as_deref()
                        .map(|id| format!(" ({})", id))
                        .unwrap_or_default()
                ),
                None => println!(
                    "{} {}",
                    entity.entity_type.as_deref().unwrap_or("entity"),
                    entity.statement_text
                ),
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let ok = match cli.command {
        Commands::Compile { files } => compile_files(&files, true),
        Commands::Validate { files } => compile_files(&files, false),
        Commands::Execute {
            file,
            config,
            server,
        } => match execute_file(&file, config.as_deref(), server.as_deref()).await {
            Ok(()) => true,
            Err(e) => {
                eprintln!("❌ {}", e);
                false
            }
        },
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
