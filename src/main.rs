//! dsexpr command line interface
//!
//! ```bash
//! # Render an expression against a registry
//! dsexpr render --config registry.yaml "meanDS(D$age)"
//!
//! # Parse only and dump the AST
//! dsexpr check "A ~ B + C"
//!
//! # List the permitted methods of a category
//! dsexpr methods --config registry.yaml --category assign
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dsexpr::registry::ResolvedMethod;
use dsexpr::{parse, MethodCategory, Registry, ScriptGenerator};

#[derive(Parser)]
#[command(name = "dsexpr")]
#[command(version)]
#[command(about = "Render restricted R expressions into registry-checked scripts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and render an expression
    Render {
        /// Registry configuration (YAML)
        #[arg(short, long)]
        config: PathBuf,
        /// Method category calls are resolved in
        #[arg(long, default_value = "aggregate")]
        category: MethodCategory,
        /// Namespace operator calls are qualified with
        #[arg(long, default_value = dsexpr::generator::DEFAULT_BASE_NAMESPACE)]
        base_namespace: String,
        /// Expression text
        expr: String,
    },
    /// Parse an expression and print its AST
    Check {
        /// Expression text
        expr: String,
    },
    /// List permitted methods
    Methods {
        /// Registry configuration (YAML)
        #[arg(short, long)]
        config: PathBuf,
        /// Only list this category
        #[arg(long)]
        category: Option<MethodCategory>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Render {
            config,
            category,
            base_namespace,
            expr,
        } => {
            let registry = load_registry(&config)?;
            let ast = parse(&expr)?;
            let script = ScriptGenerator::new(&registry, category)
                .with_base_namespace(base_namespace)
                .to_script(&ast)?;
            println!("{script}");
        }
        Commands::Check { expr } => {
            let ast = parse(&expr)?;
            println!("{ast:#?}");
        }
        Commands::Methods { config, category } => {
            let registry = load_registry(&config)?;
            let categories = match category {
                Some(category) => vec![category],
                None => MethodCategory::ALL.to_vec(),
            };
            for category in categories {
                let Some(env) = registry.environment(category) else {
                    continue;
                };
                println!("{category}:");
                for method in env.methods() {
                    match method {
                        ResolvedMethod::Packaged(f) => println!("  {} -> {}", f.name, f.function),
                        ResolvedMethod::Script(f) => println!("  {} (script)", f.name),
                    }
                }
            }
        }
    }
    Ok(())
}

fn load_registry(path: &Path) -> anyhow::Result<Registry> {
    Registry::from_yaml_path(path)
        .with_context(|| format!("loading registry configuration {}", path.display()))
}
