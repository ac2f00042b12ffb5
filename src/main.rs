//! Astgraph CLI - ingest resolved syntax trees into a property graph

use astgraph::config::{self, AstgraphConfig};
use astgraph::sink::SqliteSink;
use astgraph::{discover, ingest};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "astgraph")]
#[command(version = "0.1.0")]
#[command(about = "Materialize resolved syntax trees as a labeled property graph")]
#[command(long_about = r#"
Astgraph turns a batch of parsed, semantically-resolved syntax trees
into a persistent labeled property graph:
  • One graph node per surviving tree node, labeled and typed
  • One shared node per semantic binding, project-wide
  • Ordered, typed edges recovering the full tree structure

Example usage:
  astgraph discover --path ./my-project
  astgraph ingest --trees ./trees --project my-project
  astgraph stats
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a directory of serialized trees as one project
    Ingest {
        /// Directory holding one .json tree per source file
        #[arg(short, long)]
        trees: PathBuf,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Project name (defaults to the tree directory's name)
        #[arg(short, long)]
        project: Option<String>,

        /// Path to a config file (defaults to ./astgraph.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Discover the sources and classpath of a project directory
    Discover {
        /// Path to the project root
        #[arg(short, long)]
        path: PathBuf,
    },

    /// Show statistics about the stored graph
    Stats {
        /// Path to the database file
        #[arg(short, long, default_value = "astgraph.db")]
        database: PathBuf,
    },

    /// Write a starter config file
    Init {
        /// Where to write the config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Ingest {
            trees,
            database,
            project,
            config: config_path,
        } => {
            let file_config = config::load_config(config_path.as_deref())?.unwrap_or_default();

            let database = database
                .or_else(|| file_config.database.as_deref().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("astgraph.db"));
            let project = project
                .or(file_config.project)
                .unwrap_or_else(|| ingest::project_name_from(&trees));

            config::ensure_db_dir(&database)?;
            let mut sink = SqliteSink::open(&database)?;
            let loaded = ingest::load_tree_dir(&trees)?;

            println!("🚀 Ingesting project: {project}");
            println!("📂 Trees: {}", trees.display());
            println!("🗄️  Database: {}", database.display());

            let report = ingest::ingest(&mut sink, &project, &loaded)?;
            println!(
                "✅ Stored {} trees, {} shared bindings (project node {})",
                report.trees, report.bindings, report.project_node
            );
        }

        Commands::Discover { path } => {
            let layout = discover::discover(&path)?;

            println!("📂 Project: {}", path.display());
            println!("Source roots:");
            for root in &layout.source_roots {
                println!("  {}", root.display());
            }
            println!("Classpath:");
            for entry in &layout.classpath {
                println!("  {}", entry.display());
            }
            println!("Sources ({} files):", layout.files.len());
            for file in &layout.files {
                println!("  {}", file.display());
            }
        }

        Commands::Stats { database } => {
            let sink = SqliteSink::open(&database)?;
            print!("{}", sink.stats()?);
        }

        Commands::Init { config: path, force } => {
            let path = path.unwrap_or_else(config::default_config_path);
            let starter = AstgraphConfig {
                database: Some("astgraph.db".to_string()),
                project: None,
            };
            config::write_config(&path, &starter, force)?;
            println!("✅ Wrote {}", path.display());
        }
    }

    Ok(())
}
