use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use codegraph_indexer::index_repository;
use codegraph_query::describe_schema;
use codegraph_store::{CodeGraph, GraphStore, MemoryGraph, SqliteGraph};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codegraph")]
#[command(about = "Build a queryable code knowledge graph from a source tree", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the graph from a repository (clears the store first)
    Index(IndexArgs),

    /// Print the graph schema consumed by the query layer
    Schema(StoreArgs),

    /// Delete every node and edge from the store
    Clear(StoreArgs),
}

#[derive(Args)]
struct IndexArgs {
    /// Repository root to index (defaults to current directory)
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Graph database path
    #[arg(long, default_value = "codegraph.db")]
    db: PathBuf,

    /// Build in memory only and discard the graph (dry run)
    #[arg(long, conflicts_with = "db")]
    in_memory: bool,

    /// Output statistics as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct StoreArgs {
    /// Graph database path
    #[arg(long, default_value = "codegraph.db")]
    db: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Index(args) => index(args),
        Commands::Schema(args) => schema(args),
        Commands::Clear(args) => clear(args),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn index(args: IndexArgs) -> Result<()> {
    if args.in_memory {
        run_index(args, MemoryGraph::new())
    } else {
        // An unreachable store should fail here, at startup, not on
        // the first per-fact write.
        let store = SqliteGraph::open(&args.db)
            .with_context(|| format!("opening graph database {}", args.db.display()))?;
        run_index(args, store)
    }
}

fn run_index<S: GraphStore>(args: IndexArgs, store: S) -> Result<()> {
    let mut graph = CodeGraph::new(store);
    let stats = index_repository(&args.root, &mut graph)
        .with_context(|| format!("indexing {}", args.root.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", stats);
    }
    Ok(())
}

fn schema(args: StoreArgs) -> Result<()> {
    let store = SqliteGraph::open(&args.db)
        .with_context(|| format!("opening graph database {}", args.db.display()))?;
    println!("{}", describe_schema(&store.schema()));
    Ok(())
}

fn clear(args: StoreArgs) -> Result<()> {
    let mut store = SqliteGraph::open(&args.db)
        .with_context(|| format!("opening graph database {}", args.db.display()))?;
    store.clear_all()?;
    println!("Cleared {}", args.db.display());
    Ok(())
}
