use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ddl_ingest::parser::ParseResult;
use ddl_ingest::{
    ingest, parse_inputs, FileStore, ImportOptions, IngestOptions, ParseOptions, SchemaStore,
};

#[derive(Parser)]
#[command(name = "ddl-ingest")]
#[command(author, version, about = "Turn MySQL DDL dumps into ER diagrams")]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse SQL files and report tables, relationships and problems
    Parse {
        /// SQL files, directories, glob patterns, or - for stdin
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Print the full parse result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse SQL files and import them into a stored diagram
    Import {
        /// Path to the JSON store file
        #[arg(short, long)]
        store: PathBuf,

        /// Target diagram id
        #[arg(short, long)]
        diagram: String,

        /// SQL files, directories, glob patterns, or - for stdin
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Import even if some statements failed to parse
        #[arg(long)]
        allow_errors: bool,

        /// Print the import response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage stored diagrams
    Diagram {
        /// Path to the JSON store file
        #[arg(short, long)]
        store: PathBuf,

        #[command(subcommand)]
        action: DiagramAction,
    },
}

#[derive(Subcommand)]
enum DiagramAction {
    /// Create an empty diagram and print its id
    Create { name: String },
    /// List diagrams, most recently updated first
    List,
    /// Print a diagram as JSON
    Show { id: String },
    Rename { id: String, name: String },
    Delete { id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Parse { inputs, json } => {
            let result = parse_inputs(&inputs, &ParseOptions::default())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_parse_summary(&result);
            }
        }
        Commands::Import {
            store,
            diagram,
            inputs,
            allow_errors,
            json,
        } => {
            let options = IngestOptions {
                inputs,
                store_path: store,
                diagram_id: diagram.clone(),
                allow_errors,
                import: ImportOptions::default(),
            };
            let (parsed, response) = ingest(options)?;
            print_diagnostics(&parsed);
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!(
                    "Imported {} table(s) and {} relationship(s) into diagram {}",
                    response.tables_created, response.relationships_created, diagram
                );
                for rename in &response.renamed {
                    println!("  renamed {} -> {}", rename.from, rename.to);
                }
                if response.relationships_skipped > 0 {
                    println!(
                        "  skipped {} unresolved relationship(s)",
                        response.relationships_skipped
                    );
                }
            }
        }
        Commands::Diagram { store, action } => run_diagram_action(FileStore::open(store), action)?,
    }

    Ok(())
}

fn run_diagram_action(mut store: FileStore, action: DiagramAction) -> Result<()> {
    match action {
        DiagramAction::Create { name } => {
            let diagram = store.create_diagram(&name)?;
            println!("{}", diagram.id);
        }
        DiagramAction::List => {
            for listing in store.list_diagrams()? {
                println!(
                    "{}  {}  tables={} relationships={}  updated {}",
                    listing.id,
                    listing.name,
                    listing.table_count,
                    listing.relationship_count,
                    listing.updated_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
        DiagramAction::Show { id } => {
            let diagram = store.get_diagram(&id)?;
            println!("{}", serde_json::to_string_pretty(&diagram)?);
        }
        DiagramAction::Rename { id, name } => {
            let diagram = store.rename_diagram(&id, &name)?;
            println!("Renamed {} to {}", diagram.id, diagram.name);
        }
        DiagramAction::Delete { id } => {
            store.delete_diagram(&id)?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

fn print_parse_summary(result: &ParseResult) {
    for table in &result.tables {
        println!("{} ({} columns)", table.name, table.columns.len());
    }
    for rel in &result.relationships {
        println!(
            "{}.{} -> {}.{} [{}]",
            rel.source_table, rel.source_column, rel.target_table, rel.target_column, rel.origin
        );
    }
    print_diagnostics(result);
    println!(
        "{} table(s), {} relationship(s), {} error(s), {} warning(s)",
        result.tables.len(),
        result.relationships.len(),
        result.error_count(),
        result.warning_count()
    );
}

fn print_diagnostics(result: &ParseResult) {
    for entry in &result.errors {
        eprintln!("{}", entry);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "ddl_ingest=debug" } else { "ddl_ingest=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
