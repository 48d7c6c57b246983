mod commands;

use clap::{Parser, Subcommand};
use flows::config::{self, DEFAULT_HOST, DEFAULT_PORT, ServerConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "flows",
    version,
    about = "Store, serve, import and export flows"
)]
struct Cli {
    /// Path to the database file (default: .flows/flows.db in current dir)
    #[arg(long, env = "FLOWS_DB", global = true)]
    db: Option<PathBuf>,

    /// Output as JSON instead of table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the flows database
    Init,
    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, env = "FLOWS_HOST", default_value = DEFAULT_HOST)]
        host: String,
        /// Port to listen on
        #[arg(short, long, env = "FLOWS_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// List all flows
    List,
    /// Show a single flow
    Show {
        /// Flow ID
        id: String,
    },
    /// Import flows from a JSON file (an array, or an object with a "flows" key)
    Import {
        /// File to read
        file: PathBuf,
    },
    /// Export all flows as a JSON array
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a flow
    Delete {
        /// Flow ID
        id: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("flows=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let db_path = match cli.db {
        Some(path) => path,
        None => match config::default_db_path() {
            Ok(path) => path,
            Err(e) => {
                eprintln!("error: cannot determine database path: {e}");
                std::process::exit(1);
            }
        },
    };

    let result = match cli.command {
        Commands::Init => commands::init::run(&db_path),
        Commands::Serve { host, port } => commands::serve::run(ServerConfig {
            db_path,
            host,
            port,
        }),
        Commands::List => commands::list::run(&db_path, cli.json),
        Commands::Show { id } => commands::show::run(&db_path, &id, cli.json),
        Commands::Import { file } => commands::import::run(&db_path, &file, cli.json),
        Commands::Export { output } => commands::export::run(&db_path, output.as_deref()),
        Commands::Delete { id } => commands::delete::run(&db_path, &id),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
