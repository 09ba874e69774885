//! Homebook CLI
//!
//! Command-line front end over the homebook engine

use clap::{Parser, Subcommand};
use homebook_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "homebook")]
#[command(about = "Homebook - edit, publish and restore guest books", long_about = None)]
struct Cli {
    /// SQLite database path
    #[arg(long, global = true, env = "HOMEBOOK_DB", default_value = ".homebook/store.db")]
    db: String,

    /// Log output: pretty or json
    #[arg(long, global = true, env = "HOMEBOOK_LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    /// Acting user id
    #[arg(long, global = true, env = "HOMEBOOK_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Property operations
    Property(commands::book::PropertyArgs),
    /// Book lifecycle and read-only views
    Book(commands::book::BookArgs),
    /// Section, subsection and media editing
    Content(commands::content::ContentArgs),
    /// Publish, unpublish or restore a book
    Publish(commands::publish::PublishArgs),
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init(Profile::from_format(&cli.log_format));

    let result = commands::Context::open(&cli.db, cli.user).and_then(|mut ctx| match cli.command {
        Commands::Property(args) => commands::book::execute_property(args, &mut ctx),
        Commands::Book(args) => commands::book::execute(args, &mut ctx),
        Commands::Content(args) => commands::content::execute(args, &mut ctx),
        Commands::Publish(args) => commands::publish::execute(args, &mut ctx),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
