//! Docent CLI binary entry point.

use clap::Parser;
use docent::cli::{Cli, Commands, LibraryCommands};
use docent::types::AgentStatus;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Explain(args) => match docent::cli::explain::handle_explain(args).await {
            Ok(AgentStatus::Failed) => std::process::exit(1),
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        },
        Commands::Library(args) => match args.command {
            LibraryCommands::List(list) => docent::cli::library::handle_list(args.store, list),
            LibraryCommands::Add(add) => docent::cli::library::handle_add(args.store, add),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
