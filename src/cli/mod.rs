//! CLI entry point for Docent.

pub mod explain;
pub mod library;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Docent document explainer CLI
#[derive(Parser, Debug)]
#[command(name = "docent", version, about = "Docent document explainer agent CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a captured region to the agent and follow the job
    Explain(ExplainArgs),
    /// Manage the local upload library
    Library(LibraryArgs),
}

/// Arguments for the `explain` subcommand.
#[derive(Parser, Debug)]
pub struct ExplainArgs {
    /// PNG image of the captured region
    #[arg(short, long)]
    pub image: PathBuf,

    /// What to explain about the region
    #[arg(short, long)]
    pub prompt: String,

    /// Override DOCENT_API_BASE_URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Override DOCENT_WS_BASE_URL
    #[arg(long)]
    pub ws_url: Option<String>,
}

/// Arguments for the `library` subcommand group.
#[derive(Parser, Debug)]
pub struct LibraryArgs {
    /// Library file (defaults to ~/.docent/library_uploads.json)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: LibraryCommands,
}

/// Library subcommands.
#[derive(Subcommand, Debug)]
pub enum LibraryCommands {
    /// List uploads, optionally filtered
    List(ListArgs),
    /// Add a PDF to the library
    Add(AddArgs),
}

/// Arguments for `docent library list`.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Match against title, topic, and author names
    #[arg(short, long)]
    pub query: Option<String>,
}

/// Arguments for `docent library add`.
#[derive(Parser, Debug)]
pub struct AddArgs {
    /// PDF file to upload
    pub pdf: PathBuf,

    /// Topic (required)
    #[arg(long)]
    pub topic: String,

    /// Title (defaults to the file name)
    #[arg(long)]
    pub title: Option<String>,

    /// Author as "Name Surname"; repeatable
    #[arg(long = "author")]
    pub authors: Vec<String>,

    #[arg(long)]
    pub publisher: Option<String>,

    #[arg(long)]
    pub year: Option<String>,
}
