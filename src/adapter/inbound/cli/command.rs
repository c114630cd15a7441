//! Command-line interface definitions.
//!
//! Defines the CLI structure for the storeforge application using `clap`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Owner recorded for stores created from the command line.
pub const DEFAULT_OWNER: &str = "local";

/// Provision and manage isolated WooCommerce stores on Kubernetes
#[derive(Parser, Debug)]
#[command(name = "storeforge")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the storeforge CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the WebSocket log relay server (foreground)
    Serve(ServeArgs),

    /// Register a new store
    Create(CreateArgs),

    /// List stores, newest first
    List(ListArgs),

    /// Show one store
    Show(StoreIdArg),

    /// Provision a store, streaming its deployment log
    Provision(StoreIdArg),

    /// Send a failed store back to provisioning
    Retry(StoreIdArg),

    /// Tear a store down and remove its record
    Delete(StoreIdArg),
}

/// Arguments for the `serve` subcommand.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to listen on (overrides `server.bind`).
    #[arg(long)]
    pub bind: Option<String>,
}

/// Arguments for the `create` subcommand.
#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Store name; becomes the release name and hostname label.
    pub name: String,

    /// Owner of the new store.
    #[arg(long, default_value = DEFAULT_OWNER)]
    pub owner: String,
}

/// Arguments for the `list` subcommand.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only show stores of this owner.
    #[arg(long)]
    pub owner: Option<String>,
}

/// Shared argument struct for commands addressing one store.
#[derive(Parser, Debug)]
pub struct StoreIdArg {
    /// Store id (UUID).
    pub id: String,
}
