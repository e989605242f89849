//! Subcommand implementations

pub mod init_db;
pub mod serve;

pub use init_db::{run_init_db, InitDbArgs};
pub use serve::{run_serve, ServeArgs};

use std::path::PathBuf;

/// Default database location, relative to the working directory
pub const DEFAULT_DATABASE_PATH: &str = "data/messages.db";

/// Database file argument shared by every subcommand that opens the store
#[derive(clap::Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Path to the SQLite database file (created if missing)
    #[arg(long, env = "TREEHOLE_DATABASE_PATH", default_value = DEFAULT_DATABASE_PATH)]
    pub database_path: PathBuf,
}
