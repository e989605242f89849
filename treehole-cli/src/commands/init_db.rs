//! Database bootstrap command

use anyhow::{Context, Result};
use clap::Parser;

use treehole_server::db::{create_pool, initialize};

use super::DatabaseArgs;

/// Arguments for the init-db command
#[derive(Parser, Debug)]
pub struct InitDbArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Create the schema and seed sample messages into an empty store
pub async fn run_init_db(args: InitDbArgs) -> Result<()> {
    let path = &args.database.database_path;

    let pool = create_pool(path)
        .await
        .with_context(|| format!("Failed to open database at {}", path.display()))?;

    let seeded = initialize(&pool)
        .await
        .context("Failed to initialize message store")?;
    pool.close().await;

    if seeded > 0 {
        println!("Initialized {} with {} sample messages", path.display(), seeded);
    } else {
        println!("{} already has messages, nothing seeded", path.display());
    }

    Ok(())
}
