//! HTTP server command
//!
//! Opens (and if needed initializes) the message store, then serves the API
//! until Ctrl+C or SIGTERM.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use treehole_server::db::{create_pool, initialize};
use treehole_server::http::{run_server, ServerConfig};

use super::DatabaseArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Interface to bind to
    #[arg(long, env = "TREEHOLE_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 3000)]
    pub port: u16,

    #[command(flatten)]
    pub database: DatabaseArgs,

    /// Directory with the front-end (index.html etc.) to serve for non-API paths
    #[arg(long, env = "TREEHOLE_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,
}

impl ServeArgs {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: SocketAddr::new(self.host, self.port),
            cors_permissive: self.cors_permissive,
            static_dir: self.static_dir.clone(),
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.server_config();
    let database_path = &args.database.database_path;

    if let Some(dir) = &config.static_dir {
        if !dir.is_dir() {
            tracing::warn!(static_dir = %dir.display(), "static directory does not exist");
        }
    }

    tracing::info!(database = %database_path.display(), "Starting treehole server on {}", config.bind_addr);

    let pool = create_pool(database_path)
        .await
        .with_context(|| format!("Failed to open database at {}", database_path.display()))?;

    initialize(&pool)
        .await
        .context("Failed to initialize message store")?;

    // Run server (blocks until shutdown)
    run_server(pool, config).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn server_config_from_args() {
        let args = ServeArgs::parse_from([
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "8081",
            "--database-path",
            "/tmp/board.db",
            "--cors-permissive",
        ]);
        let config = args.server_config();

        assert_eq!(config.bind_addr, SocketAddr::from(([0, 0, 0, 0], 8081)));
        assert!(config.cors_permissive);
        assert!(config.static_dir.is_none());
        assert_eq!(args.database.database_path, PathBuf::from("/tmp/board.db"));
    }

    #[test]
    fn host_reads_namespaced_env() {
        let command = ServeArgs::command();
        let host = command
            .get_arguments()
            .find(|arg| arg.get_id() == "host")
            .unwrap();

        assert_eq!(host.get_env(), Some(std::ffi::OsStr::new("TREEHOLE_HOST")));
    }
}
