//! treehole-server: anonymous class message board
//!
//! SQLite-backed storage for short anonymous messages and the JSON API
//! that lists, posts, likes and deletes them.

pub mod db;
pub mod http;
pub mod models;

pub use db::{create_pool, initialize, DbError};
pub use http::{build_router, run_server, ServerConfig, ServerError};
