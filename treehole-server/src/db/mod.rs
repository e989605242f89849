//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - Connection pool (max 5 connections) - no Arc<Mutex<Connection>>
//! - One statement per operation; `RETURNING` instead of write-then-read
//! - No secondary indexes or caches

pub mod error;
pub mod pool;
pub mod repos;
pub mod schema;

pub use error::DbError;
pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
pub use schema::initialize;
