//! Local durable storage for scanner sessions

mod connection;
mod local_store;
mod migrations;

pub use connection::Database;
pub use local_store::{CacheKey, EventCache, LibSqlLocalStore, LocalStore};
