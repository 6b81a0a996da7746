//! Persistence: key-value stores, the expiring cache, directory sources and snapshots

pub mod cache;
pub mod snapshot;
pub mod source;
pub mod store;
