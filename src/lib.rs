//! Organization Directory Library
//!
//! This library provides the framework-independent core of an organization
//! directory: building the company hierarchy from a flat list, aggregating
//! headcounts bottom-up, ancestor/descendant closures, tree filtering, an
//! expiring cache over a pluggable key-value store, and a view state
//! synchronizer that restores and persists UI state across reloads.

pub mod cli;
pub mod io;
pub mod models;
pub mod services;
pub mod sync;

pub use models::{Employee, OrgTreeNode, OrgUnit, UiStateSnapshot, ViewMode};
pub use services::directory::Directory;
pub use services::tree::{OrgForest, OrphanPolicy};
pub use sync::{Action, LoadState, SyncOptions, ViewSynchronizer};

use std::result;

/// Custom error type for the library
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    InvalidInput(String),
    Parse(String),
    Auth(String),
    Snapshot(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Error::Parse(msg) => write!(f, "Parse error: {msg}"),
            Error::Auth(msg) => write!(f, "Authentication failed: {msg}"),
            Error::Snapshot(msg) => write!(f, "Snapshot error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

pub type Result<T> = result::Result<T, Error>;
