//! Core services for hierarchy building, aggregation, search and collaborators

pub mod aggregate;
pub mod ancestry;
pub mod directory;
pub mod filter;
pub mod links;
pub mod presence;
pub mod search;
pub mod tree;
