//! Command line front end

pub mod args;
pub mod output;
