//! Command implementations

pub mod download;
pub mod probe;
