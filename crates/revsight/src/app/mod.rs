//! Application layer orchestrating domain logic and infrastructure.

pub mod commands;
pub mod content;
pub mod context;
pub mod host;
pub mod remote;
pub mod revisions;
