//! Core types shared by the commands.

pub mod errors;
pub mod model;
