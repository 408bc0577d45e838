//! Terminal front end.

pub mod app;
pub mod components;
