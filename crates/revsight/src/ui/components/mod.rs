//! Collection of reusable TUI components.

pub mod diff;
pub mod picker;
