//! Command-line interface for Boreas

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
