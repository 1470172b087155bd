//! Command-line interface.

pub mod args;
pub mod generate;
pub mod serve;

pub use args::{Cli, Commands};
