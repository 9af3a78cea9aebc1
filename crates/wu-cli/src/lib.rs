//! Web usage tracker CLI library.
//!
//! This crate provides the CLI interface and the browser event adapter that
//! feeds the usage accumulator.

mod cli;
pub mod commands;
mod config;
pub mod events;

pub use cli::{Cli, Commands};
pub use config::Config;
