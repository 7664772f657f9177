//! Command handlers for the CLI.

pub mod common;
pub mod config;
pub mod fetch;
pub mod run;
pub mod stitch;
