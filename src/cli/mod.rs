//! Command-line interface
//!
//! Argument parsing and command dispatch for the `manhunt` binary.

pub mod args;
pub mod commands;
