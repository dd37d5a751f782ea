//! # Interface Layer
//!
//! The command-line surface: argument definitions and the handlers behind
//! each subcommand.

pub mod cli;
pub mod commands;
