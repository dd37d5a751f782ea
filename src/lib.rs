//! # Daedalus
//!
//! A Petri-net workflow engine driving conversational bots:
//! - Domain: Petri-net core, commands, configuration and types
//! - Application: Scenario building, dispatch, maintenance gate
//! - Infrastructure: Console provider, token store, logging
//! - Interface: CLI definitions and handlers

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;
pub mod strings;
