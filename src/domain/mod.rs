//! # Domain Layer
//!
//! Core definitions, types, and traits that define the business domain of the application.
//! Independent of specific chat platforms, serving as the contract for other layers.

pub mod command;
pub mod config;
pub mod paths;
pub mod petrinet;
pub mod traits;
pub mod types;
