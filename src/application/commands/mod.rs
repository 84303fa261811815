// src/application/commands/mod.rs
//
// Command Handlers
//
// ARCHITECTURE:
// - Commands are thin adapters between the presentation layer and services
// - Commands accept DTOs, return DTOs
// - Commands NEVER contain business logic

pub mod catalog_commands;
pub mod list_commands;

pub use catalog_commands::*;
pub use list_commands::*;
