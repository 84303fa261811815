// src/services/mod.rs
//
// Services Module - Orchestration Layer
//
// Services own the surface writes. Repositories only map documents.

pub mod catalog_service;
pub mod list_service;
pub mod seed_service;

#[cfg(test)]
mod test_support;


#[cfg(test)]
mod list_service_tests;

pub use catalog_service::{CatalogService, InitialLoadOutcome};
pub use list_service::ListService;
pub use seed_service::{SeedReport, SeedService};
