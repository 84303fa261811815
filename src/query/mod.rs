// src/query/mod.rs
//
// Query composition: filters in, one backend query out.

pub mod builder;

pub use builder::{CatalogQuery, QueryBuilder};
