//! # Corkboard Shared Library
//!
//! This crate contains the shared types and business logic used by the
//! Corkboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD/bulk operations
//! - `auth`: Authentication (JWT, passwords) and the ownership guard
//! - `ordering`: Position allocation and reindexing for sibling collections
//! - `cache`: Time-bounded read cache for task lists
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod cache;
pub mod db;
pub mod models;
pub mod ordering;

/// Current version of the Corkboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
