//! # Corkboard API Server Library
//!
//! This library provides the core functionality for the Corkboard API
//! server: a kanban backend with ownership-checked project/board/task
//! resources and position-based ordering.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
