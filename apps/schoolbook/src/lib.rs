//! # Schoolbook Library
//!
//! This library exposes the Schoolbook CLI modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod cli;
pub mod config;
pub mod render;
pub mod shell;

// Re-export the core and client crates for convenience
pub use schoolbook_client;
pub use schoolbook_core;
