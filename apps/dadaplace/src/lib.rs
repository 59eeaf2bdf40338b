//! # DaDaPlace Library
//!
//! This library exposes the DaDaPlace application modules for testing and
//! integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod api;
pub mod cli;
pub mod config;
pub mod report;

// Re-export dadaplace_core for convenience
pub use dadaplace_core;
