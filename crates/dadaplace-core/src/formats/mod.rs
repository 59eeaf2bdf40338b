//! # Formats Module
//!
//! Serialization of whole wardrobes.
//!
//! This module contains:
//! - Binary snapshot format (header + postcard body), used by the file backend
//!   and by `export --format binary`
//! - JSON snapshot format, used by `export --format json`
//!
//! File I/O stays with the callers; these are pure transformations.

mod persistence;

pub use persistence::*;
