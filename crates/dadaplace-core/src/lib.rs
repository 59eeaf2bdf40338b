//! # DaDaPlace Core
//!
//! The deterministic wardrobe engine behind DaDaPlace.
//!
//! This crate holds everything that does not need a runtime:
//! - Domain types for clothing items, outfit looks and community records
//! - The `WardrobeStore` persistence boundary with in-memory and redb backends
//! - The outfit recommendation engine (filter, combine, score, explain)
//! - Wardrobe gap analysis
//! - Snapshot formats for export and import
//!
//! ## Determinism
//!
//! All collections are `BTreeMap`/`BTreeSet`, all scores are integers and
//! wall-clock time only enters through the [`Clock`] trait. Given the same
//! catalog and request the engine always returns the same looks in the same
//! order.

pub mod clock;
pub mod community;
pub mod engine;
pub mod error;
pub mod formats;
pub mod primitives;
pub mod storage;
pub mod store;
pub mod stubs;
pub mod types;
pub mod wardrobe;

pub use clock::{Clock, ManualClock, SystemClock};
pub use community::FeedOrder;
pub use engine::{RecommendationEngine, TemperatureBand};
pub use error::{DadaError, Result};
pub use storage::RedbStore;
pub use store::{MemoryStore, StoreBackend, WardrobeStore};
pub use types::*;
pub use wardrobe::{ItemQuery, Wardrobe, WardrobeStats};
