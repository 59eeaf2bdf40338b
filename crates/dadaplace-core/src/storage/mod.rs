//! # Storage Module
//!
//! Disk-backed wardrobe storage using redb.
//!
//! Uses redb embedded database for:
//! - ACID transactions (one write transaction per mutation)
//! - Crash safety (copy-on-write B-trees)
//! - Records encoded with postcard, list-valued fields included

mod redb_store;

pub use redb_store::RedbStore;
