//! # driftsync Store
//!
//! Local store contract and implementations for driftsync.
//!
//! This crate provides the lowest-level persistence abstraction for the
//! sync engine. Stores are **opaque keyed byte stores** - they do not
//! interpret the records they hold.
//!
//! ## Design Principles
//!
//! - Stores are simple keyed record stores (get, put, delete, keys)
//! - Four fixed logical collections, each an independent keyspace
//! - `put` is an atomic whole-record replace, never a partial write
//! - Must be `Send + Sync` for concurrent access
//! - The engine owns all record encoding
//!
//! ## Available Stores
//!
//! - [`MemoryStore`] - For testing and ephemeral sessions
//!
//! ## Example
//!
//! ```rust
//! use driftsync_store::{Collection, LocalStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.put(Collection::EditHistory, "file-1", vec![1, 2, 3]).unwrap();
//! assert_eq!(store.keys(Collection::EditHistory).unwrap(), vec!["file-1"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::{Collection, LocalStore};
