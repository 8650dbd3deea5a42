//! Storage layer for Tiffin
//!
//! This crate provides the persistence adapter consumed by the application
//! state store: an asynchronous string-keyed snapshot store with a durable
//! sled-backed implementation and an in-memory one for tests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod keys;
pub mod kv;
pub mod memory;

pub use adapter::{Result, StorageAdapter, StorageError};
pub use kv::{KvConfig, KvStore};
pub use memory::MemoryStore;
