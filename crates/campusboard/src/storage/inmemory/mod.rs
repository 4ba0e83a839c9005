//! In-memory storage backend.
//!
//! Implements [`ItemStore`](campusboard_core::storage::ItemStore) and
//! [`BlobStore`](campusboard_core::storage::BlobStore) over maps wrapped in
//! `Arc<RwLock<_>>`. Useful for development and for tests, where the page size
//! can be shrunk to force callers through their cursor loops.
//!
//! # Example
//!
//! ```rust,ignore
//! use campusboard::storage::inmemory::InMemoryStore;
//!
//! let store = InMemoryStore::with_page_size(2);
//! ```

mod blobs;
mod store;

pub use blobs::InMemoryBlobStore;
pub use store::InMemoryStore;
