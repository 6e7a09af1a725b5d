//! In-memory document caches
//!
//! - `DocumentStore`: canonical documents with verification, per path
//! - `OverlayCache`: translated copies, per (path, language)
//!
//! Both live for the process lifetime and are safe under concurrent
//! readers and writers on independent keys.

mod document_store;
mod overlay_cache;

pub use document_store::{DocumentStore, StoreEntry};
pub use overlay_cache::{OverlayCache, OverlayEntry};
