//! Storage abstractions backing the wallet's persisted state.
//!
//! The wallet persists exactly one encrypted seed record plus a handful of
//! small scalar records (active account index, local account count, attached
//! hardware key). Both the in-memory backend used by tests and the optional
//! Sled-backed store implement the [`Store`] trait.

mod error;
mod memory;
#[cfg(feature = "sled")] mod sled_store;
mod traits;

pub use error::StoreError;
pub use memory::MemoryStore;
#[cfg(feature = "sled")] pub use sled_store::SledStore;
pub use traits::{BatchOp, ColumnId, Store, WriteBatch};
