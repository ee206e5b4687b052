//! Snapshot persistence.
//!
//! Defines the `ByteStore` port and the `PersistenceAdapter` that mirrors
//! progress and generated content into it. Implementations of the port live
//! in launchpad-infra.

pub mod adapter;
pub mod byte_store;

pub use adapter::{PersistenceAdapter, RestoredState, SaveOutcome};
pub use byte_store::ByteStore;
