//! Progress tracking: the section/task status tree and its aggregation rules.

pub mod aggregate;
pub mod store;

pub use aggregate::aggregate_status;
pub use store::{NextTask, ProgressStore};
