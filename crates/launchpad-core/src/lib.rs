//! Business logic and port definitions for Launchpad.
//!
//! This crate defines the progress model, navigation gate, content ledger,
//! persistence port, and step orchestrator. It depends only on
//! `launchpad-types` -- never on `launchpad-infra` or any filesystem/process
//! crate.

pub mod catalog;
pub mod event;
pub mod ledger;
pub mod navigation;
pub mod orchestrator;
pub mod persistence;
pub mod progress;
pub mod session;

pub use catalog::{Catalog, SectionRef, TaskRef};
pub use session::WorkflowSession;
