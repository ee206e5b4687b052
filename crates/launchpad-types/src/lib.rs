//! Shared domain types for Launchpad.
//!
//! This crate contains the domain types used across the Launchpad workspace:
//! the task catalog, progress and step statuses, generated content records,
//! configuration, events, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod catalog;
pub mod config;
pub mod content;
pub mod error;
pub mod event;
pub mod progress;
pub mod step;
