//! Infrastructure layer for Launchpad.
//!
//! Contains implementations of the ports defined in `launchpad-core`:
//! file-backed and in-memory byte stores, shell-command step triggers, and
//! configuration loading.

pub mod config;
pub mod filesystem;
pub mod store;
pub mod trigger;
