//! `StepTrigger` implementations.

pub mod command;

pub use command::{CommandTrigger, register_command_triggers};
