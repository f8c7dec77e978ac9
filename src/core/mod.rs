//! Core option lifecycle
//!
//! Contains the contract a configuration object implements and the fixed
//! bind → complete → validate sequence run before user logic.

pub mod lifecycle;
pub mod options;

pub use lifecycle::{Stage, ValidationMode};
pub use options::{Capabilities, CliOptions, NoOptions};
