//! Command-line interface module
//!
//! Provides the command tree, the application root and the process boundary
//! that reports failures.

pub mod app;
pub mod args;
pub mod command;
pub mod help;
pub mod output;

pub use app::{AppBuilder, Application, RunFunc};
pub use args::{PositionalArgs, arbitrary_args, exact_args, maximum_args, minimum_args, no_args};
pub use command::{Command, CommandRunFunc, Node};
pub use output::{exit_with_error, write_error};
