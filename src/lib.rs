//! # cli-scaffold
//!
//! Scaffolding for command-line applications built on clap. An application is
//! a tree of commands, a configuration object whose flags are declared in
//! named groups, and a fixed lifecycle run before user code:
//! bind → complete → validate → execute.
//!
//! ## Features
//!
//! - Command trees with per-command run callbacks
//! - Grouped flag declaration with `foo_bar` / `foo-bar` normalization
//! - Flags, TOML config files and defaults merged into one options object
//! - Strict validation with an opt-in lenient mode
//! - One reporting boundary that prints `Error: ...` and exits with status 1
//!
//! ## Example
//!
//! ```no_run
//! use cli_scaffold::cli::{Application, Command};
//!
//! let mut app = Application::builder("demo", "A demo application")
//!     .commands([Command::new("greet", "Say hello").with_run_func(|args| {
//!         println!("Hello, {}!", args.first().map_or("world", String::as_str));
//!         Ok(())
//!     })])
//!     .build()?;
//! app.execute();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod flag;

pub use cli::{Application, Command};
pub use crate::core::{Capabilities, CliOptions, NoOptions};
pub use error::{AppError, Result};
pub use flag::{FlagSet, NamedFlagSets};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with appropriate verbosity
pub fn setup_logging(debug: bool) -> anyhow::Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
