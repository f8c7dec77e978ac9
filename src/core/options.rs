//! The contract implemented by configuration objects

use crate::flag::NamedFlagSets;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Optional behaviors an options type supports
///
/// Declared once per type and recorded when the options are registered with an
/// application, so the lifecycle never has to probe for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub complete: bool,
    pub stringify: bool,
}

impl Capabilities {
    pub const NONE: Self = Self {
        complete: false,
        stringify: false,
    };

    #[must_use]
    pub const fn with_complete(mut self) -> Self {
        self.complete = true;
        self
    }

    #[must_use]
    pub const fn with_stringify(mut self) -> Self {
        self.stringify = true;
        self
    }
}

/// A configuration object that parsed flags are deserialized into
///
/// `flags` and `validate` are always required. `complete` and `stringify` are
/// only called when the matching capability is declared in [`CAPABILITIES`].
///
/// [`CAPABILITIES`]: CliOptions::CAPABILITIES
pub trait CliOptions: Serialize + DeserializeOwned + 'static {
    const CAPABILITIES: Capabilities = Capabilities::NONE;

    /// All flags this configuration understands, grouped by name
    fn flags(&self) -> NamedFlagSets;

    /// Every problem with the current values; empty means valid
    fn validate(&self) -> Vec<anyhow::Error>;

    /// Derive computed fields after flags have been bound
    fn complete(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Human readable summary of the current values
    fn stringify(&self) -> String {
        String::new()
    }
}

/// Stand-in for applications that take no configuration object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoOptions {}

impl CliOptions for NoOptions {
    fn flags(&self) -> NamedFlagSets {
        NamedFlagSets::new()
    }

    fn validate(&self) -> Vec<anyhow::Error> {
        Vec::new()
    }
}
