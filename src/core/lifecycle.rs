//! The per-invocation option lifecycle
//!
//! `Unparsed → Parsed → (ConfigBound →)? (Completed →)? Validated → Executed`.
//! Any failing step moves straight to `Failed`; nothing is retried.

use crate::{
    config::ConfigStore,
    core::options::{Capabilities, CliOptions},
    error::{AppError, Result},
};
use clap::ArgMatches;
use figment::Figment;
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// Where an invocation got to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Unparsed,
    Parsed,
    ConfigBound,
    Completed,
    Validated,
    Executed,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unparsed => "unparsed",
            Self::Parsed => "parsed",
            Self::ConfigBound => "config-bound",
            Self::Completed => "completed",
            Self::Validated => "validated",
            Self::Executed => "executed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What to do when `validate` reports errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Abort the invocation with [`AppError::Validation`]
    #[default]
    Strict,
    /// Log each error as a warning and keep going
    Lenient,
}

/// Switches that shape one lifecycle run
#[derive(Debug, Clone, Copy)]
pub(crate) struct Settings<'a> {
    pub name: &'a str,
    pub version: Option<&'a str>,
    pub silence: bool,
    pub no_version: bool,
    pub no_config: bool,
    pub validation: ValidationMode,
    pub capabilities: Capabilities,
    /// Options as registered, the base every invocation binds over
    pub baseline: &'a Figment,
}

/// Drives one invocation from parsed flags to the run callback
pub(crate) struct Lifecycle<'a> {
    settings: Settings<'a>,
    stage: Stage,
}

impl<'a> Lifecycle<'a> {
    pub fn new(settings: Settings<'a>) -> Self {
        Self {
            settings,
            stage: Stage::Parsed,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run every stage, then hand the prepared options to `run`
    pub fn run<O, F>(
        &mut self,
        options: &mut O,
        command: &clap::Command,
        matches: &ArgMatches,
        run: F,
    ) -> Result<()>
    where
        O: CliOptions,
        F: FnOnce(&O) -> Result<()>,
    {
        let outcome = self
            .prepare(options, command, matches)
            .and_then(|()| run(&*options));
        match outcome {
            Ok(()) => self.advance(Stage::Executed),
            Err(ref e) => {
                debug!("Lifecycle failed after stage {}: {}", self.stage, e);
                self.stage = Stage::Failed;
            }
        }
        outcome
    }

    #[instrument(skip_all, fields(app = self.settings.name))]
    fn prepare<O: CliOptions>(
        &mut self,
        options: &mut O,
        command: &clap::Command,
        matches: &ArgMatches,
    ) -> Result<()> {
        let settings = self.settings;

        let store = if settings.no_config {
            ConfigStore::new()
        } else {
            ConfigStore::bind_flags(command, matches)?
        };
        *options = store.extract(settings.baseline)?;

        if !settings.no_config {
            self.advance(Stage::ConfigBound);

            if !settings.silence {
                if let Some(path) = store.config_file_used() {
                    info!("config file used: {}", path.display());
                }
            }
        }

        if !settings.silence && !settings.no_version {
            if let Some(version) = settings.version {
                info!("{} version {}", settings.name, version);
            }
        }

        if settings.capabilities.complete {
            options.complete().map_err(AppError::Complete)?;
            self.advance(Stage::Completed);
        }

        let errors = options.validate();
        if !errors.is_empty() {
            match settings.validation {
                ValidationMode::Strict => return Err(AppError::validation(errors)),
                ValidationMode::Lenient => {
                    for error in &errors {
                        warn!("invalid option: {}", error);
                    }
                }
            }
        }
        self.advance(Stage::Validated);

        if settings.capabilities.stringify && !settings.silence {
            info!("options: {}", options.stringify());
        }

        Ok(())
    }

    fn advance(&mut self, stage: Stage) {
        debug!("Lifecycle {} -> {}", self.stage, stage);
        self.stage = stage;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::baseline,
        flag::{FlagSet, NamedFlagSets},
    };
    use serde::{Deserialize, Serialize};
    use std::cell::Cell;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct CacheOptions {
        size: i64,
        #[serde(skip)]
        completed: bool,
        #[serde(skip)]
        stringified: Cell<bool>,
    }

    impl CliOptions for CacheOptions {
        const CAPABILITIES: Capabilities = Capabilities::NONE.with_complete();

        fn flags(&self) -> NamedFlagSets {
            let mut sets = NamedFlagSets::new();
            sets.flag_set("cache").int_flag("size", 16, "cache size");
            sets
        }

        fn validate(&self) -> Vec<anyhow::Error> {
            if self.size > 0 {
                Vec::new()
            } else {
                vec![anyhow::anyhow!("size must be positive")]
            }
        }

        fn complete(&mut self) -> anyhow::Result<()> {
            if self.size == 13 {
                anyhow::bail!("cannot complete");
            }
            self.completed = true;
            Ok(())
        }

        fn stringify(&self) -> String {
            self.stringified.set(true);
            format!("size={}", self.size)
        }
    }

    fn settings(validation: ValidationMode, baseline: &Figment) -> Settings<'_> {
        Settings {
            name: "cache",
            version: None,
            silence: true,
            no_version: true,
            no_config: false,
            validation,
            capabilities: CacheOptions::CAPABILITIES,
            baseline,
        }
    }

    fn command() -> clap::Command {
        let options = CacheOptions::default();
        let flags = options.flags();
        let args: Vec<_> = flags.iter().flat_map(FlagSet::args).cloned().collect();
        clap::Command::new("cache").args(args)
    }

    fn matches(argv: &[&str]) -> ArgMatches {
        command().try_get_matches_from(argv).unwrap()
    }

    #[test]
    fn test_successful_run_reaches_executed() {
        let mut options = CacheOptions::default();
        let base = baseline(&options);
        let mut lifecycle = Lifecycle::new(settings(ValidationMode::Strict, &base));
        let mut seen = 0;

        lifecycle
            .run(&mut options, &command(), &matches(&["cache", "--size", "32"]), |o| {
                seen = o.size;
                Ok(())
            })
            .unwrap();

        assert_eq!(seen, 32);
        assert!(options.completed);
        assert_eq!(lifecycle.stage(), Stage::Executed);
    }

    #[test]
    fn test_complete_failure_skips_later_stages() {
        let mut options = CacheOptions::default();
        let base = baseline(&options);
        let mut lifecycle = Lifecycle::new(settings(ValidationMode::Strict, &base));
        let mut called = false;

        let err = lifecycle
            .run(&mut options, &command(), &matches(&["cache", "--size", "13"]), |_| {
                called = true;
                Ok(())
            })
            .unwrap_err();

        assert_eq!(err.to_string(), "cannot complete");
        assert!(!called);
        assert_eq!(lifecycle.stage(), Stage::Failed);
    }

    #[test]
    fn test_strict_validation_blocks_run() {
        let mut options = CacheOptions::default();
        let base = baseline(&options);
        let mut lifecycle = Lifecycle::new(settings(ValidationMode::Strict, &base));
        let mut called = false;

        let err = lifecycle
            .run(&mut options, &command(), &matches(&["cache", "--size", "0"]), |_| {
                called = true;
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert!(!called);
    }

    #[test]
    fn test_lenient_validation_still_runs() {
        let mut options = CacheOptions::default();
        let base = baseline(&options);
        let mut lifecycle = Lifecycle::new(settings(ValidationMode::Lenient, &base));
        let mut called = false;

        lifecycle
            .run(&mut options, &command(), &matches(&["cache", "--size", "0"]), |_| {
                called = true;
                Ok(())
            })
            .unwrap();

        assert!(called);
        assert_eq!(lifecycle.stage(), Stage::Executed);
    }

    #[test]
    fn test_no_config_skips_binding() {
        let mut options = CacheOptions {
            size: 5,
            ..CacheOptions::default()
        };
        let base = baseline(&options);
        let mut lifecycle = Lifecycle::new(Settings {
            no_config: true,
            ..settings(ValidationMode::Strict, &base)
        });

        lifecycle
            .run(&mut options, &command(), &matches(&["cache", "--size", "99"]), |_| Ok(()))
            .unwrap();

        assert_eq!(options.size, 5);
    }

    #[test]
    fn test_each_run_starts_from_baseline() {
        let mut options = CacheOptions {
            size: 5,
            ..CacheOptions::default()
        };
        let base = baseline(&options);

        let mut lifecycle = Lifecycle::new(settings(ValidationMode::Strict, &base));
        lifecycle
            .run(&mut options, &command(), &matches(&["cache", "--size", "32"]), |_| Ok(()))
            .unwrap();
        assert_eq!(options.size, 32);

        let mut lifecycle = Lifecycle::new(Settings {
            no_config: true,
            ..settings(ValidationMode::Strict, &base)
        });
        lifecycle
            .run(&mut options, &command(), &matches(&["cache"]), |_| Ok(()))
            .unwrap();
        assert_eq!(options.size, 5);
    }

    #[test]
    fn test_stringify_runs_when_declared_and_not_silenced() {
        let mut options = CacheOptions::default();
        let base = baseline(&options);
        let mut lifecycle = Lifecycle::new(Settings {
            silence: false,
            capabilities: CacheOptions::CAPABILITIES.with_stringify(),
            ..settings(ValidationMode::Strict, &base)
        });

        lifecycle
            .run(&mut options, &command(), &matches(&["cache"]), |_| Ok(()))
            .unwrap();
        assert!(options.stringified.get());
    }

    #[test]
    fn test_stringify_skipped_when_silenced() {
        let mut options = CacheOptions::default();
        let base = baseline(&options);
        let mut lifecycle = Lifecycle::new(Settings {
            silence: true,
            capabilities: CacheOptions::CAPABILITIES.with_stringify(),
            ..settings(ValidationMode::Strict, &base)
        });

        lifecycle
            .run(&mut options, &command(), &matches(&["cache"]), |_| Ok(()))
            .unwrap();
        assert!(!options.stringified.get());
    }

    #[test]
    fn test_stringify_skipped_without_capability() {
        let mut options = CacheOptions::default();
        let base = baseline(&options);
        let mut lifecycle = Lifecycle::new(Settings {
            silence: false,
            ..settings(ValidationMode::Strict, &base)
        });

        lifecycle
            .run(&mut options, &command(), &matches(&["cache"]), |_| Ok(()))
            .unwrap();
        assert!(!options.stringified.get());
    }
}
