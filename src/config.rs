//! Configuration binding
//!
//! Parsed flags are bound into a name-addressable [`ConfigStore`] and the store
//! is then deserialized into the options object. Keys are the normalized long
//! flag names; dotted names nest (`server.port` is `[server] port` in a file).
//!
//! Precedence, lowest first: the baseline options values, flag defaults, the config
//! file, flags given on the command line.

use crate::{
    error::{AppError, Result},
    flag::CONFIG_FLAG,
};
use clap::{Arg, ArgAction, ArgMatches, parser::ValueSource};
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// A value read from one parsed flag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Count(u8),
    Single(String),
    Many(Vec<String>),
}

/// Name-addressable view over bound flags and the config file
#[derive(Debug)]
pub struct ConfigStore {
    defaults: Figment,
    explicit: Figment,
    config_file: Option<PathBuf>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self {
            defaults: Figment::new(),
            explicit: Figment::new(),
            config_file: None,
        }
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every flag of `command` that has a value in `matches`
    #[instrument(skip_all, fields(command = command.get_name()))]
    pub fn bind_flags(command: &clap::Command, matches: &ArgMatches) -> Result<Self> {
        let mut store = Self::new();

        for arg in command.get_arguments() {
            let id = arg.get_id().as_str();
            if arg.is_positional() || id == CONFIG_FLAG {
                continue;
            }
            let Some(value) = flag_value(arg, matches)? else {
                continue;
            };
            let key = arg.get_long().unwrap_or(id).to_string();
            debug!("Binding flag {} = {:?}", key, value);
            match matches.value_source(id) {
                Some(ValueSource::DefaultValue) => store.set_default(&key, value),
                Some(_) => store.set(&key, value),
                None => {}
            }
        }

        if let Some(path) = matches
            .try_get_one::<String>(CONFIG_FLAG)
            .ok()
            .flatten()
        {
            store.set_config_file(path)?;
        }

        Ok(store)
    }

    /// Set a value with the precedence of a flag default
    pub fn set_default(&mut self, key: &str, value: FlagValue) {
        let defaults = std::mem::replace(&mut self.defaults, Figment::new());
        self.defaults = defaults.merge(Serialized::default(key, value));
    }

    /// Set a value with the precedence of an explicitly given flag
    pub fn set(&mut self, key: &str, value: FlagValue) {
        let explicit = std::mem::replace(&mut self.explicit, Figment::new());
        self.explicit = explicit.merge(Serialized::default(key, value));
    }

    /// Layer a TOML file between flag defaults and explicit flags
    pub fn set_config_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AppError::config_file(
                format!("config file not found: {}", path.display()),
                path,
            ));
        }
        self.config_file = Some(path.to_path_buf());
        Ok(())
    }

    /// The config file in use, if one was given
    pub fn config_file_used(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Whether a value is bound under `key`, from any layer
    pub fn contains(&self, key: &str) -> bool {
        self.figment().contains(key)
    }

    /// Read a single bound value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.figment()
            .extract_inner_lossy(key)
            .map_err(AppError::unmarshal)
    }

    /// Deserialize the bound values over `options`, keeping unbound fields as they are
    pub fn unmarshal<O>(&self, options: &mut O) -> Result<()>
    where
        O: Serialize + DeserializeOwned,
    {
        *options = self.extract(&baseline(&*options))?;
        Ok(())
    }

    /// Deserialize the bound values layered over `baseline`
    #[instrument(skip_all)]
    pub fn extract<O: DeserializeOwned>(&self, baseline: &Figment) -> Result<O> {
        baseline
            .clone()
            .merge(self.figment())
            .extract_lossy()
            .map_err(AppError::unmarshal)
    }

    fn figment(&self) -> Figment {
        let mut figment = self.defaults.clone();
        if let Some(path) = &self.config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(self.explicit.clone())
    }
}

/// Snapshot `options` as the lowest configuration layer
pub fn baseline<O: Serialize>(options: &O) -> Figment {
    Figment::from(Serialized::defaults(options))
}

fn flag_value(arg: &Arg, matches: &ArgMatches) -> Result<Option<FlagValue>> {
    let id = arg.get_id().as_str();
    let value = match arg.get_action() {
        ArgAction::SetTrue | ArgAction::SetFalse => matches
            .try_get_one::<bool>(id)
            .map_err(|e| AppError::bind(format!("flag {id} is not a switch"), e))?
            .copied()
            .map(FlagValue::Bool),
        ArgAction::Count => matches
            .try_get_one::<u8>(id)
            .map_err(|e| AppError::bind(format!("flag {id} is not a counter"), e))?
            .copied()
            .map(FlagValue::Count),
        ArgAction::Set => raw_values(matches, id)?
            .and_then(|mut values| values.pop())
            .map(FlagValue::Single),
        ArgAction::Append => raw_values(matches, id)?.map(FlagValue::Many),
        _ => None,
    };
    Ok(value)
}

fn raw_values(matches: &ArgMatches, id: &str) -> Result<Option<Vec<String>>> {
    let raw = matches
        .try_get_raw(id)
        .map_err(|e| AppError::bind(format!("flag {id} could not be read"), e))?;
    Ok(raw.map(|values| {
        values
            .map(|v| v.to_string_lossy().into_owned())
            .collect()
    }))
}
