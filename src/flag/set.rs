//! A named, ordered collection of flags

use crate::flag::normalize::word_sep_normalize;
use clap::{Arg, ArgAction};

/// An ordered collection of flags sharing a group name
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    name: String,
    args: Vec<Arg>,
}

impl FlagSet {
    /// Create an empty flag set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Group name of this flag set
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flags in declaration order
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Add a fully configured flag
    pub fn add(&mut self, arg: Arg) -> &mut Self {
        self.args.push(arg);
        self
    }

    /// Add every flag of `other` whose name is not already declared here
    pub fn add_flag_set(&mut self, other: &FlagSet) -> &mut Self {
        for arg in &other.args {
            if self.lookup(arg.get_id().as_str()).is_none() {
                self.args.push(arg.clone());
            }
        }
        self
    }

    /// Find a flag by id or long name, ignoring word separator differences
    pub fn lookup(&self, name: &str) -> Option<&Arg> {
        let wanted = word_sep_normalize(name);
        self.args.iter().find(|arg| {
            word_sep_normalize(arg.get_id().as_str()) == wanted
                || arg.get_long().is_some_and(|long| word_sep_normalize(long) == wanted)
        })
    }

    /// Declare a boolean switch, off unless given
    pub fn bool_flag(&mut self, name: &str, usage: &str) -> &mut Self {
        self.add(
            Arg::new(name.to_string())
                .long(name.to_string())
                .action(ArgAction::SetTrue)
                .help(usage.to_string()),
        )
    }

    /// Declare a string-valued flag; an empty default leaves the flag unset
    pub fn string_flag(&mut self, name: &str, default: &str, usage: &str) -> &mut Self {
        let mut arg = Arg::new(name.to_string())
            .long(name.to_string())
            .action(ArgAction::Set)
            .help(usage.to_string());
        if !default.is_empty() {
            arg = arg.default_value(default.to_string());
        }
        self.add(arg)
    }

    /// Declare an integer-valued flag
    pub fn int_flag(&mut self, name: &str, default: i64, usage: &str) -> &mut Self {
        self.add(
            Arg::new(name.to_string())
                .long(name.to_string())
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(i64))
                .default_value(default.to_string())
                .help(usage.to_string()),
        )
    }

    /// Declare a repeatable, comma separated list flag
    pub fn string_slice_flag(&mut self, name: &str, usage: &str) -> &mut Self {
        self.add(
            Arg::new(name.to_string())
                .long(name.to_string())
                .action(ArgAction::Append)
                .value_delimiter(',')
                .help(usage.to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_keep_declaration_order() {
        let mut fs = FlagSet::new("server");
        fs.string_flag("host", "127.0.0.1", "bind address")
            .int_flag("port", 8080, "listen port")
            .bool_flag("tls", "serve over TLS");

        let ids: Vec<_> = fs.args().iter().map(|a| a.get_id().as_str()).collect();
        assert_eq!(ids, ["host", "port", "tls"]);
        assert_eq!(fs.name(), "server");
    }

    #[test]
    fn test_lookup_ignores_word_separator() {
        let mut fs = FlagSet::new("misc");
        fs.bool_flag("dry-run", "only print what would happen");

        assert!(fs.lookup("dry_run").is_some());
        assert!(fs.lookup("dry-run").is_some());
        assert!(fs.lookup("dryrun").is_none());
    }

    #[test]
    fn test_add_flag_set_skips_existing_names() {
        let mut global = FlagSet::new("global");
        global.bool_flag("verbose", "chatty output");

        let mut legacy = FlagSet::new("legacy");
        legacy
            .bool_flag("verbose", "legacy verbose")
            .string_flag("log-dir", "", "where logs go");

        global.add_flag_set(&legacy);
        assert_eq!(global.len(), 2);
        assert!(global.lookup("log_dir").is_some());
    }
}
