//! Flags every application gets for free

use clap::{Arg, ArgAction};

/// Group that carries flags shared by the whole application
pub const GLOBAL_GROUP: &str = "global";
pub const HELP_FLAG: &str = "help";
pub const CONFIG_FLAG: &str = "config";
pub const VERSION_FLAG: &str = "version";
/// Id of the positional argument list attached to runnable nodes
pub const POSITIONAL_ARGS: &str = "args";

/// `-h/--help` for the named command
pub fn help_flag(name: &str) -> Arg {
    Arg::new(HELP_FLAG)
        .short('h')
        .long(HELP_FLAG)
        .action(ArgAction::Help)
        .help(format!("help for {name}"))
}

/// `-c/--config FILE`
pub fn config_flag(name: &str) -> Arg {
    Arg::new(CONFIG_FLAG)
        .short('c')
        .long(CONFIG_FLAG)
        .value_name("FILE")
        .action(ArgAction::Set)
        .help(format!(
            "Read configuration for {name} from the specified FILE, TOML format is supported."
        ))
}

/// `-V/--version`
pub fn version_flag() -> Arg {
    Arg::new(VERSION_FLAG)
        .short('V')
        .long(VERSION_FLAG)
        .action(ArgAction::Version)
        .help("Print version information and quit.")
}

/// Catch-all positional list handed to run callbacks
pub fn positional_args() -> Arg {
    Arg::new(POSITIONAL_ARGS)
        .value_name("ARGS")
        .num_args(1..)
        .action(ArgAction::Append)
        .hide(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_flag_names_command() {
        let arg = help_flag("demo");
        assert_eq!(arg.get_short(), Some('h'));
        assert_eq!(arg.get_long(), Some("help"));
        assert_eq!(
            arg.get_help().map(ToString::to_string).as_deref(),
            Some("help for demo")
        );
    }

    #[test]
    fn test_positional_args_accepts_any_count() {
        let cmd = clap::Command::new("demo").arg(positional_args());
        let matches = cmd
            .clone()
            .try_get_matches_from(["demo", "a", "b"])
            .unwrap();
        let values: Vec<_> = matches
            .get_many::<String>(POSITIONAL_ARGS)
            .unwrap()
            .cloned()
            .collect();
        assert_eq!(values, ["a", "b"]);
        assert!(cmd.try_get_matches_from(["demo"]).is_ok());
    }
}
