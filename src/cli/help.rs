//! The `help [COMMAND]...` node added to applications with subcommands

use crate::{
    error::Result,
    flag::builtin::{POSITIONAL_ARGS, help_flag, positional_args},
};
use clap::ArgMatches;
use std::io::{self, Write};

pub const HELP_COMMAND: &str = "help";

/// Build the help subcommand for application `name`
pub(crate) fn help_command(name: &str) -> clap::Command {
    clap::Command::new(HELP_COMMAND)
        .about("Help about any command.")
        .long_about(format!(
            "Help provides help for any command in the application.\n\
             Simply type {name} help [path to command] for full details."
        ))
        .disable_help_flag(true)
        .disable_help_subcommand(true)
        .disable_version_flag(true)
        .arg(positional_args().value_name("COMMAND").hide(false))
        .arg(help_flag(HELP_COMMAND))
}

/// Print help for the command path in `matches`, or the root when it is empty
pub(crate) fn run(root: &clap::Command, matches: &ArgMatches) -> Result<()> {
    let path: Vec<String> = matches
        .try_get_many::<String>(POSITIONAL_ARGS)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let mut target = root;
    for segment in &path {
        match target.find_subcommand(segment) {
            Some(found) => target = found,
            None => {
                let mut out = io::stdout().lock();
                writeln!(out, "Unknown help topic {segment:?}")?;
                writeln!(out, "{}", root.clone().render_usage())?;
                return Ok(());
            }
        }
    }
    target.clone().print_help()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_command_takes_a_path() {
        let cmd = help_command("demo");
        let matches = cmd
            .clone()
            .try_get_matches_from(["help", "remote", "add"])
            .unwrap();
        let path: Vec<_> = matches
            .get_many::<String>(POSITIONAL_ARGS)
            .unwrap()
            .cloned()
            .collect();
        assert_eq!(path, ["remote", "add"]);
        assert!(
            cmd.get_long_about()
                .map(ToString::to_string)
                .unwrap_or_default()
                .contains("demo help")
        );
    }
}
