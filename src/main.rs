#![allow(clippy::cargo_common_metadata)]
use anyhow::Result;
use cli_scaffold::{
    Capabilities, CliOptions, NamedFlagSets, setup_logging,
    cli::{Application, Command},
    flag::{GLOBAL_GROUP, normalize_args},
};
use serde::{Deserialize, Serialize};

/// Options for the greeting printed by the root command
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct GreetOptions {
    name: String,
    greeting_word: String,
    times: i64,
    shout: bool,
    debug: bool,
}

impl CliOptions for GreetOptions {
    const CAPABILITIES: Capabilities = Capabilities::NONE.with_complete().with_stringify();

    fn flags(&self) -> NamedFlagSets {
        let mut sets = NamedFlagSets::new();
        sets.flag_set("greeting")
            .string_flag("name", "", "Who to greet (defaults to world)")
            .string_flag("greeting-word", "Hello", "Word used to greet")
            .int_flag("times", 1, "How many times to greet")
            .bool_flag("shout", "Greet in upper case");
        sets.flag_set(GLOBAL_GROUP)
            .bool_flag("debug", "Enable debug output");
        sets
    }

    fn validate(&self) -> Vec<anyhow::Error> {
        let mut errors = Vec::new();
        if !(1..=10).contains(&self.times) {
            errors.push(anyhow::anyhow!(
                "times must be between 1 and 10, got {}",
                self.times
            ));
        }
        if self.greeting_word.trim().is_empty() {
            errors.push(anyhow::anyhow!("greeting-word must not be empty"));
        }
        errors
    }

    fn complete(&mut self) -> Result<()> {
        if self.name.is_empty() {
            self.name = "world".to_string();
        }
        Ok(())
    }

    fn stringify(&self) -> String {
        format!(
            "name={} greeting-word={} times={} shout={}",
            self.name, self.greeting_word, self.times, self.shout
        )
    }
}

fn greet(options: &GreetOptions) {
    let line = format!("{}, {}!", options.greeting_word, options.name);
    let line = if options.shout { line.to_uppercase() } else { line };
    for _ in 0..options.times {
        println!("{line}");
    }
}

fn commands() -> Vec<Command> {
    let greet = Command::new("greet [NAME]...", "Greet everyone named on the command line")
        .with_run_func(|args| {
            if args.is_empty() {
                println!("Hello, world!");
            }
            for name in args {
                println!("Hello, {name}!");
            }
            Ok(())
        });
    let fail = Command::new("fail", "Always fail").with_run_func(|_| anyhow::bail!("boom"));

    let mut remote = Command::new("remote", "Inspect remotes");
    remote.add_commands([
        Command::new("list", "List remotes").with_run_func(|_| {
            println!("origin");
            Ok(())
        }),
        Command::new("show", "Show one remote").with_run_func(|args| {
            let name = args
                .first()
                .ok_or_else(|| anyhow::anyhow!("remote show needs a remote name"))?;
            println!("remote {name}");
            Ok(())
        }),
    ]);

    vec![greet, fail, remote]
}

fn main() -> Result<()> {
    let args = normalize_args(std::env::args_os());

    let mut app = Application::builder("demo", "A small greeting application")
        .description("demo greets people. It exists to exercise the application scaffolding.")
        .version(env!("CARGO_PKG_VERSION"))
        .default_args()
        .commands(commands())
        .options(GreetOptions::default())
        .run_func_with_options(|_, options| {
            greet(options);
            Ok(())
        })
        .build()?;

    // Parse errors are left for execute to report
    let debug = app
        .command()
        .clone()
        .try_get_matches_from(args.iter())
        .ok()
        .and_then(|matches| matches.try_get_one::<bool>("debug").ok().flatten().copied())
        .unwrap_or(false);
    setup_logging(debug)?;

    app.execute_from(args);
    Ok(())
}
