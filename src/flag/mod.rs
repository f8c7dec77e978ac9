//! Flag declaration
//!
//! Flags are declared in named groups ([`NamedFlagSets`]) and flattened onto the
//! root command when an application is built. Flag names are normalized so that
//! `--foo_bar` and `--foo-bar` address the same flag.

pub mod builtin;
pub mod named;
pub mod normalize;
pub mod set;

pub use builtin::{CONFIG_FLAG, GLOBAL_GROUP, HELP_FLAG, VERSION_FLAG};
pub use named::NamedFlagSets;
pub use normalize::{normalize_args, word_sep_normalize};
pub use set::FlagSet;
