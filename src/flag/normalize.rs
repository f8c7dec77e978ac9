//! Word separator normalization for flag names

use std::borrow::Cow;
use std::ffi::OsString;

/// Replace underscores with hyphens so `foo_bar` and `foo-bar` are one flag
pub fn word_sep_normalize(name: &str) -> Cow<'_, str> {
    if name.contains('_') {
        Cow::Owned(name.replace('_', "-"))
    } else {
        Cow::Borrowed(name)
    }
}

/// Normalize long flag names in a raw argument list
///
/// Only the name part of `--name` / `--name=value` tokens is rewritten, values
/// are left alone, and nothing after a bare `--` terminator is touched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut terminated = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if terminated {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                terminated = true;
                return arg;
            }
            let Some(flag) = text.strip_prefix("--") else {
                return arg;
            };
            match flag.split_once('=') {
                Some((name, value)) => format!("--{}={value}", word_sep_normalize(name)).into(),
                None => format!("--{}", word_sep_normalize(flag)).into(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underscores_become_hyphens() {
        assert_eq!(word_sep_normalize("foo_bar"), "foo-bar");
        assert_eq!(word_sep_normalize("a_b_c"), "a-b-c");
        assert_eq!(word_sep_normalize("foo-bar"), "foo-bar");
        assert!(matches!(word_sep_normalize("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_normalize_args_rewrites_flag_names_only() {
        let args = normalize_args([
            "demo",
            "--log_level=debug_all",
            "--dry_run",
            "-x",
            "some_value",
            "--",
            "--keep_me",
        ]);
        assert_eq!(
            args,
            [
                "demo",
                "--log-level=debug_all",
                "--dry-run",
                "-x",
                "some_value",
                "--",
                "--keep_me",
            ]
        );
    }
}
