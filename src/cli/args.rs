//! Positional argument validators for the root command

use crate::error::{AppError, Result};

/// Checks the positional arguments left after flag parsing
///
/// Receives the command path and the arguments.
pub type PositionalArgs = Box<dyn Fn(&str, &[String]) -> Result<()>>;

/// Reject any non-empty positional argument
pub fn no_args() -> PositionalArgs {
    Box::new(|path, args| {
        if args.iter().any(|arg| !arg.is_empty()) {
            return Err(AppError::args(format!(
                "{path:?} does not take any arguments, got {args:?}"
            )));
        }
        Ok(())
    })
}

/// Accept anything
pub fn arbitrary_args() -> PositionalArgs {
    Box::new(|_, _| Ok(()))
}

pub fn exact_args(n: usize) -> PositionalArgs {
    Box::new(move |path, args| {
        if args.len() != n {
            return Err(AppError::args(format!(
                "{path:?} accepts {n} arg(s), received {}",
                args.len()
            )));
        }
        Ok(())
    })
}

pub fn minimum_args(n: usize) -> PositionalArgs {
    Box::new(move |path, args| {
        if args.len() < n {
            return Err(AppError::args(format!(
                "{path:?} requires at least {n} arg(s), only received {}",
                args.len()
            )));
        }
        Ok(())
    })
}

pub fn maximum_args(n: usize) -> PositionalArgs {
    Box::new(move |path, args| {
        if args.len() > n {
            return Err(AppError::args(format!(
                "{path:?} accepts at most {n} arg(s), received {}",
                args.len()
            )));
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_no_args_names_path_and_arguments() {
        let err = no_args()("demo", &strings(&["extra-arg"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#""demo" does not take any arguments, got ["extra-arg"]"#
        );
    }

    #[test]
    fn test_no_args_allows_empty_strings() {
        assert!(no_args()("demo", &[]).is_ok());
        assert!(no_args()("demo", &strings(&[""])).is_ok());
    }

    #[test]
    fn test_counting_validators() {
        let two = strings(&["a", "b"]);
        assert!(exact_args(2)("demo", &two).is_ok());
        assert!(exact_args(1)("demo", &two).is_err());
        assert!(minimum_args(3)("demo", &two).is_err());
        assert!(maximum_args(2)("demo", &two).is_ok());
        assert!(maximum_args(1)("demo", &two).is_err());
        assert!(arbitrary_args()("demo", &two).is_ok());
    }
}
