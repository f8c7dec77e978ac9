//! Error reporting at the process boundary

use console::style;
use std::{
    fmt::Display,
    io::{self, Write},
};

/// Write `Error: <message>` with the marker highlighted
pub fn write_error(out: &mut impl Write, err: &impl Display) -> io::Result<()> {
    writeln!(out, "{} {}", style("Error:").red().bold().for_stderr(), err)
}

/// Report `err` on standard error and terminate with status 1
pub fn exit_with_error(err: &impl Display) -> ! {
    let _ = write_error(&mut io::stderr().lock(), err);
    std::process::exit(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_line_format() {
        let mut out = Vec::new();
        write_error(&mut out, &"boom").unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Error:"));
        assert!(text.ends_with(" boom\n"));
    }
}
