//! Helpers for command line argument handling in the binaries

use std::{error::Error, fmt, fmt::Display};

/// Wraps a static message into something that can be bubbled up as a `Box<dyn Error>`
#[derive(Debug)]
pub struct CliErr(pub &'static str);

impl Display for CliErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Error for CliErr {}

/// Parse an optional positional argument, falling back to a default when absent.
pub fn parse_arg_or<T: std::str::FromStr>(arg: Option<String>, default: T) -> Result<T, CliErr> {
    match arg {
        Some(arg) => arg.parse().map_err(|_| CliErr("could not parse argument")),
        None => Ok(default),
    }
}
