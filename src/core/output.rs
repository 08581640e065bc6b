//! Diagnostic printing and exit code mapping.
//!
//! Every diagnostic is a single `<tool>: <message>` line on stderr,
//! followed by optional `hint:` lines.

use std::io::{self, Write};

use crate::error::Error;

/// Print a `<tool>: <message>` diagnostic.
pub fn diagnostic(tool: &str, message: impl std::fmt::Display) {
    let stderr = io::stderr();
    let mut handle = stderr.lock();
    let _ = writeln!(handle, "{}: {}", tool, message);
}

/// Report an error and return the exit status it maps to.
///
/// Broken pipes are swallowed: a reader that went away is not a failure.
pub fn report(tool: &str, err: &Error) -> i32 {
    if err.is_broken_pipe() {
        return err.exit_code();
    }

    diagnostic(tool, &err.message);
    for hint in &err.hints {
        diagnostic(tool, format!("hint: {}", hint.message));
    }
    if err.code.is_usage() && err.hints.is_empty() {
        diagnostic(tool, format!("Try '{} --help' for more information.", tool));
    }

    err.exit_code()
}

/// Clamp an exit status to the byte range the OS reports.
pub fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_clamps() {
        assert_eq!(exit_code_to_u8(-3), 0);
        assert_eq!(exit_code_to_u8(124), 124);
        assert_eq!(exit_code_to_u8(9000), 255);
    }

    #[test]
    fn report_maps_broken_pipe_to_success() {
        assert_eq!(report("cat", &Error::broken_pipe()), 0);
    }

    #[test]
    fn report_returns_usage_status() {
        assert_eq!(report("cat", &Error::missing_operand(None)), 2);
    }
}
