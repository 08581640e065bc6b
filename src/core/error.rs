use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UsageInvalidArgument,
    UsageMissingOperand,
    UsageExtraOperand,

    InputIo,

    ParseInvalidNumber,
    ParseInvalidValue,
    ParseInvalidPattern,
    ParseInvalidJson,

    RuntimeOs,
    RuntimeUnsupported,
    RuntimeTimeout,
    RuntimeNetwork,
    CommandNotFound,
    CommandNotExecutable,

    OutputBrokenPipe,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UsageInvalidArgument => "usage.invalid_argument",
            ErrorCode::UsageMissingOperand => "usage.missing_operand",
            ErrorCode::UsageExtraOperand => "usage.extra_operand",

            ErrorCode::InputIo => "input.io",

            ErrorCode::ParseInvalidNumber => "parse.invalid_number",
            ErrorCode::ParseInvalidValue => "parse.invalid_value",
            ErrorCode::ParseInvalidPattern => "parse.invalid_pattern",
            ErrorCode::ParseInvalidJson => "parse.invalid_json",

            ErrorCode::RuntimeOs => "runtime.os",
            ErrorCode::RuntimeUnsupported => "runtime.unsupported",
            ErrorCode::RuntimeTimeout => "runtime.timeout",
            ErrorCode::RuntimeNetwork => "runtime.network",
            ErrorCode::CommandNotFound => "command.not_found",
            ErrorCode::CommandNotExecutable => "command.not_executable",

            ErrorCode::OutputBrokenPipe => "output.broken_pipe",
        }
    }

    /// Process exit status for a fatal error of this class.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::UsageInvalidArgument
            | ErrorCode::UsageMissingOperand
            | ErrorCode::UsageExtraOperand => 2,
            ErrorCode::RuntimeTimeout => 124,
            ErrorCode::CommandNotExecutable => 126,
            ErrorCode::CommandNotFound => 127,
            ErrorCode::OutputBrokenPipe => 0,
            _ => 1,
        }
    }

    pub fn is_usage(&self) -> bool {
        self.exit_code() == 2
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Self::broken_pipe();
        }
        Self::new(ErrorCode::RuntimeOs, describe_io(&err))
    }
}

/// Render an I/O error the way classic tools do: the OS reason without
/// Rust's trailing ` (os error N)`.
pub fn describe_io(err: &io::Error) -> String {
    let text = err.to_string();
    match text.rfind(" (os error ") {
        Some(idx) => text[..idx].to_string(),
        None => text,
    }
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            hints: Vec::new(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UsageInvalidArgument, message)
    }

    pub fn missing_operand(after: Option<&str>) -> Self {
        let message = match after {
            Some(prev) => format!("missing operand after '{}'", prev),
            None => "missing operand".to_string(),
        };
        Self::new(ErrorCode::UsageMissingOperand, message)
    }

    pub fn extra_operand(operand: &str) -> Self {
        Self::new(
            ErrorCode::UsageExtraOperand,
            format!("extra operand '{}'", operand),
        )
    }

    pub fn invalid_argument(field: impl Into<String>, value: impl AsRef<str>) -> Self {
        Self::new(
            ErrorCode::UsageInvalidArgument,
            format!("invalid {}: '{}'", field.into(), value.as_ref()),
        )
    }

    /// An I/O failure on a named input or output: `<path>: <reason>`.
    pub fn io(path: impl AsRef<str>, err: &io::Error) -> Self {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Self::broken_pipe();
        }
        Self::new(
            ErrorCode::InputIo,
            format!("{}: {}", path.as_ref(), describe_io(err)),
        )
    }

    pub fn os(context: impl AsRef<str>, err: &io::Error) -> Self {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Self::broken_pipe();
        }
        Self::new(
            ErrorCode::RuntimeOs,
            format!("{}: {}", context.as_ref(), describe_io(err)),
        )
    }

    /// Wrap the current `errno` for a failed libc call.
    pub fn last_os(context: impl AsRef<str>) -> Self {
        Self::os(context, &io::Error::last_os_error())
    }

    pub fn invalid_number(value: impl AsRef<str>) -> Self {
        Self::new(
            ErrorCode::ParseInvalidNumber,
            format!("invalid number: '{}'", value.as_ref()),
        )
    }

    pub fn invalid_value(what: impl Into<String>, value: impl AsRef<str>) -> Self {
        Self::new(
            ErrorCode::ParseInvalidValue,
            format!("invalid {}: '{}'", what.into(), value.as_ref()),
        )
    }

    pub fn invalid_pattern(pattern: impl AsRef<str>, err: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::ParseInvalidPattern,
            format!("invalid pattern '{}': {}", pattern.as_ref(), err),
        )
    }

    pub fn invalid_json(context: impl AsRef<str>, err: &serde_json::Error) -> Self {
        Self::new(
            ErrorCode::ParseInvalidJson,
            format!("{}: invalid JSON: {}", context.as_ref(), err),
        )
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RuntimeOs, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RuntimeNetwork, message)
    }

    pub fn unsupported(feature: impl AsRef<str>) -> Self {
        Self::new(
            ErrorCode::RuntimeUnsupported,
            format!("{} is unsupported on this platform", feature.as_ref()),
        )
    }

    pub fn timeout() -> Self {
        Self::new(ErrorCode::RuntimeTimeout, "timed out")
    }

    pub fn broken_pipe() -> Self {
        Self::new(ErrorCode::OutputBrokenPipe, "broken pipe")
    }

    pub fn is_broken_pipe(&self) -> bool {
        self.code == ErrorCode::OutputBrokenPipe
    }

    pub fn exit_code(&self) -> i32 {
        self.code.exit_code()
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_io_strips_os_error_suffix() {
        let err = io::Error::from_raw_os_error(libc::ENOENT);
        assert_eq!(describe_io(&err), "No such file or directory");
    }

    #[test]
    fn io_error_names_the_path() {
        let err = io::Error::from_raw_os_error(libc::ENOENT);
        let e = Error::io("nope.txt", &err);
        assert_eq!(e.to_string(), "nope.txt: No such file or directory");
        assert_eq!(e.code.as_str(), "input.io");
        assert_eq!(e.exit_code(), 1);
    }

    #[test]
    fn broken_pipe_exits_cleanly() {
        let err: Error = io::Error::from(io::ErrorKind::BrokenPipe).into();
        assert!(err.is_broken_pipe());
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn usage_errors_exit_two() {
        assert_eq!(Error::missing_operand(None).exit_code(), 2);
        assert_eq!(Error::extra_operand("x").exit_code(), 2);
        assert_eq!(Error::timeout().exit_code(), 124);
    }

    #[test]
    fn with_hint_accumulates() {
        let err = Error::usage("bad").with_hint("one").with_hint("two");
        assert_eq!(err.hints.len(), 2);
        assert_eq!(err.hints[1].message, "two");
    }
}
