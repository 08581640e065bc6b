//! Child process primitives with consistent error handling.

use std::process::{Child, Command, ExitStatus, Stdio};

use crate::error::{describe_io, Error, ErrorCode, Result};

/// Build a `Command` from an argv vector.
pub fn build(argv: &[String]) -> Result<Command> {
    let (program, args) = argv.split_first().ok_or_else(|| Error::missing_operand(None))?;
    let mut cmd = Command::new(program);
    cmd.args(args);
    Ok(cmd)
}

/// Spawn a command, mapping spawn failures to `<program>: <reason>`.
pub fn spawn(cmd: &mut Command) -> Result<Child> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    tracing::debug!(program = %program, "spawning child");
    cmd.spawn().map_err(|e| spawn_error(&program, &e))
}

/// Run argv to completion with inherited stdio and return its exit code.
pub fn run_inherited(argv: &[String]) -> Result<i32> {
    let mut cmd = build(argv)?;
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    match cmd.status() {
        Ok(status) => Ok(status_code(status)),
        Err(e) => Err(spawn_error(&argv[0], &e)),
    }
}

/// Replace the current process image (Unix `exec`). Only returns on error.
#[cfg(unix)]
pub fn exec(mut cmd: Command) -> Error {
    use std::os::unix::process::CommandExt;
    let program = cmd.get_program().to_string_lossy().into_owned();
    let err = cmd.exec();
    spawn_error(&program, &err)
}

/// Map a spawn failure; "not found" exits 127, other failures 126.
pub fn spawn_error(program: &str, err: &std::io::Error) -> Error {
    let code = if err.kind() == std::io::ErrorKind::NotFound {
        ErrorCode::CommandNotFound
    } else {
        ErrorCode::CommandNotExecutable
    };
    Error::new(code, format!("{}: {}", program, describe_io(err)))
}

/// Numeric exit code of a finished child; signals map to 128+N.
pub fn status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }
    1
}

/// Look up an executable on `PATH`. Returns every match in PATH order.
pub fn which_all(name: &str) -> Vec<std::path::PathBuf> {
    if name.contains('/') {
        let p = std::path::PathBuf::from(name);
        return if is_executable(&p) { vec![p] } else { Vec::new() };
    }
    let path = std::env::var_os("PATH").unwrap_or_default();
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .filter(|candidate| is_executable(candidate))
        .collect()
}

/// Whether `path` is a regular file with any execute bit set.
pub fn is_executable(path: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
