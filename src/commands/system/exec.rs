//! Tools that adjust how a command runs and then become it: `nice`,
//! `nohup` and `stdbuf`.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;

use clap::Parser;

use kit::{command, io, output, tty, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Run a command with adjusted scheduling priority")]
pub struct NiceArgs {
    /// Add N to the niceness (default 10)
    #[arg(short = 'n', long = "adjustment", default_value_t = 10, allow_hyphen_values = true)]
    pub adjustment: i32,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

fn niceness() -> kit::Result<i32> {
    // getpriority can legitimately return -1, so errno must be checked.
    // SAFETY: errno is thread-local; getpriority has no memory effects.
    unsafe {
        *libc::__errno_location() = 0;
        let value = libc::getpriority(libc::PRIO_PROCESS, 0);
        if value == -1 && *libc::__errno_location() != 0 {
            return Err(Error::last_os("getpriority"));
        }
        Ok(value)
    }
}

pub fn run_nice(args: NiceArgs) -> CmdResult {
    if args.command.is_empty() {
        let mut out = io::stdout();
        writeln!(out, "{}", niceness()?)?;
        out.flush()?;
        return Ok(0);
    }
    let target = (niceness()? + args.adjustment).clamp(-20, 19);
    // SAFETY: setpriority only touches kernel scheduling state.
    if unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, target) } != 0 {
        output::diagnostic(
            "nice",
            Error::last_os("cannot set niceness").message,
        );
    }
    Err(command::exec(command::build(&args.command)?))
}

#[derive(Parser, Debug)]
#[command(about = "Run a command immune to hangups")]
pub struct NohupArgs {
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// `./nohup.out`, falling back to `$HOME/nohup.out`.
fn open_nohup_out() -> kit::Result<(File, PathBuf)> {
    let mut candidates = vec![PathBuf::from("nohup.out")];
    if let Some(home) = std::env::var_os("HOME") {
        candidates.push(PathBuf::from(home).join("nohup.out"));
    }
    let mut last = None;
    for path in candidates {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(e) => last = Some(Error::io(path.display().to_string(), &e)),
        }
    }
    Err(last.unwrap_or_else(|| Error::runtime("cannot open nohup.out")))
}

pub fn run_nohup(args: NohupArgs) -> CmdResult {
    // SAFETY: installing SIG_IGN for SIGHUP has no preconditions.
    unsafe {
        libc::signal(libc::SIGHUP, libc::SIG_IGN);
    }
    let mut cmd = command::build(&args.command)?;
    let stdin_tty = tty::is_stdin_tty();
    if stdin_tty {
        cmd.stdin(Stdio::null());
    }
    if tty::is_stdout_tty() {
        let (file, path) = open_nohup_out()?;
        let for_stderr = file.try_clone().map_err(|e| Error::io(path.display().to_string(), &e))?;
        let notice = if stdin_tty {
            "ignoring input and appending output to"
        } else {
            "appending output to"
        };
        output::diagnostic("nohup", format!("{} '{}'", notice, path.display()));
        cmd.stdout(Stdio::from(file));
        if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
            cmd.stderr(Stdio::from(for_stderr));
        }
    } else if stdin_tty {
        output::diagnostic("nohup", "ignoring input");
    }
    Err(command::exec(cmd))
}

#[derive(Parser, Debug)]
#[command(about = "Run a command with modified stream buffering")]
pub struct StdbufArgs {
    /// Standard input buffering: 0 or SIZE
    #[arg(short = 'i', long = "input", value_name = "MODE")]
    pub input: Option<String>,

    /// Standard output buffering: L, 0 or SIZE
    #[arg(short = 'o', long = "output", value_name = "MODE")]
    pub output: Option<String>,

    /// Standard error buffering: L, 0 or SIZE
    #[arg(short = 'e', long = "error", value_name = "MODE")]
    pub error: Option<String>,

    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

const LIBSTDBUF: &[&str] = &[
    "/usr/libexec/coreutils/libstdbuf.so",
    "/usr/lib/coreutils/libstdbuf.so",
    "/usr/lib/x86_64-linux-gnu/coreutils/libstdbuf.so",
    "/usr/lib64/coreutils/libstdbuf.so",
];

/// Validate a buffering mode: `L` (line, not for stdin), `0` or a size.
pub fn check_mode(stream: &str, mode: &str) -> kit::Result<()> {
    if mode == "L" {
        if stream == "i" {
            return Err(Error::invalid_value("input buffering mode", mode)
                .with_hint("line buffering stdin is meaningless"));
        }
        return Ok(());
    }
    kit::parser::parse_size(mode).map(|_| ())
}

/// `_STDBUF_*` variables understood by the buffering preload library.
pub fn buffer_env(args: &StdbufArgs) -> kit::Result<Vec<(String, String)>> {
    let mut env = Vec::new();
    for (stream, mode) in [("i", &args.input), ("o", &args.output), ("e", &args.error)] {
        if let Some(mode) = mode {
            check_mode(stream, mode)?;
            env.push((format!("_STDBUF_{}", stream.to_ascii_uppercase()), mode.clone()));
        }
    }
    if env.is_empty() {
        return Err(Error::usage("you must specify a buffering mode option"));
    }
    Ok(env)
}

pub fn run_stdbuf(args: StdbufArgs) -> CmdResult {
    let env = buffer_env(&args)?;
    let mut cmd = command::build(&args.command)?;
    cmd.envs(env);
    match LIBSTDBUF.iter().find(|p| std::path::Path::new(p).exists()) {
        Some(lib) => {
            let preload = match std::env::var("LD_PRELOAD") {
                Ok(existing) if !existing.is_empty() => format!("{}:{}", existing, lib),
                _ => lib.to_string(),
            };
            cmd.env("LD_PRELOAD", preload);
        }
        None => tracing::debug!("libstdbuf not found; relying on _STDBUF_ variables alone"),
    }
    Err(command::exec(cmd))
}
