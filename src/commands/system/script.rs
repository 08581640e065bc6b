//! `script` runs a shell on a pseudo-terminal and tees everything it
//! prints into a transcript file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::thread;
use std::time::Instant;

use chrono::Local;
use clap::Parser;
use portable_pty::{native_pty_system, CommandBuilder, PtySize};

use kit::{log_status, tty, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Record a terminal session")]
pub struct ScriptArgs {
    /// Append to the transcript instead of overwriting
    #[arg(short = 'a', long = "append")]
    pub append: bool,

    /// No start and done messages
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Write timing data to FILE (standard error without a value)
    #[arg(
        short = 't',
        long = "timing",
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "-",
        require_equals = true
    )]
    pub timing: Option<String>,

    /// Run COMMAND instead of an interactive shell
    #[arg(short = 'c', long = "command", value_name = "COMMAND")]
    pub command: Option<String>,

    #[arg(default_value = "typescript")]
    pub file: String,
}

/// `elapsed bytes` records, one per chunk of output.
pub struct Timing<W: Write> {
    last: Instant,
    sink: W,
}

impl<W: Write> Timing<W> {
    pub fn new(sink: W) -> Self {
        Self {
            last: Instant::now(),
            sink,
        }
    }

    pub fn record(&mut self, bytes: usize) -> std::io::Result<()> {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        writeln!(self.sink, "{:.6} {}", elapsed, bytes)
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Restores the terminal settings of stdin when dropped.
struct RawMode {
    saved: libc::termios,
}

impl RawMode {
    fn enable() -> Option<Self> {
        if !tty::is_stdin_tty() {
            return None;
        }
        // SAFETY: termios is plain data filled in by tcgetattr.
        let mut saved: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &mut saved) } != 0 {
            return None;
        }
        let mut raw = saved;
        // SAFETY: raw is a valid termios copied from the live settings.
        unsafe {
            libc::cfmakeraw(&mut raw);
            libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &raw);
        }
        Some(Self { saved })
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        // SAFETY: restores settings captured by tcgetattr.
        unsafe {
            libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &self.saved);
        }
    }
}

fn terminal_size() -> PtySize {
    // SAFETY: winsize is plain data filled in by the ioctl.
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let ok = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) } == 0;
    let (rows, cols) = if ok && ws.ws_row > 0 && ws.ws_col > 0 {
        (ws.ws_row, ws.ws_col)
    } else {
        (24, 80)
    };
    PtySize {
        rows,
        cols,
        pixel_width: 0,
        pixel_height: 0,
    }
}

pub fn shell_command(shell: &str, command: Option<&str>) -> CommandBuilder {
    let mut cmd = CommandBuilder::new(shell);
    if let Some(command) = command {
        cmd.arg("-c");
        cmd.arg(command);
    }
    if let Ok(cwd) = std::env::current_dir() {
        cmd.cwd(cwd);
    }
    cmd
}

fn pty_error(err: impl std::fmt::Display) -> Error {
    Error::runtime(format!("pseudo-terminal: {}", err))
}

fn open_transcript(path: &str, append: bool) -> kit::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .map_err(|e| Error::io(path, &e))
}

pub fn run(args: ScriptArgs) -> CmdResult {
    let mut transcript = open_transcript(&args.file, args.append)?;
    let mut timing = match args.timing.as_deref() {
        None => None,
        Some("-") => Some(Timing::new(Box::new(std::io::stderr()) as Box<dyn Write>)),
        Some(path) => Some(Timing::new(
            Box::new(open_transcript(path, args.append)?) as Box<dyn Write>
        )),
    };

    let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
    let pair = native_pty_system()
        .openpty(terminal_size())
        .map_err(pty_error)?;
    let mut child = pair
        .slave
        .spawn_command(shell_command(&shell, args.command.as_deref()))
        .map_err(pty_error)?;
    drop(pair.slave);
    tracing::debug!(shell = %shell, "script session started");

    let started = Local::now();
    writeln!(transcript, "Script started on {}", started.format("%Y-%m-%d %H:%M:%S%:z"))?;
    if !args.quiet {
        log_status!("script", "Script started, output log file is '{}'.", args.file);
    }

    let mut reader = pair.master.try_clone_reader().map_err(pty_error)?;
    let mut writer = pair.master.take_writer().map_err(pty_error)?;
    let raw = RawMode::enable();
    thread::spawn(move || {
        let mut stdin = std::io::stdin();
        let mut buf = [0u8; 1024];
        while let Ok(n) = stdin.read(&mut buf) {
            if n == 0 || writer.write_all(&buf[..n]).is_err() {
                break;
            }
        }
    });

    let mut stdout = std::io::stdout();
    let mut buf = [0u8; 8192];
    loop {
        // the master reports EIO once the child side has closed
        let n = match reader.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        stdout.write_all(&buf[..n])?;
        stdout.flush()?;
        transcript.write_all(&buf[..n])?;
        if let Some(timing) = timing.as_mut() {
            timing.record(n)?;
        }
    }
    drop(raw);

    let status = child.wait().map_err(|e| Error::os("wait", &e))?;
    let code = status.exit_code() as i32;
    writeln!(
        transcript,
        "\nScript done on {} [COMMAND_EXIT_CODE=\"{}\"]",
        Local::now().format("%Y-%m-%d %H:%M:%S%:z"),
        code
    )?;
    if let Some(timing) = timing {
        timing.into_inner().flush()?;
    }
    if !args.quiet {
        log_status!("script", "Script done.");
    }
    Ok(code)
}
