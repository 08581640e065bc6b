//! `timeout` and `timeout2`: run a command with a time limit.
//!
//! A waiter thread reports the child's exit over a channel; the main thread
//! uses `recv_timeout` as the timer, so whichever completes first drives the
//! next state.

use std::process::ExitStatus;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use clap::Parser;

use kit::{command, log_status, parser, signals, Error};

use crate::commands::CmdResult;

const DEFAULT_GRACE: Duration = Duration::from_secs(5);

/// Exit code when the time limit was reached.
pub const TIMED_OUT: i32 = 124;

#[derive(Parser, Debug)]
#[command(about = "Run a command with a time limit")]
pub struct TimeoutArgs {
    /// Signal to send when the time limit is reached
    #[arg(short = 's', long = "signal", default_value = "TERM")]
    pub signal: String,

    /// Time limit (e.g. 10, 1.5s, 2m)
    pub duration: String,

    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Run a command with a time limit and a configurable kill grace period")]
pub struct Timeout2Args {
    #[arg(short = 's', long = "signal", default_value = "TERM")]
    pub signal: String,

    /// Send KILL this long after the first signal if the command is still running
    #[arg(short = 'k', long = "kill-after", default_value = "5s")]
    pub kill_after: String,

    pub duration: String,

    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    GracePending,
    ForceKilled,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    ChildExited,
    SignalTick,
    GraceTick,
}

impl State {
    pub fn next(self, event: Event) -> State {
        match (self, event) {
            (State::Running, Event::ChildExited) => State::Done,
            (State::Running, Event::SignalTick) => State::GracePending,
            (State::GracePending, Event::ChildExited) => State::Done,
            (State::GracePending, Event::GraceTick) => State::ForceKilled,
            (state, _) => state,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, State::Done | State::ForceKilled)
    }
}

#[derive(Debug, Clone)]
pub struct Limits {
    pub duration: Duration,
    pub signal: i32,
    pub grace: Duration,
}

impl Limits {
    fn parse(duration: &str, signal: &str, grace: Duration) -> kit::Result<Self> {
        Ok(Self {
            duration: parser::parse_duration(duration)?,
            signal: signals::number(signal).ok_or_else(|| Error::invalid_value("signal", signal))?,
            grace,
        })
    }
}

fn send(pid: i32, signal: i32) {
    // SAFETY: kill has no memory effects; a vanished pid just returns ESRCH.
    unsafe { libc::kill(pid, signal) };
}

/// Run `argv` under `limits` and return the exit code to report.
pub fn supervise(argv: &[String], limits: &Limits) -> kit::Result<i32> {
    let mut child = command::spawn(&mut command::build(argv)?)?;
    let pid = child.id() as i32;
    let (tx, rx) = mpsc::channel::<std::io::Result<ExitStatus>>();
    std::thread::spawn(move || {
        let _ = tx.send(child.wait());
    });

    let mut state = State::Running;
    // Zero disables the limit.
    let mut wait = (!limits.duration.is_zero()).then_some(limits.duration);
    let mut status = None;

    while !state.is_terminal() {
        let received = match wait {
            Some(limit) => rx.recv_timeout(limit),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        let event = match received {
            Ok(result) => {
                status = Some(result.map_err(|e| Error::os("wait", &e))?);
                Event::ChildExited
            }
            Err(RecvTimeoutError::Timeout) if state == State::Running => Event::SignalTick,
            Err(RecvTimeoutError::Timeout) => Event::GraceTick,
            Err(RecvTimeoutError::Disconnected) => {
                return Err(Error::runtime("lost track of the child process"))
            }
        };
        let previous = state;
        state = state.next(event);
        match (previous, state) {
            (State::Running, State::GracePending) => {
                tracing::debug!(pid, signal = limits.signal, "time limit reached");
                send(pid, limits.signal);
                wait = (limits.signal != libc::SIGKILL).then_some(limits.grace);
            }
            (State::GracePending, State::ForceKilled) => {
                log_status!("timeout", "sending KILL to {}", pid);
                send(pid, libc::SIGKILL);
                let _ = rx.recv();
                return Ok(TIMED_OUT);
            }
            (State::GracePending, State::Done) => return Ok(TIMED_OUT),
            _ => {}
        }
    }
    Ok(status.map(command::status_code).unwrap_or(1))
}

pub fn run(args: TimeoutArgs) -> CmdResult {
    let limits = Limits::parse(&args.duration, &args.signal, DEFAULT_GRACE)?;
    supervise(&args.command, &limits)
}

pub fn run_timeout2(args: Timeout2Args) -> CmdResult {
    let grace = parser::parse_duration(&args.kill_after)?;
    let limits = Limits::parse(&args.duration, &args.signal, grace)?;
    supervise(&args.command, &limits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    fn limits(duration_ms: u64, grace_ms: u64) -> Limits {
        Limits {
            duration: Duration::from_millis(duration_ms),
            signal: libc::SIGTERM,
            grace: Duration::from_millis(grace_ms),
        }
    }

    #[test]
    fn transitions() {
        assert_eq!(State::Running.next(Event::ChildExited), State::Done);
        assert_eq!(State::Running.next(Event::SignalTick), State::GracePending);
        assert_eq!(State::GracePending.next(Event::ChildExited), State::Done);
        assert_eq!(State::GracePending.next(Event::GraceTick), State::ForceKilled);
        assert_eq!(State::Done.next(Event::SignalTick), State::Done);
        assert!(State::ForceKilled.is_terminal());
    }

    #[test]
    fn fast_command_keeps_its_exit_code() {
        assert_eq!(supervise(&argv("exit 3"), &limits(5_000, 1_000)).unwrap(), 3);
    }

    #[test]
    fn slow_command_times_out() {
        assert_eq!(supervise(&argv("sleep 5"), &limits(100, 1_000)).unwrap(), TIMED_OUT);
    }

    #[test]
    fn ignoring_the_signal_gets_killed() {
        let code = supervise(&argv("trap '' TERM; sleep 3"), &limits(200, 200)).unwrap();
        assert_eq!(code, TIMED_OUT);
    }

    #[test]
    fn unknown_signal_is_rejected() {
        assert!(Limits::parse("1", "NOPE", DEFAULT_GRACE).is_err());
    }
}
