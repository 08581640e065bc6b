use std::io::{BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

use kit::{io, tty};

use crate::commands::CmdResult;

const TICK: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(about = "Stopwatch: ENTER records a lap, q quits")]
pub struct TimerArgs {
    /// Live display with laps; otherwise wait for ENTER and print the time
    #[arg(short = 'i', long = "interactive")]
    pub interactive: bool,
}

/// `MM:SS.mmm`, with an hour field once past 60 minutes.
pub fn stopwatch(d: Duration) -> String {
    let ms = d.as_millis();
    let (h, m, s, frac) = (ms / 3_600_000, (ms / 60_000) % 60, (ms / 1000) % 60, ms % 1000);
    if h > 0 {
        format!("{}:{:02}:{:02}.{:03}", h, m, s, frac)
    } else {
        format!("{:02}:{:02}.{:03}", m, s, frac)
    }
}

#[derive(Debug, Default)]
pub struct Laps {
    last: Duration,
    count: usize,
}

impl Laps {
    pub fn record(&mut self, total: Duration) -> String {
        self.count += 1;
        let lap = total.saturating_sub(self.last);
        self.last = total;
        format!("Lap {}: {}  (total {})", self.count, stopwatch(lap), stopwatch(total))
    }
}

enum Event {
    Line(String),
    Eof,
}

fn spawn_reader() -> mpsc::Receiver<Event> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(l) => {
                    if tx.send(Event::Line(l)).is_err() {
                        return;
                    }
                }
                Err(_) => break,
            }
        }
        let _ = tx.send(Event::Eof);
    });
    rx
}

pub fn run(args: TimerArgs) -> CmdResult {
    let start = Instant::now();
    let events = spawn_reader();
    let mut out = io::stdout();
    let live = args.interactive && tty::is_stdout_tty();
    let mut laps = Laps::default();

    if args.interactive {
        writeln!(out, "ENTER = lap, q = quit")?;
    }
    loop {
        match events.recv_timeout(TICK) {
            Ok(Event::Line(line)) if args.interactive && !line.trim().eq_ignore_ascii_case("q") => {
                if live {
                    write!(out, "\r")?;
                }
                writeln!(out, "{}", laps.record(start.elapsed()))?;
            }
            Ok(_) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                if live {
                    write!(out, "\r{}", stopwatch(start.elapsed()))?;
                    out.flush()?;
                }
            }
        }
    }
    if live {
        write!(out, "\r")?;
    }
    writeln!(out, "Total: {}", stopwatch(start.elapsed()))?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopwatch_format() {
        assert_eq!(stopwatch(Duration::from_millis(1250)), "00:01.250");
        assert_eq!(stopwatch(Duration::from_secs(3723)), "1:02:03.000");
    }

    #[test]
    fn laps_measure_since_previous() {
        let mut laps = Laps::default();
        assert_eq!(
            laps.record(Duration::from_secs(10)),
            "Lap 1: 00:10.000  (total 00:10.000)"
        );
        assert_eq!(
            laps.record(Duration::from_secs(25)),
            "Lap 2: 00:15.000  (total 00:25.000)"
        );
    }
}
