use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

use kit::{io, parser, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Pass standard input through at a fixed pace")]
pub struct RatelimitArgs {
    /// Lines per second
    #[arg(short = 'r', long = "rate", value_name = "RATE", conflicts_with = "interval")]
    pub rate: Option<f64>,

    /// Lines released per tick
    #[arg(short = 'n', long = "lines", default_value_t = 1)]
    pub lines: usize,

    /// Tick period (default 1s)
    #[arg(short = 'i', long = "interval", value_name = "DURATION")]
    pub interval: Option<String>,

    /// Report throughput on standard error when done
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

pub fn period(args: &RatelimitArgs) -> kit::Result<Duration> {
    if let Some(rate) = args.rate {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(Error::invalid_value("rate", rate.to_string()));
        }
        return Ok(Duration::from_secs_f64(1.0 / rate));
    }
    match &args.interval {
        Some(text) => {
            let period = parser::parse_duration(text)?;
            if period.is_zero() {
                return Err(Error::invalid_value("interval", text));
            }
            Ok(period)
        }
        None => Ok(Duration::from_secs(1)),
    }
}

/// Release lines from `rx` in batches of `batch` every `period` until
/// `finished` is set, then flush the remainder at once. Returns the number
/// of lines written.
pub fn pace(
    rx: Receiver<String>,
    finished: &AtomicBool,
    period: Duration,
    batch: usize,
    out: &mut dyn Write,
) -> kit::Result<usize> {
    let mut written = 0;
    let mut next = Instant::now();
    loop {
        if finished.load(Ordering::Acquire) {
            for line in rx.try_iter() {
                writeln!(out, "{}", line)?;
                written += 1;
            }
            out.flush()?;
            return Ok(written);
        }
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        }
        next += period;
        for _ in 0..batch {
            match rx.try_recv() {
                Ok(line) => {
                    writeln!(out, "{}", line)?;
                    written += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    out.flush()?;
                    return Ok(written);
                }
            }
        }
        out.flush()?;
    }
}

pub fn run(args: RatelimitArgs) -> CmdResult {
    let period = period(&args)?;
    let batch = args.lines.max(1);
    let (tx, rx) = mpsc::channel();
    let finished = Arc::new(AtomicBool::new(false));

    let reader_done = Arc::clone(&finished);
    let reader = thread::spawn(move || -> kit::Result<()> {
        let stdin = std::io::stdin();
        let mut lines = stdin.lock();
        let result = io::for_each_line(&mut lines, |line| {
            let _ = tx.send(line.to_string());
            Ok(())
        });
        reader_done.store(true, Ordering::Release);
        result
    });

    let started = Instant::now();
    let mut out = io::stdout();
    let written = pace(rx, &finished, period, batch, &mut out)?;
    if let Ok(Err(err)) = reader.join() {
        return Err(err);
    }
    if args.verbose {
        eprintln!(
            "ratelimit: {} lines in {:.2}s",
            written,
            started.elapsed().as_secs_f64()
        );
    }
    Ok(0)
}
