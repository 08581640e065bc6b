use std::io::Write;

use clap::Parser;

use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Bin numeric input and draw a bar chart")]
pub struct HistogramArgs {
    /// Number of bins
    #[arg(short = 'b', long = "bins", default_value_t = 10)]
    pub bins: usize,

    /// Width of the longest bar
    #[arg(short = 'w', long = "width", default_value_t = 50)]
    pub width: usize,

    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub stddev: f64,
}

/// Population statistics; `None` for an empty sample.
pub fn stats(values: &[f64]) -> Option<Stats> {
    if values.is_empty() {
        return None;
    }
    let n = values.len();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    Some(Stats {
        n,
        min,
        max,
        mean,
        stddev: var.sqrt(),
    })
}

/// Equal-width bins over `[min, max]`; the maximum lands in the last bin.
pub fn bin(values: &[f64], bins: usize, min: f64, max: f64) -> Vec<usize> {
    let bins = bins.max(1);
    let mut counts = vec![0; bins];
    let span = max - min;
    for v in values {
        let idx = if span == 0.0 {
            0
        } else {
            (((v - min) / span) * bins as f64) as usize
        };
        counts[idx.min(bins - 1)] += 1;
    }
    counts
}

pub fn render(values: &[f64], bins: usize, width: usize) -> Vec<String> {
    let Some(s) = stats(values) else {
        return Vec::new();
    };
    let counts = bin(values, bins, s.min, s.max);
    let step = (s.max - s.min) / counts.len() as f64;
    let peak = counts.iter().copied().max().unwrap_or(0).max(1);
    let mut lines: Vec<String> = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let lo = s.min + step * i as f64;
            let hi = lo + step;
            let bar = "#".repeat(count * width / peak);
            format!("{:>12.3} - {:<12.3} | {:<w$} {}", lo, hi, bar, count, w = width)
        })
        .collect();
    lines.push(format!(
        "n={} min={} max={} mean={:.4} stddev={:.4}",
        s.n, s.min, s.max, s.mean, s.stddev
    ));
    lines
}

pub fn run(args: HistogramArgs) -> CmdResult {
    let mut values = Vec::new();
    let status = io::each_input("histogram", &args.files, |_, reader| {
        io::for_each_line(reader, |line| {
            values.extend(line.split_whitespace().filter_map(|t| t.parse::<f64>().ok()));
            Ok(())
        })
    })?;
    let mut out = io::stdout();
    io::write_lines(&mut out, render(&values, args.bins, args.width))?;
    out.flush()?;
    Ok(status)
}
