use std::io::Write;

use clap::Parser;
use comfy_table::presets::ASCII_FULL;
use comfy_table::{CellAlignment, Table};

use kit::{csv, io, numfmt};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Summarise the numeric columns of CSV input")]
pub struct CsvstatArgs {
    /// Field delimiter
    #[arg(short = 'd', long = "delimiter", default_value = ",")]
    pub delimiter: String,

    /// The first row is data, not column names
    #[arg(long = "no-header")]
    pub no_header: bool,

    pub file: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub name: String,
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub stddev: f64,
}

impl Summary {
    /// Statistics over the numeric cells of a column; `None` when it has none.
    pub fn of(name: String, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        Some(Summary {
            name,
            n,
            min: sorted[0],
            max: sorted[n - 1],
            mean,
            median,
            stddev: variance.sqrt(),
        })
    }
}

/// One summary per column that holds at least one number. Non-numeric
/// cells are ignored.
pub fn summarise(records: &[Vec<String>], header: bool) -> Vec<Summary> {
    let (names, rows) = match records.split_first() {
        Some((first, rest)) if header => (Some(first.as_slice()), rest),
        _ => (None, records),
    };
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);

    (0..width)
        .filter_map(|col| {
            let values: Vec<f64> = rows
                .iter()
                .filter_map(|row| row.get(col))
                .filter_map(|cell| cell.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .collect();
            let name = names
                .and_then(|n| n.get(col).cloned())
                .unwrap_or_else(|| format!("col{}", col + 1));
            Summary::of(name, &values)
        })
        .collect()
}

fn number(value: f64) -> String {
    numfmt::general(value, 6, false)
}

pub fn build(summaries: &[Summary]) -> Table {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(vec!["column", "n", "min", "max", "mean", "median", "stddev"]);
    for s in summaries {
        table.add_row(vec![
            s.name.clone(),
            s.n.to_string(),
            number(s.min),
            number(s.max),
            number(s.mean),
            number(s.median),
            number(s.stddev),
        ]);
    }
    for index in 1..7 {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}

pub fn run(args: CsvstatArgs) -> CmdResult {
    let text = io::read_text(args.file.as_deref().unwrap_or(io::STDIN))?;
    let records = csv::parse(&text, csv::delimiter_from_arg(&args.delimiter));
    let summaries = summarise(&records, !args.no_header);
    if summaries.is_empty() {
        return Ok(0);
    }
    let mut out = io::stdout();
    writeln!(out, "{}", build(&summaries))?;
    out.flush()?;
    Ok(0)
}
