use std::io::Write;

use clap::{Parser, ValueEnum};
use comfy_table::presets::{ASCII_FULL, UTF8_FULL};
use comfy_table::{Cell, Table};

use kit::{csv, io};

use crate::commands::CmdResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Style {
    Ascii,
    Unicode,
}

#[derive(Parser, Debug)]
#[command(about = "Render delimited input as a bordered table")]
pub struct TableArgs {
    /// Field delimiter
    #[arg(short = 'd', long = "delimiter", default_value = ",")]
    pub delimiter: String,

    /// Treat the first row as a header
    #[arg(short = 'H', long = "header")]
    pub header: bool,

    /// Border style
    #[arg(long = "style", value_enum, default_value_t = Style::Ascii)]
    pub style: Style,

    pub files: Vec<String>,
}

pub fn build(records: &[Vec<String>], header: bool, style: Style) -> Table {
    let mut table = Table::new();
    table.load_preset(match style {
        Style::Ascii => ASCII_FULL,
        Style::Unicode => UTF8_FULL,
    });
    let mut rows = records.iter();
    if header {
        if let Some(first) = rows.next() {
            table.set_header(first.iter().map(Cell::new));
        }
    }
    for row in rows {
        table.add_row(row.iter().map(Cell::new));
    }
    table
}

pub fn run(args: TableArgs) -> CmdResult {
    let text = io::read_all_text(&args.files)?;
    let records = csv::parse(&text, csv::delimiter_from_arg(&args.delimiter));
    if records.is_empty() {
        return Ok(0);
    }
    let mut out = io::stdout();
    writeln!(out, "{}", build(&records, args.header, args.style))?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Vec<String>> {
        csv::parse("name,qty\napple,3\n", ',')
    }

    #[test]
    fn ascii_table_has_borders() {
        let rendered = build(&records(), true, Style::Ascii).to_string();
        assert!(rendered.starts_with('+'));
        assert!(rendered.contains("| name  | qty |"));
        assert!(rendered.contains("| apple | 3   |"));
    }

    #[test]
    fn unicode_style_uses_box_drawing() {
        let rendered = build(&records(), false, Style::Unicode).to_string();
        assert!(rendered.starts_with('┌'));
        assert!(rendered.contains("│ apple ┆ 3   │"));
    }
}
