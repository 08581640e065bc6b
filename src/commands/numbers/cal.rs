use std::io::Write;

use chrono::{Datelike, Local};
use clap::Parser;

use kit::dates::month_block;
use kit::{io, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Display a calendar: cal [month] [year]")]
pub struct CalArgs {
    /// Month (1-12); a lone value above 12 is read as a year
    pub month: Option<u32>,

    pub year: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Month(i32, u32),
    Year(i32),
}

pub fn view(month: Option<u32>, year: Option<i32>, today: (i32, u32)) -> Result<View> {
    match (month, year) {
        (None, _) => Ok(View::Month(today.0, today.1)),
        (Some(m), None) if (1..=12).contains(&m) => Ok(View::Month(today.0, m)),
        (Some(y), None) => i32::try_from(y)
            .ok()
            .filter(|y| (1..=9999).contains(y))
            .map(View::Year)
            .ok_or_else(|| Error::invalid_argument("year", y.to_string())),
        (Some(m), Some(y)) => {
            if !(1..=12).contains(&m) {
                return Err(Error::invalid_argument("month", m.to_string()));
            }
            if !(1..=9999).contains(&y) {
                return Err(Error::invalid_argument("year", y.to_string()));
            }
            Ok(View::Month(y, m))
        }
    }
}

/// Twelve month blocks, three per row.
pub fn year_view(year: i32, today: (i32, u32, u32)) -> Vec<String> {
    let mut lines = vec![format!("{:^64}", year).trim_end().to_string(), String::new()];
    for quarter in 0..4u32 {
        let blocks: Vec<Vec<String>> = (1..=3)
            .map(|i| {
                let month = quarter * 3 + i;
                let mark = (today.0 == year && today.1 == month).then_some(today.2);
                month_block(year, month, mark)
            })
            .collect();
        let height = blocks.iter().map(Vec::len).max().unwrap_or(0);
        for row in 0..height {
            let line = blocks
                .iter()
                .map(|b| format!("{:<20}", b.get(row).map(String::as_str).unwrap_or("")))
                .collect::<Vec<_>>()
                .join("  ");
            lines.push(line.trim_end().to_string());
        }
        lines.push(String::new());
    }
    lines
}

pub fn run(args: CalArgs) -> CmdResult {
    let now = Local::now().date_naive();
    let today = (now.year(), now.month(), now.day());
    let lines = match view(args.month, args.year, (today.0, today.1))? {
        View::Month(year, month) => {
            let mark = (today.0 == year && today.1 == month).then_some(today.2);
            month_block(year, month, mark)
        }
        View::Year(year) => year_view(year, today),
    };
    let mut out = io::stdout();
    io::write_lines(&mut out, lines)?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_forms() {
        let today = (2024, 5);
        assert_eq!(view(None, None, today).unwrap(), View::Month(2024, 5));
        assert_eq!(view(Some(2), None, today).unwrap(), View::Month(2024, 2));
        assert_eq!(view(Some(1999), None, today).unwrap(), View::Year(1999));
        assert_eq!(view(Some(7), Some(1969), today).unwrap(), View::Month(1969, 7));
        assert!(view(Some(13), Some(2000), today).is_err());
    }

    #[test]
    fn year_has_twelve_titles() {
        let lines = year_view(2023, (2000, 1, 1));
        assert_eq!(lines[0].trim(), "2023");
        let text = lines.join("\n");
        for name in ["January 2023", "June 2023", "December 2023"] {
            assert!(text.contains(name), "{}", name);
        }
        assert!(!text.contains('['));
    }

    #[test]
    fn today_is_marked_in_year_view() {
        let text = year_view(2024, (2024, 2, 14)).join("\n");
        assert!(text.contains("[14]"));
    }
}
