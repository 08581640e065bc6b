use std::fmt::Write as _;
use std::io::Write;

use chrono::NaiveDateTime;
use clap::Parser;

use kit::dates::{self, Unit};
use kit::{io, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Add an offset to a date: dateadd DATE ±N UNIT [FORMAT]")]
pub struct DateaddArgs {
    #[arg(allow_negative_numbers = true, allow_hyphen_values = true, num_args = 2..=4, required = true)]
    pub terms: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Report the span between two dates")]
pub struct DaysbetweenArgs {
    pub first: String,
    pub second: String,
}

/// Split `DATE ±N UNIT [FMT]`, also accepting a glued `+3d`.
pub fn parse_offset(terms: &[String]) -> Result<(i64, Unit, Option<&str>)> {
    let amount = terms.get(1).ok_or_else(|| Error::missing_operand(None))?;
    if let Ok(n) = amount.parse::<i64>() {
        let unit = terms
            .get(2)
            .ok_or_else(|| Error::missing_operand(Some(amount)))?;
        if let Some(extra) = terms.get(4) {
            return Err(Error::extra_operand(extra));
        }
        return Ok((n, Unit::parse(unit)?, terms.get(3).map(String::as_str)));
    }
    let split = amount
        .find(|c: char| c.is_ascii_alphabetic())
        .ok_or_else(|| Error::invalid_number(amount))?;
    let n = amount[..split]
        .parse::<i64>()
        .map_err(|_| Error::invalid_number(amount))?;
    if let Some(extra) = terms.get(3) {
        return Err(Error::extra_operand(extra));
    }
    Ok((n, Unit::parse(&amount[split..])?, terms.get(2).map(String::as_str)))
}

/// Render with a user strftime format without panicking on bad specifiers.
pub fn format_date(value: NaiveDateTime, format: &str) -> Result<String> {
    let mut text = String::new();
    write!(text, "{}", value.format(format))
        .map_err(|_| Error::invalid_value("format", format))?;
    Ok(text)
}

pub fn dateadd(terms: &[String]) -> Result<String> {
    let base = dates::parse(&terms[0])?;
    let (amount, unit, format) = parse_offset(terms)?;
    let result = dates::add(base.value, amount, unit)?;
    let has_time = base.has_time || matches!(unit, Unit::Second | Unit::Minute | Unit::Hour);
    let default = if has_time { "%Y-%m-%d %H:%M:%S" } else { "%Y-%m-%d" };
    format_date(result, format.unwrap_or(default))
}

pub fn run_dateadd(args: DateaddArgs) -> CmdResult {
    let text = dateadd(&args.terms)?;
    let mut out = io::stdout();
    writeln!(out, "{}", text)?;
    out.flush()?;
    Ok(0)
}

pub fn report(first: &str, second: &str) -> Result<Vec<String>> {
    let a = dates::parse(first)?.value.date();
    let b = dates::parse(second)?.value.date();
    let span = dates::span(a, b);
    Ok(vec![
        format!("Days:     {}", span.days),
        format!("Weeks:    {} ({} days)", span.weeks, span.remainder_days),
        format!("Months:   {}", span.months),
        format!("Years:    {}", span.years),
        format!("Weekdays: {}", span.weekdays),
    ])
}

pub fn run_daysbetween(args: DaysbetweenArgs) -> CmdResult {
    let lines = report(&args.first, &args.second)?;
    let mut out = io::stdout();
    io::write_lines(&mut out, lines)?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn adds_days_and_months() {
        assert_eq!(dateadd(&terms(&["2024-01-31", "+1", "month"])).unwrap(), "2024-02-29");
        assert_eq!(dateadd(&terms(&["2024-03-01", "-1", "day"])).unwrap(), "2024-02-29");
        assert_eq!(dateadd(&terms(&["2024-03-01", "+2w"])).unwrap(), "2024-03-15");
    }

    #[test]
    fn add_then_subtract_restores() {
        let forward = dateadd(&terms(&["2023-06-15", "+100", "days"])).unwrap();
        let back = dateadd(&terms(&[&forward, "-100", "days"])).unwrap();
        assert_eq!(back, "2023-06-15");
    }

    #[test]
    fn time_units_show_time() {
        assert_eq!(
            dateadd(&terms(&["2024-01-01", "90", "min"])).unwrap(),
            "2024-01-01 01:30:00"
        );
    }

    #[test]
    fn custom_format() {
        assert_eq!(
            dateadd(&terms(&["2024-01-01", "1", "y", "%d/%m/%Y"])).unwrap(),
            "01/01/2025"
        );
        assert!(dateadd(&terms(&["2024-01-01", "1", "y", "%Q"])).is_err());
    }

    #[test]
    fn bad_unit() {
        assert!(dateadd(&terms(&["2024-01-01", "1", "fortnight"])).is_err());
    }

    #[test]
    fn span_is_symmetric() {
        let ab = report("2024-01-01", "2024-03-15").unwrap();
        let ba = report("2024-03-15", "2024-01-01").unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab[0], "Days:     74");
        assert_eq!(ab[1], "Weeks:    10 (4 days)");
        assert_eq!(ab[2], "Months:   2");
    }
}
