//! Date parsing and calendar arithmetic for `dateadd`, `daysbetween` and
//! `cal`.

use chrono::{Datelike, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::error::{Error, Result};

/// A parsed date and whether the input carried a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDate {
    pub value: NaiveDateTime,
    pub has_time: bool,
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%Y%m%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parse the common date spellings plus `now`, `today`, `yesterday` and
/// `tomorrow`.
pub fn parse(input: &str) -> Result<ParsedDate> {
    let s = input.trim();
    let now = Local::now().naive_local();
    let today = now.date().and_time(NaiveTime::MIN);
    match s.to_ascii_lowercase().as_str() {
        "now" => return Ok(ParsedDate { value: now, has_time: true }),
        "today" => return Ok(ParsedDate { value: today, has_time: false }),
        "yesterday" => {
            return Ok(ParsedDate {
                value: today - Duration::days(1),
                has_time: false,
            })
        }
        "tomorrow" => {
            return Ok(ParsedDate {
                value: today + Duration::days(1),
                has_time: false,
            })
        }
        _ => {}
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(ParsedDate {
            value: dt.naive_local(),
            has_time: true,
        });
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ParsedDate { value: dt, has_time: true });
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(ParsedDate {
                value: d.and_time(NaiveTime::MIN),
                has_time: false,
            });
        }
    }
    Err(Error::invalid_value("date", input))
}

/// Calendar units accepted by `dateadd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Unit {
    pub fn parse(value: &str) -> Result<Self> {
        let v = value.to_ascii_lowercase();
        let v = v.strip_suffix('s').unwrap_or(&v);
        match v {
            "sec" | "second" => Ok(Unit::Second),
            "min" | "minute" => Ok(Unit::Minute),
            "h" | "hour" => Ok(Unit::Hour),
            "d" | "day" => Ok(Unit::Day),
            "w" | "week" => Ok(Unit::Week),
            "m" | "mon" | "month" => Ok(Unit::Month),
            "y" | "yr" | "year" => Ok(Unit::Year),
            _ => Err(Error::invalid_argument("unit", value)),
        }
    }
}

/// Add `amount` units to `base`. Month and year steps clamp to the last
/// day of the target month.
pub fn add(base: NaiveDateTime, amount: i64, unit: Unit) -> Result<NaiveDateTime> {
    let overflow = || Error::invalid_value("date offset", amount.to_string());
    match unit {
        Unit::Second => base.checked_add_signed(Duration::seconds(amount)),
        Unit::Minute => base.checked_add_signed(Duration::minutes(amount)),
        Unit::Hour => base.checked_add_signed(Duration::hours(amount)),
        Unit::Day => base.checked_add_signed(Duration::days(amount)),
        Unit::Week => base.checked_add_signed(Duration::weeks(amount)),
        Unit::Month | Unit::Year => {
            let months = if unit == Unit::Year {
                amount.checked_mul(12).ok_or_else(overflow)?
            } else {
                amount
            };
            let magnitude = u32::try_from(months.unsigned_abs()).map_err(|_| overflow())?;
            if months >= 0 {
                base.checked_add_months(Months::new(magnitude))
            } else {
                base.checked_sub_months(Months::new(magnitude))
            }
        }
    }
    .ok_or_else(overflow)
}

/// Summary of the span between two dates, order-independent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub days: i64,
    pub weeks: i64,
    pub remainder_days: i64,
    pub months: i64,
    pub years: i64,
    pub weekdays: i64,
}

pub fn span(a: NaiveDate, b: NaiveDate) -> Span {
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    let days = (end - start).num_days();

    let mut months = (end.year() as i64 - start.year() as i64) * 12
        + (end.month() as i64 - start.month() as i64);
    if end.day() < start.day() {
        months -= 1;
    }

    Span {
        days,
        weeks: days / 7,
        remainder_days: days % 7,
        months,
        years: months / 12,
        weekdays: weekdays_between(start, end),
    }
}

/// Count Monday..Friday days in the half-open range `[start, end)`.
pub fn weekdays_between(start: NaiveDate, end: NaiveDate) -> i64 {
    let days = (end - start).num_days();
    let full_weeks = days / 7;
    let mut count = full_weeks * 5;
    let mut day = start + Duration::days(full_weeks * 7);
    while day < end {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            count += 1;
        }
        day += Duration::days(1);
    }
    count
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

/// Render one month as the classic 20-column calendar block. `highlight`
/// puts that day in brackets (`14[15]16`).
pub fn month_block(year: i32, month: u32, highlight: Option<u32>) -> Vec<String> {
    let title = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_default();
    let mut lines = vec![format!("{:^20}", title), "Su Mo Tu We Th Fr Sa".to_string()];

    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or(0);
    let mut cells: Vec<Option<u32>> = (0..first).map(|_| None).collect();
    cells.extend((1..=days_in_month(year, month)).map(Some));

    for week in cells.chunks(7) {
        let mut line = String::new();
        let mut open = false;
        for (i, cell) in week.iter().enumerate() {
            let marked = cell.is_some() && *cell == highlight;
            if marked {
                line.push('[');
            } else if open {
                line.push(']');
            } else if i > 0 {
                line.push(' ');
            }
            open = marked;
            match cell {
                Some(day) => line.push_str(&format!("{:>2}", day)),
                None => line.push_str("  "),
            }
        }
        if open {
            line.push(']');
        }
        lines.push(line.trim_end().to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_common_formats() {
        let iso = parse("2024-03-15").unwrap();
        assert_eq!(iso.value.date(), date(2024, 3, 15));
        assert!(!iso.has_time);

        assert_eq!(parse("03/15/2024").unwrap().value.date(), date(2024, 3, 15));
        assert_eq!(parse("15.03.2024").unwrap().value.date(), date(2024, 3, 15));
        assert_eq!(parse("March 15, 2024").unwrap().value.date(), date(2024, 3, 15));
        assert!(parse("2024-03-15 10:30:00").unwrap().has_time);
        assert!(parse("not a date").is_err());
    }

    #[test]
    fn add_and_subtract_round_trip() {
        let base = parse("2024-01-31").unwrap().value;
        let later = add(base, 45, Unit::Day).unwrap();
        assert_eq!(add(later, -45, Unit::Day).unwrap(), base);
    }

    #[test]
    fn month_addition_clamps() {
        let base = parse("2024-01-31").unwrap().value;
        assert_eq!(add(base, 1, Unit::Month).unwrap().date(), date(2024, 2, 29));
        assert_eq!(add(base, -1, Unit::Year).unwrap().date(), date(2023, 1, 31));
    }

    #[test]
    fn unit_aliases() {
        assert_eq!(Unit::parse("days").unwrap(), Unit::Day);
        assert_eq!(Unit::parse("Weeks").unwrap(), Unit::Week);
        assert_eq!(Unit::parse("y").unwrap(), Unit::Year);
        assert!(Unit::parse("fortnight").is_err());
    }

    #[test]
    fn span_is_symmetric() {
        let a = date(2024, 1, 1);
        let b = date(2024, 12, 25);
        assert_eq!(span(a, b), span(b, a));
        let s = span(a, b);
        assert_eq!(s.days, 359);
        assert_eq!(s.months, 11);
        assert_eq!(s.years, 0);
    }

    #[test]
    fn weekdays_skip_weekends() {
        // Monday 2024-01-01 to Monday 2024-01-08
        assert_eq!(weekdays_between(date(2024, 1, 1), date(2024, 1, 8)), 5);
        assert_eq!(weekdays_between(date(2024, 1, 6), date(2024, 1, 8)), 0);
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2023, 12), 31);
    }

    #[test]
    fn month_block_layout() {
        let block = month_block(2024, 2, None);
        assert_eq!(block[0].trim(), "February 2024");
        assert_eq!(block[1], "Su Mo Tu We Th Fr Sa");
        // Feb 1 2024 is a Thursday
        assert_eq!(block[2], "             1  2  3");
    }

    #[test]
    fn highlighted_day_is_bracketed() {
        let block = month_block(2024, 2, Some(14));
        assert_eq!(block[4], "11 12 13[14]15 16 17");
        let block = month_block(2024, 2, Some(3));
        assert_eq!(block[2], "             1  2[ 3]");
    }
}
