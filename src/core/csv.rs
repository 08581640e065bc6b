//! Lenient CSV reading and RFC 4180 writing.
//!
//! Reading tolerates stray quotes inside fields ("lazy quotes") and trims
//! leading whitespace of every field. Blank lines are skipped.

/// A parsed table: ordered records of fields.
pub type Records = Vec<Vec<String>>;

pub fn parse(text: &str, delimiter: char) -> Records {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut chars = text.chars().peekable();
    let mut at_field_start = true;
    let mut in_quotes = false;
    let mut line_has_content = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                match chars.peek() {
                    Some('"') => {
                        chars.next();
                        field.push('"');
                    }
                    Some(&next) if next == delimiter || next == '\n' || next == '\r' => {
                        in_quotes = false;
                    }
                    None => in_quotes = false,
                    Some(_) => field.push('"'),
                }
            } else {
                field.push(c);
            }
            continue;
        }

        if at_field_start && c != delimiter && (c == ' ' || c == '\t') {
            continue;
        }

        if c == delimiter {
            record.push(std::mem::take(&mut field));
            at_field_start = true;
            line_has_content = true;
            continue;
        }

        if c == '\r' && chars.peek() == Some(&'\n') {
            continue;
        }

        if c == '\n' || c == '\r' {
            if line_has_content || !field.is_empty() || !record.is_empty() {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            at_field_start = true;
            line_has_content = false;
            continue;
        }

        if at_field_start && c == '"' {
            in_quotes = true;
            at_field_start = false;
            line_has_content = true;
            continue;
        }

        at_field_start = false;
        line_has_content = true;
        field.push(c);
    }

    if line_has_content || !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    records
}

/// Resolve a column reference: a 1-based index, or a header name when a
/// header row is available. Returns a 0-based index.
pub fn resolve_column(spec: &str, header: Option<&[String]>) -> Option<usize> {
    if let Ok(n) = spec.trim().parse::<usize>() {
        return n.checked_sub(1);
    }
    header?.iter().position(|h| h == spec)
}

/// Pick the first delimiter character from a `-d` argument, honouring
/// `\t`.
pub fn delimiter_from_arg(arg: &str) -> char {
    match arg {
        "\\t" | "tab" => '\t',
        _ => arg.chars().next().unwrap_or(','),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_simple_records() {
        let records = parse("a,b,c\n1,2,3\n", ',');
        assert_eq!(records, vec![row(&["a", "b", "c"]), row(&["1", "2", "3"])]);
    }

    #[test]
    fn quoted_fields_keep_delimiters_and_newlines() {
        let records = parse("\"x,y\",\"line\nbreak\",\"say \"\"hi\"\"\"\n", ',');
        assert_eq!(records, vec![row(&["x,y", "line\nbreak", "say \"hi\""])]);
    }

    #[test]
    fn stray_quotes_are_tolerated() {
        let records = parse("ab\"c,\"d\"e\"\n", ',');
        assert_eq!(records, vec![row(&["ab\"c", "d\"e"])]);
    }

    #[test]
    fn leading_space_is_trimmed_trailing_kept() {
        let records = parse("  a , b\n", ',');
        assert_eq!(records, vec![row(&["a ", "b"])]);
    }

    #[test]
    fn blank_lines_skipped_and_empty_fields_kept() {
        let records = parse("a,,c\n\n\r\nd,e,\n", ',');
        assert_eq!(records, vec![row(&["a", "", "c"]), row(&["d", "e", ""])]);
    }

    #[test]
    fn crlf_records() {
        let records = parse("a,b\r\nc,d", ',');
        assert_eq!(records, vec![row(&["a", "b"]), row(&["c", "d"])]);
    }

    #[test]
    fn resolve_column_by_index_or_name() {
        let header = row(&["id", "name"]);
        assert_eq!(resolve_column("2", Some(&header)), Some(1));
        assert_eq!(resolve_column("name", Some(&header)), Some(1));
        assert_eq!(resolve_column("missing", Some(&header)), None);
        assert_eq!(resolve_column("0", None), None);
    }
}
