use std::io::Write;

use clap::Parser;
use serde_json::{Map, Number, Value};

use kit::{csv, io, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Convert CSV records to a JSON array")]
pub struct Csv2jsonArgs {
    /// Field delimiter
    #[arg(short = 'd', long = "delimiter", default_value = ",")]
    pub delimiter: String,

    /// The first row is data, not column names
    #[arg(long = "no-header")]
    pub no_header: bool,

    /// Pretty-print, one record per line
    #[arg(short = 'p', long = "pretty")]
    pub pretty: bool,

    /// Emit every record as an array even when a header is present
    #[arg(short = 'a', long = "array")]
    pub array: bool,

    pub file: Option<String>,
}

/// Typed cell value: integer, float, boolean, null for empty, else string.
pub fn coerce(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(n) = cell.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Some(n) = cell
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
    {
        return Value::Number(n);
    }
    match cell {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(cell.to_string()),
    }
}

/// One JSON value per record. With a header, records become objects keyed
/// by column name; cells past the header are keyed `colN`.
pub fn records_to_values(records: &[Vec<String>], header: bool, array: bool) -> Vec<Value> {
    let (names, rows) = match records.split_first() {
        Some((first, rest)) if header => (Some(first), rest),
        _ => (None, records),
    };

    rows.iter()
        .map(|row| match names {
            Some(names) if !array => {
                let mut object = Map::new();
                let width = names.len().max(row.len());
                for i in 0..width {
                    let key = names
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| format!("col{}", i + 1));
                    let value = row.get(i).map(|c| coerce(c)).unwrap_or(Value::Null);
                    object.insert(key, value);
                }
                Value::Object(object)
            }
            _ => Value::Array(row.iter().map(|c| coerce(c)).collect()),
        })
        .collect()
}

/// Single-line rendering with a space after `:` and `,`.
fn spaced(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let fields: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", Value::String(k.clone()), spaced(v)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(spaced).collect();
            format!("[{}]", items.join(", "))
        }
        other => other.to_string(),
    }
}

pub fn render(values: &[Value], pretty: bool) -> kit::Result<String> {
    if !pretty {
        return serde_json::to_string(values)
            .map_err(|e| Error::runtime(format!("cannot encode JSON: {}", e)));
    }
    if values.is_empty() {
        return Ok("[]".to_string());
    }
    let rows: Vec<String> = values.iter().map(|v| format!("  {}", spaced(v))).collect();
    Ok(format!("[\n{}\n]", rows.join(",\n")))
}

pub fn run(args: Csv2jsonArgs) -> CmdResult {
    let text = io::read_text(args.file.as_deref().unwrap_or(io::STDIN))?;
    let records = csv::parse(&text, csv::delimiter_from_arg(&args.delimiter));
    let values = records_to_values(&records, !args.no_header, args.array);

    let mut out = io::stdout();
    writeln!(out, "{}", render(&values, args.pretty)?)?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn convert(text: &str, header: bool, array: bool, pretty: bool) -> String {
        let records = csv::parse(text, ',');
        render(&records_to_values(&records, header, array), pretty).unwrap()
    }

    #[test]
    fn cells_are_coerced() {
        assert_eq!(coerce("42"), json!(42));
        assert_eq!(coerce("-1.5"), json!(-1.5));
        assert_eq!(coerce("true"), json!(true));
        assert_eq!(coerce(""), Value::Null);
        assert_eq!(coerce("abc"), json!("abc"));
        assert_eq!(coerce("NaN"), json!("NaN"));
    }

    #[test]
    fn pretty_output_puts_one_record_per_line() {
        assert_eq!(
            convert("a,b,c\n1,2,3\n4,5,6\n", true, false, true),
            "[\n  {\"a\": 1, \"b\": 2, \"c\": 3},\n  {\"a\": 4, \"b\": 5, \"c\": 6}\n]"
        );
    }

    #[test]
    fn compact_output() {
        assert_eq!(
            convert("name,ok\nada,true\n", true, false, false),
            r#"[{"name":"ada","ok":true}]"#
        );
    }

    #[test]
    fn without_header_records_are_arrays() {
        assert_eq!(convert("1,x\n", false, false, false), r#"[[1,"x"]]"#);
        assert_eq!(convert("h\n1\n", true, true, false), "[[1]]");
    }

    #[test]
    fn ragged_rows_fill_with_null_and_extra_columns() {
        assert_eq!(
            convert("a,b\n1\n2,3,4\n", true, false, false),
            r#"[{"a":1,"b":null},{"a":2,"b":3,"col3":4}]"#
        );
    }

    #[test]
    fn empty_input_is_empty_array() {
        assert_eq!(convert("", true, false, true), "[]");
        assert_eq!(convert("a,b\n", true, false, false), "[]");
    }
}
