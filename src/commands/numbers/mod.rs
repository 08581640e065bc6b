pub mod abs;
pub mod bcalc;
pub mod bitflip;
pub mod cal;
pub mod countdown;
pub mod dates;
pub mod factor;
pub mod floatfmt;
pub mod humanize;
pub mod numbase;
pub mod numpad;
pub mod roman;
pub mod seq;
pub mod timer;

use std::io::Write;

use kit::{io, output};

/// Run `convert` over each argument, or each stdin line when there are
/// none. Values that fail are reported and skipped; the status is 1 only
/// when nothing converted.
pub(crate) fn each_value<F>(tool: &str, values: &[String], mut convert: F) -> crate::commands::CmdResult
where
    F: FnMut(&str) -> kit::Result<String>,
{
    let inputs = if values.is_empty() {
        io::read_all_lines(&[])?
    } else {
        values.to_vec()
    };
    let mut out = io::stdout();
    let mut converted = 0;
    let mut failed = 0;
    for input in inputs.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        match convert(input) {
            Ok(text) => {
                writeln!(out, "{}", text)?;
                converted += 1;
            }
            Err(err) => {
                output::diagnostic(tool, &err.message);
                failed += 1;
            }
        }
    }
    out.flush()?;
    Ok(if failed > 0 && converted == 0 { 1 } else { 0 })
}
