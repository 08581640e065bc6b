use std::io::Write;

use clap::Parser;

use kit::{io, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Merge lines from several files round-robin")]
pub struct InterleaveArgs {
    /// Lines taken from each file per round
    #[arg(short = 'n', long = "lines", default_value_t = 1)]
    pub lines: usize,

    /// Per-file batch sizes, e.g. `2:1`
    #[arg(short = 'r', long = "ratio", value_name = "A:B")]
    pub ratio: Option<String>,

    /// Line printed after each round
    #[arg(short = 's', long = "separator", value_name = "SEP")]
    pub separator: Option<String>,

    /// Pad exhausted files with blank lines until every file is done
    #[arg(short = 'p', long = "pad")]
    pub pad: bool,

    #[arg(required = true)]
    pub files: Vec<String>,
}

pub fn parse_ratio(spec: &str, files: usize) -> Result<Vec<usize>> {
    let sizes: Vec<usize> = spec
        .split(':')
        .map(|p| p.trim().parse::<usize>().ok().filter(|n| *n > 0))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| Error::invalid_argument("ratio", spec))?;
    if sizes.is_empty() {
        return Err(Error::invalid_argument("ratio", spec));
    }
    // a short ratio repeats its last entry
    let last = sizes[sizes.len() - 1];
    Ok((0..files).map(|i| sizes.get(i).copied().unwrap_or(last)).collect())
}

pub fn interleave(
    inputs: &[Vec<String>],
    batches: &[usize],
    separator: Option<&str>,
    pad: bool,
) -> Vec<String> {
    let mut cursors = vec![0usize; inputs.len()];
    let mut out = Vec::new();
    loop {
        if inputs.iter().zip(&cursors).all(|(lines, &c)| c >= lines.len()) {
            break;
        }
        for (i, lines) in inputs.iter().enumerate() {
            for _ in 0..batches[i] {
                match lines.get(cursors[i]) {
                    Some(line) => {
                        out.push(line.clone());
                        cursors[i] += 1;
                    }
                    None if pad => out.push(String::new()),
                    None => break,
                }
            }
        }
        if let Some(sep) = separator {
            out.push(sep.to_string());
        }
    }
    out
}

pub fn run(args: InterleaveArgs) -> CmdResult {
    let inputs = args
        .files
        .iter()
        .map(|f| io::read_lines(f))
        .collect::<Result<Vec<_>>>()?;
    let batches = match &args.ratio {
        Some(spec) => parse_ratio(spec, inputs.len())?,
        None => vec![args.lines.max(1); inputs.len()],
    };
    let mut out = io::stdout();
    io::write_lines(
        &mut out,
        interleave(&inputs, &batches, args.separator.as_deref(), args.pad),
    )?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn round_robin() {
        let inputs = vec![lines(&["a1", "a2", "a3"]), lines(&["b1"])];
        assert_eq!(
            interleave(&inputs, &[1, 1], None, false),
            lines(&["a1", "b1", "a2", "a3"])
        );
    }

    #[test]
    fn ratio_and_padding() {
        let inputs = vec![lines(&["a1", "a2", "a3"]), lines(&["b1"])];
        assert_eq!(
            interleave(&inputs, &[2, 1], Some("--"), true),
            lines(&["a1", "a2", "b1", "--", "a3", "", "", "--"])
        );
    }

    #[test]
    fn ratio_parsing() {
        assert_eq!(parse_ratio("2:1", 3).unwrap(), vec![2, 1, 1]);
        assert!(parse_ratio("2:0", 2).is_err());
        assert!(parse_ratio("x", 2).is_err());
    }
}
