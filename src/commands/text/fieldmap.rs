use clap::Parser;

use kit::{csv, io, Error, Result};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Reorder, duplicate or rename columns")]
pub struct FieldmapArgs {
    /// Input field delimiter
    #[arg(short = 'd', long = "delimiter", default_value = ",")]
    pub delimiter: String,

    /// Output field delimiter (defaults to the input delimiter)
    #[arg(short = 'o', long = "output-delimiter")]
    pub output_delimiter: Option<String>,

    /// First line is a header; columns may be named and renamed (`name:new`)
    #[arg(short = 'H', long = "header")]
    pub header: bool,

    /// Comma-separated output columns; `0` emits an empty field
    pub spec: String,

    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    /// Source column reference; `None` emits an empty field.
    pub source: Option<String>,
    pub rename: Option<String>,
}

pub fn parse_spec(spec: &str) -> Result<Vec<Mapping>> {
    spec.split(',')
        .map(|item| {
            let item = item.trim();
            if item.is_empty() {
                return Err(Error::invalid_argument("field spec", spec));
            }
            let (source, rename) = match item.split_once(':') {
                Some((s, r)) => (s, Some(r.to_string())),
                None => (item, None),
            };
            Ok(Mapping {
                source: (source != "0").then(|| source.to_string()),
                rename,
            })
        })
        .collect()
}

/// Resolve mappings to 0-based source indices (`None` = empty field).
pub fn resolve(mappings: &[Mapping], header: Option<&[String]>) -> Result<Vec<Option<usize>>> {
    mappings
        .iter()
        .map(|m| match &m.source {
            None => Ok(None),
            Some(src) => csv::resolve_column(src, header)
                .map(Some)
                .ok_or_else(|| Error::invalid_argument("column", src)),
        })
        .collect()
}

pub fn project(fields: &[&str], columns: &[Option<usize>]) -> Vec<String> {
    columns
        .iter()
        .map(|c| {
            c.and_then(|i| fields.get(i))
                .map(|f| f.to_string())
                .unwrap_or_default()
        })
        .collect()
}

pub fn run(args: FieldmapArgs) -> CmdResult {
    let delimiter = csv::delimiter_from_arg(&args.delimiter);
    let out_delim = args
        .output_delimiter
        .as_deref()
        .map(csv::delimiter_from_arg)
        .unwrap_or(delimiter)
        .to_string();
    let mappings = parse_spec(&args.spec)?;
    let mut columns = if args.header {
        None
    } else {
        Some(resolve(&mappings, None)?)
    };

    let mut failure = None;
    let status = io::map_lines("fieldmap", &args.files, |line| {
        let fields: Vec<&str> = line.split(delimiter).collect();
        if let Some(cols) = &columns {
            return Some(project(&fields, cols).join(&out_delim));
        }
        let header: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        match resolve(&mappings, Some(&header)) {
            Ok(cols) => {
                let mut names = project(&fields, &cols);
                for (name, m) in names.iter_mut().zip(&mappings) {
                    if let Some(r) = &m.rename {
                        *name = r.clone();
                    }
                }
                columns = Some(cols);
                Some(names.join(&out_delim))
            }
            Err(err) => {
                failure = Some(err);
                None
            }
        }
    })?;
    match failure {
        Some(err) => Err(err),
        None => Ok(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_parsing() {
        let m = parse_spec("2,0,name:label").unwrap();
        assert_eq!(m[0].source.as_deref(), Some("2"));
        assert_eq!(m[1].source, None);
        assert_eq!(m[2].rename.as_deref(), Some("label"));
        assert!(parse_spec("1,,2").is_err());
    }

    #[test]
    fn reorders_and_blanks() {
        let cols = resolve(&parse_spec("3,0,1").unwrap(), None).unwrap();
        assert_eq!(project(&["a", "b", "c"], &cols), vec!["c", "", "a"]);
    }

    #[test]
    fn resolves_header_names() {
        let header = vec!["id".to_string(), "name".to_string()];
        let cols = resolve(&parse_spec("name,id").unwrap(), Some(&header)).unwrap();
        assert_eq!(cols, vec![Some(1), Some(0)]);
        assert!(resolve(&parse_spec("nope").unwrap(), Some(&header)).is_err());
    }
}
