use serde_json::Value;

use kit::{io, Error};

pub mod csv2json;
pub mod csvstat;
pub mod dotenv;
pub mod flatten;
pub mod htmlstrip;
pub mod jsonkeys;
pub mod jsonmerge;
pub mod template;
pub mod xmlfmt;

/// Read and parse one JSON document from an operand (`-` is stdin).
pub(crate) fn read_json(path: &str) -> kit::Result<Value> {
    let text = io::read_text(path)?;
    let name = if path == io::STDIN { "standard input" } else { path };
    serde_json::from_str(&text).map_err(|e| Error::invalid_json(name, &e))
}
