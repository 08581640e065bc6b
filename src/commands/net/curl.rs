use std::io::Write;

use clap::Parser;

use kit::http::{self, Request};
use kit::{io, output, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Make a single HTTP request")]
pub struct CurlArgs {
    /// Request method (default GET, or POST with -d)
    #[arg(short = 'X', long = "request")]
    pub method: Option<String>,

    /// Extra header as "Name: value"; repeatable
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Request body; '@file' reads it from a file
    #[arg(short = 'd', long = "data")]
    pub data: Option<String>,

    /// Write the body to FILE instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,

    /// Include the status line and response headers
    #[arg(short = 'i', long = "include")]
    pub include: bool,

    /// Exit 22 on HTTP status >= 400
    #[arg(short = 'f', long = "fail")]
    pub fail: bool,

    pub url: String,
}

fn body(data: Option<&str>) -> kit::Result<Option<String>> {
    match data {
        Some(spec) => match spec.strip_prefix('@') {
            Some(path) => io::read_text(path).map(Some),
            None => Ok(Some(spec.to_string())),
        },
        None => Ok(None),
    }
}

pub fn run(args: CurlArgs) -> CmdResult {
    let request = Request {
        method: args.method.clone(),
        url: args.url.clone(),
        headers: args.headers.clone(),
        body: body(args.data.as_deref())?,
    };
    let response = http::send(&request)?;
    let status = response.status();

    let mut head = Vec::new();
    if args.include {
        writeln!(head, "{:?} {}\r", response.version(), status)?;
        for (name, value) in response.headers() {
            writeln!(head, "{}: {}\r", name, String::from_utf8_lossy(value.as_bytes()))?;
        }
        writeln!(head, "\r")?;
    }

    if args.fail && (status.is_client_error() || status.is_server_error()) {
        output::diagnostic(
            "curl",
            format!("The requested URL returned error: {}", status.as_u16()),
        );
        return Ok(22);
    }

    let bytes = response
        .bytes()
        .map_err(|e| Error::network(format!("{}: {}", args.url, e)))?;
    head.extend_from_slice(&bytes);

    match &args.output {
        Some(path) => io::write_file(std::path::Path::new(path), &head)?,
        None => {
            let mut out = io::stdout();
            out.write_all(&head)?;
            out.flush()?;
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_may_come_from_a_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("body.json");
        std::fs::write(&path, "{\"a\":1}").unwrap();
        let spec = format!("@{}", path.display());
        assert_eq!(body(Some(&spec)).unwrap().as_deref(), Some("{\"a\":1}"));
        assert_eq!(body(Some("x=1")).unwrap().as_deref(), Some("x=1"));
        assert_eq!(body(None).unwrap(), None);
    }
}
