use std::io::Write;
use std::path::Path;

use clap::Parser;

use kit::http::{self, Request};
use kit::{humanize, io, log_status, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Download a URL to a file")]
pub struct WgetArgs {
    /// Output file ('-' for stdout); derived from the URL when omitted
    #[arg(short = 'O', long = "output-document")]
    pub output: Option<String>,

    /// Suppress progress messages
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    pub url: String,
}

pub fn run(args: WgetArgs) -> CmdResult {
    let target = args.output.clone().unwrap_or_else(|| http::file_name(&args.url));
    if !args.quiet {
        log_status!("wget", "fetching {}", args.url);
    }

    let response = http::send(&Request::get(&args.url))?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(Error::network(format!("{}: server returned {}", args.url, status)));
    }
    let bytes = response
        .bytes()
        .map_err(|e| Error::network(format!("{}: {}", args.url, e)))?;

    if target == "-" {
        let mut out = io::stdout();
        out.write_all(&bytes)?;
        out.flush()?;
    } else {
        io::write_file(Path::new(&target), &bytes)?;
    }
    if !args.quiet {
        log_status!(
            "wget",
            "saved '{}' ({})",
            target,
            humanize::short_size(bytes.len() as u64)
        );
    }
    Ok(0)
}
