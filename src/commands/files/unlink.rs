use std::fs;

use clap::Parser;

use kit::Error;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Remove a single file")]
pub struct UnlinkArgs {
    pub path: String,
}

pub fn run(args: UnlinkArgs) -> CmdResult {
    fs::remove_file(&args.path)
        .map_err(|e| Error::io(format!("cannot unlink '{}'", args.path), &e))?;
    Ok(0)
}
