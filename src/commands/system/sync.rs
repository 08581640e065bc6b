use std::fs::File;

use clap::Parser;

use kit::Error;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Flush filesystem buffers", ignore_errors = true)]
pub struct SyncArgs {
    /// Sync only file data, not metadata
    #[arg(short = 'd', long = "data")]
    pub data: bool,

    /// Files to sync; everything when omitted
    pub files: Vec<String>,
}

pub fn run(args: SyncArgs) -> CmdResult {
    if args.files.is_empty() {
        // SAFETY: sync takes no arguments and cannot fail.
        unsafe { libc::sync() };
        return Ok(0);
    }
    for name in &args.files {
        let file = File::open(name).map_err(|e| Error::io(name, &e))?;
        let result = if args.data { file.sync_data() } else { file.sync_all() };
        result.map_err(|e| Error::os(format!("error syncing '{}'", name), &e))?;
    }
    Ok(0)
}
