use std::fs::{self, File, FileTimes, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::time::SystemTime;

use chrono::{Local, TimeZone};
use clap::Parser;

use kit::{dates, output, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Create files or update their timestamps")]
pub struct TouchArgs {
    /// Do not create missing files
    #[arg(short = 'c', long = "no-create")]
    pub no_create: bool,

    /// Change only the access time
    #[arg(short = 'a')]
    pub access_only: bool,

    /// Change only the modification time
    #[arg(short = 'm')]
    pub modify_only: bool,

    /// Use DATE instead of now
    #[arg(short = 'd', long = "date", value_name = "DATE", conflicts_with = "reference")]
    pub date: Option<String>,

    /// Use the times of FILE instead of now
    #[arg(short = 'r', long = "reference", value_name = "FILE")]
    pub reference: Option<String>,

    #[arg(required = true)]
    pub files: Vec<String>,
}

/// Access and modification times to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub accessed: SystemTime,
    pub modified: SystemTime,
}

fn stamp(args: &TouchArgs) -> kit::Result<Stamp> {
    if let Some(reference) = &args.reference {
        let meta = fs::metadata(reference).map_err(|e| {
            Error::io(format!("failed to get attributes of '{}'", reference), &e)
        })?;
        let fail = |e: std::io::Error| Error::io(reference.as_str(), &e);
        return Ok(Stamp {
            accessed: meta.accessed().map_err(fail)?,
            modified: meta.modified().map_err(fail)?,
        });
    }
    let when = match &args.date {
        Some(text) => {
            let parsed = dates::parse(text)?;
            let local = Local
                .from_local_datetime(&parsed.value)
                .earliest()
                .ok_or_else(|| Error::invalid_value("date", text))?;
            SystemTime::from(local)
        }
        None => SystemTime::now(),
    };
    Ok(Stamp {
        accessed: when,
        modified: when,
    })
}

/// The times to set, honouring `-a` and `-m`. Neither flag means both.
pub fn file_times(stamp: Stamp, access_only: bool, modify_only: bool) -> FileTimes {
    let both = access_only == modify_only;
    let mut times = FileTimes::new();
    if both || access_only {
        times = times.set_accessed(stamp.accessed);
    }
    if both || modify_only {
        times = times.set_modified(stamp.modified);
    }
    times
}

fn touch(path: &str, args: &TouchArgs, times: FileTimes) -> kit::Result<()> {
    let fail = |e: std::io::Error| Error::io(format!("cannot touch '{}'", path), &e);
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if args.no_create {
                return Ok(());
            }
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .mode(0o644)
                .open(path)
                .map_err(fail)?
        }
        Err(e) => return Err(fail(e)),
    };
    file.set_times(times).map_err(fail)
}

pub fn run(args: TouchArgs) -> CmdResult {
    let times = file_times(stamp(&args)?, args.access_only, args.modify_only);
    let mut status = 0;
    for path in &args.files {
        if let Err(err) = touch(path, &args, times) {
            output::diagnostic("touch", &err.message);
            status = 1;
        }
    }
    Ok(status)
}
