use std::ffi::CString;

use clap::Parser;

use kit::{modes, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Make block or character special files, or FIFOs")]
pub struct MknodArgs {
    /// Permission bits for the new node
    #[arg(short = 'm', long = "mode", value_name = "MODE")]
    pub mode: Option<String>,

    pub name: String,

    /// b (block), c or u (character), p (FIFO)
    #[arg(value_name = "TYPE")]
    pub kind: String,

    pub major: Option<String>,

    pub minor: Option<String>,
}

/// `st_mode` type bits for a node kind, and whether it needs device numbers.
pub fn node_type(kind: &str) -> kit::Result<(libc::mode_t, bool)> {
    match kind {
        "b" => Ok((libc::S_IFBLK, true)),
        "c" | "u" => Ok((libc::S_IFCHR, true)),
        "p" => Ok((libc::S_IFIFO, false)),
        other => Err(Error::invalid_argument("device type", other)),
    }
}

fn device_number(text: &str) -> kit::Result<u32> {
    kit::parser::parse_uint(text)?
        .try_into()
        .map_err(|_| Error::invalid_number(text))
}

pub fn run(args: MknodArgs) -> CmdResult {
    let (type_bits, needs_numbers) = node_type(&args.kind)?;
    let dev = match (needs_numbers, &args.major, &args.minor) {
        (true, Some(major), Some(minor)) => {
            libc::makedev(device_number(major)?, device_number(minor)?)
        }
        (true, _, _) => {
            return Err(Error::missing_operand(Some(args.kind.as_str()))
                .with_hint("block and character devices need MAJOR and MINOR"))
        }
        (false, None, None) => 0,
        (false, Some(extra), _) | (false, None, Some(extra)) => {
            return Err(Error::extra_operand(extra)
                .with_hint("fifos do not have major and minor device numbers"))
        }
    };
    let perms = match &args.mode {
        Some(spec) => modes::apply(spec, 0o666, false)? & 0o7777,
        None => 0o666,
    };

    let path = CString::new(args.name.as_str())
        .map_err(|_| Error::invalid_argument("name", &args.name))?;
    // SAFETY: path is a valid NUL-terminated string for the call's duration.
    let rc = unsafe { libc::mknod(path.as_ptr(), type_bits | perms as libc::mode_t, dev) };
    if rc != 0 {
        return Err(Error::last_os(&args.name));
    }
    if args.mode.is_some() {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&args.name, std::fs::Permissions::from_mode(perms))
            .map_err(|e| Error::io(&args.name, &e))?;
    }
    Ok(0)
}
