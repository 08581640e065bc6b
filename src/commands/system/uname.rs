use std::ffi::{CStr, CString};
use std::io::Write;

use clap::Parser;

use kit::{io, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Print system information")]
pub struct UnameArgs {
    /// Print everything
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Kernel name
    #[arg(short = 's', long = "kernel-name")]
    pub kernel_name: bool,

    /// Network node hostname
    #[arg(short = 'n', long = "nodename")]
    pub nodename: bool,

    /// Kernel release
    #[arg(short = 'r', long = "kernel-release")]
    pub kernel_release: bool,

    /// Kernel version
    #[arg(short = 'v', long = "kernel-version")]
    pub kernel_version: bool,

    /// Machine hardware name
    #[arg(short = 'm', long = "machine")]
    pub machine: bool,

    /// Processor type
    #[arg(short = 'p', long = "processor")]
    pub processor: bool,

    /// Hardware platform
    #[arg(short = 'i', long = "hardware-platform")]
    pub platform: bool,

    /// Operating system
    #[arg(short = 'o', long = "operating-system")]
    pub os: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Print the machine hardware name", ignore_errors = true)]
pub struct ArchArgs {}

#[derive(Parser, Debug)]
#[command(about = "Show or set the system host name", ignore_errors = true)]
pub struct HostnameArgs {
    /// Print the name up to the first dot
    #[arg(short = 's', long = "short")]
    pub short: bool,

    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uts {
    pub sysname: String,
    pub nodename: String,
    pub release: String,
    pub version: String,
    pub machine: String,
}

fn field(raw: &[libc::c_char]) -> String {
    // SAFETY: uname(2) NUL-terminates every field within its array.
    unsafe { CStr::from_ptr(raw.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

pub fn uts() -> kit::Result<Uts> {
    // SAFETY: utsname is plain data; uname fills it in.
    let mut raw: libc::utsname = unsafe { std::mem::zeroed() };
    if unsafe { libc::uname(&mut raw) } != 0 {
        return Err(Error::last_os("uname"));
    }
    Ok(Uts {
        sysname: field(&raw.sysname),
        nodename: field(&raw.nodename),
        release: field(&raw.release),
        version: field(&raw.version),
        machine: field(&raw.machine),
    })
}

fn operating_system(sysname: &str) -> String {
    match sysname {
        "Linux" => "GNU/Linux".to_string(),
        other => other.to_string(),
    }
}

/// Selected fields in `uname -a` order. No flags means `-s`.
pub fn fields(uts: &Uts, args: &UnameArgs) -> Vec<String> {
    let all = args.all;
    let none = !(all
        || args.kernel_name
        || args.nodename
        || args.kernel_release
        || args.kernel_version
        || args.machine
        || args.processor
        || args.platform
        || args.os);
    let wanted = [
        (all || none || args.kernel_name, uts.sysname.clone()),
        (all || args.nodename, uts.nodename.clone()),
        (all || args.kernel_release, uts.release.clone()),
        (all || args.kernel_version, uts.version.clone()),
        (all || args.machine, uts.machine.clone()),
        (all || args.processor, uts.machine.clone()),
        (all || args.platform, uts.machine.clone()),
        (all || args.os, operating_system(&uts.sysname)),
    ];
    wanted
        .into_iter()
        .filter_map(|(on, value)| on.then_some(value))
        .collect()
}

pub fn run(args: UnameArgs) -> CmdResult {
    let uts = uts()?;
    let mut out = io::stdout();
    writeln!(out, "{}", fields(&uts, &args).join(" "))?;
    out.flush()?;
    Ok(0)
}

pub fn run_arch(_args: ArchArgs) -> CmdResult {
    let uts = uts()?;
    let mut out = io::stdout();
    writeln!(out, "{}", uts.machine)?;
    out.flush()?;
    Ok(0)
}

pub fn run_hostname(args: HostnameArgs) -> CmdResult {
    if let Some(name) = &args.name {
        let c_name = CString::new(name.as_str())
            .map_err(|_| Error::invalid_argument("hostname", name))?;
        // SAFETY: the pointer and length describe a live CString.
        let rc = unsafe { libc::sethostname(c_name.as_ptr(), name.len()) };
        if rc != 0 {
            return Err(Error::last_os("sethostname"));
        }
        return Ok(0);
    }
    let uts = uts()?;
    let name = if args.short {
        uts.nodename.split('.').next().unwrap_or_default().to_string()
    } else {
        uts.nodename
    };
    let mut out = io::stdout();
    writeln!(out, "{}", name)?;
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Uts {
        Uts {
            sysname: "Linux".into(),
            nodename: "box".into(),
            release: "6.1.0".into(),
            version: "#1 SMP".into(),
            machine: "x86_64".into(),
        }
    }

    fn flags() -> UnameArgs {
        UnameArgs {
            all: false,
            kernel_name: false,
            nodename: false,
            kernel_release: false,
            kernel_version: false,
            machine: false,
            processor: false,
            platform: false,
            os: false,
        }
    }

    #[test]
    fn defaults_to_kernel_name() {
        assert_eq!(fields(&sample(), &flags()), vec!["Linux"]);
    }

    #[test]
    fn all_in_fixed_order() {
        let mut args = flags();
        args.all = true;
        assert_eq!(
            fields(&sample(), &args).join(" "),
            "Linux box 6.1.0 #1 SMP x86_64 x86_64 x86_64 GNU/Linux"
        );
    }

    #[test]
    fn selected_fields_keep_order() {
        let mut args = flags();
        args.machine = true;
        args.nodename = true;
        assert_eq!(fields(&sample(), &args), vec!["box", "x86_64"]);
    }

    #[test]
    fn live_system_reports_kernel() {
        assert!(!uts().unwrap().sysname.is_empty());
    }
}
