use std::ffi::CStr;
use std::io::Write;

use clap::Parser;

use kit::{io, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Print or change terminal settings")]
pub struct SttyArgs {
    /// Print all current settings
    #[arg(short = 'a', long = "all", conflicts_with = "save")]
    pub all: bool,

    /// Print settings in a form stty can read back
    #[arg(short = 'g', long = "save")]
    pub save: bool,

    /// Settings to apply (echo, -echo, icanon, -icanon, raw, sane, size, or a -g string)
    #[arg(allow_hyphen_values = true)]
    pub settings: Vec<String>,
}

type Flag = (&'static str, libc::tcflag_t);

const LOCAL_FLAGS: &[Flag] = &[
    ("isig", libc::ISIG),
    ("icanon", libc::ICANON),
    ("iexten", libc::IEXTEN),
    ("echo", libc::ECHO),
    ("echoe", libc::ECHOE),
    ("echok", libc::ECHOK),
    ("echonl", libc::ECHONL),
    ("noflsh", libc::NOFLSH),
    ("tostop", libc::TOSTOP),
];

const INPUT_FLAGS: &[Flag] = &[
    ("ignbrk", libc::IGNBRK),
    ("brkint", libc::BRKINT),
    ("ignpar", libc::IGNPAR),
    ("inlcr", libc::INLCR),
    ("igncr", libc::IGNCR),
    ("icrnl", libc::ICRNL),
    ("ixon", libc::IXON),
    ("ixoff", libc::IXOFF),
    ("istrip", libc::ISTRIP),
];

const OUTPUT_FLAGS: &[Flag] = &[("opost", libc::OPOST), ("onlcr", libc::ONLCR)];

const CONTROL_FLAGS: &[Flag] = &[
    ("parenb", libc::PARENB),
    ("parodd", libc::PARODD),
    ("cread", libc::CREAD),
    ("hupcl", libc::HUPCL),
    ("clocal", libc::CLOCAL),
];

const CONTROL_CHARS: &[(&str, usize)] = &[
    ("intr", libc::VINTR),
    ("quit", libc::VQUIT),
    ("erase", libc::VERASE),
    ("kill", libc::VKILL),
    ("eof", libc::VEOF),
    ("start", libc::VSTART),
    ("stop", libc::VSTOP),
    ("susp", libc::VSUSP),
];

fn get() -> kit::Result<libc::termios> {
    // SAFETY: termios is plain data filled in by tcgetattr.
    let mut t: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &mut t) } != 0 {
        return Err(Error::last_os("standard input"));
    }
    Ok(t)
}

fn set(t: &libc::termios) -> kit::Result<()> {
    // SAFETY: t is a fully initialised termios.
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSADRAIN, t) } != 0 {
        return Err(Error::last_os("standard input"));
    }
    Ok(())
}

fn window() -> Option<(u16, u16)> {
    // SAFETY: winsize is plain data filled in by the ioctl.
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let ok = unsafe { libc::ioctl(libc::STDIN_FILENO, libc::TIOCGWINSZ, &mut ws) } == 0;
    ok.then_some((ws.ws_row, ws.ws_col))
}

fn flag_words(flags: libc::tcflag_t, table: &[Flag]) -> String {
    table
        .iter()
        .map(|(name, bit)| {
            if flags & bit != 0 {
                name.to_string()
            } else {
                format!("-{}", name)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `^C` style rendering of a control character.
pub fn control_char(c: libc::cc_t) -> String {
    match c {
        0 => "<undef>".to_string(),
        127 => "^?".to_string(),
        c if c < 32 => format!("^{}", (c + b'@') as char),
        c => (c as char).to_string(),
    }
}

/// Colon-separated hex fields: iflag, oflag, cflag, lflag, then c_cc.
pub fn save_string(t: &libc::termios) -> String {
    let mut fields = vec![
        format!("{:x}", t.c_iflag),
        format!("{:x}", t.c_oflag),
        format!("{:x}", t.c_cflag),
        format!("{:x}", t.c_lflag),
    ];
    fields.extend(t.c_cc.iter().map(|c| format!("{:x}", c)));
    fields.join(":")
}

/// Parse a `-g` string onto `t`. Returns false when `text` is not one.
pub fn restore(text: &str, t: &mut libc::termios) -> bool {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 4 + t.c_cc.len() {
        return false;
    }
    let Ok(values) = parts
        .iter()
        .map(|p| u32::from_str_radix(p, 16))
        .collect::<Result<Vec<u32>, _>>()
    else {
        return false;
    };
    t.c_iflag = values[0] as libc::tcflag_t;
    t.c_oflag = values[1] as libc::tcflag_t;
    t.c_cflag = values[2] as libc::tcflag_t;
    t.c_lflag = values[3] as libc::tcflag_t;
    for (slot, v) in t.c_cc.iter_mut().zip(&values[4..]) {
        *slot = *v as libc::cc_t;
    }
    true
}

/// Apply one setting word to `t`.
pub fn apply(word: &str, t: &mut libc::termios) -> kit::Result<()> {
    let (negate, name) = match word.strip_prefix('-') {
        Some(name) => (true, name),
        None => (false, word),
    };
    match name {
        "raw" if !negate => {
            // SAFETY: t is a valid termios.
            unsafe { libc::cfmakeraw(t) };
            return Ok(());
        }
        "raw" | "cooked" | "sane" => {
            t.c_iflag |= libc::BRKINT | libc::ICRNL | libc::IXON;
            t.c_oflag |= libc::OPOST | libc::ONLCR;
            t.c_lflag |= libc::ISIG | libc::ICANON | libc::IEXTEN | libc::ECHO | libc::ECHOE | libc::ECHOK;
            return Ok(());
        }
        _ => {}
    }
    for (table, field) in [
        (LOCAL_FLAGS, &mut t.c_lflag),
        (INPUT_FLAGS, &mut t.c_iflag),
        (OUTPUT_FLAGS, &mut t.c_oflag),
        (CONTROL_FLAGS, &mut t.c_cflag),
    ] {
        if let Some((_, bit)) = table.iter().find(|(n, _)| *n == name) {
            if negate {
                *field &= !bit;
            } else {
                *field |= bit;
            }
            return Ok(());
        }
    }
    if restore(word, t) {
        return Ok(());
    }
    Err(Error::invalid_argument("argument", word))
}

fn speed(t: &libc::termios) -> u32 {
    // SAFETY: cfgetospeed reads a field of a valid termios.
    let code = unsafe { libc::cfgetospeed(t) };
    const SPEEDS: &[(libc::speed_t, u32)] = &[
        (libc::B9600, 9600),
        (libc::B19200, 19200),
        (libc::B38400, 38400),
        (libc::B57600, 57600),
        (libc::B115200, 115200),
        (libc::B230400, 230400),
    ];
    SPEEDS.iter().find(|(c, _)| *c == code).map(|(_, b)| *b).unwrap_or(38400)
}

pub fn run(args: SttyArgs) -> CmdResult {
    let mut t = get()?;
    let mut out = io::stdout();

    if args.save {
        writeln!(out, "{}", save_string(&t))?;
        out.flush()?;
        return Ok(0);
    }
    if !args.settings.is_empty() && !args.all {
        if args.settings.iter().any(|s| s == "size") {
            let (rows, cols) = window().ok_or_else(|| Error::last_os("standard input"))?;
            writeln!(out, "{} {}", rows, cols)?;
            out.flush()?;
            return Ok(0);
        }
        for word in &args.settings {
            apply(word, &mut t)?;
        }
        set(&t)?;
        return Ok(0);
    }

    match window() {
        Some((rows, cols)) => writeln!(out, "speed {} baud; rows {}; columns {};", speed(&t), rows, cols)?,
        None => writeln!(out, "speed {} baud;", speed(&t))?,
    }
    if args.all {
        let chars: Vec<String> = CONTROL_CHARS
            .iter()
            .map(|(name, idx)| format!("{} = {};", name, control_char(t.c_cc[*idx])))
            .collect();
        writeln!(out, "{}", chars.join(" "))?;
        writeln!(out, "{}", flag_words(t.c_cflag, CONTROL_FLAGS))?;
        writeln!(out, "{}", flag_words(t.c_iflag, INPUT_FLAGS))?;
        writeln!(out, "{}", flag_words(t.c_oflag, OUTPUT_FLAGS))?;
        writeln!(out, "{}", flag_words(t.c_lflag, LOCAL_FLAGS))?;
    } else {
        let changed: Vec<&str> = LOCAL_FLAGS
            .iter()
            .filter(|(name, bit)| matches!(*name, "icanon" | "echo") && t.c_lflag & bit == 0)
            .map(|(name, _)| *name)
            .collect();
        if !changed.is_empty() {
            let words: Vec<String> = changed.iter().map(|n| format!("-{}", n)).collect();
            writeln!(out, "{}", words.join(" "))?;
        }
    }
    out.flush()?;
    Ok(0)
}

#[derive(Parser, Debug)]
#[command(about = "Print the terminal connected to standard input")]
pub struct TtyArgs {
    /// Print nothing; only set the exit status
    #[arg(short = 's', long = "silent", alias = "quiet")]
    pub silent: bool,
}

pub fn tty_name() -> Option<String> {
    // SAFETY: ttyname returns NULL or a pointer to static storage.
    let name = unsafe { libc::ttyname(libc::STDIN_FILENO) };
    if name.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned())
}

pub fn run_tty(args: TtyArgs) -> CmdResult {
    let name = tty_name();
    if !args.silent {
        let mut out = io::stdout();
        writeln!(out, "{}", name.as_deref().unwrap_or("not a tty"))?;
        out.flush()?;
    }
    Ok(if name.is_some() { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> libc::termios {
        unsafe { std::mem::zeroed() }
    }

    #[test]
    fn flags_toggle() {
        let mut t = blank();
        apply("echo", &mut t).unwrap();
        assert!(t.c_lflag & libc::ECHO != 0);
        apply("-echo", &mut t).unwrap();
        assert!(t.c_lflag & libc::ECHO == 0);
        apply("icrnl", &mut t).unwrap();
        assert!(t.c_iflag & libc::ICRNL != 0);
        assert!(apply("bogus", &mut t).is_err());
    }

    #[test]
    fn save_string_round_trips() {
        let mut t = blank();
        t.c_lflag = libc::ICANON | libc::ECHO;
        t.c_cc[libc::VINTR] = 3;
        let saved = save_string(&t);
        let mut back = blank();
        apply(&saved, &mut back).unwrap();
        assert_eq!(back.c_lflag, t.c_lflag);
        assert_eq!(back.c_cc[libc::VINTR], 3);
    }

    #[test]
    fn control_chars_render() {
        assert_eq!(control_char(3), "^C");
        assert_eq!(control_char(127), "^?");
        assert_eq!(control_char(0), "<undef>");
    }

    #[test]
    fn sane_restores_canonical_echo() {
        let mut t = blank();
        apply("sane", &mut t).unwrap();
        assert!(t.c_lflag & libc::ICANON != 0);
        assert!(t.c_oflag & libc::OPOST != 0);
    }
}
