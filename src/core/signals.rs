//! The fixed Linux signal table, for `kill`, `pkill`, `timeout` and
//! `signame`.

/// Signal number and name (without the `SIG` prefix), in number order.
pub const SIGNALS: &[(i32, &str)] = &[
    (1, "HUP"),
    (2, "INT"),
    (3, "QUIT"),
    (4, "ILL"),
    (5, "TRAP"),
    (6, "ABRT"),
    (7, "BUS"),
    (8, "FPE"),
    (9, "KILL"),
    (10, "USR1"),
    (11, "SEGV"),
    (12, "USR2"),
    (13, "PIPE"),
    (14, "ALRM"),
    (15, "TERM"),
    (16, "STKFLT"),
    (17, "CHLD"),
    (18, "CONT"),
    (19, "STOP"),
    (20, "TSTP"),
    (21, "TTIN"),
    (22, "TTOU"),
    (23, "URG"),
    (24, "XCPU"),
    (25, "XFSZ"),
    (26, "VTALRM"),
    (27, "PROF"),
    (28, "WINCH"),
    (29, "IO"),
    (30, "PWR"),
    (31, "SYS"),
];

pub fn name(number: i32) -> Option<&'static str> {
    SIGNALS
        .iter()
        .find(|(n, _)| *n == number)
        .map(|(_, name)| *name)
}

/// Resolve `9`, `KILL`, `SIGKILL` or `kill` to a signal number.
pub fn number(spec: &str) -> Option<i32> {
    let spec = spec.trim();
    if let Ok(n) = spec.parse::<i32>() {
        return name(n).map(|_| n).or(if n == 0 { Some(0) } else { None });
    }
    let upper = spec.to_ascii_uppercase();
    let bare = upper.strip_prefix("SIG").unwrap_or(&upper);
    match bare {
        "IOT" => return Some(6),
        "POLL" => return Some(29),
        "CLD" => return Some(17),
        _ => {}
    }
    SIGNALS.iter().find(|(_, n)| *n == bare).map(|(n, _)| *n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_and_numbers() {
        assert_eq!(number("9"), Some(9));
        assert_eq!(number("KILL"), Some(9));
        assert_eq!(number("sigterm"), Some(15));
        assert_eq!(number("IOT"), Some(6));
        assert_eq!(number("0"), Some(0));
        assert_eq!(number("BOGUS"), None);
        assert_eq!(number("99"), None);
    }

    #[test]
    fn names_by_number() {
        assert_eq!(name(2), Some("INT"));
        assert_eq!(name(64), None);
    }

    #[test]
    fn table_matches_libc() {
        assert_eq!(number("TERM"), Some(libc::SIGTERM));
        assert_eq!(number("CHLD"), Some(libc::SIGCHLD));
        assert_eq!(number("USR1"), Some(libc::SIGUSR1));
    }
}
