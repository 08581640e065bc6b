//! Permission modes: `chmod` specs and `ls`-style rendering.

use crate::error::{Error, Result};

const SETUID: u32 = 0o4000;
const SETGID: u32 = 0o2000;
const STICKY: u32 = 0o1000;

const USER: u32 = 0o700;
const GROUP: u32 = 0o070;
const OTHER: u32 = 0o007;

/// Apply a mode spec to `current`.
///
/// Octal specs (`755`) replace the permission bits outright. Symbolic
/// specs are comma-separated clauses `[ugoa]*[+-=][rwxXst]*`; an empty
/// who means `a`. `X` adds execute only for directories or files that
/// already have an execute bit.
pub fn apply(spec: &str, current: u32, is_dir: bool) -> Result<u32> {
    if !spec.is_empty() && spec.chars().all(|c| c.is_digit(8)) {
        let value = u32::from_str_radix(spec, 8).map_err(|_| invalid(spec))?;
        if value > 0o7777 {
            return Err(invalid(spec));
        }
        return Ok((current & !0o7777) | value);
    }

    let mut mode = current;
    for clause in spec.split(',') {
        mode = apply_clause(clause, mode, is_dir).ok_or_else(|| invalid(spec))?;
    }
    Ok(mode)
}

fn invalid(spec: &str) -> Error {
    Error::invalid_value("mode", spec)
}

fn apply_clause(clause: &str, mut mode: u32, is_dir: bool) -> Option<u32> {
    let ops_at = clause.find(['+', '-', '='])?;
    let (who_part, mut rest) = clause.split_at(ops_at);

    let mut who = 0;
    for c in who_part.chars() {
        who |= match c {
            'u' => USER | SETUID,
            'g' => GROUP | SETGID,
            'o' => OTHER | STICKY,
            'a' => 0o7777,
            _ => return None,
        };
    }
    if who == 0 {
        who = 0o7777;
    }

    while let Some(op) = rest.chars().next() {
        if !matches!(op, '+' | '-' | '=') {
            return None;
        }
        rest = &rest[1..];
        let end = rest.find(['+', '-', '=']).unwrap_or(rest.len());
        let (perms, tail) = rest.split_at(end);
        rest = tail;

        let bits = perm_bits(perms, mode, is_dir)? & who;
        mode = match op {
            '+' => mode | bits,
            '-' => mode & !bits,
            _ => (mode & !who) | bits,
        };
    }
    Some(mode)
}

/// Permission letters as bits for every class; the caller masks by who.
fn perm_bits(perms: &str, mode: u32, is_dir: bool) -> Option<u32> {
    let mut bits = 0;
    for c in perms.chars() {
        bits |= match c {
            'r' => 0o444,
            'w' => 0o222,
            'x' => 0o111,
            'X' if is_dir || mode & 0o111 != 0 => 0o111,
            'X' => 0,
            's' => SETUID | SETGID,
            't' => STICKY,
            'u' => spread((mode & USER) >> 6),
            'g' => spread((mode & GROUP) >> 3),
            'o' => spread(mode & OTHER),
            _ => return None,
        };
    }
    Some(bits)
}

fn spread(rwx: u32) -> u32 {
    rwx << 6 | rwx << 3 | rwx
}

/// File type letter from `st_mode`.
pub fn type_char(mode: u32) -> char {
    match mode & 0o170000 {
        0o040000 => 'd',
        0o120000 => 'l',
        0o020000 => 'c',
        0o060000 => 'b',
        0o010000 => 'p',
        0o140000 => 's',
        _ => '-',
    }
}

/// `-rwxr-xr-x` style rendering, special bits included.
pub fn symbolic(mode: u32) -> String {
    let mut out = String::with_capacity(10);
    out.push(type_char(mode));
    let classes = [(6, SETUID, 's'), (3, SETGID, 's'), (0, STICKY, 't')];
    for (shift, special, letter) in classes {
        let rwx = (mode >> shift) & 0o7;
        out.push(if rwx & 4 != 0 { 'r' } else { '-' });
        out.push(if rwx & 2 != 0 { 'w' } else { '-' });
        let exec = rwx & 1 != 0;
        out.push(match (mode & special != 0, exec) {
            (true, true) => letter,
            (true, false) => letter.to_ascii_uppercase(),
            (false, true) => 'x',
            (false, false) => '-',
        });
    }
    out
}

/// Human name of the file type, as `stat` prints it.
pub fn type_name(mode: u32) -> &'static str {
    match type_char(mode) {
        'd' => "directory",
        'l' => "symbolic link",
        'c' => "character special file",
        'b' => "block special file",
        'p' => "fifo",
        's' => "socket",
        _ => "regular file",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: u32 = 0o100000;

    #[test]
    fn octal_replaces_permission_bits() {
        assert_eq!(apply("755", FILE | 0o644, false).unwrap(), FILE | 0o755);
        assert!(apply("8", 0, false).is_err());
        assert!(apply("17777", 0, false).is_err());
    }

    #[test]
    fn symbolic_add_remove_set() {
        assert_eq!(apply("u+x", 0o644, false).unwrap(), 0o744);
        assert_eq!(apply("go-r", 0o644, false).unwrap(), 0o600);
        assert_eq!(apply("a=r", 0o755, false).unwrap(), 0o444);
        assert_eq!(apply("+x", 0o600, false).unwrap(), 0o711);
        assert_eq!(apply("u=rw,g=r,o=", 0o777, false).unwrap(), 0o640);
    }

    #[test]
    fn capital_x_depends_on_target() {
        assert_eq!(apply("a+X", 0o644, false).unwrap(), 0o644);
        assert_eq!(apply("a+X", 0o644, true).unwrap(), 0o755);
        assert_eq!(apply("a+X", 0o744, false).unwrap(), 0o755);
    }

    #[test]
    fn special_bits() {
        assert_eq!(apply("u+s", 0o755, false).unwrap(), 0o4755);
        assert_eq!(apply("g+s", 0o755, false).unwrap(), 0o2755);
        assert_eq!(apply("+t", 0o777, true).unwrap(), 0o1777);
    }

    #[test]
    fn copy_from_class() {
        assert_eq!(apply("g=u", 0o740, false).unwrap(), 0o770);
    }

    #[test]
    fn chained_operators() {
        assert_eq!(apply("u-w+x", 0o644, false).unwrap(), 0o544);
    }

    #[test]
    fn malformed_specs_fail() {
        assert!(apply("z+x", 0o644, false).is_err());
        assert!(apply("u+q", 0o644, false).is_err());
        assert!(apply("u", 0o644, false).is_err());
    }

    #[test]
    fn renders_like_ls() {
        assert_eq!(symbolic(FILE | 0o644), "-rw-r--r--");
        assert_eq!(symbolic(0o040755), "drwxr-xr-x");
        assert_eq!(symbolic(0o041777), "drwxrwxrwt");
        assert_eq!(symbolic(FILE | 0o4644), "-rwSr--r--");
        assert_eq!(type_name(0o120777), "symbolic link");
    }
}
