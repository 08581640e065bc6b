pub mod base;
pub mod base58;
pub mod checksum;
pub mod cksum;
pub mod eol;
pub mod escape;
pub mod fingerprint;
pub mod genhex;
pub mod hashsum;
pub mod isutf8;
pub mod morse;
pub mod od;
pub mod tables;
pub mod url;
pub mod uuid;
pub mod xxd;
pub mod zigzag;

use std::io::Write;

use kit::io;

/// Apply `f` to the words joined by spaces, or to each line of standard
/// input when no words are given.
pub(crate) fn transform_text<F>(words: &[String], mut f: F) -> crate::commands::CmdResult
where
    F: FnMut(&str) -> kit::Result<String>,
{
    let mut out = io::stdout();
    if !words.is_empty() {
        writeln!(out, "{}", f(&words.join(" "))?)?;
    } else {
        let mut reader = io::open(io::STDIN)?;
        io::for_each_line(reader.as_mut(), |line| {
            writeln!(out, "{}", f(line)?)?;
            Ok(())
        })?;
    }
    out.flush()?;
    Ok(0)
}
