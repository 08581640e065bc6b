//! Input acquisition and output primitives with consistent error handling.
//!
//! A tool names its inputs as operands; `-` (or no operand at all) means
//! standard input. Inputs are consumed one at a time, in argv order.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::output;

/// Operand naming standard input.
pub const STDIN: &str = "-";

/// Line buffers must hold long HTML/XML lines without splitting them.
pub const LINE_BUFFER: usize = 1 << 20;

/// Default the operand list to standard input.
pub fn operands(files: &[String]) -> Vec<String> {
    if files.is_empty() {
        vec![STDIN.to_string()]
    } else {
        files.to_vec()
    }
}

/// Open an operand for buffered reading.
pub fn open(path: &str) -> Result<Box<dyn BufRead>> {
    if path == STDIN {
        return Ok(Box::new(BufReader::with_capacity(LINE_BUFFER, io::stdin())));
    }
    let file = File::open(path).map_err(|e| Error::io(path, &e))?;
    if file.metadata().map(|m| m.is_dir()).unwrap_or(false) {
        return Err(Error::io(
            path,
            &io::Error::new(io::ErrorKind::Other, "Is a directory"),
        ));
    }
    Ok(Box::new(BufReader::with_capacity(LINE_BUFFER, file)))
}

/// Read an operand fully as raw bytes.
pub fn read_bytes(path: &str) -> Result<Vec<u8>> {
    let mut reader = open(path)?;
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|e| Error::io(path, &e))?;
    Ok(buf)
}

/// Read an operand fully as text; invalid UTF-8 is replaced, not rejected.
pub fn read_text(path: &str) -> Result<String> {
    let bytes = read_bytes(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Read an operand as a vector of lines without terminators.
pub fn read_lines(path: &str) -> Result<Vec<String>> {
    Ok(read_text(path)?.lines().map(|s| s.to_string()).collect())
}

/// Read every operand (stdin when empty) and concatenate the lines.
pub fn read_all_lines(files: &[String]) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for path in operands(files) {
        lines.extend(read_lines(&path)?);
    }
    Ok(lines)
}

/// Read every operand (stdin when empty) into one text buffer.
pub fn read_all_text(files: &[String]) -> Result<String> {
    let mut text = String::new();
    for path in operands(files) {
        text.push_str(&read_text(&path)?);
    }
    Ok(text)
}

/// Read a file from disk (not an operand) with standardized error handling.
pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path.display().to_string(), &e))
}

/// Write content to a file with standardized error handling.
pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    fs::write(path, content).map_err(|e| Error::io(path.display().to_string(), &e))
}

/// Run `f` over every operand in order.
///
/// An input that fails to open or read is reported as
/// `<tool>: <path>: <reason>` and skipped; the return value is 1 when any
/// input failed. A broken stdout aborts the loop.
pub fn each_input<F>(tool: &str, files: &[String], mut f: F) -> Result<i32>
where
    F: FnMut(&str, &mut dyn BufRead) -> Result<()>,
{
    let mut status = 0;
    for path in operands(files) {
        let outcome = open(&path).and_then(|mut reader| f(&path, reader.as_mut()));
        if let Err(err) = outcome {
            if err.is_broken_pipe() {
                return Err(err);
            }
            output::diagnostic(tool, &err.message);
            status = 1;
        }
    }
    Ok(status)
}

/// Visit each line of `reader` without its terminator (`\n` or `\r\n`).
/// Invalid UTF-8 is replaced rather than rejected.
pub fn for_each_line<F>(reader: &mut dyn BufRead, mut f: F) -> Result<()>
where
    F: FnMut(&str) -> Result<()>,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        f(chomp(&line))?;
    }
}

/// Stream every input line through `f`, writing what it returns
/// (`None` drops the line). Returns the `each_input` status.
pub fn map_lines<F>(tool: &str, files: &[String], mut f: F) -> Result<i32>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = stdout();
    let status = each_input(tool, files, |_, reader| {
        for_each_line(reader, |line| {
            if let Some(mapped) = f(line) {
                out.write_all(mapped.as_bytes())?;
                out.write_all(b"\n")?;
            }
            Ok(())
        })
    })?;
    out.flush()?;
    Ok(status)
}

/// Standard output handle; `Stdout` is line buffered already.
pub fn stdout() -> io::StdoutLock<'static> {
    io::stdout().lock()
}

/// Write lines, each terminated with `\n`.
pub fn write_lines<W, I, S>(out: &mut W, lines: I) -> Result<()>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for line in lines {
        out.write_all(line.as_ref().as_bytes())?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Split a byte buffer into lines, keeping the terminators.
pub fn split_inclusive_lines(data: &[u8]) -> Vec<&[u8]> {
    data.split_inclusive(|&b| b == b'\n').collect()
}

/// Strip one trailing `\n` (and a preceding `\r`).
pub fn chomp(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
