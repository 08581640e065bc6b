use std::io::Write;

use clap::Parser;

use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Print files with their lines in reverse order")]
pub struct TacArgs {
    pub files: Vec<String>,
}

/// Lines of `data` last-first, each terminated by `\n`.
pub fn reverse_lines(data: &[u8]) -> Vec<u8> {
    let body = data.strip_suffix(b"\n").unwrap_or(data);
    if data.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(data.len() + 1);
    for line in body.split(|&b| b == b'\n').rev() {
        out.extend_from_slice(line);
        out.push(b'\n');
    }
    out
}

pub fn run(args: TacArgs) -> CmdResult {
    let mut out = io::stdout();
    let status = io::each_input("tac", &args.files, |_, reader| {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        out.write_all(&reverse_lines(&data))?;
        Ok(())
    })?;
    out.flush()?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverses_line_order() {
        assert_eq!(reverse_lines(b"a\nb\nc\n"), b"c\nb\na\n");
    }

    #[test]
    fn missing_final_newline_is_added() {
        assert_eq!(reverse_lines(b"a\nb"), b"b\na\n");
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(reverse_lines(b"").is_empty());
    }
}
