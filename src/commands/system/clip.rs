use std::io::Write;

use arboard::Clipboard;
use clap::Parser;

use kit::{io, Error};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Copy standard input to the clipboard, or paste it")]
pub struct ClipArgs {
    /// Print the clipboard contents instead of copying
    #[arg(short = 'o', long = "paste")]
    pub paste: bool,

    /// Strip one trailing newline before copying
    #[arg(short = 'n', long = "trim-newline")]
    pub trim_newline: bool,

    pub files: Vec<String>,
}

fn clipboard_error(err: arboard::Error) -> Error {
    Error::runtime(format!("clipboard unavailable: {}", err))
        .with_hint("a running display server (X11, Wayland or macOS) is required")
}

pub fn run(args: ClipArgs) -> CmdResult {
    let mut clipboard = Clipboard::new().map_err(clipboard_error)?;
    if args.paste {
        let text = clipboard.get_text().map_err(clipboard_error)?;
        let mut out = io::stdout();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        return Ok(0);
    }

    let mut text = io::read_all_text(&args.files)?;
    if args.trim_newline && text.ends_with('\n') {
        text.pop();
    }
    tracing::debug!(bytes = text.len(), "copying to clipboard");
    clipboard.set_text(text).map_err(clipboard_error)?;
    Ok(0)
}
