use std::io::Write;

use clap::Parser;
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use kit::{io, Error, ErrorCode};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Pretty-print or minify XML")]
pub struct XmlfmtArgs {
    /// Minify instead of indenting
    #[arg(short = 'm', long = "minify")]
    pub minify: bool,

    /// Spaces per indentation level
    #[arg(short = 'i', long = "indent", default_value_t = 2)]
    pub indent: usize,

    pub file: Option<String>,
}

fn xml_error(position: usize, err: impl std::fmt::Display) -> Error {
    Error::new(
        ErrorCode::ParseInvalidValue,
        format!("invalid XML at byte {}: {}", position, err),
    )
}

/// Re-encode `xml` event by event. Whitespace-only text nodes are dropped;
/// `indent` of `None` produces minified output.
pub fn reformat(xml: &str, indent: Option<usize>) -> kit::Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = match indent {
        Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
        None => Writer::new(Vec::new()),
    };

    loop {
        let event = reader
            .read_event()
            .map_err(|e| xml_error(reader.buffer_position(), e))?;
        match event {
            Event::Eof => break,
            Event::Text(ref text) if text.iter().all(u8::is_ascii_whitespace) => continue,
            other => writer
                .write_event(other)
                .map_err(|e| xml_error(reader.buffer_position(), e))?,
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::new(ErrorCode::ParseInvalidValue, format!("invalid UTF-8: {}", e)))
}

pub fn run(args: XmlfmtArgs) -> CmdResult {
    let xml = io::read_text(args.file.as_deref().unwrap_or(io::STDIN))?;
    let indent = (!args.minify).then_some(args.indent);
    let formatted = reformat(&xml, indent)?;

    let mut out = io::stdout();
    if !formatted.is_empty() {
        writeln!(out, "{}", formatted)?;
    }
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_prints_nested_elements() {
        let out = reformat("<a><b>x</b><c/></a>", Some(2)).unwrap();
        assert_eq!(out, "<a>\n  <b>x</b>\n  <c/>\n</a>");
    }

    #[test]
    fn pretty_is_idempotent() {
        let once = reformat("<root>\n<item id=\"1\">one</item>\n   <item/></root>", Some(4)).unwrap();
        assert_eq!(reformat(&once, Some(4)).unwrap(), once);
    }

    #[test]
    fn minify_drops_whitespace_nodes() {
        let out = reformat("<a>\n  <b> x </b>\n  <!-- c -->\n</a>", None).unwrap();
        assert_eq!(out, "<a><b> x </b><!-- c --></a>");
    }

    #[test]
    fn mismatched_tags_are_errors() {
        assert!(reformat("<a><b></a>", None).is_err());
    }
}
