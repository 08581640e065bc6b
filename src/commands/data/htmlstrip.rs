use std::io::Write;

use clap::Parser;
use regex::Regex;

use kit::{io, Error};

use crate::commands::encoding::escape::xml_unescape;
use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Strip HTML tags, scripts and styles from text")]
pub struct HtmlstripArgs {
    /// Decode HTML entities
    #[arg(short = 'd', long = "decode")]
    pub decode: bool,

    /// Collapse runs of whitespace into one space
    #[arg(short = 'c', long = "collapse")]
    pub collapse: bool,

    pub file: Option<String>,
}

/// Named entities beyond the five XML ones.
const HTML_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", "\u{a0}"),
    ("&copy;", "©"),
    ("&reg;", "®"),
    ("&trade;", "™"),
    ("&hellip;", "…"),
    ("&mdash;", "—"),
    ("&ndash;", "–"),
    ("&lsquo;", "‘"),
    ("&rsquo;", "’"),
    ("&ldquo;", "“"),
    ("&rdquo;", "”"),
    ("&laquo;", "«"),
    ("&raquo;", "»"),
    ("&euro;", "€"),
    ("&pound;", "£"),
    ("&deg;", "°"),
    ("&times;", "×"),
    ("&middot;", "·"),
];

pub struct Stripper {
    blocks: Regex,
    tags: Regex,
}

impl Stripper {
    pub fn new() -> kit::Result<Self> {
        let blocks = r"(?is)<!--.*?-->|<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>";
        Ok(Stripper {
            blocks: Regex::new(blocks).map_err(|e| Error::invalid_pattern(blocks, e))?,
            tags: Regex::new(r"<[^>]*>").map_err(|e| Error::invalid_pattern("tag", e))?,
        })
    }

    pub fn strip(&self, html: &str) -> String {
        let without_blocks = self.blocks.replace_all(html, "");
        self.tags.replace_all(&without_blocks, "").into_owned()
    }
}

pub fn decode_entities(text: &str) -> String {
    let mut decoded = text.to_string();
    for (entity, replacement) in HTML_ENTITIES {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, replacement);
        }
    }
    xml_unescape(&decoded)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn run(args: HtmlstripArgs) -> CmdResult {
    let html = io::read_text(args.file.as_deref().unwrap_or(io::STDIN))?;
    let mut text = Stripper::new()?.strip(&html);
    if args.decode {
        text = decode_entities(&text);
    }
    let mut out = io::stdout();
    if args.collapse {
        text = collapse_whitespace(&text);
        if !text.is_empty() {
            writeln!(out, "{}", text)?;
        }
    } else {
        out.write_all(text.as_bytes())?;
    }
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(html: &str) -> String {
        Stripper::new().unwrap().strip(html)
    }

    #[test]
    fn tags_are_removed() {
        assert_eq!(strip("<p class=\"x\">Hi <b>there</b></p>"), "Hi there");
    }

    #[test]
    fn script_and_style_contents_are_removed() {
        let html = "<head><STYLE>p{}</STYLE></head><script type=\"t\">\nvar a = '<p>';\n</script>text<!-- note -->";
        assert_eq!(strip(html), "text");
    }

    #[test]
    fn entities_decode() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt; &#65;&copy;"), "a & b <c> A©");
        assert_eq!(decode_entities("&amp;nbsp;"), "&nbsp;");
        assert_eq!(decode_entities("AT&T"), "AT&T");
    }

    #[test]
    fn collapse_is_idempotent() {
        let once = collapse_whitespace(&strip("<p>\n  a \t b\n</p>\n"));
        assert_eq!(once, "a b");
        assert_eq!(collapse_whitespace(&strip(&once)), once);
    }
}
