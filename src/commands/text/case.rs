//! Case transforms. `lower`, `upper`, `upperlower` and `initcap` filter
//! files; `snake_case` and `slugify` convert their arguments, or each
//! stdin line when none are given.

use std::io::Write;

use clap::Parser;

use kit::io;
use kit::slugify::{self, CaseStyle};

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Convert text to lowercase")]
pub struct LowerArgs {
    pub files: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Convert text to uppercase")]
pub struct UpperArgs {
    pub files: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Swap the case of every letter")]
pub struct UpperLowerArgs {
    pub files: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Capitalize the first letter of every word")]
pub struct InitcapArgs {
    pub files: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Convert identifiers to snake_case")]
pub struct SnakeCaseArgs {
    /// kebab-case output
    #[arg(short = 'k', long = "kebab")]
    pub kebab: bool,

    /// SCREAMING_SNAKE_CASE output
    #[arg(short = 'u', long = "upper")]
    pub upper: bool,

    /// Word separator
    #[arg(short = 's', long = "separator", value_name = "SEP")]
    pub separator: Option<String>,

    pub text: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Convert text to a URL slug")]
pub struct SlugifyArgs {
    /// Word separator
    #[arg(short = 's', long = "separator", value_name = "SEP", default_value = "-")]
    pub separator: String,

    /// Uppercase the slug
    #[arg(short = 'u', long = "upper")]
    pub upper: bool,

    pub text: Vec<String>,
}

pub fn swap_case(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for c in line.chars() {
        if c.is_lowercase() {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Apply `f` to the joined arguments, or to each stdin line.
fn convert_text<F>(tool: &str, text: &[String], f: F) -> CmdResult
where
    F: Fn(&str) -> String,
{
    if text.is_empty() {
        return io::map_lines(tool, &[], |line| Some(f(line)));
    }
    let mut out = io::stdout();
    writeln!(out, "{}", f(&text.join(" ")))?;
    out.flush()?;
    Ok(0)
}

pub fn run_lower(args: LowerArgs) -> CmdResult {
    io::map_lines("lower", &args.files, |line| Some(line.to_lowercase()))
}

pub fn run_upper(args: UpperArgs) -> CmdResult {
    io::map_lines("upper", &args.files, |line| Some(line.to_uppercase()))
}

pub fn run_upperlower(args: UpperLowerArgs) -> CmdResult {
    io::map_lines("upperlower", &args.files, |line| Some(swap_case(line)))
}

pub fn run_initcap(args: InitcapArgs) -> CmdResult {
    io::map_lines("initcap", &args.files, |line| Some(slugify::initcap(line)))
}

pub fn run_snake_case(args: SnakeCaseArgs) -> CmdResult {
    let style = if args.kebab {
        CaseStyle::Kebab
    } else if args.upper {
        CaseStyle::ScreamingSnake
    } else {
        CaseStyle::Snake
    };
    let separator = args.separator.clone();
    convert_text("snake_case", &args.text, move |s| {
        slugify::snake_case(s, style, separator.as_deref())
    })
}

pub fn run_slugify(args: SlugifyArgs) -> CmdResult {
    let upper = args.upper;
    let separator = args.separator.clone();
    convert_text("slugify", &args.text, move |s| {
        let slug = slugify::slugify(s, &separator);
        if upper {
            slug.to_uppercase()
        } else {
            slug
        }
    })
}
