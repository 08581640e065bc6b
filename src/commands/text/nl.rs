use clap::{Parser, ValueEnum};

use kit::io;

use crate::commands::CmdResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BodyStyle {
    /// Number all lines
    A,
    /// Number only non-empty lines
    T,
    /// Number no lines
    N,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum NumberFormat {
    /// Left justified
    Ln,
    /// Right justified
    Rn,
    /// Right justified, zero padded
    Rz,
}

#[derive(Parser, Debug)]
#[command(about = "Number lines of files")]
pub struct NlArgs {
    /// Body numbering style
    #[arg(short = 'b', long = "body-numbering", value_enum, default_value = "t")]
    pub body: BodyStyle,

    /// Line number format
    #[arg(short = 'n', long = "number-format", value_enum, default_value = "rn")]
    pub format: NumberFormat,

    /// Width of the number column
    #[arg(short = 'w', long = "number-width", default_value_t = 6)]
    pub width: usize,

    /// Separator between number and line
    #[arg(short = 's', long = "number-separator", default_value = "\t")]
    pub separator: String,

    /// First line number
    #[arg(short = 'v', long = "starting-line-number", default_value_t = 1, allow_negative_numbers = true)]
    pub start: i64,

    /// Line number increment
    #[arg(short = 'i', long = "line-increment", default_value_t = 1, allow_negative_numbers = true)]
    pub increment: i64,

    pub files: Vec<String>,
}

pub struct Numberer {
    body: BodyStyle,
    format: NumberFormat,
    width: usize,
    separator: String,
    next: i64,
    increment: i64,
}

impl Numberer {
    pub fn new(args: &NlArgs) -> Self {
        Numberer {
            body: args.body,
            format: args.format,
            width: args.width,
            separator: args.separator.clone(),
            next: args.start,
            increment: args.increment,
        }
    }

    pub fn line(&mut self, line: &str) -> String {
        let numbered = match self.body {
            BodyStyle::A => true,
            BodyStyle::T => !line.is_empty(),
            BodyStyle::N => false,
        };
        if !numbered {
            if line.is_empty() {
                return String::new();
            }
            let pad = " ".repeat(self.width + self.separator.chars().count());
            return format!("{}{}", pad, line);
        }
        let n = self.next;
        self.next += self.increment;
        let w = self.width;
        let number = match self.format {
            NumberFormat::Ln => format!("{:<w$}", n),
            NumberFormat::Rn => format!("{:>w$}", n),
            NumberFormat::Rz => format!("{:0>w$}", n),
        };
        format!("{}{}{}", number, self.separator, line)
    }
}

pub fn run(args: NlArgs) -> CmdResult {
    let mut numberer = Numberer::new(&args);
    io::map_lines("nl", &args.files, |line| Some(numberer.line(line)))
}
