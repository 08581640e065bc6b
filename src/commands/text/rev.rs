use clap::Parser;

use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Reverse the characters of every line")]
pub struct RevArgs {
    pub files: Vec<String>,
}

pub fn reverse(line: &str) -> String {
    line.chars().rev().collect()
}

pub fn run(args: RevArgs) -> CmdResult {
    io::map_lines("rev", &args.files, |line| Some(reverse(line)))
}
