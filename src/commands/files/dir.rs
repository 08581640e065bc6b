use clap::Parser;

use kit::command;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "List directory contents in columns (ls -C -b)")]
pub struct DirArgs {
    /// Arguments passed on to ls
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

pub fn argv(args: Vec<String>) -> Vec<String> {
    let mut argv = vec!["ls".to_string(), "-C".to_string(), "-b".to_string()];
    argv.extend(args);
    argv
}

pub fn run(args: DirArgs) -> CmdResult {
    command::run_inherited(&argv(args.args))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_come_first() {
        assert_eq!(argv(vec!["-a".into(), "/tmp".into()]), vec!["ls", "-C", "-b", "-a", "/tmp"]);
    }
}
