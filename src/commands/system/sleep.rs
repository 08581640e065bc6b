use std::time::Duration;

use clap::Parser;

use kit::parser;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Pause for the sum of the given durations", ignore_errors = true)]
pub struct SleepArgs {
    #[arg(value_name = "DURATION", required = true)]
    pub durations: Vec<String>,
}

pub fn total(durations: &[String]) -> kit::Result<Duration> {
    durations
        .iter()
        .try_fold(Duration::ZERO, |sum, d| Ok(sum + parser::parse_duration(d)?))
}

pub fn run(args: SleepArgs) -> CmdResult {
    std::thread::sleep(total(&args.durations)?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_add_up() {
        let list: Vec<String> = ["1", "500ms", "1m"].iter().map(|s| s.to_string()).collect();
        assert_eq!(total(&list).unwrap(), Duration::from_millis(61_500));
    }

    #[test]
    fn bad_duration_fails() {
        assert!(total(&["soon".to_string()]).is_err());
    }
}
