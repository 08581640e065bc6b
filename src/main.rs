use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use kit::output::{self, exit_code_to_u8};

mod commands;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_tracing() {
    let filter = EnvFilter::try_from_env("KIT_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

fn usage() {
    eprintln!("Usage: kit <tool> [ARGS...]");
    eprintln!("       kit --list");
}

fn main() -> ExitCode {
    init_tracing();

    let mut argv: Vec<String> = std::env::args().collect();
    let invoked = argv
        .first()
        .and_then(|a| Path::new(a).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    // Busybox style: a link named after the tool runs that tool.
    if commands::NAMES.contains(&invoked.as_str()) {
        argv.remove(0);
        let code = commands::dispatch(&invoked, argv).unwrap_or(2);
        return ExitCode::from(exit_code_to_u8(code));
    }

    let Some(tool) = argv.get(1).cloned() else {
        usage();
        return ExitCode::from(2);
    };

    match tool.as_str() {
        "--list" | "-l" => {
            let mut out = kit::io::stdout();
            for name in commands::NAMES {
                if writeln!(out, "{}", name).is_err() {
                    break;
                }
            }
            return ExitCode::SUCCESS;
        }
        "--version" | "-V" => {
            let _ = writeln!(kit::io::stdout(), "kit {}", VERSION);
            return ExitCode::SUCCESS;
        }
        "--help" | "-h" => {
            usage();
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    let rest = argv.split_off(2);
    match commands::dispatch(&tool, rest) {
        Some(code) => ExitCode::from(exit_code_to_u8(code)),
        None => {
            output::diagnostic("kit", format!("unknown tool '{}'", tool));
            output::diagnostic("kit", "Try 'kit --list' for available tools.");
            ExitCode::from(2)
        }
    }
}
