use std::io::Write;

use clap::Parser;
use uuid::Uuid;

use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Generate random (version 4) UUIDs")]
pub struct UuidArgs {
    /// How many to generate
    #[arg(short = 'n', long = "count", default_value_t = 1)]
    pub count: usize,

    /// Uppercase hex digits
    #[arg(long = "upper")]
    pub upper: bool,
}

pub fn generate(upper: bool) -> String {
    let id = Uuid::new_v4().hyphenated().to_string();
    if upper {
        id.to_ascii_uppercase()
    } else {
        id
    }
}

pub fn run(args: UuidArgs) -> CmdResult {
    let mut out = io::stdout();
    for _ in 0..args.count {
        writeln!(out, "{}", generate(args.upper))?;
    }
    out.flush()?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_and_variant_bits() {
        let id = generate(false);
        assert_eq!(id.len(), 36);
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(parsed.get_variant(), uuid::Variant::RFC4122);
        assert_eq!(&id[14..15], "4");
    }

    #[test]
    fn upper_and_unique() {
        let a = generate(true);
        assert_eq!(a, a.to_ascii_uppercase());
        assert_ne!(generate(false), generate(false));
    }
}
