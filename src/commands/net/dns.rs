use clap::Parser;

use kit::dns::{self, RecordType};
use kit::io;

use crate::commands::CmdResult;

#[derive(Parser, Debug)]
#[command(about = "Look up DNS records for a host")]
pub struct DnsArgs {
    /// Record type: A, AAAA, MX, NS, TXT or CNAME
    #[arg(short = 't', long = "type", default_value = "A")]
    pub record_type: String,

    pub host: String,
}

pub fn run(args: DnsArgs) -> CmdResult {
    let rtype = RecordType::parse(&args.record_type)?;
    let answers = dns::lookup(&args.host, rtype)?;
    if answers.is_empty() {
        kit::output::diagnostic(
            "dns",
            format!("no {} records for {}", args.record_type.to_ascii_uppercase(), args.host),
        );
        return Ok(1);
    }
    let mut out = io::stdout();
    io::write_lines(&mut out, answers.iter().map(|a| a.to_string()))?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localhost_resolves() {
        let args = DnsArgs {
            record_type: "a".to_string(),
            host: "localhost".to_string(),
        };
        assert_eq!(run(args).unwrap(), 0);
    }

    #[test]
    fn unknown_record_type_fails() {
        let args = DnsArgs {
            record_type: "SRV".to_string(),
            host: "localhost".to_string(),
        };
        assert!(run(args).is_err());
    }
}
