use clap::error::ErrorKind;
use clap::{Arg, ArgAction, CommandFactory, FromArgMatches};

use kit::output;

pub type CmdResult = kit::Result<i32>;

/// Parse `argv` for `tool` and run it.
///
/// Help is `--help` only; `-h` belongs to the tools. Parse failures print
/// `<tool>: <message>` plus the usage line and exit 2.
pub fn invoke<A>(tool: &str, argv: Vec<String>, run: fn(A) -> CmdResult) -> i32
where
    A: CommandFactory + FromArgMatches,
{
    let argv = kit::args::normalize(tool, argv);
    let command = A::command()
        .name(tool.to_string())
        .bin_name(tool.to_string())
        .disable_help_flag(true)
        .arg(
            Arg::new("help")
                .long("help")
                .action(ArgAction::Help)
                .help("Print help"),
        );

    let parsed = command
        .try_get_matches_from(std::iter::once(tool.to_string()).chain(argv))
        .and_then(|matches| A::from_arg_matches(&matches));

    match parsed {
        Ok(args) => {
            tracing::debug!(tool, "dispatch");
            match run(args) {
                Ok(code) => code,
                Err(err) => output::report(tool, &err),
            }
        }
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            | ErrorKind::DisplayVersion => {
                let _ = err.print();
                0
            }
            _ => {
                report_parse_error(tool, &err.render().to_string());
                2
            }
        },
    }
}

fn report_parse_error(tool: &str, rendered: &str) {
    let mut lines = rendered.lines().filter(|l| !l.trim().is_empty());
    if let Some(first) = lines.next() {
        output::diagnostic(tool, first.trim_start_matches("error: "));
    }
    for line in lines.filter(|l| l.starts_with("Usage:")) {
        eprintln!("{}", line);
    }
    output::diagnostic(tool, format!("Try '{} --help' for more information.", tool));
}

macro_rules! registry {
    ($($name:literal => $run:path),* $(,)?) => {
        /// Every tool name, in listing order.
        pub const NAMES: &[&str] = &[$($name),*];

        /// Run `name` with `argv` (arguments after the tool name).
        pub fn dispatch(name: &str, argv: Vec<String>) -> Option<i32> {
            match name {
                $($name => Some(invoke(name, argv, $run)),)*
                _ => None,
            }
        }
    };
}

registry! {
    // files
    "basename" => files::basename::run,
    "chgrp" => files::chown::run_chgrp,
    "chmod" => files::chmod::run,
    "chown" => files::chown::run,
    "cp" => files::cp::run,
    "df" => files::df::run,
    "dir" => files::dir::run,
    "dirname" => files::dirname::run,
    "dirsize" => files::dirsize::run,
    "du" => files::du::run,
    "fileage" => files::fileage::run,
    "filehead" => files::filehead::run_head,
    "filetail" => files::filehead::run_tail,
    "find" => files::find::run,
    "ln" => files::ln::run,
    "mkdir" => files::mkdir::run,
    "mktemp" => files::mktemp::run,
    "mv" => files::mv::run,
    "pathinfo" => files::pathinfo::run,
    "realpath" => files::realpath::run,
    "rm" => files::rm::run,
    "rmdir" => files::rmdir::run,
    "shred" => files::shred::run,
    "split" => files::split::run,
    "stat" => files::stat::run,
    "tee" => files::tee::run,
    "touch" => files::touch::run,
    "tree" => files::tree::run,
    "treeprint" => files::tree::run,
    "truncate" => files::truncate::run,
    "unlink" => files::unlink::run,
    "watcher" => files::watcher::run,
    // text
    "align" => text::align::run,
    "anagram" => text::anagram::run,
    "cat" => text::cat::run,
    "charfreq" => text::charfreq::run,
    "chunk" => text::chunk::run,
    "col" => text::col::run,
    "colorize" => text::colorize::run,
    "colreplace" => text::colreplace::run,
    "crossref" => text::crossref::run,
    "cut" => text::cut::run,
    "dedent" => text::indent::run_dedent,
    "dedup" => text::dedup::run,
    "expand" => text::expand::run_expand,
    "fieldmap" => text::fieldmap::run,
    "fmt" => text::fmt::run,
    "fold" => text::fold::run,
    "head" => text::head::run,
    "histogram" => text::histogram::run,
    "indent2tab" => text::indent::run_indent2tab,
    "indenter" => text::indent::run_indenter,
    "initcap" => text::case::run_initcap,
    "interleave" => text::interleave::run,
    "linefilter" => text::linefilter::run,
    "linenum" => text::linenum::run,
    "linesplit" => text::linesplit::run,
    "lower" => text::case::run_lower,
    "nl" => text::nl::run,
    "outline" => text::outline::run,
    "palindrome" => text::palindrome::run,
    "paste" => text::paste::run,
    "rev" => text::rev::run,
    "slugify" => text::case::run_slugify,
    "snake_case" => text::case::run_snake_case,
    "sort" => text::sort::run,
    "strings" => text::strings::run,
    "table" => text::table::run,
    "tac" => text::tac::run,
    "tail" => text::tail::run,
    "tr" => text::tr::run,
    "trim" => text::trim::run,
    "unexpand" => text::expand::run_unexpand,
    "uniq" => text::uniq::run,
    "upper" => text::case::run_upper,
    "upperlower" => text::case::run_upperlower,
    "wc" => text::wc::run,
    // search
    "bsearch" => search::bsearch::run,
    "globmatch" => search::globmatch::run,
    "grep" => search::grep::run,
    "sed" => search::sed::run,
    // numbers
    "abs" => numbers::abs::run,
    "bcalc" => numbers::bcalc::run,
    "bitflip" => numbers::bitflip::run,
    "cal" => numbers::cal::run,
    "countdown" => numbers::countdown::run,
    "dateadd" => numbers::dates::run_dateadd,
    "daysbetween" => numbers::dates::run_daysbetween,
    "factor" => numbers::factor::run,
    "floatfmt" => numbers::floatfmt::run,
    "humanize" => numbers::humanize::run,
    "numbase" => numbers::numbase::run,
    "numpad" => numbers::numpad::run,
    "roman" => numbers::roman::run,
    "seq" => numbers::seq::run,
    "timer" => numbers::timer::run,
    // encoding
    "b2sum" => encoding::hashsum::run_b2sum,
    "base32" => encoding::base::run_base32,
    "base58" => encoding::base58::run,
    "base64" => encoding::base::run_base64,
    "braille" => encoding::tables::run_braille,
    "cbase64" => encoding::base::run_base64,
    "checksum" => encoding::checksum::run,
    "cksum" => encoding::cksum::run,
    "eol" => encoding::eol::run,
    "escape" => encoding::escape::run,
    "fingerprint" => encoding::fingerprint::run,
    "flip" => encoding::tables::run_flip,
    "genhex" => encoding::genhex::run,
    "isutf8" => encoding::isutf8::run,
    "md5sum" => encoding::hashsum::run_md5sum,
    "morse" => encoding::morse::run,
    "od" => encoding::od::run,
    "phonetic" => encoding::tables::run_phonetic,
    "sha1sum" => encoding::hashsum::run_sha1sum,
    "sha224sum" => encoding::hashsum::run_sha224sum,
    "sha256sum" => encoding::hashsum::run_sha256sum,
    "sha384sum" => encoding::hashsum::run_sha384sum,
    "sha512sum" => encoding::hashsum::run_sha512sum,
    "sum" => encoding::cksum::run_sum,
    "urldecode" => encoding::url::run_urldecode,
    "urlencode" => encoding::url::run_urlencode,
    "uuid" => encoding::uuid::run,
    "xxd" => encoding::xxd::run,
    "zigzag" => encoding::zigzag::run,
    // data
    "csv2json" => data::csv2json::run,
    "csvstat" => data::csvstat::run,
    "dotenv" => data::dotenv::run,
    "filltemplate" => data::template::run_filltemplate,
    "flatten2" => data::flatten::run,
    "htmlstrip" => data::htmlstrip::run,
    "jsonkeys" => data::jsonkeys::run,
    "jsonmerge" => data::jsonmerge::run,
    "jsontemplate" => data::template::run_jsontemplate,
    "template" => data::template::run_template,
    "xmlfmt" => data::xmlfmt::run,
    // system
    "arch" => system::uname::run_arch,
    "clip" => system::clip::run,
    "confirm" => system::confirm::run,
    "dice" => system::random::run_dice,
    "diceware" => system::random::run_diceware,
    "env" => system::env::run_env,
    "free" => system::free::run,
    "hostname" => system::uname::run_hostname,
    "kill" => system::kill::run,
    "logger" => system::logger::run,
    "lorem" => system::random::run_lorem,
    "lsof" => system::lsof::run,
    "mknod" => system::mknod::run,
    "nice" => system::exec::run_nice,
    "nohup" => system::exec::run_nohup,
    "pipe" => system::pipe::run,
    "pkill" => system::kill::run_pkill,
    "printenv" => system::env::run_printenv,
    "ps" => system::ps::run,
    "pwd" => system::pwd::run,
    "ratelimit" => system::ratelimit::run,
    "script" => system::script::run,
    "signame" => system::kill::run_signame,
    "sleep" => system::sleep::run,
    "stdbuf" => system::exec::run_stdbuf,
    "stty" => system::stty::run,
    "sync" => system::sync::run,
    "timeout" => system::timeout::run,
    "timeout2" => system::timeout::run_timeout2,
    "tty" => system::stty::run_tty,
    "uname" => system::uname::run,
    "uptime" => system::uptime::run,
    "watch" => system::watch::run,
    "which" => system::which::run,
    // net
    "arp" => net::arp::run,
    "curl" => net::curl::run,
    "dns" => net::dns::run,
    "ifconfig" => net::ifconfig::run,
    "iprange" => net::iprange::run,
    "nc" => net::nc::run,
    "netstat" => net::netstat::run,
    "ping" => net::ping::run,
    "telnet" => net::telnet::run,
    "wget" => net::wget::run,
}

pub mod data;
pub mod encoding;
pub mod files;
pub mod net;
pub mod numbers;
pub mod search;
pub mod system;
pub mod text;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let mut names = NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), NAMES.len());
    }

    #[test]
    fn unknown_tool_is_not_dispatched() {
        assert_eq!(dispatch("no-such-tool", Vec::new()), None);
    }
}
