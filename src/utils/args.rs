//! Argument normalization utilities.
//!
//! Transforms CLI arguments before clap parsing to support the legacy
//! syntax classic tools accept but a declarative parser cannot express.

/// Single-dash long words some tools accept (`floatfmt -pct`).
const SINGLE_DASH_WORDS: &[(&str, &[&str])] = &[
    ("floatfmt", &["-pct", "-trim"]),
    ("uuid", &["-upper"]),
    ("dns", &["-type"]),
    ("flip", &["-ud", "-lr"]),
    (
        "find",
        &["-name", "-iname", "-path", "-type", "-size", "-maxdepth", "-mindepth", "-empty", "-print0"],
    ),
];

/// Flags of `head`/`tail` whose separate value may itself look like a count.
const COUNT_FLAGS: &[&str] = &["-n", "-c", "--lines", "--bytes"];

/// Convert `head -5` / `tail -5` / `tail +5` into `-n 5` / `-n +5`.
pub fn normalize_line_count(tool: &str, args: Vec<String>) -> Vec<String> {
    if tool != "head" && tool != "tail" {
        return args;
    }

    let mut result = Vec::with_capacity(args.len() + 1);
    let mut done = false;
    let mut takes_value = false;
    for arg in args {
        if takes_value {
            takes_value = false;
            result.push(arg);
            continue;
        }
        if !done && arg == "--" {
            done = true;
            result.push(arg);
            continue;
        }
        if !done && COUNT_FLAGS.contains(&arg.as_str()) {
            takes_value = true;
            result.push(arg);
            continue;
        }
        let digits = arg
            .strip_prefix('-')
            .filter(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()));
        let plus = arg
            .strip_prefix('+')
            .filter(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()));
        match (done, digits, plus) {
            (false, Some(n), _) => {
                result.push("-n".to_string());
                result.push(n.to_string());
            }
            (false, None, Some(n)) if tool == "tail" => {
                result.push("-n".to_string());
                result.push(format!("+{}", n));
            }
            _ => result.push(arg),
        }
    }
    result
}

/// Convert `kill -9 pid` / `kill -TERM pid` into `kill -s 9 pid`; `pkill`
/// takes the same leading signal form.
pub fn normalize_kill_signal(tool: &str, args: Vec<String>) -> Vec<String> {
    if tool != "kill" && tool != "pkill" {
        return args;
    }

    let Some(first) = args.first() else {
        return args;
    };
    let Some(sig) = first.strip_prefix('-') else {
        return args;
    };
    let is_signal = !sig.is_empty()
        && (sig.chars().all(|c| c.is_ascii_digit())
            || (sig.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
                && sig.len() > 1));
    if !is_signal {
        return args;
    }

    let mut result = vec!["-s".to_string(), sig.to_string()];
    result.extend(args.into_iter().skip(1));
    result
}

/// Promote single-dash long words (`-pct`) to `--pct` for tools that use them.
pub fn normalize_single_dash_words(tool: &str, args: Vec<String>) -> Vec<String> {
    let Some((_, words)) = SINGLE_DASH_WORDS.iter().find(|(name, _)| *name == tool) else {
        return args;
    };

    args.into_iter()
        .map(|arg| {
            let word = arg.split('=').next().unwrap_or("");
            if words.contains(&word) {
                format!("-{}", arg)
            } else {
                arg
            }
        })
        .collect()
}

/// Apply all argument normalizations in sequence.
pub fn normalize(tool: &str, args: Vec<String>) -> Vec<String> {
    let args = normalize_line_count(tool, args);
    let args = normalize_kill_signal(tool, args);
    normalize_single_dash_words(tool, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_head_numeric_shorthand() {
        let result = normalize("head", strings(&["-5", "file.txt"]));
        assert_eq!(result, strings(&["-n", "5", "file.txt"]));
    }

    #[test]
    fn test_tail_plus_shorthand() {
        let result = normalize("tail", strings(&["+3"]));
        assert_eq!(result, strings(&["-n", "+3"]));
    }

    #[test]
    fn test_explicit_count_values_untouched() {
        assert_eq!(normalize("tail", strings(&["-n", "+3"])), strings(&["-n", "+3"]));
        assert_eq!(normalize("tail", strings(&["-c", "+3"])), strings(&["-c", "+3"]));
        assert_eq!(normalize("head", strings(&["-n", "-1"])), strings(&["-n", "-1"]));
        assert_eq!(
            normalize("head", strings(&["--bytes", "-2", "-3"])),
            strings(&["--bytes", "-2", "-n", "3"])
        );
    }

    #[test]
    fn test_attached_count_forms_untouched() {
        assert_eq!(normalize("tail", strings(&["-n+3"])), strings(&["-n+3"]));
        assert_eq!(normalize("head", strings(&["--lines=-1"])), strings(&["--lines=-1"]));
    }

    #[test]
    fn test_head_plus_is_a_filename() {
        let result = normalize("head", strings(&["+3"]));
        assert_eq!(result, strings(&["+3"]));
    }

    #[test]
    fn test_shorthand_stops_at_separator() {
        let result = normalize("head", strings(&["--", "-5"]));
        assert_eq!(result, strings(&["--", "-5"]));
    }

    #[test]
    fn test_other_tools_untouched() {
        let args = strings(&["-5"]);
        assert_eq!(normalize("sort", args.clone()), args);
    }

    #[test]
    fn test_kill_numeric_signal() {
        let result = normalize("kill", strings(&["-9", "123"]));
        assert_eq!(result, strings(&["-s", "9", "123"]));
    }

    #[test]
    fn test_kill_named_signal() {
        let result = normalize("kill", strings(&["-TERM", "123"]));
        assert_eq!(result, strings(&["-s", "TERM", "123"]));
    }

    #[test]
    fn test_pkill_named_signal() {
        let result = normalize("pkill", strings(&["-HUP", "nginx"]));
        assert_eq!(result, strings(&["-s", "HUP", "nginx"]));
    }

    #[test]
    fn test_kill_list_flag_untouched() {
        let args = strings(&["-l"]);
        assert_eq!(normalize("kill", args.clone()), args);
    }

    #[test]
    fn test_single_dash_words() {
        let result = normalize("floatfmt", strings(&["-pct", "-p", "2"]));
        assert_eq!(result, strings(&["--pct", "-p", "2"]));

        let result = normalize("dns", strings(&["-type", "MX", "example.com"]));
        assert_eq!(result, strings(&["--type", "MX", "example.com"]));
    }

    #[test]
    fn test_find_predicates_become_long_flags() {
        let result = normalize("find", strings(&[".", "-name", "*.rs", "-type", "f"]));
        assert_eq!(result, strings(&[".", "--name", "*.rs", "--type", "f"]));
    }
}
