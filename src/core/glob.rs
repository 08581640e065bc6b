//! Shell-style glob matching with `{a,b,c}` brace expansion.
//!
//! Braces are expanded first, by recursive substitution of the leftmost
//! group; each resulting pattern is then matched with POSIX semantics
//! (`*` and `?` never cross `/`, `[...]` and `[!...]` classes).

use crate::error::{Error, Result};

/// Locate the leftmost brace group that has at least one top-level comma.
/// Returns `(open, close, commas)` byte offsets.
fn find_group(pattern: &str) -> Option<(usize, usize, Vec<usize>)> {
    let bytes = pattern.as_bytes();
    let mut start = 0;
    while let Some(rel) = pattern[start..].find('{') {
        let open = start + rel;
        let mut depth = 0usize;
        let mut commas = Vec::new();
        let mut i = open;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 1,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        if !commas.is_empty() {
                            return Some((open, i, commas));
                        }
                        break;
                    }
                }
                b',' if depth == 1 => commas.push(i),
                _ => {}
            }
            i += 1;
        }
        start = open + 1;
    }
    None
}

/// Expand every brace group; patterns without groups come back unchanged.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some((open, close, commas)) = find_group(pattern) else {
        return vec![pattern.to_string()];
    };
    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];

    let mut bounds = Vec::with_capacity(commas.len() + 2);
    bounds.push(open);
    bounds.extend(commas);
    bounds.push(close);

    bounds
        .windows(2)
        .flat_map(|w| {
            let alternative = &pattern[w[0] + 1..w[1]];
            expand_braces(&format!("{}{}{}", prefix, alternative, suffix))
        })
        .collect()
}

/// Whether `text` matches `pattern` after brace expansion.
pub fn matches(pattern: &str, text: &str) -> bool {
    expand_braces(pattern)
        .iter()
        .any(|p| glob_match::glob_match(p, text))
}

/// Expand `pattern` against the filesystem, in brace order then sorted.
pub fn expand_paths(pattern: &str) -> Result<Vec<String>> {
    let mut found = Vec::new();
    for alternative in expand_braces(pattern) {
        let paths = glob::glob(&alternative)
            .map_err(|e| Error::invalid_pattern(&alternative, e.msg))?;
        for path in paths.flatten() {
            let text = path.display().to_string();
            if !found.contains(&text) {
                found.push(text);
            }
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn braces_expand_in_order() {
        assert_eq!(expand_braces("a{b,c}d"), vec!["abd", "acd"]);
        assert_eq!(
            expand_braces("{x,y}{1,2}"),
            vec!["x1", "x2", "y1", "y2"]
        );
    }

    #[test]
    fn nested_braces_expand() {
        assert_eq!(expand_braces("a{b,c{d,e}}"), vec!["ab", "acd", "ace"]);
    }

    #[test]
    fn braces_without_comma_stay_literal() {
        assert_eq!(expand_braces("a{b}c"), vec!["a{b}c"]);
        assert_eq!(expand_braces("{a,b"), vec!["{a,b"]);
    }

    #[test]
    fn matches_posix_wildcards() {
        assert!(matches("*.rs", "main.rs"));
        assert!(!matches("*.rs", "src/main.rs"));
        assert!(matches("file?.txt", "file1.txt"));
        assert!(matches("[!a]*", "beta"));
        assert!(!matches("[!a]*", "alpha"));
        assert!(matches("*.{jpg,png}", "photo.png"));
    }

    #[test]
    fn expand_paths_lists_matching_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::write(dir.path().join("b.md"), "").unwrap();
        fs::write(dir.path().join("c.log"), "").unwrap();
        let pattern = format!("{}/*.{{txt,md}}", dir.path().display());
        let found = expand_paths(&pattern).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("a.txt"));
        assert!(found[1].ends_with("b.md"));
    }
}
