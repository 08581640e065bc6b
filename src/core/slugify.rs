use heck::{ToKebabCase, ToShoutySnakeCase, ToSnakeCase};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold to ASCII where a decomposition exists: NFD, then drop combining
/// marks. `Crème Brûlée` becomes `Creme Brulee`.
pub fn fold_ascii(value: &str) -> String {
    value.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// URL slug: ASCII-folded, lowercase, every run of characters outside
/// `[a-z0-9]` collapsed to `separator`, no leading/trailing separator.
pub fn slugify(value: &str, separator: &str) -> String {
    let folded = fold_ascii(value).to_lowercase();

    let mut out = String::new();
    let mut pending_separator = false;

    for ch in folded.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_separator && !out.is_empty() {
                out.push_str(separator);
            }
            pending_separator = false;
            out.push(ch);
        } else {
            pending_separator = true;
        }
    }

    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStyle {
    Snake,
    Kebab,
    ScreamingSnake,
}

/// Convert identifiers to snake case, splitting at lower→upper transitions
/// and acronym boundaries (`myCSVParser` → `my_csv_parser`). A custom
/// separator replaces `_`.
pub fn snake_case(value: &str, style: CaseStyle, separator: Option<&str>) -> String {
    let converted = match style {
        CaseStyle::Snake => value.to_snake_case(),
        CaseStyle::Kebab => value.to_kebab_case(),
        CaseStyle::ScreamingSnake => value.to_shouty_snake_case(),
    };
    match separator {
        Some(sep) => {
            let native = if style == CaseStyle::Kebab { "-" } else { "_" };
            converted.replace(native, sep)
        }
        None => converted,
    }
}

/// Capitalize the first letter of every word, lowercasing the rest.
/// Word boundaries are any non-alphanumeric character except apostrophes.
pub fn initcap(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for ch in value.chars() {
        if ch.is_alphanumeric() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = ch != '\'';
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic_name() {
        assert_eq!(slugify("Hello, World!", "-"), "hello-world");
    }

    #[test]
    fn slugify_preserves_numbers() {
        assert_eq!(slugify("Plugin v2", "-"), "plugin-v2");
    }

    #[test]
    fn slugify_trims_whitespace() {
        assert_eq!(slugify("  spaced  ", "-"), "spaced");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("foo--bar__baz", "-"), "foo-bar-baz");
    }

    #[test]
    fn slugify_folds_accents() {
        assert_eq!(slugify("Crème Brûlée à la carte", "_"), "creme_brulee_a_la_carte");
    }

    #[test]
    fn slugify_is_idempotent() {
        let once = slugify("Ünïcödé  Text -- here", "-");
        assert_eq!(slugify(&once, "-"), once);
    }

    #[test]
    fn slugify_only_special_is_empty() {
        assert_eq!(slugify("!@#$%", "-"), "");
    }

    #[test]
    fn snake_case_splits_acronyms() {
        assert_eq!(snake_case("myCSVParser", CaseStyle::Snake, None), "my_csv_parser");
        assert_eq!(snake_case("HTTPServer", CaseStyle::Snake, None), "http_server");
    }

    #[test]
    fn snake_case_styles() {
        assert_eq!(snake_case("fooBar", CaseStyle::Kebab, None), "foo-bar");
        assert_eq!(snake_case("fooBar", CaseStyle::ScreamingSnake, None), "FOO_BAR");
        assert_eq!(snake_case("fooBar", CaseStyle::Snake, Some(".")), "foo.bar");
    }

    #[test]
    fn snake_case_is_idempotent() {
        let once = snake_case("someXMLValue", CaseStyle::Snake, None);
        assert_eq!(snake_case(&once, CaseStyle::Snake, None), once);
    }

    #[test]
    fn initcap_words() {
        assert_eq!(initcap("hello wORLD-foo don't"), "Hello World-Foo Don't");
    }
}
