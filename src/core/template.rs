//! String template rendering.
//!
//! Two flavours: plain `{{NAME}}` substitution with an explicit policy
//! for unknown names, and a full mustache-style language (minijinja) with
//! a fixed set of helper filters.

use std::collections::HashMap;

use minijinja::{Environment, UndefinedBehavior};
use regex::{Captures, Regex};
use serde::Serialize;

use crate::error::{Error, ErrorCode, Result};

/// What to do with `{{NAME}}` when `NAME` has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    Keep,
    Empty,
    Error,
}

impl MissingPolicy {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "keep" => Ok(MissingPolicy::Keep),
            "empty" => Ok(MissingPolicy::Empty),
            "error" => Ok(MissingPolicy::Error),
            other => Err(Error::invalid_argument("missing policy", other)),
        }
    }
}

pub fn render(template: &str, variables: &[(&str, &str)]) -> String {
    let mut result = template.to_string();

    for (key, value) in variables {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }

    result
}

/// Replace `{{NAME}}` (optional inner spaces) using `variables`.
pub fn render_map(
    template: &str,
    variables: &HashMap<String, String>,
    missing: MissingPolicy,
) -> Result<String> {
    let re = Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*\}\}")
        .map_err(|e| Error::invalid_pattern("placeholder", e))?;
    let mut unknown: Option<String> = None;

    let rendered = re.replace_all(template, |caps: &Captures| {
        let name = &caps[1];
        match variables.get(name) {
            Some(value) => value.clone(),
            None => match missing {
                MissingPolicy::Keep => caps[0].to_string(),
                MissingPolicy::Empty => String::new(),
                MissingPolicy::Error => {
                    unknown.get_or_insert_with(|| name.to_string());
                    String::new()
                }
            },
        }
    });

    if let Some(name) = unknown {
        return Err(Error::new(
            ErrorCode::ParseInvalidValue,
            format!("undefined variable: {}", name),
        ));
    }
    Ok(rendered.into_owned())
}

fn split_filter(value: String, separator: Option<String>) -> Vec<String> {
    match separator {
        Some(sep) if !sep.is_empty() => value.split(sep.as_str()).map(str::to_string).collect(),
        _ => value.split_whitespace().map(str::to_string).collect(),
    }
}

fn env_lookup(name: String, default: Option<String>) -> String {
    std::env::var(&name).unwrap_or_else(|_| default.unwrap_or_default())
}

/// The template environment with the helper set: `upper lower title trim
/// replace split join default env`.
pub fn environment(strict: bool) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.set_undefined_behavior(if strict {
        UndefinedBehavior::Strict
    } else {
        UndefinedBehavior::Lenient
    });
    env.add_filter("split", split_filter);
    env.add_filter("env", env_lookup);
    env.add_function("env", env_lookup);
    env
}

/// Render a mustache-style template against any serializable context.
pub fn render_template<S: Serialize>(source: &str, context: S, strict: bool) -> Result<String> {
    let env = environment(strict);
    env.render_str(source, context).map_err(|e| {
        Error::new(
            ErrorCode::ParseInvalidValue,
            format!("template error: {}", e),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn render_replaces_placeholders() {
        assert_eq!(render("Hi {{name}}", &[("name", "Ada")]), "Hi Ada");
    }

    #[test]
    fn render_map_policies() {
        let v = vars(&[("A", "1")]);
        assert_eq!(
            render_map("{{A}} {{ B }}", &v, MissingPolicy::Keep).unwrap(),
            "1 {{ B }}"
        );
        assert_eq!(
            render_map("{{A}} {{B}}", &v, MissingPolicy::Empty).unwrap(),
            "1 "
        );
        let err = render_map("{{A}} {{B}}", &v, MissingPolicy::Error).unwrap_err();
        assert_eq!(err.message, "undefined variable: B");
    }

    #[test]
    fn missing_policy_parses() {
        assert_eq!(MissingPolicy::parse("keep").unwrap(), MissingPolicy::Keep);
        assert!(MissingPolicy::parse("drop").is_err());
    }

    #[test]
    fn template_helpers() {
        let ctx = json!({"name": "ada lovelace", "tags": "a,b,c"});
        let out = render_template(
            "{{ name|title }} {{ name|upper }} {{ tags|split(',')|join('+') }} {{ missing|default('x') }}",
            &ctx,
            false,
        )
        .unwrap();
        assert_eq!(out, "Ada Lovelace ADA LOVELACE a+b+c x");
    }

    #[test]
    fn template_replace_and_trim() {
        let ctx = json!({"s": "  a-b  "});
        let out = render_template("{{ s|trim|replace('-', '_') }}", &ctx, false).unwrap();
        assert_eq!(out, "a_b");
    }

    #[test]
    fn template_env_helper() {
        let out = render_template("{{ env('KIT_TEMPLATE_UNSET_VAR', 'fallback') }}", json!({}), false)
            .unwrap();
        assert_eq!(out, "fallback");
    }

    #[test]
    fn trailing_newline_is_kept() {
        let out = render_template("a {{ x }}\nb\n", json!({"x": 1}), false).unwrap();
        assert_eq!(out, "a 1\nb\n");
    }

    #[test]
    fn strict_mode_rejects_undefined() {
        assert!(render_template("{{ nope }}", json!({}), true).is_err());
    }
}
