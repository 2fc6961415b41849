//! Command templates.
//!
//! A template is split on whitespace into tokens. `{name}` marks a
//! placeholder; braces that do not enclose an identifier are literal text.
//!
//! Rendering produces an argument vector, never a shell string:
//!
//! - a token that is exactly one placeholder expands to the argument's
//!   values (one argv entry each), or to nothing if the argument is absent
//! - a token mixing text and placeholders (`--glob={pattern}`) is substituted
//!   in place, and dropped entirely if any of its placeholders is absent

use super::validation::ValidatedArguments;
use std::collections::BTreeSet;

/// Piece of a template token.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn segments(token: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = token;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_identifier(&after[..close]) => {
                if open > 0 {
                    out.push(Segment::Literal(&rest[..open]));
                }
                out.push(Segment::Placeholder(&after[..close]));
                rest = &after[close + 1..];
            }
            _ => {
                // Not a placeholder; keep the brace as text
                out.push(Segment::Literal(&rest[..open + 1]));
                rest = after;
            }
        }
    }
    if !rest.is_empty() {
        out.push(Segment::Literal(rest));
    }
    out
}

/// Names of all placeholders appearing in `template`.
pub fn placeholders(template: &str) -> BTreeSet<String> {
    template
        .split_whitespace()
        .flat_map(segments)
        .filter_map(|seg| match seg {
            Segment::Placeholder(name) => Some(name.to_string()),
            Segment::Literal(_) => None,
        })
        .collect()
}

/// Render `template` into an argument vector.
///
/// The first element is the program to run. Returns an empty vector if
/// the template renders to nothing.
pub fn render(template: &str, args: &ValidatedArguments) -> Vec<String> {
    let mut argv = Vec::new();

    for token in template.split_whitespace() {
        let segs = segments(token);

        if let [Segment::Placeholder(name)] = segs.as_slice() {
            if let Some(values) = args.get(name) {
                argv.extend(values.iter().cloned());
            }
            continue;
        }

        let mut rendered = String::new();
        let mut complete = true;
        for seg in &segs {
            match seg {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Placeholder(name) => match args.get(name) {
                    Some(values) => rendered.push_str(&values.join(" ")),
                    None => {
                        complete = false;
                        break;
                    }
                },
            }
        }
        if complete {
            argv.push(rendered);
        }
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, &[&str])]) -> ValidatedArguments {
        let mut validated = ValidatedArguments::default();
        for (name, values) in pairs {
            validated.insert(*name, values.iter().map(|v| v.to_string()).collect());
        }
        validated
    }

    #[test]
    fn test_placeholders() {
        let names = placeholders("grep -rn {pattern} --include={glob} {path}");
        let expected: BTreeSet<String> =
            ["glob", "path", "pattern"].iter().map(|s| s.to_string()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_non_identifier_braces_are_literal() {
        assert!(placeholders("jq {.name} {} {a-b}").is_empty());
        let argv = render("jq {.name} {}", &ValidatedArguments::default());
        assert_eq!(argv, vec!["jq", "{.name}", "{}"]);
    }

    #[test]
    fn test_render_whole_token_keeps_value_as_one_argument() {
        let argv = render("echo {text}", &args(&[("text", &["; rm -rf /"])]));
        assert_eq!(argv, vec!["echo", "; rm -rf /"]);
    }

    #[test]
    fn test_render_drops_absent_optional() {
        let argv = render("ls -la {path}", &ValidatedArguments::default());
        assert_eq!(argv, vec!["ls", "-la"]);
    }

    #[test]
    fn test_render_embedded_placeholder() {
        let argv = render("rg --glob={glob} {pattern}", &args(&[("pattern", &["TODO"])]));
        assert_eq!(argv, vec!["rg", "TODO"]);

        let argv = render(
            "rg --glob={glob} {pattern}",
            &args(&[("pattern", &["TODO"]), ("glob", &["*.rs"])]),
        );
        assert_eq!(argv, vec!["rg", "--glob=*.rs", "TODO"]);
    }

    #[test]
    fn test_render_array_expands_to_many_arguments() {
        let argv = render("ls {args}", &args(&[("args", &["-l", "-a", "/tmp"])]));
        assert_eq!(argv, vec!["ls", "-l", "-a", "/tmp"]);
    }
}
