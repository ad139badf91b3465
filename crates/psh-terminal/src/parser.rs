//! Line parsing: statements, pipeline segments, tokens, named parameters.
//!
//! Quote tracking is the same everywhere: a run opened by `'` or `"` ends
//! only at the same character, and the other quote is literal inside it.

use std::collections::HashMap;

use crate::arith;

// ---------------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------------

/// Split on `sep` outside quotes. With `braces`, also only at brace depth 0.
fn split_unquoted(input: &str, sep: char, braces: bool) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;

    for ch in input.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
                current.push(ch);
            },
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    current.push(ch);
                },
                '{' if braces => {
                    depth += 1;
                    current.push(ch);
                },
                '}' if braces => {
                    depth = depth.saturating_sub(1);
                    current.push(ch);
                },
                c if c == sep && depth == 0 => {
                    parts.push(std::mem::take(&mut current));
                },
                _ => current.push(ch),
            },
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Split a statement into pipeline segments on unquoted `|`.
pub fn split_pipeline(input: &str) -> Vec<String> {
    split_unquoted(input, '|', false)
}

/// Split a line into statements on unquoted `;` outside `{ }` blocks.
pub fn split_statements(input: &str) -> Vec<String> {
    split_unquoted(input, ';', true)
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Split a segment into tokens on unquoted whitespace. Quote characters
/// delimit runs and are removed from the token text.
pub fn parse_args(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in input.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                },
                _ => current.push(ch),
            },
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// First whitespace-delimited word of `input`, quotes left in place.
pub fn first_raw_token(input: &str) -> &str {
    let t = input.trim_start();
    t.split(char::is_whitespace).next().unwrap_or("")
}

/// Everything after the first whitespace-delimited word, trimmed.
pub fn after_first_token(input: &str) -> &str {
    let t = input.trim_start();
    match t.find(char::is_whitespace) {
        Some(i) => t[i..].trim(),
        None => "",
    }
}

// ---------------------------------------------------------------------------
// Named parameters
// ---------------------------------------------------------------------------

/// Value bound to a named parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Value(String),
    /// Flag given with no value.
    Switch,
}

/// Tokens split into positional arguments and named parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub positional: Vec<String>,
    /// Keyed by lower-cased parameter name, without the dash.
    pub named: HashMap<String, ParamValue>,
}

impl ParsedArgs {
    /// Value of a named parameter. `None` for switches and absent names.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self.named.get(&name.to_lowercase()) {
            Some(ParamValue::Value(v)) => Some(v),
            _ => None,
        }
    }

    /// True if the parameter was given at all.
    pub fn has(&self, name: &str) -> bool {
        self.named.contains_key(&name.to_lowercase())
    }

    /// Switch state: present without a value, or with a value other than
    /// `false`/`0`.
    pub fn flag(&self, name: &str) -> bool {
        match self.named.get(&name.to_lowercase()) {
            Some(ParamValue::Switch) => true,
            Some(ParamValue::Value(v)) => {
                let v = v.trim_start_matches('$');
                !(v.eq_ignore_ascii_case("false") || v == "0")
            },
            None => false,
        }
    }

    /// Named value, falling back to the positional argument at `position`.
    pub fn param(&self, name: &str, position: usize) -> Option<&str> {
        self.get(name)
            .or_else(|| self.positional.get(position).map(String::as_str))
    }

    /// First named value among `names`.
    pub fn get_any(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|n| self.get(n))
    }
}

/// Split tokens into positional and named parameters.
///
/// `-Name:value` binds inline. `-Name value` consumes the next token unless it
/// starts with `-` or `Name` is one of `switches`; otherwise it is a switch.
pub fn parse_params(tokens: &[String], switches: &[&str]) -> ParsedArgs {
    let mut args = ParsedArgs::default();
    let mut i = 0;
    while i < tokens.len() {
        let tok = &tokens[i];
        i += 1;
        let Some(body) = tok.strip_prefix('-').filter(|b| !b.is_empty()) else {
            args.positional.push(tok.clone());
            continue;
        };
        if let Some(colon) = body.find(':').filter(|&c| c > 0) {
            let name = body[..colon].to_lowercase();
            let value = body[colon + 1..].to_string();
            args.named.insert(name, ParamValue::Value(value));
            continue;
        }
        let name = body.to_lowercase();
        let is_switch = switches.iter().any(|s| s.eq_ignore_ascii_case(&name));
        match tokens.get(i) {
            Some(next) if !is_switch && !next.starts_with('-') => {
                args.named.insert(name, ParamValue::Value(next.clone()));
                i += 1;
            },
            _ => {
                args.named.insert(name, ParamValue::Switch);
            },
        }
    }
    args
}

// ---------------------------------------------------------------------------
// Statement forms
// ---------------------------------------------------------------------------

/// Recognise `$name = rhs`. Returns the name and the trimmed right-hand side.
pub fn parse_assignment(statement: &str) -> Option<(&str, &str)> {
    let s = statement.trim();
    let body = s.strip_prefix('$')?;
    let name_len = body
        .char_indices()
        .find(|&(_, c)| !(c.is_alphanumeric() || c == '_'))
        .map_or(body.len(), |(i, _)| i);
    let name = &body[..name_len];
    if !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return None;
    }
    let rest = body[name_len..].trim_start().strip_prefix('=')?;
    if rest.starts_with('=') {
        return None;
    }
    Some((name, rest.trim()))
}

/// True for a bare arithmetic statement such as `2 + 3` or `(4)`.
pub fn is_arithmetic_statement(statement: &str) -> bool {
    let s = statement.trim();
    arith::is_arithmetic_text(s) && s.starts_with(|c: char| c.is_ascii_digit() || c == '(')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    // -- Splitting --

    #[test]
    fn pipeline_split_respects_quotes() {
        assert_eq!(
            split_pipeline("echo 'a|b' | Sort-Object |  "),
            vec!["echo 'a|b'", "Sort-Object"]
        );
        assert_eq!(split_pipeline("echo \"it's | here\""), vec!["echo \"it's | here\""]);
    }

    #[test]
    fn statement_split_respects_braces() {
        assert_eq!(
            split_statements("ls | % { $a; $b }; pwd"),
            vec!["ls | % { $a; $b }", "pwd"]
        );
        assert_eq!(split_statements("echo 'x;y'; ; echo z"), vec!["echo 'x;y'", "echo z"]);
    }

    // -- Tokenizer --

    #[test]
    fn tokenizer_strips_quotes() {
        assert_eq!(
            parse_args("Write-Output \"hello world\" 'x y' z"),
            toks(&["Write-Output", "hello world", "x y", "z"])
        );
    }

    #[test]
    fn tokenizer_other_quote_is_literal() {
        assert_eq!(parse_args("echo \"it's\""), toks(&["echo", "it's"]));
        assert_eq!(parse_args("echo 'say \"hi\"'"), toks(&["echo", "say \"hi\""]));
    }

    #[test]
    fn tokenizer_joins_adjacent_runs_and_drops_empty() {
        assert_eq!(parse_args("a\"b c\"d"), toks(&["ab cd"]));
        assert_eq!(parse_args("echo \"\"   x"), toks(&["echo", "x"]));
        assert!(parse_args("   ").is_empty());
    }

    #[test]
    fn raw_token_helpers() {
        assert_eq!(first_raw_token("  \"a b\" c"), "\"a");
        assert_eq!(after_first_token("Where-Object { $_ -gt 1 }"), "{ $_ -gt 1 }");
        assert_eq!(after_first_token("pwd"), "");
    }

    // -- Named parameters --

    #[test]
    fn named_value_and_positional() {
        let a = parse_params(&toks(&["src", "-Path", "x.txt", "dst"]), &[]);
        assert_eq!(a.positional, toks(&["src", "dst"]));
        assert_eq!(a.get("path"), Some("x.txt"));
        assert_eq!(a.get("PATH"), Some("x.txt"));
    }

    #[test]
    fn inline_colon_value() {
        let a = parse_params(&toks(&["-Count:3", "-Recurse:false"]), &[]);
        assert_eq!(a.get("count"), Some("3"));
        assert!(!a.flag("recurse"));
    }

    #[test]
    fn flag_followed_by_flag_is_switch() {
        let a = parse_params(&toks(&["-Force", "-Recurse"]), &[]);
        assert_eq!(a.named.get("force"), Some(&ParamValue::Switch));
        assert!(a.flag("force"));
        assert!(a.flag("recurse"));
        assert_eq!(a.get("force"), None);
    }

    #[test]
    fn without_declared_switches_next_token_is_consumed() {
        let a = parse_params(&toks(&["-Recurse", "docs"]), &[]);
        assert_eq!(a.get("recurse"), Some("docs"));
        assert!(a.positional.is_empty());
    }

    #[test]
    fn declared_switch_never_consumes() {
        let a = parse_params(&toks(&["-Recurse", "docs"]), &["Recurse"]);
        assert!(a.flag("recurse"));
        assert_eq!(a.positional, toks(&["docs"]));
    }

    #[test]
    fn lone_dash_is_positional() {
        let a = parse_params(&toks(&["-"]), &[]);
        assert_eq!(a.positional, toks(&["-"]));
    }

    #[test]
    fn param_falls_back_to_position() {
        let a = parse_params(&toks(&["a.txt"]), &[]);
        assert_eq!(a.param("path", 0), Some("a.txt"));
        assert_eq!(a.param("path", 1), None);
        let b = parse_params(&toks(&["-Path", "b.txt", "c.txt"]), &[]);
        assert_eq!(b.param("path", 0), Some("b.txt"));
    }

    // -- Statement forms --

    #[test]
    fn assignment_forms() {
        assert_eq!(parse_assignment("$x = 5"), Some(("x", "5")));
        assert_eq!(parse_assignment("$name=\"a b\""), Some(("name", "\"a b\"")));
        assert_eq!(parse_assignment("$x == 5"), None);
        assert_eq!(parse_assignment("$1 = 5"), None);
        assert_eq!(parse_assignment("x = 5"), None);
        assert_eq!(parse_assignment("$x"), None);
    }

    #[test]
    fn arithmetic_statement_detection() {
        assert!(is_arithmetic_statement("2 + 2"));
        assert!(is_arithmetic_statement("(1+2)*3"));
        assert!(!is_arithmetic_statement("-5"));
        assert!(!is_arithmetic_statement("ls"));
    }
}
