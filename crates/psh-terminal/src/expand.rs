//! Variable expansion.
//!
//! Two passes. `${name}` is replaced with the variable's value, or nothing
//! when undefined. Bare `$name` is replaced only when defined; an undefined
//! bare reference stays in the text as written.

use psh_types::config::ShellConfig;

use crate::variables::Variables;

/// Version string reported by `$PSVersionTable`.
pub const PS_VERSION: &str = "5.1.0 (psh)";

/// Read-only view of everything variable expansion can see.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub variables: &'a Variables,
    pub cwd: &'a str,
    pub config: &'a ShellConfig,
}

/// Names of the built-in read-only variables.
pub const BUILTIN_NAMES: &[&str] = &[
    "null",
    "true",
    "false",
    "PSVersionTable",
    "UserName",
    "ComputerName",
    "Home",
    "PWD",
];

/// Value of a built-in variable, matched case-insensitively.
pub fn builtin(name: &str, scope: &Scope<'_>) -> Option<String> {
    let value = match name.to_ascii_lowercase().as_str() {
        "null" => String::new(),
        "true" => "True".to_string(),
        "false" => "False".to_string(),
        "psversiontable" => PS_VERSION.to_string(),
        "username" => scope.config.user_name.clone(),
        "computername" => scope.config.computer_name.clone(),
        "home" => scope.config.home_dir(),
        "pwd" => scope.cwd.to_string(),
        _ => return None,
    };
    Some(value)
}

/// Resolve a bare `$name`: built-ins first, then user variables.
pub fn lookup(name: &str, scope: &Scope<'_>) -> Option<String> {
    builtin(name, scope).or_else(|| scope.variables.get(name).map(str::to_string))
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// If `text` is exactly `$name`, return `name`.
pub fn bare_variable_name(text: &str) -> Option<&str> {
    let name = text.strip_prefix('$')?;
    let mut chars = name.chars();
    let first = chars.next()?;
    (is_ident_start(first) && chars.all(is_ident_char)).then_some(name)
}

fn expand_braced(text: &str, scope: &Scope<'_>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let name = &after[..end];
        let value = scope
            .variables
            .get(name)
            .map(str::to_string)
            .or_else(|| builtin(name, scope))
            .unwrap_or_default();
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

fn expand_bare(text: &str, scope: &Scope<'_>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some(&(_, c)) if is_ident_start(c) => {},
            _ => {
                out.push(ch);
                continue;
            },
        }
        let start = i + 1;
        let mut end = start;
        while let Some(&(j, c)) = chars.peek() {
            if !is_ident_char(c) {
                break;
            }
            end = j + c.len_utf8();
            chars.next();
        }
        let name = &text[start..end];
        match lookup(name, scope) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&text[i..end]),
        }
    }
    out
}

/// Substitute variables into `text`.
pub fn expand(text: &str, scope: &Scope<'_>) -> String {
    if !text.contains('$') {
        return text.to_string();
    }
    let braced = expand_braced(text, scope);
    expand_bare(&braced, scope)
}
