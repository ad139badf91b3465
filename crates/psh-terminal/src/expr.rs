//! Expression evaluation: arithmetic, then binary comparisons, otherwise the
//! text itself.
//!
//! Failure never surfaces as an error. Text that is neither valid arithmetic
//! nor a recognised comparison is returned unchanged.

use psh_vfs::path::unquote;

use crate::arith;
use crate::expand::{Scope, expand};

/// Comparison operators, without the leading dash.
const OPERATORS: &[&str] = &[
    "eq", "ne", "lt", "gt", "le", "ge", "like", "notlike", "match", "contains",
];

/// Expand variables in `text`, then evaluate it.
pub fn evaluate(text: &str, scope: &Scope<'_>) -> String {
    evaluate_expanded(&expand(text, scope))
}

/// Evaluate text whose variables are already substituted.
pub fn evaluate_expanded(text: &str) -> String {
    if arith::is_arithmetic_text(text) {
        let v = arith::evaluate(text);
        if !v.is_nan() {
            return arith::format_number(v);
        }
    }
    match compare(text) {
        Some(true) => "True".to_string(),
        Some(false) => "False".to_string(),
        None => text.to_string(),
    }
}

/// True if `text` evaluates to a truthy value: `True`, or a non-zero number.
pub fn is_truthy(value: &str) -> bool {
    let v = value.trim();
    if v.eq_ignore_ascii_case("true") {
        return true;
    }
    if v.is_empty() || v.eq_ignore_ascii_case("false") {
        return false;
    }
    arith::parse_decimal(v).is_none_or(|n| n != 0.0)
}

/// Locate the first whitespace-delimited ` -op ` in `text`.
///
/// Returns the byte range of the operator token (including its dash) and the
/// lower-cased operator name.
fn find_operator(text: &str) -> Option<(usize, usize, &'static str)> {
    let lower = text.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    for (i, _) in lower.match_indices('-') {
        if i == 0 || !bytes[i - 1].is_ascii_whitespace() {
            continue;
        }
        let after = &lower[i + 1..];
        for &op in OPERATORS {
            let Some(rest) = after.strip_prefix(op) else {
                continue;
            };
            if rest.starts_with(|c: char| c.is_ascii_whitespace()) {
                return Some((i, i + 1 + op.len(), op));
            }
        }
    }
    None
}

fn parse_num(s: &str) -> f64 {
    arith::parse_decimal(s).unwrap_or(f64::NAN)
}

/// Evaluate `<left> -op <right>`. `None` if `text` is not a comparison.
pub fn compare(text: &str) -> Option<bool> {
    let (start, end, op) = find_operator(text)?;
    let left = text[..start].trim();
    let right = text[end..].trim();
    if left.is_empty() || right.is_empty() {
        return None;
    }
    let (l, r) = (unquote(left), unquote(right));
    let result = match op {
        "eq" => l == r,
        "ne" => l != r,
        "lt" => parse_num(l) < parse_num(r),
        "gt" => parse_num(l) > parse_num(r),
        "le" => parse_num(l) <= parse_num(r),
        "ge" => parse_num(l) >= parse_num(r),
        "like" => glob_match(r, l),
        "notlike" => !glob_match(r, l),
        "match" => regex_search(r, l),
        "contains" => l.contains(r),
        _ => return None,
    };
    Some(result)
}

fn regex_search(pattern: &str, text: &str) -> bool {
    match regex::RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.is_match(text),
        Err(e) => {
            log::debug!("Invalid -match pattern {pattern:?}: {e}");
            false
        },
    }
}

/// Case-insensitive wildcard match anchored at both ends. `*` matches any
/// run of characters, `?` exactly one.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.to_lowercase().chars().collect();
    let t: Vec<char> = text.to_lowercase().chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            backtrack = Some((pi, ti));
            pi += 1;
        } else if let Some((star, matched)) = backtrack {
            pi = star + 1;
            ti = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}
