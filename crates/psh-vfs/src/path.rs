//! Drive-letter path normalization and resolution.
//!
//! Paths use `\` as the canonical separator and `/` is accepted on input.
//! A normalized path has an uppercase drive letter, no repeated separators
//! and no trailing separator except on a drive root (`C:\`).

use std::borrow::Cow;

/// Canonical separator.
pub const SEPARATOR: char = '\\';

fn is_sep(c: char) -> bool {
    c == '\\' || c == '/'
}

/// True if `path` starts with a single letter followed by `:`.
pub fn has_drive_prefix(path: &str) -> bool {
    let b = path.as_bytes();
    b.len() >= 2 && b[0].is_ascii_alphabetic() && b[1] == b':'
}

/// True for `X:\` exactly.
pub fn is_drive_root(path: &str) -> bool {
    path.len() == 3 && has_drive_prefix(path) && path.ends_with(SEPARATOR)
}

/// Check whether a path is already in normal form.
fn is_normalized(path: &str) -> bool {
    if path.contains('/') || path.contains("\\\\") {
        return false;
    }
    if has_drive_prefix(path) {
        if path.as_bytes()[0].is_ascii_lowercase() || path.len() == 2 {
            return false;
        }
        if is_drive_root(path) {
            return true;
        }
    }
    !path.ends_with(SEPARATOR)
}

/// Normalize a path. Returns the input unchanged (zero-alloc) when it is
/// already in normal form.
///
/// Total: the empty string normalizes to itself.
pub fn normalize(path: &str) -> Cow<'_, str> {
    if is_normalized(path) {
        return Cow::Borrowed(path);
    }
    let mut out = String::with_capacity(path.len() + 1);
    let mut prev_sep = false;
    for ch in path.chars() {
        if is_sep(ch) {
            if !prev_sep {
                out.push(SEPARATOR);
            }
            prev_sep = true;
        } else {
            out.push(ch);
            prev_sep = false;
        }
    }
    if has_drive_prefix(&out) {
        let letter = out[..1].to_ascii_uppercase();
        out.replace_range(..1, &letter);
        if out.len() == 2 {
            out.push(SEPARATOR);
        }
    }
    if out.ends_with(SEPARATOR) && !is_drive_root(&out) {
        out.pop();
    }
    Cow::Owned(out)
}

/// Strip one layer of matching single or double quotes.
pub fn unquote(s: &str) -> &str {
    let b = s.as_bytes();
    if b.len() >= 2 && (b[0] == b'"' || b[0] == b'\'') && b[b.len() - 1] == b[0] {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Root of the drive `path` lives on (`C:\`). Empty when `path` has no drive.
pub fn drive_root_of(path: &str) -> String {
    if has_drive_prefix(path) {
        format!("{}:{SEPARATOR}", path[..1].to_ascii_uppercase())
    } else {
        String::new()
    }
}

/// Drop the last segment of `base` in place. Never goes above a drive root.
fn pop_segment(base: &mut String) {
    if is_drive_root(base) {
        return;
    }
    if let Some(i) = base.rfind(SEPARATOR) {
        base.truncate(i);
        if base.len() == 2 && has_drive_prefix(base) {
            base.push(SEPARATOR);
        }
    }
}

/// Resolve a user-supplied path against the current directory.
///
/// `.` segments are skipped and `..` pops one segment, stopping at the drive
/// root. A leading separator starts from the root of `cwd`'s drive.
pub fn resolve(path: &str, cwd: &str) -> String {
    let input = unquote(path);
    if input.is_empty() || input == "." {
        return normalize(cwd).into_owned();
    }
    if has_drive_prefix(input) {
        return normalize(input).into_owned();
    }

    let mut base = if input.starts_with(is_sep) {
        drive_root_of(cwd)
    } else {
        normalize(cwd).into_owned()
    };
    for seg in input.split(is_sep) {
        match seg {
            "" | "." => {},
            ".." => pop_segment(&mut base),
            name => {
                if !base.is_empty() && !base.ends_with(SEPARATOR) {
                    base.push(SEPARATOR);
                }
                base.push_str(name);
            },
        }
    }
    normalize(&base).into_owned()
}

/// Parent directory of a normalized path. `None` for drive roots and
/// single-segment relative paths.
pub fn parent(path: &str) -> Option<&str> {
    if is_drive_root(path) {
        return None;
    }
    match path.rfind(SEPARATOR) {
        Some(2) if has_drive_prefix(path) => Some(&path[..3]),
        Some(i) => Some(&path[..i]),
        None => None,
    }
}

/// Last segment of a normalized path. Empty for a drive root.
pub fn file_name(path: &str) -> &str {
    if is_drive_root(path) {
        return "";
    }
    match path.rfind(SEPARATOR) {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

/// Append `name` to directory `dir`.
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else if dir.ends_with(SEPARATOR) {
        format!("{dir}{name}")
    } else {
        format!("{dir}{SEPARATOR}{name}")
    }
}
