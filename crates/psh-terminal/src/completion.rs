//! Tab completion over commands, parameters, variables and paths.

use std::collections::HashSet;

use serde::Serialize;

use psh_vfs::Vfs;
use psh_vfs::path;

use crate::expand::BUILTIN_NAMES;
use crate::interpreter::CommandRegistry;
use crate::parser::parse_args;
use crate::state::ShellState;

/// What a completion candidate refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompletionKind {
    Command,
    Parameter,
    Variable,
    Directory,
    File,
}

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    /// Text shown in a picker.
    pub label: String,
    pub kind: CompletionKind,
    /// The whole input line with the current word replaced.
    pub replacement: String,
}

/// Byte offsets of the current pipeline segment and of the word under the
/// cursor (the end of `input`).
fn locate(input: &str) -> (usize, usize) {
    let mut quote: Option<char> = None;
    let (mut segment, mut word) = (0, 0);
    for (i, ch) in input.char_indices() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
            },
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                '|' | ';' => {
                    segment = i + 1;
                    word = i + 1;
                },
                c if c.is_whitespace() => word = i + c.len_utf8(),
                _ => {},
            },
        }
    }
    (segment, word)
}

fn starts_with_ignore_case(candidate: &str, prefix: &str) -> bool {
    candidate
        .to_lowercase()
        .starts_with(&prefix.to_lowercase())
}

/// Completions for the last word of `input`, sorted by label.
pub fn complete(
    input: &str,
    registry: &CommandRegistry,
    state: &ShellState,
    vfs: &dyn Vfs,
) -> Vec<Completion> {
    let (segment, word_start) = locate(input);
    let head = &input[..word_start];
    let raw_word = &input[word_start..];
    let word = parse_args(raw_word).into_iter().next().unwrap_or_default();
    let before = parse_args(&input[segment..word_start]);

    let candidates: Vec<(String, CompletionKind, String)> = if before.is_empty() {
        registry
            .names()
            .into_iter()
            .filter(|n| starts_with_ignore_case(n, &word))
            .map(|n| (n.clone(), CompletionKind::Command, n))
            .collect()
    } else if let Some(prefix) = word.strip_prefix('-') {
        let params = registry
            .get(&before[0])
            .map(|c| c.parameters())
            .unwrap_or_default();
        params
            .iter()
            .filter(|p| starts_with_ignore_case(p, prefix))
            .map(|p| {
                let text = format!("-{p}");
                (text.clone(), CompletionKind::Parameter, text)
            })
            .collect()
    } else if let Some(prefix) = word.strip_prefix('$') {
        let user = state.variables.iter().map(|v| v.name.as_str());
        let mut seen = HashSet::new();
        BUILTIN_NAMES
            .iter()
            .copied()
            .chain(user)
            .filter(|n| seen.insert(n.to_ascii_lowercase()))
            .filter(|n| starts_with_ignore_case(n, prefix))
            .map(|n| {
                let text = format!("${n}");
                (text.clone(), CompletionKind::Variable, text)
            })
            .collect()
    } else {
        path_candidates(&word, state, vfs)
    };

    let mut out: Vec<Completion> = candidates
        .into_iter()
        .map(|(label, kind, text)| Completion {
            label,
            kind,
            replacement: format!("{head}{text}"),
        })
        .collect();
    out.sort_by_key(|c| c.label.to_lowercase());
    out
}

/// Children of the word's directory part whose names start with its last
/// segment.
fn path_candidates(
    word: &str,
    state: &ShellState,
    vfs: &dyn Vfs,
) -> Vec<(String, CompletionKind, String)> {
    let split = word.rfind(['\\', '/']).map_or(0, |i| i + 1);
    let (dir_part, prefix) = word.split_at(split);
    let dir = if dir_part.is_empty() {
        state.cwd.clone()
    } else if let Some(rest) = dir_part.strip_prefix('~') {
        path::resolve(rest.trim_start_matches(['\\', '/']), &state.config.home_dir())
    } else {
        path::resolve(dir_part, &state.cwd)
    };

    vfs.list_children(&dir)
        .into_iter()
        .filter(|e| starts_with_ignore_case(&e.name, prefix))
        .map(|e| {
            let (label, kind) = if e.node.is_dir() {
                (format!("{}\\", e.name), CompletionKind::Directory)
            } else {
                (e.name.clone(), CompletionKind::File)
            };
            let full = format!("{dir_part}{label}");
            let text = if full.contains(' ') {
                format!("\"{full}\"")
            } else {
                full
            };
            (label, kind, text)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestShell;

    fn labels(c: &[Completion]) -> Vec<&str> {
        c.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn locate_tracks_segments_and_quotes() {
        assert_eq!(locate("ls | so"), (4, 5));
        assert_eq!(locate("cat \"my fi"), (0, 4));
        assert_eq!(locate("pwd "), (0, 4));
    }

    #[test]
    fn first_word_completes_commands() {
        let sh = TestShell::new();
        let c = sh.shell.completions("Get-C");
        assert_eq!(
            labels(&c),
            vec!["Get-ChildItem", "Get-Command", "Get-Content"]
        );
        assert!(c.iter().all(|c| c.kind == CompletionKind::Command));
        assert_eq!(c[0].replacement, "Get-ChildItem");
    }

    #[test]
    fn command_after_pipe() {
        let sh = TestShell::new();
        let c = sh.shell.completions("ls | sort-");
        assert_eq!(labels(&c), vec!["Sort-Object"]);
        assert_eq!(c[0].replacement, "ls | Sort-Object");
    }

    #[test]
    fn dash_completes_parameters() {
        let sh = TestShell::new();
        let c = sh.shell.completions("Get-ChildItem -R");
        assert_eq!(labels(&c), vec!["-Recurse"]);
        assert_eq!(c[0].kind, CompletionKind::Parameter);
        assert_eq!(c[0].replacement, "Get-ChildItem -Recurse");
        assert!(sh.shell.completions("nosuch -R").is_empty());
    }

    #[test]
    fn dollar_completes_variables() {
        let mut sh = TestShell::new();
        sh.exec("$project = psh");
        let c = sh.shell.completions("echo $p");
        assert_eq!(labels(&c), vec!["$project", "$PSVersionTable", "$PWD"]);
        assert!(c.iter().all(|c| c.kind == CompletionKind::Variable));
    }

    #[test]
    fn user_variable_shadowing_builtin_is_offered_once() {
        let mut sh = TestShell::new();
        sh.exec("$pwd = mine");
        sh.exec("$zeta = 1");
        assert_eq!(labels(&sh.shell.completions("echo $pw")), vec!["$PWD"]);
        assert_eq!(labels(&sh.shell.completions("echo $z")), vec!["$zeta"]);
    }

    #[test]
    fn paths_complete_relative_to_cwd() {
        let sh = TestShell::new();
        let c = sh.shell.completions("cd D");
        assert_eq!(labels(&c), vec!["Desktop\\", "Documents\\", "Downloads\\"]);
        assert!(c.iter().all(|c| c.kind == CompletionKind::Directory));
        assert_eq!(c[1].replacement, "cd Documents\\");
    }

    #[test]
    fn nested_and_absolute_paths() {
        let mut sh = TestShell::new();
        sh.exec("Set-Content Documents\\notes.txt x");
        let c = sh.shell.completions("cat Documents\\n");
        assert_eq!(labels(&c), vec!["notes.txt"]);
        assert_eq!(c[0].kind, CompletionKind::File);
        assert_eq!(c[0].replacement, "cat Documents\\notes.txt");
        let c = sh.shell.completions("ls C:\\Win");
        assert_eq!(c[0].replacement, "ls C:\\Windows\\");
    }

    #[test]
    fn names_with_spaces_are_quoted() {
        let mut sh = TestShell::new();
        sh.exec("New-Item \"my file.txt\"");
        let c = sh.shell.completions("cat my");
        assert_eq!(c[0].replacement, "cat \"my file.txt\"");
    }

    #[test]
    fn trailing_space_lists_everything_in_cwd() {
        let sh = TestShell::new();
        let c = sh.shell.completions("cat ");
        assert_eq!(c.len(), 4);
        assert_eq!(c[3].label, "readme.txt");
    }
}
