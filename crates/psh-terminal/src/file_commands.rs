//! Filesystem cmdlets: listing, navigation, item creation/removal, content.

use std::collections::VecDeque;

use psh_types::error::{PshError, Result};
use psh_vfs::FsNode;
use psh_vfs::path;

use crate::commands::{parse_count, usage_error};
use crate::expr::glob_match;
use crate::interpreter::{Command, Environment, Invocation};
use crate::output::BufferSink;
use crate::value::{FileEntry, PipeValue, Record, render_value};

fn has_wildcard(s: &str) -> bool {
    s.contains(['*', '?'])
}

/// Sort directories before files, then by name case-insensitively.
fn sort_entries(entries: &mut [FileEntry]) {
    entries.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

fn sorted_children(env: &Environment<'_>, dir: &str) -> Vec<FileEntry> {
    let mut entries: Vec<FileEntry> = env
        .vfs
        .list_children(dir)
        .iter()
        .map(FileEntry::from_dir_entry)
        .collect();
    sort_entries(&mut entries);
    entries
}

/// Expand a trailing wildcard segment (`docs\*.txt`) into matching paths.
/// Paths without wildcards are returned as-is.
fn expand_wildcard(env: &Environment<'_>, input: &str) -> Vec<String> {
    let full = env.resolve(input);
    let name = path::file_name(&full);
    if !has_wildcard(name) {
        return vec![full];
    }
    let dir = path::parent(&full).unwrap_or(&full);
    sorted_children(env, dir)
        .into_iter()
        .filter(|e| glob_match(name, &e.name))
        .map(|e| e.full_name)
        .collect()
}

/// Move the current directory up until it names an existing directory.
fn repair_cwd(env: &mut Environment<'_>) {
    while !env.vfs.is_dir(&env.state.cwd) {
        match path::parent(&env.state.cwd) {
            Some(p) => env.state.cwd = p.to_string(),
            None => {
                env.state.cwd = env.state.config.drive_root();
                break;
            },
        }
    }
}

fn file_record(env: &Environment<'_>, full: &str) -> Option<PipeValue> {
    let node = env.vfs.node(full)?;
    Some(PipeValue::Record(Record::File(FileEntry::from_node(
        path::file_name(full),
        full,
        node,
    ))))
}

// ---------------------------------------------------------------------------
// Get-ChildItem
// ---------------------------------------------------------------------------

struct GetChildItemCmd;
impl Command for GetChildItemCmd {
    fn name(&self) -> &str {
        "Get-ChildItem"
    }
    fn aliases(&self) -> &[&str] {
        &["ls", "dir", "gci"]
    }
    fn description(&self) -> &str {
        "List the items in a directory"
    }
    fn usage(&self) -> &str {
        "Get-ChildItem [-Path p] [-Filter glob] [-Recurse] [-Name] [-File] [-Directory]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn parameters(&self) -> &[&str] {
        &["Path", "Filter", "Recurse", "Name", "File", "Directory"]
    }
    fn switches(&self) -> &[&str] {
        &["Recurse", "Name", "File", "Directory", "Force"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let args = &inv.args;
        let mut target = env.resolve(args.param("path", 0).unwrap_or("."));
        let mut filter = args.get("filter").map(str::to_string);
        if filter.is_none() && has_wildcard(path::file_name(&target)) {
            filter = Some(path::file_name(&target).to_string());
            target = path::parent(&target).unwrap_or(&target).to_string();
        }

        match env.vfs.node(&target) {
            None => return Err(PshError::PathNotFound(target)),
            Some(FsNode::File { .. }) => return Ok(file_record(env, &target)),
            Some(FsNode::Directory { .. }) => {},
        }

        let (only_files, only_dirs) = (args.flag("file"), args.flag("directory"));
        let recurse = args.flag("recurse");
        let mut found: Vec<FileEntry> = Vec::new();
        let mut queue = VecDeque::from([target.clone()]);
        while let Some(dir) = queue.pop_front() {
            for entry in sorted_children(env, &dir) {
                if recurse && entry.is_dir {
                    queue.push_back(entry.full_name.clone());
                }
                found.push(entry);
            }
            if !recurse {
                break;
            }
        }

        found.retain(|e| {
            filter.as_deref().is_none_or(|f| glob_match(f, &e.name))
                && !(only_files && e.is_dir)
                && !(only_dirs && !e.is_dir)
        });

        let items = if args.flag("name") {
            let prefix_len = if path::is_drive_root(&target) {
                target.len()
            } else {
                target.len() + 1
            };
            found
                .into_iter()
                .map(|e| PipeValue::Text(e.full_name[prefix_len..].to_string()))
                .collect()
        } else {
            found
                .into_iter()
                .map(|e| PipeValue::Record(Record::File(e)))
                .collect()
        };
        Ok(Some(PipeValue::List(items)))
    }
}

// ---------------------------------------------------------------------------
// Set-Location / Get-Location
// ---------------------------------------------------------------------------

struct SetLocationCmd;
impl Command for SetLocationCmd {
    fn name(&self) -> &str {
        "Set-Location"
    }
    fn aliases(&self) -> &[&str] {
        &["cd", "chdir", "sl"]
    }
    fn description(&self) -> &str {
        "Change the current directory"
    }
    fn usage(&self) -> &str {
        "Set-Location [path]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn parameters(&self) -> &[&str] {
        &["Path"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let target = env.resolve(inv.args.param("path", 0).unwrap_or("~"));
        match env.vfs.node(&target) {
            None => Err(PshError::PathNotFound(target)),
            Some(FsNode::File { .. }) => Err(PshError::NotADirectory(target)),
            Some(FsNode::Directory { .. }) => {
                log::debug!("cwd -> {target}");
                env.state.cwd = target;
                Ok(None)
            },
        }
    }
}

struct GetLocationCmd;
impl Command for GetLocationCmd {
    fn name(&self) -> &str {
        "Get-Location"
    }
    fn aliases(&self) -> &[&str] {
        &["pwd", "gl"]
    }
    fn description(&self) -> &str {
        "Print the current directory"
    }
    fn usage(&self) -> &str {
        "Get-Location"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(
        &self,
        _inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        Ok(Some(PipeValue::text(env.state.cwd.clone())))
    }
}

// ---------------------------------------------------------------------------
// New-Item / mkdir
// ---------------------------------------------------------------------------

/// Create a file or directory. Without `force` the parent must exist and
/// the target must not.
fn new_item(
    env: &mut Environment<'_>,
    full: &str,
    is_dir: bool,
    value: &str,
    force: bool,
) -> Result<Option<PipeValue>> {
    if let Some(parent) = path::parent(full)
        && !env.vfs.is_dir(parent)
    {
        if !force {
            return Err(PshError::PathNotFound(parent.to_string()));
        }
        let mut missing = Vec::new();
        let mut cur = Some(parent);
        while let Some(p) = cur {
            if env.vfs.is_dir(p) {
                break;
            }
            missing.push(p.to_string());
            cur = path::parent(p);
        }
        for dir in missing.iter().rev() {
            env.vfs.make_dir(dir)?;
        }
    }

    if is_dir {
        if force && env.vfs.is_dir(full) {
            return Ok(file_record(env, full));
        }
        env.vfs.make_dir(full)?;
    } else {
        if env.vfs.exists(full) && !force {
            return Err(PshError::AlreadyExists(full.to_string()));
        }
        env.vfs.write_file(full, value, false)?;
    }
    Ok(file_record(env, full))
}

struct NewItemCmd;
impl Command for NewItemCmd {
    fn name(&self) -> &str {
        "New-Item"
    }
    fn aliases(&self) -> &[&str] {
        &["ni"]
    }
    fn description(&self) -> &str {
        "Create a file or directory"
    }
    fn usage(&self) -> &str {
        "New-Item <path> [-ItemType File|Directory] [-Value text] [-Force]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn parameters(&self) -> &[&str] {
        &["Path", "ItemType", "Value", "Force"]
    }
    fn switches(&self) -> &[&str] {
        &["Force"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let args = &inv.args;
        let target = args
            .param("path", 0)
            .ok_or_else(|| usage_error(self.usage()))?;
        let full = env.resolve(target);
        let is_dir = match args.get_any(&["itemtype", "type"]) {
            None => false,
            Some(t) if t.eq_ignore_ascii_case("file") => false,
            Some(t) if t.eq_ignore_ascii_case("directory") || t.eq_ignore_ascii_case("dir") => {
                true
            },
            Some(t) => {
                return Err(PshError::Command(format!(
                    "Unknown item type '{t}'. Use File or Directory."
                )));
            },
        };
        let value = args.get("value").unwrap_or("");
        new_item(env, &full, is_dir, value, args.flag("force"))
    }
}

struct MkdirCmd;
impl Command for MkdirCmd {
    fn name(&self) -> &str {
        "mkdir"
    }
    fn aliases(&self) -> &[&str] {
        &["md"]
    }
    fn description(&self) -> &str {
        "Create a directory"
    }
    fn usage(&self) -> &str {
        "mkdir <path>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn parameters(&self) -> &[&str] {
        &["Path", "Force"]
    }
    fn switches(&self) -> &[&str] {
        &["Force"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let target = inv
            .args
            .param("path", 0)
            .ok_or_else(|| usage_error(self.usage()))?;
        let full = env.resolve(target);
        new_item(env, &full, true, "", inv.args.flag("force"))
    }
}

// ---------------------------------------------------------------------------
// Remove-Item
// ---------------------------------------------------------------------------

struct RemoveItemCmd;
impl Command for RemoveItemCmd {
    fn name(&self) -> &str {
        "Remove-Item"
    }
    fn aliases(&self) -> &[&str] {
        &["rm", "del", "erase", "rd", "rmdir", "ri"]
    }
    fn description(&self) -> &str {
        "Delete files and directories"
    }
    fn usage(&self) -> &str {
        "Remove-Item <path> [-Recurse]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn parameters(&self) -> &[&str] {
        &["Path", "Recurse", "Force"]
    }
    fn switches(&self) -> &[&str] {
        &["Recurse", "Force"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let target = inv
            .args
            .param("path", 0)
            .ok_or_else(|| usage_error(self.usage()))?;
        let targets = expand_wildcard(env, target);
        if targets.is_empty() {
            return Err(PshError::PathNotFound(env.resolve(target)));
        }
        let recurse = inv.args.flag("recurse");
        let removed = remove_targets(env, targets, recurse);
        // Earlier targets may already be gone when a later one fails.
        repair_cwd(env);
        removed.map(|()| None)
    }
}

fn remove_targets(env: &mut Environment<'_>, targets: Vec<String>, recurse: bool) -> Result<()> {
    for full in targets {
        if !env.vfs.exists(&full) {
            return Err(PshError::PathNotFound(full));
        }
        if env.vfs.is_dir(&full) && !recurse && !env.vfs.list_children(&full).is_empty() {
            return Err(PshError::Command(format!(
                "The item at '{full}' has children and the -Recurse parameter was not specified."
            )));
        }
        env.vfs.remove(&full)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Copy-Item / Move-Item / Rename-Item
// ---------------------------------------------------------------------------

fn source_and_destination<'a>(inv: &'a Invocation, usage: &str) -> Result<(&'a str, &'a str)> {
    let src = inv.args.param("path", 0).ok_or_else(|| usage_error(usage))?;
    let dst_pos = usize::from(inv.args.get("path").is_none());
    let dst = inv
        .args
        .param("destination", dst_pos)
        .ok_or_else(|| usage_error(usage))?;
    Ok((src, dst))
}

struct CopyItemCmd;
impl Command for CopyItemCmd {
    fn name(&self) -> &str {
        "Copy-Item"
    }
    fn aliases(&self) -> &[&str] {
        &["cp", "copy", "cpi"]
    }
    fn description(&self) -> &str {
        "Copy a file"
    }
    fn usage(&self) -> &str {
        "Copy-Item <source> <destination>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn parameters(&self) -> &[&str] {
        &["Path", "Destination"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let (src, dst) = source_and_destination(inv, self.usage())?;
        let (src, dst) = (env.resolve(src), env.resolve(dst));
        env.vfs.copy(&src, &dst)?;
        Ok(None)
    }
}

struct MoveItemCmd;
impl Command for MoveItemCmd {
    fn name(&self) -> &str {
        "Move-Item"
    }
    fn aliases(&self) -> &[&str] {
        &["mv", "move", "mi"]
    }
    fn description(&self) -> &str {
        "Move a file"
    }
    fn usage(&self) -> &str {
        "Move-Item <source> <destination>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn parameters(&self) -> &[&str] {
        &["Path", "Destination"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let (src, dst) = source_and_destination(inv, self.usage())?;
        let (src, dst) = (env.resolve(src), env.resolve(dst));
        env.vfs.move_item(&src, &dst)?;
        Ok(None)
    }
}

struct RenameItemCmd;
impl Command for RenameItemCmd {
    fn name(&self) -> &str {
        "Rename-Item"
    }
    fn aliases(&self) -> &[&str] {
        &["ren", "rni"]
    }
    fn description(&self) -> &str {
        "Rename a file in place"
    }
    fn usage(&self) -> &str {
        "Rename-Item <path> <newName>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn parameters(&self) -> &[&str] {
        &["Path", "NewName"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let args = &inv.args;
        let src = args.param("path", 0).ok_or_else(|| usage_error(self.usage()))?;
        let new_pos = usize::from(args.get("path").is_none());
        let new_name = args
            .param("newname", new_pos)
            .ok_or_else(|| usage_error(self.usage()))?;
        if new_name.contains(['\\', '/']) {
            return Err(PshError::Command(
                "The new name must not contain a path separator.".into(),
            ));
        }
        let src = env.resolve(src);
        if !env.vfs.exists(&src) {
            return Err(PshError::PathNotFound(src));
        }
        let dir = path::parent(&src).unwrap_or(&src).to_string();
        let dst = path::join(&dir, new_name);
        if dst != src && env.vfs.exists(&dst) {
            return Err(PshError::AlreadyExists(dst));
        }
        env.vfs.move_item(&src, &dst)?;
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Get-Content
// ---------------------------------------------------------------------------

struct GetContentCmd;
impl Command for GetContentCmd {
    fn name(&self) -> &str {
        "Get-Content"
    }
    fn aliases(&self) -> &[&str] {
        &["cat", "type", "gc"]
    }
    fn description(&self) -> &str {
        "Read a file as lines"
    }
    fn usage(&self) -> &str {
        "Get-Content <path> [-TotalCount n] [-Tail n]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn parameters(&self) -> &[&str] {
        &["Path", "TotalCount", "Head", "Tail"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let args = &inv.args;
        let target = args.param("path", 0).ok_or_else(|| usage_error(self.usage()))?;
        let full = env.resolve(target);
        match env.vfs.node(&full) {
            None => return Err(PshError::PathNotFound(full)),
            Some(FsNode::Directory { .. }) => return Err(PshError::NotAFile(full)),
            Some(FsNode::File { .. }) => {},
        }
        let content = env.vfs.read_content(&full);
        let mut lines: Vec<&str> = content.lines().collect();
        if let Some(n) = args.get_any(&["totalcount", "head", "first"]) {
            lines.truncate(parse_count(n, "TotalCount")?);
        }
        if let Some(n) = args.get_any(&["tail", "last"]) {
            let n = parse_count(n, "Tail")?;
            let skip = lines.len().saturating_sub(n);
            lines.drain(..skip);
        }
        Ok(Some(PipeValue::List(
            lines.into_iter().map(PipeValue::text).collect(),
        )))
    }
}

// ---------------------------------------------------------------------------
// Set-Content / Add-Content / Out-File
// ---------------------------------------------------------------------------

/// Text to write: `-Value`, then remaining positionals, then piped input.
fn content_argument(inv: &Invocation, input: Option<&PipeValue>) -> String {
    if let Some(v) = inv.args.get("value") {
        return v.to_string();
    }
    let skip = usize::from(inv.args.get("path").is_none());
    if inv.args.positional.len() > skip {
        return inv.args.positional[skip..].join(" ");
    }
    input.map(PipeValue::to_text).unwrap_or_default()
}

struct SetContentCmd;
impl Command for SetContentCmd {
    fn name(&self) -> &str {
        "Set-Content"
    }
    fn aliases(&self) -> &[&str] {
        &["sc"]
    }
    fn description(&self) -> &str {
        "Replace a file's content"
    }
    fn usage(&self) -> &str {
        "Set-Content <path> [-Value text]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn parameters(&self) -> &[&str] {
        &["Path", "Value"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let target = inv
            .args
            .param("path", 0)
            .ok_or_else(|| usage_error(self.usage()))?;
        let full = env.resolve(target);
        let text = content_argument(inv, input.as_ref());
        env.vfs.write_file(&full, &text, false)?;
        Ok(None)
    }
}

struct AddContentCmd;
impl Command for AddContentCmd {
    fn name(&self) -> &str {
        "Add-Content"
    }
    fn aliases(&self) -> &[&str] {
        &["ac"]
    }
    fn description(&self) -> &str {
        "Append a line to a file"
    }
    fn usage(&self) -> &str {
        "Add-Content <path> [-Value text]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn parameters(&self) -> &[&str] {
        &["Path", "Value"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let target = inv
            .args
            .param("path", 0)
            .ok_or_else(|| usage_error(self.usage()))?;
        let full = env.resolve(target);
        let mut text = content_argument(inv, input.as_ref());
        let existing = env.vfs.read_content(&full);
        if !existing.is_empty() && !existing.ends_with('\n') {
            text.insert(0, '\n');
        }
        env.vfs.write_file(&full, &text, true)?;
        Ok(None)
    }
}

struct OutFileCmd;
impl Command for OutFileCmd {
    fn name(&self) -> &str {
        "Out-File"
    }
    fn description(&self) -> &str {
        "Write pipeline output to a file as it would be displayed"
    }
    fn usage(&self) -> &str {
        "<command> | Out-File <path> [-Append]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn parameters(&self) -> &[&str] {
        &["FilePath", "Append"]
    }
    fn switches(&self) -> &[&str] {
        &["Append"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let target = inv
            .args
            .get_any(&["filepath", "path"])
            .or_else(|| inv.args.positional.first().map(String::as_str))
            .ok_or_else(|| usage_error(self.usage()))?;
        let full = env.resolve(target);
        let mut rendered = BufferSink::new();
        if let Some(value) = &input {
            render_value(&mut rendered, value);
        }
        let mut text = rendered.text();
        if !text.is_empty() {
            text.push('\n');
        }
        env.vfs.write_file(&full, &text, inv.args.flag("append"))?;
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Test-Path
// ---------------------------------------------------------------------------

struct TestPathCmd;
impl Command for TestPathCmd {
    fn name(&self) -> &str {
        "Test-Path"
    }
    fn description(&self) -> &str {
        "Check whether a path exists"
    }
    fn usage(&self) -> &str {
        "Test-Path <path> [-PathType Container|Leaf]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn parameters(&self) -> &[&str] {
        &["Path", "PathType"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let target = inv
            .args
            .param("path", 0)
            .ok_or_else(|| usage_error(self.usage()))?;
        let full = env.resolve(target);
        let found = match inv.args.get("pathtype").map(str::to_ascii_lowercase).as_deref() {
            Some("container") => env.vfs.is_dir(&full),
            Some("leaf") => env.vfs.is_file(&full),
            _ => env.vfs.exists(&full),
        };
        let text = if found { "True" } else { "False" };
        Ok(Some(PipeValue::text(text)))
    }
}

/// Register filesystem cmdlets.
pub fn register_file_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(GetChildItemCmd));
    reg.register(Box::new(SetLocationCmd));
    reg.register(Box::new(GetLocationCmd));
    reg.register(Box::new(NewItemCmd));
    reg.register(Box::new(MkdirCmd));
    reg.register(Box::new(RemoveItemCmd));
    reg.register(Box::new(CopyItemCmd));
    reg.register(Box::new(MoveItemCmd));
    reg.register(Box::new(RenameItemCmd));
    reg.register(Box::new(GetContentCmd));
    reg.register(Box::new(SetContentCmd));
    reg.register(Box::new(AddContentCmd));
    reg.register(Box::new(OutFileCmd));
    reg.register(Box::new(TestPathCmd));
}

#[cfg(test)]
mod tests {
    use crate::output::Style;
    use crate::test_support::TestShell;
    use crate::value::PipeValue;

    fn setup() -> TestShell {
        TestShell::new()
    }

    fn names(v: Option<PipeValue>) -> Vec<String> {
        match v {
            Some(PipeValue::List(items)) => items
                .iter()
                .map(|i| i.property("Name").unwrap_or_else(|| i.to_text()))
                .collect(),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn ls_lists_directories_first() {
        let mut sh = setup();
        sh.exec("New-Item zeta.txt -Value z");
        sh.exec("mkdir Alpha");
        let listed = names(sh.exec("ls"));
        assert_eq!(
            listed,
            vec!["Alpha", "Desktop", "Documents", "Downloads", "readme.txt", "zeta.txt"]
        );
    }

    #[test]
    fn ls_filter_and_switches() {
        let mut sh = setup();
        sh.exec("Set-Content a.txt one; Set-Content b.log two");
        assert_eq!(names(sh.exec("ls -Filter *.txt")), vec!["a.txt", "readme.txt"]);
        assert_eq!(names(sh.exec("ls *.log")), vec!["b.log"]);
        assert_eq!(
            names(sh.exec("Get-ChildItem -Directory")),
            vec!["Desktop", "Documents", "Downloads"]
        );
        assert_eq!(names(sh.exec("dir -File -Name")), vec!["a.txt", "b.log", "readme.txt"]);
    }

    #[test]
    fn ls_recurse_keeps_positional_path() {
        let mut sh = setup();
        sh.exec("Set-Content Documents\\notes.txt hi");
        sh.exec("mkdir Documents\\deep; Set-Content Documents\\deep\\x.txt x");
        let listed = names(sh.exec("gci -Recurse Documents -Name"));
        assert_eq!(listed, vec!["deep", "notes.txt", "deep\\x.txt"]);
    }

    #[test]
    fn ls_missing_path_reports_error() {
        let mut sh = setup();
        assert_eq!(sh.exec("ls nowhere"), None);
        let errors = sh.sink.lines_with(Style::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Get-ChildItem : Cannot find path"));
    }

    #[test]
    fn cd_and_pwd() {
        let mut sh = setup();
        sh.exec("cd Documents");
        assert_eq!(sh.exec("pwd"), Some(PipeValue::text("C:\\Users\\user\\Documents")));
        sh.exec("cd ..\\..");
        assert_eq!(sh.cwd(), "C:\\Users");
        sh.exec("cd");
        assert_eq!(sh.cwd(), "C:\\Users\\user");
        sh.exec("cd /");
        assert_eq!(sh.cwd(), "C:\\");
        sh.exec("cd ~");
        assert_eq!(sh.cwd(), "C:\\Users\\user");
    }

    #[test]
    fn cd_rejects_missing_and_files() {
        let mut sh = setup();
        sh.exec("cd nope");
        sh.exec("cd readme.txt");
        assert_eq!(sh.cwd(), "C:\\Users\\user");
        let errors = sh.sink.lines_with(Style::Error);
        assert!(errors[0].contains("does not exist"));
        assert!(errors[1].contains("is not a directory"));
    }

    #[test]
    fn new_item_file_and_directory() {
        let mut sh = setup();
        sh.exec("New-Item -Path hello.txt -ItemType File -Value \"hi there\"");
        assert_eq!(sh.read("C:\\Users\\user\\hello.txt"), "hi there");
        sh.exec("ni stuff -ItemType Directory");
        assert!(sh.is_dir("C:\\Users\\user\\stuff"));
    }

    #[test]
    fn new_item_existing_fails_without_force() {
        let mut sh = setup();
        sh.exec("New-Item a.txt -Value one");
        sh.exec("New-Item a.txt -Value two");
        assert_eq!(sh.read("C:\\Users\\user\\a.txt"), "one");
        assert!(sh.sink.lines_with(Style::Error)[0].contains("already exists"));
        sh.exec("New-Item a.txt -Value three -Force");
        assert_eq!(sh.read("C:\\Users\\user\\a.txt"), "three");
    }

    #[test]
    fn mkdir_requires_parent_unless_forced() {
        let mut sh = setup();
        sh.exec("mkdir x\\y");
        assert!(!sh.is_dir("C:\\Users\\user\\x\\y"));
        sh.exec("mkdir x\\y -Force");
        assert!(sh.is_dir("C:\\Users\\user\\x"));
        assert!(sh.is_dir("C:\\Users\\user\\x\\y"));
        sh.exec("md x");
        assert!(sh.sink.lines_with(Style::Error).last().unwrap().contains("already exists"));
    }

    #[test]
    fn remove_needs_recurse_for_non_empty_directories() {
        let mut sh = setup();
        sh.exec("mkdir d; Set-Content d\\f.txt data");
        sh.exec("Remove-Item d");
        assert!(sh.is_dir("C:\\Users\\user\\d"));
        sh.exec("rm d -Recurse");
        assert!(!sh.exists("C:\\Users\\user\\d"));
        assert!(!sh.exists("C:\\Users\\user\\d\\f.txt"));
    }

    #[test]
    fn remove_wildcard() {
        let mut sh = setup();
        sh.exec("sc a.tmp 1; sc b.tmp 2; sc keep.txt 3");
        sh.exec("del *.tmp");
        assert!(!sh.exists("C:\\Users\\user\\a.tmp"));
        assert!(!sh.exists("C:\\Users\\user\\b.tmp"));
        assert!(sh.exists("C:\\Users\\user\\keep.txt"));
    }

    #[test]
    fn removing_current_directory_moves_cwd_up() {
        let mut sh = setup();
        sh.exec("cd Documents");
        sh.exec("rm C:\\Users\\user\\Documents -Recurse");
        assert_eq!(sh.cwd(), "C:\\Users\\user");
    }

    #[test]
    fn partial_wildcard_removal_still_moves_cwd_up() {
        let mut sh = setup();
        sh.exec("mkdir a; mkdir b; Set-Content b\\f.txt x");
        sh.exec("cd a");
        sh.exec("rm ..\\*");
        let errors = sh.sink.lines_with(Style::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("has children"));
        assert!(!sh.exists("C:\\Users\\user\\a"));
        assert!(sh.is_dir("C:\\Users\\user\\b"));
        assert_eq!(sh.cwd(), "C:\\Users\\user");
        assert!(sh.is_dir(&sh.cwd().to_string()));
    }

    #[test]
    fn copy_move_rename() {
        let mut sh = setup();
        sh.exec("Set-Content a.txt alpha");
        sh.exec("Copy-Item a.txt Documents");
        assert_eq!(sh.read("C:\\Users\\user\\Documents\\a.txt"), "alpha");
        sh.exec("mv a.txt b.txt");
        assert!(!sh.exists("C:\\Users\\user\\a.txt"));
        assert_eq!(sh.read("C:\\Users\\user\\b.txt"), "alpha");
        sh.exec("Rename-Item b.txt c.txt");
        assert_eq!(sh.read("C:\\Users\\user\\c.txt"), "alpha");
        sh.exec("cp -Path c.txt -Destination d.txt");
        assert_eq!(sh.read("C:\\Users\\user\\d.txt"), "alpha");
    }

    #[test]
    fn copy_directory_is_unsupported() {
        let mut sh = setup();
        sh.exec("cp Documents Docs2");
        assert!(sh.sink.lines_with(Style::Error)[0].contains("not supported"));
        assert!(!sh.exists("C:\\Users\\user\\Docs2"));
    }

    #[test]
    fn get_content_head_and_tail() {
        let mut sh = setup();
        sh.exec("Set-Content n.txt x");
        sh.vfs_write("C:\\Users\\user\\n.txt", "1\n2\n3\n4\n5");
        assert_eq!(sh.exec("cat n.txt").map(|v| v.to_text()).as_deref(), Some("1\n2\n3\n4\n5"));
        assert_eq!(sh.exec("gc n.txt -Head 2").unwrap().to_text(), "1\n2");
        assert_eq!(sh.exec("gc n.txt -Tail 2").unwrap().to_text(), "4\n5");
        sh.exec("gc n.txt -Tail abc");
        assert!(sh.sink.lines_with(Style::Error)[0].contains("abc"));
    }

    #[test]
    fn get_content_of_directory_fails() {
        let mut sh = setup();
        sh.exec("type Documents");
        assert!(sh.sink.lines_with(Style::Error)[0].contains("is a directory"));
    }

    #[test]
    fn add_content_separates_lines() {
        let mut sh = setup();
        sh.exec("Set-Content log.txt first");
        sh.exec("Add-Content log.txt second");
        sh.exec("ac log.txt -Value third");
        assert_eq!(sh.read("C:\\Users\\user\\log.txt"), "first\nsecond\nthird");
    }

    #[test]
    fn piped_input_feeds_set_content() {
        let mut sh = setup();
        sh.exec("Write-Output piped | Set-Content p.txt");
        assert_eq!(sh.read("C:\\Users\\user\\p.txt"), "piped");
    }

    #[test]
    fn out_file_writes_rendered_text() {
        let mut sh = setup();
        sh.exec("echo hello | Out-File o.txt");
        sh.exec("echo again | Out-File o.txt -Append");
        assert_eq!(sh.read("C:\\Users\\user\\o.txt"), "hello\nagain\n");
        sh.exec("ls -Directory | Out-File dirs.txt");
        let text = sh.read("C:\\Users\\user\\dirs.txt");
        assert!(text.starts_with("Mode"));
        assert!(text.contains("Documents"));
    }

    #[test]
    fn test_path_variants() {
        let mut sh = setup();
        let t = |sh: &mut TestShell, line: &str| sh.exec(line).unwrap().to_text();
        assert_eq!(t(&mut sh, "Test-Path readme.txt"), "True");
        assert_eq!(t(&mut sh, "Test-Path missing"), "False");
        assert_eq!(t(&mut sh, "Test-Path Documents -PathType Container"), "True");
        assert_eq!(t(&mut sh, "Test-Path Documents -PathType Leaf"), "False");
        assert_eq!(t(&mut sh, "Test-Path C:\\Windows\\System32"), "True");
    }
}
