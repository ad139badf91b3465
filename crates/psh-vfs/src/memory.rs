//! In-memory VFS implementation.
//!
//! The whole tree lives in a `BTreeMap<String, FsNode>` keyed by normalized
//! path, so a directory's descendants form one contiguous key range.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use psh_types::clock::Clock;
use psh_types::error::{PshError, Result};

use crate::path::{self, SEPARATOR};
use crate::{DirEntry, FsNode, Vfs};

/// A fully in-memory virtual file system.
pub struct MemoryVfs {
    nodes: BTreeMap<String, FsNode>,
    clock: Arc<dyn Clock>,
    revision: u64,
}

impl fmt::Debug for MemoryVfs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryVfs")
            .field("nodes", &self.nodes.len())
            .field("revision", &self.revision)
            .finish()
    }
}

impl MemoryVfs {
    /// Create a VFS holding only the drive root `root` (e.g. `C:\`).
    pub fn new(clock: Arc<dyn Clock>, root: &str) -> Self {
        let now = clock.now();
        let mut nodes = BTreeMap::new();
        nodes.insert(
            path::normalize(root).into_owned(),
            FsNode::Directory {
                created: now,
                modified: now,
            },
        );
        Self {
            nodes,
            clock,
            revision: 0,
        }
    }

    /// Rebuild a VFS from a previously taken snapshot. Keys are
    /// re-normalized, so hand-edited snapshots still address correctly.
    pub fn from_snapshot(clock: Arc<dyn Clock>, snapshot: BTreeMap<String, FsNode>) -> Self {
        let nodes = snapshot
            .into_iter()
            .map(|(k, v)| (path::normalize(&k).into_owned(), v))
            .collect();
        Self {
            nodes,
            clock,
            revision: 0,
        }
    }

    /// Number of stored nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    /// Keys strictly below directory `dir`.
    fn descendants(&self, dir: &str) -> Vec<String> {
        let prefix = child_prefix(dir);
        self.nodes
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(k, _)| k.clone())
            .collect()
    }
}

fn child_prefix(dir: &str) -> String {
    if dir.ends_with(SEPARATOR) {
        dir.to_string()
    } else {
        format!("{dir}{SEPARATOR}")
    }
}

impl Vfs for MemoryVfs {
    fn node(&self, path: &str) -> Option<&FsNode> {
        self.nodes.get(path::normalize(path).as_ref())
    }

    fn list_children(&self, dir: &str) -> Vec<DirEntry> {
        let prefix = child_prefix(&path::normalize(dir));
        let mut entries = Vec::new();
        for (key, node) in self.nodes.range(prefix.clone()..) {
            if !key.starts_with(&prefix) {
                break;
            }
            // Direct child only: non-empty name with no separator after the prefix.
            let rest = &key[prefix.len()..];
            if !rest.is_empty() && !rest.contains(SEPARATOR) {
                entries.push(DirEntry {
                    name: rest.to_string(),
                    path: key.clone(),
                    node: node.clone(),
                });
            }
        }
        entries
    }

    fn make_dir(&mut self, path: &str) -> Result<()> {
        let path = path::normalize(path).into_owned();
        if path.is_empty() {
            return Err(PshError::Command("Path must not be empty.".into()));
        }
        if self.nodes.contains_key(&path) {
            return Err(PshError::AlreadyExists(path));
        }
        let now = self.clock.now();
        self.nodes.insert(
            path,
            FsNode::Directory {
                created: now,
                modified: now,
            },
        );
        self.bump();
        Ok(())
    }

    fn write_file(&mut self, path: &str, content: &str, append: bool) -> Result<()> {
        let path = path::normalize(path).into_owned();
        if path.is_empty() {
            return Err(PshError::Command("Path must not be empty.".into()));
        }
        let now = self.clock.now();
        match self.nodes.get_mut(&path) {
            Some(FsNode::Directory { .. }) => return Err(PshError::NotAFile(path)),
            Some(FsNode::File {
                content: existing,
                modified,
                ..
            }) => {
                if append {
                    existing.push_str(content);
                } else {
                    *existing = content.to_string();
                }
                *modified = now;
            },
            None => {
                self.nodes.insert(
                    path,
                    FsNode::File {
                        content: content.to_string(),
                        created: now,
                        modified: now,
                    },
                );
            },
        }
        self.bump();
        Ok(())
    }

    fn remove(&mut self, path: &str) -> Result<()> {
        let path = path::normalize(path).into_owned();
        if path::is_drive_root(&path) {
            return Err(PshError::Unsupported(format!("Removing drive root '{path}'")));
        }
        let Some(node) = self.nodes.remove(&path) else {
            return Err(PshError::PathNotFound(path));
        };
        if node.is_dir() {
            let below = self.descendants(&path);
            log::debug!("Removing {} entries below {path}", below.len());
            for key in below {
                self.nodes.remove(&key);
            }
        }
        self.bump();
        Ok(())
    }

    fn copy(&mut self, src: &str, dst: &str) -> Result<String> {
        let src = path::normalize(src).into_owned();
        let (content, created) = match self.nodes.get(&src) {
            None => return Err(PshError::PathNotFound(src)),
            Some(FsNode::Directory { .. }) => {
                return Err(PshError::Unsupported(format!("Copying directory '{src}'")));
            },
            Some(FsNode::File {
                content, created, ..
            }) => (content.clone(), *created),
        };

        let mut dst = path::normalize(dst).into_owned();
        if self.is_dir(&dst) {
            dst = path::join(&dst, path::file_name(&src));
        }
        if dst.is_empty() {
            return Err(PshError::Command("Destination must not be empty.".into()));
        }
        if self.is_dir(&dst) {
            return Err(PshError::NotAFile(dst));
        }
        if dst == src {
            return Ok(dst);
        }

        self.nodes.insert(
            dst.clone(),
            FsNode::File {
                content,
                created,
                modified: self.clock.now(),
            },
        );
        self.bump();
        Ok(dst)
    }

    fn move_item(&mut self, src: &str, dst: &str) -> Result<String> {
        let src = path::normalize(src).into_owned();
        let dst = self.copy(&src, dst)?;
        if dst != src {
            self.remove(&src)?;
        }
        Ok(dst)
    }

    fn snapshot(&self) -> BTreeMap<String, FsNode> {
        self.nodes.clone()
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}
