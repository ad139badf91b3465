//! Virtual file system for psh.
//!
//! The store is flat: a map from normalized absolute path (`C:\Users\ada`)
//! to a node. Listing is prefix-based, so a file may exist without explicit
//! entries for every ancestor directory. Commands decide how strict to be
//! about parents; the store itself only guards the drive root.

mod memory;
pub mod path;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use psh_types::error::Result;

pub use memory::MemoryVfs;

/// A directory or a file with text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FsNode {
    Directory {
        #[serde(rename = "createdAt")]
        created: DateTime<Utc>,
        #[serde(rename = "modifiedAt")]
        modified: DateTime<Utc>,
    },
    File {
        content: String,
        #[serde(rename = "createdAt")]
        created: DateTime<Utc>,
        #[serde(rename = "modifiedAt")]
        modified: DateTime<Utc>,
    },
}

impl FsNode {
    pub fn is_dir(&self) -> bool {
        matches!(self, FsNode::Directory { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self, FsNode::File { .. })
    }

    pub fn created(&self) -> DateTime<Utc> {
        match self {
            FsNode::Directory { created, .. } | FsNode::File { created, .. } => *created,
        }
    }

    pub fn modified(&self) -> DateTime<Utc> {
        match self {
            FsNode::Directory { modified, .. } | FsNode::File { modified, .. } => *modified,
        }
    }

    /// File content, or `None` for directories.
    pub fn content(&self) -> Option<&str> {
        match self {
            FsNode::File { content, .. } => Some(content),
            FsNode::Directory { .. } => None,
        }
    }

    /// Content length in bytes (0 for directories).
    pub fn size(&self) -> usize {
        self.content().map_or(0, str::len)
    }
}

/// A direct child returned by [`Vfs::list_children`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Last path component.
    pub name: String,
    /// Full normalized path.
    pub path: String,
    pub node: FsNode,
}

/// Filesystem operations used by every filesystem-touching command.
///
/// Path arguments are normalized by the implementation; callers resolve
/// relative paths with [`path::resolve`] first.
pub trait Vfs {
    /// Look up the node stored at `path`.
    fn node(&self, path: &str) -> Option<&FsNode>;

    fn exists(&self, path: &str) -> bool {
        self.node(path).is_some()
    }

    fn is_dir(&self, path: &str) -> bool {
        self.node(path).is_some_and(FsNode::is_dir)
    }

    fn is_file(&self, path: &str) -> bool {
        self.node(path).is_some_and(FsNode::is_file)
    }

    /// Content of the file at `path`; empty for directories and missing paths.
    fn read_content(&self, path: &str) -> String {
        self.node(path)
            .and_then(FsNode::content)
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Direct children of `dir`, in path order.
    fn list_children(&self, dir: &str) -> Vec<DirEntry>;

    /// Create a directory. Fails if anything already lives at `path`.
    fn make_dir(&mut self, path: &str) -> Result<()>;

    /// Create, replace or append to a file. Missing parents are not an error.
    fn write_file(&mut self, path: &str, content: &str, append: bool) -> Result<()>;

    /// Delete a file, or a directory together with everything below it.
    fn remove(&mut self, path: &str) -> Result<()>;

    /// Copy a file. Returns the effective destination path.
    fn copy(&mut self, src: &str, dst: &str) -> Result<String>;

    /// Copy then delete the source. Returns the effective destination path.
    fn move_item(&mut self, src: &str, dst: &str) -> Result<String>;

    /// Every node, keyed by normalized path.
    fn snapshot(&self) -> BTreeMap<String, FsNode>;

    /// Counter bumped by every successful mutation.
    fn revision(&self) -> u64;
}
