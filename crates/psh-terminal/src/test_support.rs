//! Shared harness for cmdlet tests: a seeded session at a fixed time.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use psh_types::clock::{Clock, ManualClock};
use psh_types::config::ShellConfig;
use psh_types::storage::MemoryBlobStore;

use crate::output::BufferSink;
use crate::shell::Shell;
use crate::value::PipeValue;

pub(crate) struct TestShell {
    pub shell: Shell,
    pub sink: BufferSink,
    pub clock: Arc<ManualClock>,
}

impl TestShell {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let shell = Shell::new(
            ShellConfig::default(),
            Box::new(MemoryBlobStore::new()),
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        Self {
            shell,
            sink: BufferSink::new(),
            clock,
        }
    }

    /// Submit a line and return the last statement's value.
    pub fn exec(&mut self, line: &str) -> Option<PipeValue> {
        self.shell.submit(line, &mut self.sink)
    }

    pub fn cwd(&self) -> &str {
        &self.shell.state().cwd
    }

    pub fn read(&self, path: &str) -> String {
        self.shell.vfs().read_content(path)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.shell.vfs().exists(path)
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.shell.vfs().is_dir(path)
    }

    /// Write a file directly, bypassing the parser (for multi-line content).
    pub fn vfs_write(&mut self, path: &str, content: &str) {
        self.shell.vfs_mut().write_file(path, content, false).unwrap();
    }
}
