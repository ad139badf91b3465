//! A shell session: registry, state, filesystem and persistence together.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use psh_types::clock::Clock;
use psh_types::config::{Settings, ShellConfig};
use psh_types::error::Result;
use psh_types::storage::{BlobStore, HISTORY_KEY, SETTINGS_KEY, VFS_KEY};
use psh_vfs::{FsNode, MemoryVfs, Vfs};

use crate::commands::register_builtins;
use crate::completion::{self, Completion};
use crate::history::History;
use crate::interpreter::{self, CommandRegistry, Environment};
use crate::output::OutputSink;
use crate::parser;
use crate::setup::seed_default_tree;
use crate::state::ShellState;
use crate::value::PipeValue;

/// The `Export-Session` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExport {
    pub vfs: BTreeMap<String, FsNode>,
    pub history: Vec<String>,
    pub variables: BTreeMap<String, String>,
}

impl SessionExport {
    pub fn capture(state: &ShellState, vfs: &dyn Vfs) -> Self {
        Self {
            vfs: vfs.snapshot(),
            history: state.history.entries().to_vec(),
            variables: state.variables.to_map(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// An interactive session.
pub struct Shell {
    registry: CommandRegistry,
    state: ShellState,
    vfs: Box<dyn Vfs>,
    store: Box<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    /// VFS revision last written to the store.
    saved_revision: u64,
}

impl Shell {
    /// Session with every built-in cmdlet.
    pub fn new(config: ShellConfig, store: Box<dyn BlobStore>, clock: Arc<dyn Clock>) -> Self {
        let mut registry = CommandRegistry::new();
        register_builtins(&mut registry);
        Self::with_registry(config, store, clock, registry)
    }

    /// Session with a caller-supplied command set. Saved filesystem, history
    /// and settings are restored from `store`; undecodable blobs are
    /// ignored.
    pub fn with_registry(
        config: ShellConfig,
        store: Box<dyn BlobStore>,
        clock: Arc<dyn Clock>,
        registry: CommandRegistry,
    ) -> Self {
        let mut state = ShellState::new(config);

        if let Some(text) = store.load(HISTORY_KEY) {
            match serde_json::from_str::<Vec<String>>(&text) {
                Ok(entries) => {
                    state.history = History::from_entries(entries, state.config.history_limit);
                },
                Err(e) => log::warn!("Ignoring unreadable history: {e}"),
            }
        }
        if let Some(text) = store.load(SETTINGS_KEY) {
            match serde_json::from_str::<Settings>(&text) {
                Ok(settings) => state.settings = settings,
                Err(e) => log::warn!("Ignoring unreadable settings: {e}"),
            }
        }

        let restored = store.load(VFS_KEY).and_then(|text| {
            match serde_json::from_str::<BTreeMap<String, FsNode>>(&text) {
                Ok(nodes) if !nodes.is_empty() => Some(nodes),
                Ok(_) => None,
                Err(e) => {
                    log::warn!("Ignoring unreadable filesystem snapshot: {e}");
                    None
                },
            }
        });
        let mut vfs: Box<dyn Vfs> = match restored {
            Some(nodes) => {
                log::info!("Restored filesystem with {} nodes", nodes.len());
                Box::new(MemoryVfs::from_snapshot(Arc::clone(&clock), nodes))
            },
            None => {
                let root = state.config.drive_root();
                let mut fresh = MemoryVfs::new(Arc::clone(&clock), &root);
                if let Err(e) = seed_default_tree(&mut fresh, &state.config) {
                    log::warn!("Could not seed default tree: {e}");
                }
                log::info!("Started with a fresh filesystem");
                Box::new(fresh)
            },
        };
        if !vfs.is_dir(&state.cwd) {
            let root = state.config.drive_root();
            if !vfs.is_dir(&root)
                && let Err(e) = vfs.make_dir(&root)
            {
                log::warn!("Could not create drive root {root}: {e}");
            }
            state.cwd = root;
        }

        Self {
            registry,
            state,
            vfs,
            store,
            clock,
            saved_revision: 0,
        }
    }

    /// Run one line of input: record it, then execute each statement.
    /// Returns the last statement's value.
    pub fn submit(&mut self, line: &str, sink: &mut dyn OutputSink) -> Option<PipeValue> {
        self.state.history.push(line);
        let mut last = None;
        for statement in parser::split_statements(line) {
            last = self.execute_command(&statement, sink);
        }
        self.save_history();
        last
    }

    /// Execute a single statement and persist the filesystem if it changed.
    pub fn execute_command(&mut self, statement: &str, sink: &mut dyn OutputSink) -> Option<PipeValue> {
        let mut env = Environment {
            state: &mut self.state,
            vfs: self.vfs.as_mut(),
            sink,
            clock: self.clock.as_ref(),
            registry: &self.registry,
        };
        let value = interpreter::execute_statement(statement, &mut env);
        self.persist_vfs();
        value
    }

    pub fn completions(&self, partial: &str) -> Vec<Completion> {
        completion::complete(partial, &self.registry, &self.state, self.vfs.as_ref())
    }

    /// Session export document as pretty JSON.
    pub fn export_json(&self) -> Result<String> {
        SessionExport::capture(&self.state, self.vfs.as_ref()).to_json()
    }

    pub fn prompt(&self) -> String {
        format!("PS {}> ", self.state.cwd)
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn vfs(&self) -> &dyn Vfs {
        self.vfs.as_ref()
    }

    pub fn vfs_mut(&mut self) -> &mut dyn Vfs {
        self.vfs.as_mut()
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    /// Replace the UI settings and persist them.
    pub fn update_settings(&mut self, settings: Settings) {
        self.save_blob(SETTINGS_KEY, &settings);
        self.state.settings = settings;
    }

    // -- Persistence ---------------------------------------------------------

    fn persist_vfs(&mut self) {
        let revision = self.vfs.revision();
        if revision == self.saved_revision {
            return;
        }
        let snapshot = self.vfs.snapshot();
        self.save_blob(VFS_KEY, &snapshot);
        self.saved_revision = revision;
    }

    fn save_history(&mut self) {
        let entries = self.state.history.entries().to_vec();
        self.save_blob(HISTORY_KEY, &entries);
    }

    /// Serialize and store a blob. Failures are logged and dropped.
    fn save_blob<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not encode {key}: {e}");
                return;
            },
        };
        match self.store.save(key, &json) {
            Ok(()) => log::debug!("Saved {key} ({} bytes)", json.len()),
            Err(e) => log::warn!("Could not save {key}: {e}"),
        }
    }
}
