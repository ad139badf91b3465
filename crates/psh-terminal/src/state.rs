//! Per-session shell state.

use psh_types::config::{Settings, ShellConfig};

use crate::expand::Scope;
use crate::history::History;
use crate::variables::Variables;

/// Everything a session mutates besides the filesystem.
#[derive(Debug, Clone)]
pub struct ShellState {
    /// Normalized path of the current directory.
    pub cwd: String,
    pub variables: Variables,
    pub history: History,
    pub config: ShellConfig,
    pub settings: Settings,
}

impl ShellState {
    /// Fresh state starting in the configured user's home directory.
    pub fn new(config: ShellConfig) -> Self {
        Self {
            cwd: config.home_dir(),
            variables: Variables::new(),
            history: History::new(config.history_limit),
            config,
            settings: Settings::default(),
        }
    }

    /// View used by variable expansion.
    pub fn scope(&self) -> Scope<'_> {
        Scope {
            variables: &self.variables,
            cwd: &self.cwd,
            config: &self.config,
        }
    }
}
