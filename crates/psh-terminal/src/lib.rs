//! Command interpreter and shell session.
//!
//! The terminal is a registry-based dispatch system. Commands implement the
//! `Command` trait and are registered by name and alias. The interpreter
//! splits input lines into statements and pipelines, expands variables,
//! resolves each command, and threads values from stage to stage.

pub mod arith;
mod commands;
pub mod completion;
pub mod expand;
pub mod expr;
mod file_commands;
pub mod history;
mod interpreter;
pub mod output;
pub mod parser;
mod pipeline_commands;
mod setup;
mod shell;
pub mod state;
mod system_commands;
pub mod value;
mod variable_commands;
pub mod variables;

#[cfg(test)]
mod test_support;

/// Register all built-in cmdlets (filesystem, pipeline, variables, system, session).
pub use commands::register_builtins;
/// A completion candidate and its kind.
pub use completion::{Completion, CompletionKind};
/// Register filesystem cmdlets into a registry.
pub use file_commands::register_file_commands;
/// A single executable command trait.
pub use interpreter::Command;
/// Registry of available commands with dispatch.
pub use interpreter::CommandRegistry;
/// Shared mutable environment passed to every command.
pub use interpreter::Environment;
/// One parsed pipeline stage handed to a command.
pub use interpreter::Invocation;
/// Run one statement against an environment.
pub use interpreter::execute_statement;
/// Render target and its styles.
pub use output::{BufferSink, OutputSink, Style};
/// Register pipeline cmdlets into a registry.
pub use pipeline_commands::register_pipeline_commands;
/// Seed a fresh filesystem with the default layout.
pub use setup::seed_default_tree;
/// Interactive session and its export document.
pub use shell::{SessionExport, Shell};
/// Register system cmdlets into a registry.
pub use system_commands::register_system_commands;
/// Values threaded between pipeline stages.
pub use value::PipeValue;
/// Register variable cmdlets into a registry.
pub use variable_commands::register_variable_commands;
