//! Built-in command registration and session cmdlets (help, history, export).

use psh_types::error::{PshError, Result};

use crate::expr::glob_match;
use crate::interpreter::{Command, CommandRegistry, Environment, Invocation};
use crate::output::Style;
use crate::shell::SessionExport;
use crate::value::{GenericRecord, PipeValue, Record};

/// Error for a missing required argument.
pub(crate) fn usage_error(usage: &str) -> PshError {
    PshError::Command(format!("usage: {usage}"))
}

/// Parse a non-negative count given to `-<param>`.
pub(crate) fn parse_count(value: &str, param: &str) -> Result<usize> {
    value.trim().parse().map_err(|_| {
        PshError::Command(format!(
            "Cannot bind parameter '{param}'. Cannot convert value \"{value}\" to a count."
        ))
    })
}

/// Register every built-in cmdlet.
pub fn register_builtins(reg: &mut CommandRegistry) {
    crate::file_commands::register_file_commands(reg);
    crate::pipeline_commands::register_pipeline_commands(reg);
    crate::variable_commands::register_variable_commands(reg);
    crate::system_commands::register_system_commands(reg);
    register_session_commands(reg);
}

// ---------------------------------------------------------------------------
// Get-Help
// ---------------------------------------------------------------------------

struct GetHelpCmd;
impl Command for GetHelpCmd {
    fn name(&self) -> &str {
        "Get-Help"
    }
    fn aliases(&self) -> &[&str] {
        &["help", "man"]
    }
    fn description(&self) -> &str {
        "List commands or show help for one"
    }
    fn usage(&self) -> &str {
        "Get-Help [command]"
    }
    fn parameters(&self) -> &[&str] {
        &["Name"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let registry = env.registry;
        if let Some(topic) = inv.args.param("name", 0) {
            let cmd = registry.get(topic).ok_or_else(|| {
                PshError::Command(format!("Get-Help could not find '{topic}'."))
            })?;
            let mut sections = vec![("NAME", cmd.name().to_string())];
            if !cmd.aliases().is_empty() {
                sections.push(("ALIASES", cmd.aliases().join(", ")));
            }
            sections.push(("SYNOPSIS", cmd.description().to_string()));
            sections.push(("SYNTAX", cmd.usage().to_string()));
            if !cmd.parameters().is_empty() {
                let params: Vec<String> = cmd.parameters().iter().map(|p| format!("-{p}")).collect();
                sections.push(("PARAMETERS", params.join(" ")));
            }
            for (i, (title, body)) in sections.iter().enumerate() {
                if i > 0 {
                    env.sink.write_line("", Style::Normal);
                }
                env.sink.write_line(title, Style::Info);
                env.sink.write_line(&format!("    {body}"), Style::Normal);
            }
            return Ok(None);
        }

        let commands = registry.list_commands();
        let mut categories: Vec<&str> = commands.iter().map(|c| c.category()).collect();
        categories.sort_unstable();
        categories.dedup();
        let width = commands.iter().map(|c| c.name().len()).max().unwrap_or(0);
        for category in categories {
            env.sink.write_line(&format!("{category}:"), Style::Info);
            for cmd in commands.iter().filter(|c| c.category() == category) {
                let line = format!("  {:<width$}  {}", cmd.name(), cmd.description());
                env.sink.write_line(&line, Style::Normal);
            }
        }
        env.sink.write_line(
            "Type 'Get-Help <command>' for details on one command.",
            Style::Info,
        );
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Get-Command
// ---------------------------------------------------------------------------

struct GetCommandCmd;
impl Command for GetCommandCmd {
    fn name(&self) -> &str {
        "Get-Command"
    }
    fn aliases(&self) -> &[&str] {
        &["gcm"]
    }
    fn description(&self) -> &str {
        "List commands, optionally filtered by name"
    }
    fn usage(&self) -> &str {
        "Get-Command [-Name glob]"
    }
    fn parameters(&self) -> &[&str] {
        &["Name"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let pattern = inv.args.param("name", 0).unwrap_or("*");
        let rows: Vec<PipeValue> = env
            .registry
            .list_commands()
            .into_iter()
            .filter(|c| {
                glob_match(pattern, c.name()) || c.aliases().iter().any(|a| glob_match(pattern, a))
            })
            .map(|c| {
                PipeValue::Record(Record::Generic(
                    GenericRecord::new()
                        .with("Name", c.name())
                        .with("Aliases", c.aliases().join(", "))
                        .with("Category", c.category()),
                ))
            })
            .collect();
        if rows.is_empty() && !pattern.contains(['*', '?']) {
            return Err(PshError::UnrecognizedCommand(pattern.to_string()));
        }
        Ok(Some(PipeValue::List(rows)))
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

struct GetHistoryCmd;
impl Command for GetHistoryCmd {
    fn name(&self) -> &str {
        "Get-History"
    }
    fn aliases(&self) -> &[&str] {
        &["history", "h"]
    }
    fn description(&self) -> &str {
        "List previously entered command lines"
    }
    fn usage(&self) -> &str {
        "Get-History [-Count n]"
    }
    fn parameters(&self) -> &[&str] {
        &["Count"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let entries = env.state.history.entries();
        let skip = match inv.args.param("count", 0) {
            Some(n) => entries.len().saturating_sub(parse_count(n, "Count")?),
            None => 0,
        };
        let rows = entries
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(i, line)| {
                PipeValue::Record(Record::Generic(
                    GenericRecord::new()
                        .with("Id", (i + 1).to_string())
                        .with("CommandLine", line.clone()),
                ))
            })
            .collect();
        Ok(Some(PipeValue::List(rows)))
    }
}

struct ClearHistoryCmd;
impl Command for ClearHistoryCmd {
    fn name(&self) -> &str {
        "Clear-History"
    }
    fn aliases(&self) -> &[&str] {
        &["clhy"]
    }
    fn description(&self) -> &str {
        "Forget all command history"
    }
    fn usage(&self) -> &str {
        "Clear-History"
    }
    fn execute(
        &self,
        _inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        env.state.history.clear();
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Export-Session
// ---------------------------------------------------------------------------

struct ExportSessionCmd;
impl Command for ExportSessionCmd {
    fn name(&self) -> &str {
        "Export-Session"
    }
    fn description(&self) -> &str {
        "Dump filesystem, history and variables as JSON"
    }
    fn usage(&self) -> &str {
        "Export-Session [| Set-Content file]"
    }
    fn execute(
        &self,
        _inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let json = SessionExport::capture(env.state, &*env.vfs).to_json()?;
        Ok(Some(PipeValue::Text(json)))
    }
}

fn register_session_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(GetHelpCmd));
    reg.register(Box::new(GetCommandCmd));
    reg.register(Box::new(GetHistoryCmd));
    reg.register(Box::new(ClearHistoryCmd));
    reg.register(Box::new(ExportSessionCmd));
}
