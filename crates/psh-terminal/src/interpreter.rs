//! Command trait, registry, and dispatch logic.
//!
//! A statement is either an assignment, a bare arithmetic expression, or a
//! pipeline. Pipelines run stage by stage; each stage's return value is the
//! next stage's input and the last value is rendered.

use std::collections::HashMap;

use psh_types::clock::Clock;
use psh_types::error::{PshError, Result};
use psh_vfs::Vfs;
use psh_vfs::path::{self, unquote};

use crate::arith;
use crate::expand::{self, Scope};
use crate::expr;
use crate::output::{OutputSink, Style};
use crate::parser::{self, ParsedArgs};
use crate::state::ShellState;
use crate::value::{PipeValue, render_value};

/// A single executable command.
pub trait Command {
    /// Canonical name (e.g. `Get-ChildItem`).
    fn name(&self) -> &str;

    /// Alternative names. Matched case-insensitively like the name.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// One-line description for `Get-Help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "Get-Content <path> \[-Tail n\]").
    fn usage(&self) -> &str;

    /// Command category for grouping in help output.
    fn category(&self) -> &str {
        "general"
    }

    /// Named parameters offered by tab completion, without the dash.
    fn parameters(&self) -> &[&str] {
        &[]
    }

    /// Parameters that never take a value.
    fn switches(&self) -> &[&str] {
        &[]
    }

    /// Run the command with its parsed arguments and the previous stage's value.
    fn execute(
        &self,
        inv: &Invocation,
        input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>>;
}

/// One parsed pipeline stage.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Name as typed.
    pub name: String,
    /// The stage's text after variable expansion, quotes intact.
    pub text: String,
    pub args: ParsedArgs,
}

impl Invocation {
    /// Raw text after the command word, for commands that take a script
    /// block or free-form condition.
    pub fn remainder(&self) -> &str {
        parser::after_first_token(&self.text)
    }

    /// Positional arguments joined with spaces.
    pub fn joined(&self) -> String {
        self.args.positional.join(" ")
    }
}

/// Shared mutable environment passed to every command.
pub struct Environment<'a> {
    pub state: &'a mut ShellState,
    pub vfs: &'a mut dyn Vfs,
    pub sink: &'a mut dyn OutputSink,
    pub clock: &'a dyn Clock,
    pub registry: &'a CommandRegistry,
}

impl Environment<'_> {
    /// Resolve a user-supplied path against the current directory. `~`
    /// stands for the home directory.
    pub fn resolve(&self, input: &str) -> String {
        let input = unquote(input);
        if input == "~" {
            return self.state.config.home_dir();
        }
        if let Some(rest) = input.strip_prefix("~\\").or_else(|| input.strip_prefix("~/")) {
            return path::resolve(rest, &self.state.config.home_dir());
        }
        path::resolve(input, &self.state.cwd)
    }

    pub fn scope(&self) -> Scope<'_> {
        self.state.scope()
    }

    /// Write an error-styled line.
    pub fn error(&mut self, text: &str) {
        self.sink.write_line(text, Style::Error);
    }
}

/// Registry of available commands with dispatch.
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
    /// Lower-cased name or alias to index in `commands`.
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a command under its name and aliases. A command with the
    /// same name is replaced.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        let key = cmd.name().to_lowercase();
        let slot = match self.index.get(&key) {
            Some(&i) if self.commands[i].name().eq_ignore_ascii_case(cmd.name()) => {
                self.index.retain(|_, v| *v != i);
                self.commands[i] = cmd;
                i
            },
            _ => {
                self.commands.push(cmd);
                self.commands.len() - 1
            },
        };
        let cmd = &self.commands[slot];
        self.index.insert(cmd.name().to_lowercase(), slot);
        for alias in cmd.aliases() {
            self.index.insert(alias.to_lowercase(), slot);
        }
    }

    /// Look up a command by name or alias, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.index
            .get(&name.to_lowercase())
            .map(|&i| self.commands[i].as_ref())
    }

    /// All commands sorted by name.
    pub fn list_commands(&self) -> Vec<&dyn Command> {
        let mut cmds: Vec<&dyn Command> = self.commands.iter().map(|c| c.as_ref()).collect();
        cmds.sort_by_key(|c| c.name().to_lowercase());
        cmds
    }

    /// Every invocable name (canonical names and aliases), sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for cmd in &self.commands {
            names.push(cmd.name().to_string());
            names.extend(cmd.aliases().iter().map(|a| a.to_string()));
        }
        names.sort_by_key(|n| n.to_lowercase());
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Statement execution
// ---------------------------------------------------------------------------

/// Execute one statement: comment, assignment, arithmetic, or pipeline.
///
/// Never fails: every error is rendered to the sink and the statement's
/// value becomes `None`.
pub fn execute_statement(statement: &str, env: &mut Environment<'_>) -> Option<PipeValue> {
    let stmt = statement.trim();
    if stmt.is_empty() || stmt.starts_with('#') {
        return None;
    }

    if let Some((name, rhs)) = parser::parse_assignment(stmt) {
        let value = expr::evaluate(rhs, &env.scope());
        let value = unquote(&value).to_string();
        log::debug!("Assign ${name} = {value:?}");
        env.state.variables.set(name, &value);
        return Some(PipeValue::Text(value));
    }

    if parser::is_arithmetic_statement(stmt) {
        let text = arith::format_number(arith::evaluate(stmt));
        env.sink.write_line(&text, Style::Normal);
        return Some(PipeValue::Text(text));
    }

    run_pipeline(stmt, env)
}

/// Whether a segment reads as an expression rather than a command line.
/// Only consulted once its expanded first token names no command.
fn starts_expression(segment: &str) -> bool {
    parser::first_raw_token(segment).starts_with(['$', '"', '\''])
}

fn evaluate_segment(segment: &str, scope: &Scope<'_>) -> Option<PipeValue> {
    if let Some(name) = expand::bare_variable_name(segment) {
        return expand::lookup(name, scope).map(PipeValue::Text);
    }
    let value = expr::evaluate(segment, scope);
    Some(PipeValue::Text(unquote(&value).to_string()))
}

/// Run `a | b | c`, threading each stage's value into the next, and render
/// the final value.
///
/// An unrecognized command stops the pipeline. A command that fails is
/// reported and passes `None` on.
pub fn run_pipeline(statement: &str, env: &mut Environment<'_>) -> Option<PipeValue> {
    let registry = env.registry;
    let mut piped: Option<PipeValue> = None;

    for segment in parser::split_pipeline(statement) {
        let expanded = expand::expand(&segment, &env.scope());
        let tokens = parser::parse_args(&expanded);
        let names_command = tokens.first().is_some_and(|t| registry.get(t).is_some());
        if !names_command && starts_expression(&segment) {
            piped = evaluate_segment(&segment, &env.scope());
            continue;
        }

        let Some(first) = tokens.first() else {
            piped = None;
            continue;
        };
        let Some(cmd) = registry.get(first) else {
            log::debug!("Unrecognized command {first:?}");
            env.error(&PshError::UnrecognizedCommand(first.clone()).to_string());
            return None;
        };

        let inv = Invocation {
            name: first.clone(),
            text: expanded.clone(),
            args: parser::parse_params(&tokens[1..], cmd.switches()),
        };
        log::debug!("Dispatch {} ({} args)", cmd.name(), tokens.len() - 1);
        piped = match cmd.execute(&inv, piped.take(), env) {
            Ok(value) => value,
            Err(e) => {
                env.error(&format!("{} : {e}", cmd.name()));
                None
            },
        };
    }

    if let Some(value) = &piped {
        render_value(env.sink, value);
    }
    piped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use psh_types::clock::ManualClock;
    use psh_types::config::ShellConfig;
    use psh_vfs::MemoryVfs;

    use crate::output::BufferSink;

    /// Returns its first positional argument, ignoring input.
    struct EmitCmd;
    impl Command for EmitCmd {
        fn name(&self) -> &str {
            "Emit"
        }
        fn aliases(&self) -> &[&str] {
            &["em"]
        }
        fn description(&self) -> &str {
            "Emit an argument"
        }
        fn usage(&self) -> &str {
            "Emit <text>"
        }
        fn execute(
            &self,
            inv: &Invocation,
            _input: Option<PipeValue>,
            _env: &mut Environment<'_>,
        ) -> Result<Option<PipeValue>> {
            Ok(Some(PipeValue::text(inv.joined())))
        }
    }

    /// Appends `+suffix` to its input.
    struct SuffixCmd;
    impl Command for SuffixCmd {
        fn name(&self) -> &str {
            "Suffix"
        }
        fn description(&self) -> &str {
            "Append a suffix"
        }
        fn usage(&self) -> &str {
            "Suffix <s>"
        }
        fn execute(
            &self,
            inv: &Invocation,
            input: Option<PipeValue>,
            _env: &mut Environment<'_>,
        ) -> Result<Option<PipeValue>> {
            let base = input.map(|v| v.to_text()).unwrap_or_default();
            Ok(Some(PipeValue::text(format!("{base}+{}", inv.joined()))))
        }
    }

    /// Records the input it receives.
    struct CaptureCmd(Rc<RefCell<Option<PipeValue>>>);
    impl Command for CaptureCmd {
        fn name(&self) -> &str {
            "Capture"
        }
        fn description(&self) -> &str {
            "Record input"
        }
        fn usage(&self) -> &str {
            "Capture"
        }
        fn execute(
            &self,
            _inv: &Invocation,
            input: Option<PipeValue>,
            _env: &mut Environment<'_>,
        ) -> Result<Option<PipeValue>> {
            *self.0.borrow_mut() = input;
            Ok(None)
        }
    }

    struct FailCmd;
    impl Command for FailCmd {
        fn name(&self) -> &str {
            "Fail"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn usage(&self) -> &str {
            "Fail"
        }
        fn execute(
            &self,
            _inv: &Invocation,
            _input: Option<PipeValue>,
            _env: &mut Environment<'_>,
        ) -> Result<Option<PipeValue>> {
            Err(PshError::Command("boom".into()))
        }
    }

    /// Records its parsed arguments, declaring `Recurse` as a switch.
    struct ArgsCmd(Rc<RefCell<Option<ParsedArgs>>>);
    impl Command for ArgsCmd {
        fn name(&self) -> &str {
            "Args"
        }
        fn description(&self) -> &str {
            "Record arguments"
        }
        fn usage(&self) -> &str {
            "Args"
        }
        fn switches(&self) -> &[&str] {
            &["Recurse"]
        }
        fn execute(
            &self,
            inv: &Invocation,
            _input: Option<PipeValue>,
            _env: &mut Environment<'_>,
        ) -> Result<Option<PipeValue>> {
            *self.0.borrow_mut() = Some(inv.args.clone());
            Ok(None)
        }
    }

    struct Harness {
        state: ShellState,
        vfs: MemoryVfs,
        sink: BufferSink,
        clock: Arc<ManualClock>,
        registry: CommandRegistry,
    }

    impl Harness {
        fn new(registry: CommandRegistry) -> Self {
            let clock = Arc::new(ManualClock::new(
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            ));
            Self {
                state: ShellState::new(ShellConfig::default()),
                vfs: MemoryVfs::new(Arc::clone(&clock) as Arc<dyn Clock>, "C:\\"),
                sink: BufferSink::new(),
                clock,
                registry,
            }
        }

        fn run(&mut self, line: &str) -> Option<PipeValue> {
            let mut env = Environment {
                state: &mut self.state,
                vfs: &mut self.vfs,
                sink: &mut self.sink,
                clock: self.clock.as_ref(),
                registry: &self.registry,
            };
            let mut last = None;
            for stmt in parser::split_statements(line) {
                last = execute_statement(&stmt, &mut env);
            }
            last
        }
    }

    fn basic_registry() -> CommandRegistry {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(EmitCmd));
        reg.register(Box::new(SuffixCmd));
        reg.register(Box::new(FailCmd));
        reg
    }

    #[test]
    fn register_and_lookup_case_insensitive() {
        let reg = basic_registry();
        assert_eq!(reg.get("emit").map(|c| c.name()), Some("Emit"));
        assert_eq!(reg.get("EM").map(|c| c.name()), Some("Emit"));
        assert!(reg.get("nope").is_none());
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn register_replaces_existing_command() {
        let mut reg = basic_registry();
        reg.register(Box::new(EmitCmd));
        assert_eq!(reg.len(), 3);
        assert!(reg.get("em").is_some());
    }

    #[test]
    fn names_include_aliases_sorted() {
        let reg = basic_registry();
        assert_eq!(reg.names(), vec!["em", "Emit", "Fail", "Suffix"]);
        let listed: Vec<&str> = reg.list_commands().iter().map(|c| c.name()).collect();
        assert_eq!(listed, vec!["Emit", "Fail", "Suffix"]);
    }

    #[test]
    fn three_stage_pipeline_threads_values() {
        let seen = Rc::new(RefCell::new(None));
        let mut reg = basic_registry();
        reg.register(Box::new(CaptureCmd(Rc::clone(&seen))));
        let mut h = Harness::new(reg);
        h.run("Emit a | Suffix b | Capture");
        assert_eq!(*seen.borrow(), Some(PipeValue::text("a+b")));
    }

    #[test]
    fn final_value_is_rendered() {
        let mut h = Harness::new(basic_registry());
        let v = h.run("emit hello | suffix x");
        assert_eq!(v, Some(PipeValue::text("hello+x")));
        assert_eq!(h.sink.lines(), vec!["hello+x"]);
    }

    #[test]
    fn unrecognized_command_aborts_only_its_pipeline() {
        let mut h = Harness::new(basic_registry());
        let v = h.run("badcmd | Emit hi; Emit there");
        assert_eq!(v, Some(PipeValue::text("there")));
        assert_eq!(h.sink.lines_with(Style::Normal), vec!["there"]);
        let errors = h.sink.lines_with(Style::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'badcmd'"));
    }

    #[test]
    fn failing_stage_reports_and_passes_none() {
        let seen = Rc::new(RefCell::new(Some(PipeValue::text("stale"))));
        let mut reg = basic_registry();
        reg.register(Box::new(CaptureCmd(Rc::clone(&seen))));
        let mut h = Harness::new(reg);
        h.run("Fail | Capture");
        assert_eq!(*seen.borrow(), None);
        assert_eq!(h.sink.lines_with(Style::Error), vec!["Fail : boom"]);
    }

    #[test]
    fn comments_and_blank_statements_are_skipped() {
        let mut h = Harness::new(basic_registry());
        assert_eq!(h.run("# Emit nothing"), None);
        assert_eq!(h.run("   "), None);
        assert!(h.sink.events.is_empty());
    }

    #[test]
    fn assignment_stores_without_rendering() {
        let mut h = Harness::new(basic_registry());
        let v = h.run("$greeting = \"hi there\"");
        assert_eq!(v, Some(PipeValue::text("hi there")));
        assert_eq!(h.state.variables.get("greeting"), Some("hi there"));
        assert!(h.sink.events.is_empty());
    }

    #[test]
    fn assignment_evaluates_expressions() {
        let mut h = Harness::new(basic_registry());
        h.run("$n = 2 + 3; $big = $n -gt 4");
        assert_eq!(h.state.variables.get("n"), Some("5"));
        assert_eq!(h.state.variables.get("big"), Some("True"));
    }

    #[test]
    fn arithmetic_shortcut_renders_number() {
        let mut h = Harness::new(basic_registry());
        assert_eq!(h.run("2 + 3 * 4"), Some(PipeValue::text("14")));
        h.run("10 / 0");
        assert_eq!(h.sink.lines(), vec!["14", "NaN"]);
    }

    #[test]
    fn variables_expand_into_arguments() {
        let mut h = Harness::new(basic_registry());
        h.run("$who = world");
        assert_eq!(h.run("Emit hello $who"), Some(PipeValue::text("hello world")));
    }

    #[test]
    fn bare_variable_reference_is_output() {
        let mut h = Harness::new(basic_registry());
        h.run("$x = 42");
        assert_eq!(h.run("$x"), Some(PipeValue::text("42")));
        assert_eq!(h.run("$undefined"), None);
        assert_eq!(h.sink.lines(), vec!["42"]);
    }

    #[test]
    fn expression_segments_evaluate() {
        let mut h = Harness::new(basic_registry());
        assert_eq!(h.run("\"abc\" -like \"a*\""), Some(PipeValue::text("True")));
        assert_eq!(h.run("'just text'"), Some(PipeValue::text("just text")));
        assert_eq!(h.run("'x' | Suffix y"), Some(PipeValue::text("x+y")));
    }

    #[test]
    fn variable_holding_command_name_dispatches() {
        let mut h = Harness::new(basic_registry());
        h.run("$c = \"Emit\"");
        assert_eq!(h.run("$c hi"), Some(PipeValue::text("hi")));
        h.run("$n = nothing");
        assert_eq!(h.run("$n hi"), Some(PipeValue::text("nothing hi")));
        assert!(h.sink.lines_with(Style::Error).is_empty());
    }

    #[test]
    fn declared_switches_keep_following_positional() {
        let seen = Rc::new(RefCell::new(None));
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(ArgsCmd(Rc::clone(&seen))));
        let mut h = Harness::new(reg);
        h.run("args -Recurse docs -Filter:*.txt");
        let args = seen.borrow().clone().unwrap();
        assert!(args.flag("recurse"));
        assert_eq!(args.positional, vec!["docs"]);
        assert_eq!(args.get("filter"), Some("*.txt"));
    }

    #[test]
    fn resolve_handles_home_shortcut() {
        let mut h = Harness::new(basic_registry());
        let env = Environment {
            state: &mut h.state,
            vfs: &mut h.vfs,
            sink: &mut h.sink,
            clock: h.clock.as_ref(),
            registry: &h.registry,
        };
        assert_eq!(env.resolve("~"), "C:\\Users\\user");
        assert_eq!(env.resolve("~\\Documents"), "C:\\Users\\user\\Documents");
        assert_eq!(env.resolve(".."), "C:\\Users");
    }
}
