//! System information cmdlets: date, sleep, processes, identity, screen.

use chrono::{DateTime, Utc};

use psh_types::error::{PshError, Result};

use crate::arith;
use crate::expr::glob_match;
use crate::interpreter::{Command, Environment, Invocation};
use crate::output::Style;
use crate::value::{PipeValue, ProcessEntry, Record};

// ---------------------------------------------------------------------------
// Get-Date
// ---------------------------------------------------------------------------

/// Used when `-Format` is absent.
const DEFAULT_DATE_FORMAT: &str = "dddd, MMMM d, yyyy h:mm:ss tt";

/// .NET date tokens and their chrono equivalents. Longer tokens first so
/// matching is greedy.
const DATE_TOKENS: &[(&str, &str)] = &[
    ("yyyy", "%Y"),
    ("yy", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("M", "%-m"),
    ("dddd", "%A"),
    ("ddd", "%a"),
    ("dd", "%d"),
    ("d", "%-d"),
    ("HH", "%H"),
    ("H", "%-H"),
    ("hh", "%I"),
    ("h", "%-I"),
    ("mm", "%M"),
    ("m", "%-M"),
    ("ss", "%S"),
    ("s", "%-S"),
    ("fff", "%3f"),
    ("tt", "%p"),
];

/// Translate a .NET-style date format into a chrono format string.
/// Unrecognised characters are copied literally.
fn translate_date_format(format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut rest = format;
    'outer: while let Some(ch) = rest.chars().next() {
        for (token, spec) in DATE_TOKENS {
            if let Some(after) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = after;
                continue 'outer;
            }
        }
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
        rest = &rest[ch.len_utf8()..];
    }
    out
}

pub fn format_date(now: DateTime<Utc>, format: &str) -> String {
    now.format(&translate_date_format(format)).to_string()
}

struct GetDateCmd;
impl Command for GetDateCmd {
    fn name(&self) -> &str {
        "Get-Date"
    }
    fn aliases(&self) -> &[&str] {
        &["date"]
    }
    fn description(&self) -> &str {
        "Show the current date and time"
    }
    fn usage(&self) -> &str {
        "Get-Date [-Format fmt]"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn parameters(&self) -> &[&str] {
        &["Format"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let format = inv.args.get("format").unwrap_or(DEFAULT_DATE_FORMAT);
        Ok(Some(PipeValue::text(format_date(env.clock.now(), format))))
    }
}

// ---------------------------------------------------------------------------
// Start-Sleep
// ---------------------------------------------------------------------------

fn parse_duration(value: &str, param: &str) -> Result<f64> {
    match arith::parse_decimal(value) {
        Some(n) if n >= 0.0 => Ok(n),
        _ => Err(PshError::Command(format!(
            "Cannot bind parameter '{param}'. '{value}' is not a non-negative number."
        ))),
    }
}

struct StartSleepCmd;
impl Command for StartSleepCmd {
    fn name(&self) -> &str {
        "Start-Sleep"
    }
    fn aliases(&self) -> &[&str] {
        &["sleep"]
    }
    fn description(&self) -> &str {
        "Pretend to pause (returns immediately)"
    }
    fn usage(&self) -> &str {
        "Start-Sleep [-Seconds n] [-Milliseconds n]"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn parameters(&self) -> &[&str] {
        &["Seconds", "Milliseconds"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let args = &inv.args;
        let millis = match (args.get_any(&["milliseconds", "ms"]), args.param("seconds", 0)) {
            (Some(ms), _) => parse_duration(ms, "Milliseconds")?,
            (None, Some(s)) => parse_duration(s, "Seconds")? * 1000.0,
            (None, None) => 0.0,
        };
        log::debug!("Simulated sleep of {millis} ms");
        let text = if millis >= 1000.0 {
            format!("Slept for {} second(s).", crate::arith::format_number(millis / 1000.0))
        } else {
            format!("Slept for {} millisecond(s).", crate::arith::format_number(millis))
        };
        env.sink.write_line(&text, Style::Info);
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Get-Process
// ---------------------------------------------------------------------------

/// The emulated process table: (id, name, cpu seconds, working set MB).
const PROCESSES: &[(u32, &str, f64, f64)] = &[
    (0, "Idle", 0.0, 0.01),
    (4, "System", 812.45, 0.14),
    (388, "smss", 0.12, 1.06),
    (564, "csrss", 14.7, 5.23),
    (648, "wininit", 0.2, 6.8),
    (704, "services", 22.31, 9.92),
    (716, "lsass", 18.05, 17.4),
    (836, "svchost", 97.6, 42.12),
    (3120, "explorer", 143.2, 121.55),
    (4242, "powershell", 3.5, 68.3),
];

struct GetProcessCmd;
impl Command for GetProcessCmd {
    fn name(&self) -> &str {
        "Get-Process"
    }
    fn aliases(&self) -> &[&str] {
        &["ps", "gps"]
    }
    fn description(&self) -> &str {
        "List emulated processes"
    }
    fn usage(&self) -> &str {
        "Get-Process [-Name glob]"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn parameters(&self) -> &[&str] {
        &["Name"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        _input: Option<PipeValue>,
        _env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let pattern = inv.args.param("name", 0).unwrap_or("*");
        let mut found: Vec<ProcessEntry> = PROCESSES
            .iter()
            .filter(|(_, name, _, _)| glob_match(pattern, name))
            .map(|&(id, name, cpu_seconds, working_set_mb)| ProcessEntry {
                id,
                name: name.to_string(),
                cpu_seconds,
                working_set_mb,
            })
            .collect();
        if found.is_empty() {
            return Err(PshError::Command(format!(
                "Cannot find a process with the name \"{pattern}\"."
            )));
        }
        found.sort_by_key(|p| p.name.to_lowercase());
        Ok(Some(PipeValue::List(
            found
                .into_iter()
                .map(|p| PipeValue::Record(Record::Process(p)))
                .collect(),
        )))
    }
}

// ---------------------------------------------------------------------------
// Clear-Host / whoami / hostname
// ---------------------------------------------------------------------------

struct ClearHostCmd;
impl Command for ClearHostCmd {
    fn name(&self) -> &str {
        "Clear-Host"
    }
    fn aliases(&self) -> &[&str] {
        &["cls", "clear"]
    }
    fn description(&self) -> &str {
        "Clear the screen"
    }
    fn usage(&self) -> &str {
        "Clear-Host"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(
        &self,
        _inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        env.sink.clear();
        Ok(None)
    }
}

struct WhoamiCmd;
impl Command for WhoamiCmd {
    fn name(&self) -> &str {
        "whoami"
    }
    fn description(&self) -> &str {
        "Show the current user as computer\\user"
    }
    fn usage(&self) -> &str {
        "whoami"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(
        &self,
        _inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let config = &env.state.config;
        Ok(Some(PipeValue::text(format!(
            "{}\\{}",
            config.computer_name.to_lowercase(),
            config.user_name
        ))))
    }
}

struct HostnameCmd;
impl Command for HostnameCmd {
    fn name(&self) -> &str {
        "hostname"
    }
    fn description(&self) -> &str {
        "Show the computer name"
    }
    fn usage(&self) -> &str {
        "hostname"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn execute(
        &self,
        _inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        Ok(Some(PipeValue::text(env.state.config.computer_name.clone())))
    }
}

/// Register system cmdlets.
pub fn register_system_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(GetDateCmd));
    reg.register(Box::new(StartSleepCmd));
    reg.register(Box::new(GetProcessCmd));
    reg.register(Box::new(ClearHostCmd));
    reg.register(Box::new(WhoamiCmd));
    reg.register(Box::new(HostnameCmd));
}
