//! Variable cmdlets.

use psh_types::error::{PshError, Result};

use crate::commands::usage_error;
use crate::expr::glob_match;
use crate::interpreter::{Command, Environment, Invocation};
use crate::value::{GenericRecord, PipeValue, Record};

/// Accept `name` and `$name`.
fn variable_name(raw: &str) -> &str {
    raw.strip_prefix('$').unwrap_or(raw)
}

struct SetVariableCmd;
impl Command for SetVariableCmd {
    fn name(&self) -> &str {
        "Set-Variable"
    }
    fn aliases(&self) -> &[&str] {
        &["set", "sv"]
    }
    fn description(&self) -> &str {
        "Assign a session variable"
    }
    fn usage(&self) -> &str {
        "Set-Variable -Name n -Value v"
    }
    fn category(&self) -> &str {
        "variables"
    }
    fn parameters(&self) -> &[&str] {
        &["Name", "Value"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let args = &inv.args;
        let name = args
            .param("name", 0)
            .map(variable_name)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| usage_error(self.usage()))?;
        let skip = usize::from(args.get("name").is_none());
        let value = match args.get("value") {
            Some(v) => v.to_string(),
            None if args.positional.len() > skip => args.positional[skip..].join(" "),
            None => input.map(|v| v.to_text()).unwrap_or_default(),
        };
        env.state.variables.set(name, &value);
        Ok(None)
    }
}

struct GetVariableCmd;
impl Command for GetVariableCmd {
    fn name(&self) -> &str {
        "Get-Variable"
    }
    fn aliases(&self) -> &[&str] {
        &["gv"]
    }
    fn description(&self) -> &str {
        "List session variables"
    }
    fn usage(&self) -> &str {
        "Get-Variable [-Name glob] [-ValueOnly]"
    }
    fn category(&self) -> &str {
        "variables"
    }
    fn parameters(&self) -> &[&str] {
        &["Name", "ValueOnly"]
    }
    fn switches(&self) -> &[&str] {
        &["ValueOnly"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        _input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let pattern = inv.args.param("name", 0).map(variable_name).unwrap_or("*");
        let matched: Vec<_> = env
            .state
            .variables
            .iter()
            .filter(|v| glob_match(pattern, &v.name))
            .collect();
        if matched.is_empty() && !pattern.contains(['*', '?']) {
            return Err(PshError::Command(format!(
                "Cannot find a variable with the name '{pattern}'."
            )));
        }
        let items = if inv.args.flag("valueonly") {
            matched
                .iter()
                .map(|v| PipeValue::text(v.value.clone()))
                .collect()
        } else {
            matched
                .iter()
                .map(|v| {
                    PipeValue::Record(Record::Generic(
                        GenericRecord::new()
                            .with("Name", v.name.clone())
                            .with("Value", v.value.clone()),
                    ))
                })
                .collect()
        };
        Ok(Some(PipeValue::List(items)))
    }
}

struct RemoveVariableCmd;
impl Command for RemoveVariableCmd {
    fn name(&self) -> &str {
        "Remove-Variable"
    }
    fn aliases(&self) -> &[&str] {
        &["rv"]
    }
    fn description(&self) -> &str {
        "Delete a session variable"
    }
    fn usage(&self) -> &str {
        "Remove-Variable -Name n"
    }
    fn category(&self) -> &str {
        "variables"
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
        let name = inv
            .args
            .param("name", 0)
            .map(variable_name)
            .ok_or_else(|| usage_error(self.usage()))?;
        if !env.state.variables.remove(name) {
            return Err(PshError::Command(format!(
                "Cannot find a variable with the name '{name}'."
            )));
        }
        Ok(None)
    }
}

/// Register variable cmdlets.
pub fn register_variable_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(SetVariableCmd));
    reg.register(Box::new(GetVariableCmd));
    reg.register(Box::new(RemoveVariableCmd));
}
