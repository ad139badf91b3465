//! Object-pipeline cmdlets: output, filtering, projection, sorting, measuring.

use std::cmp::Ordering;

use psh_types::error::{PshError, Result};

use crate::arith::{self, format_number};
use crate::commands::{parse_count, usage_error};
use crate::expr;
use crate::interpreter::{Command, Environment, Invocation};
use crate::output::Style;
use crate::value::{GenericRecord, PipeValue, Record, Renderable};
use psh_vfs::path::{self, unquote};

/// Body of a `{ ... }` script block, or `None` if `text` is not one.
fn script_block(text: &str) -> Option<&str> {
    let t = text.trim();
    t.strip_prefix('{')?.strip_suffix('}').map(str::trim)
}

/// Replace `$_.Prop` with the item's property and `$_` with its text.
/// Unknown properties become empty.
fn substitute_item(script: &str, item: &PipeValue) -> String {
    let mut out = String::with_capacity(script.len());
    let mut rest = script;
    while let Some(i) = rest.find("$_") {
        out.push_str(&rest[..i]);
        let after = &rest[i + 2..];
        if let Some(prop) = after.strip_prefix('.') {
            let len = prop
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(prop.len());
            if len > 0 {
                out.push_str(&item.property(&prop[..len]).unwrap_or_default());
                rest = &prop[len..];
                continue;
            }
        }
        out.push_str(&item.to_text());
        rest = after;
    }
    out.push_str(rest);
    out
}

/// Comma-separated names, as in `-Property Name,Length`.
fn name_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| unquote(s.trim()).to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Numbers compare numerically, everything else case-insensitively.
fn compare_keys(a: &str, b: &str) -> Ordering {
    match (arith::parse_decimal(a), arith::parse_decimal(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

fn item_key(item: &PipeValue, property: Option<&str>) -> String {
    property
        .and_then(|p| item.property(p))
        .unwrap_or_else(|| item.to_text())
}

// ---------------------------------------------------------------------------
// Write-Output / Write-Host
// ---------------------------------------------------------------------------

struct WriteOutputCmd;
impl Command for WriteOutputCmd {
    fn name(&self) -> &str {
        "Write-Output"
    }
    fn aliases(&self) -> &[&str] {
        &["echo", "write"]
    }
    fn description(&self) -> &str {
        "Send text down the pipeline"
    }
    fn usage(&self) -> &str {
        "Write-Output <text>"
    }
    fn category(&self) -> &str {
        "pipeline"
    }
    fn parameters(&self) -> &[&str] {
        &["InputObject"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        input: Option<PipeValue>,
        _env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        if let Some(v) = inv.args.get("inputobject") {
            return Ok(Some(PipeValue::text(v)));
        }
        if inv.args.positional.is_empty() {
            return Ok(input);
        }
        Ok(Some(PipeValue::text(inv.joined())))
    }
}

struct WriteHostCmd;
impl Command for WriteHostCmd {
    fn name(&self) -> &str {
        "Write-Host"
    }
    fn description(&self) -> &str {
        "Write text straight to the console"
    }
    fn usage(&self) -> &str {
        "Write-Host <text> [-ForegroundColor color] [-NoNewline]"
    }
    fn category(&self) -> &str {
        "pipeline"
    }
    fn parameters(&self) -> &[&str] {
        &["Object", "ForegroundColor", "BackgroundColor", "NoNewline"]
    }
    fn switches(&self) -> &[&str] {
        &["NoNewline"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let text = match inv.args.get("object") {
            Some(v) => v.to_string(),
            None if inv.args.positional.is_empty() => {
                input.map(|v| v.to_text()).unwrap_or_default()
            },
            None => inv.joined(),
        };
        let style = inv
            .args
            .get_any(&["foregroundcolor", "fore", "fg"])
            .map_or(Style::Host, Style::from_color);
        env.sink.write_line(&text, style);
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Where-Object / ForEach-Object
// ---------------------------------------------------------------------------

struct WhereObjectCmd;
impl Command for WhereObjectCmd {
    fn name(&self) -> &str {
        "Where-Object"
    }
    fn aliases(&self) -> &[&str] {
        &["where", "?"]
    }
    fn description(&self) -> &str {
        "Keep pipeline items matching a condition"
    }
    fn usage(&self) -> &str {
        "Where-Object { $_.Prop -op value } | Where-Object Prop -op value"
    }
    fn category(&self) -> &str {
        "pipeline"
    }
    fn execute(
        &self,
        inv: &Invocation,
        input: Option<PipeValue>,
        _env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let rest = inv.remainder();
        if rest.is_empty() {
            return Err(usage_error(self.usage()));
        }
        let condition = match script_block(rest) {
            Some(body) => body.to_string(),
            None if rest.starts_with('$') => rest.to_string(),
            None => format!("$_.{rest}"),
        };
        let Some(input) = input else {
            return Ok(None);
        };
        let kept: Vec<PipeValue> = input
            .into_items()
            .into_iter()
            .filter(|item| {
                let verdict = expr::evaluate_expanded(&substitute_item(&condition, item));
                expr::is_truthy(&verdict)
            })
            .collect();
        Ok(Some(PipeValue::List(kept)))
    }
}

struct ForEachObjectCmd;
impl Command for ForEachObjectCmd {
    fn name(&self) -> &str {
        "ForEach-Object"
    }
    fn aliases(&self) -> &[&str] {
        &["foreach", "%"]
    }
    fn description(&self) -> &str {
        "Evaluate a script block or read a property for each item"
    }
    fn usage(&self) -> &str {
        "ForEach-Object { expression using $_ } | ForEach-Object PropertyName"
    }
    fn category(&self) -> &str {
        "pipeline"
    }
    fn execute(
        &self,
        inv: &Invocation,
        input: Option<PipeValue>,
        _env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let rest = inv.remainder();
        if rest.is_empty() {
            return Err(usage_error(self.usage()));
        }
        let Some(input) = input else {
            return Ok(None);
        };
        let items = input.into_items();
        let mapped: Vec<PipeValue> = match script_block(rest) {
            Some(body) => items
                .iter()
                .map(|item| {
                    let value = expr::evaluate_expanded(&substitute_item(body, item));
                    PipeValue::text(unquote(&value))
                })
                .collect(),
            None => {
                let property = inv.args.param("membername", 0).unwrap_or(rest);
                items
                    .iter()
                    .filter_map(|item| item.property(property).map(PipeValue::Text))
                    .collect()
            },
        };
        Ok(Some(PipeValue::List(mapped)))
    }
}

// ---------------------------------------------------------------------------
// Sort-Object / Select-Object
// ---------------------------------------------------------------------------

struct SortObjectCmd;
impl Command for SortObjectCmd {
    fn name(&self) -> &str {
        "Sort-Object"
    }
    fn aliases(&self) -> &[&str] {
        &["sort"]
    }
    fn description(&self) -> &str {
        "Sort pipeline items"
    }
    fn usage(&self) -> &str {
        "Sort-Object [-Property p] [-Descending] [-Unique]"
    }
    fn category(&self) -> &str {
        "pipeline"
    }
    fn parameters(&self) -> &[&str] {
        &["Property", "Descending", "Unique"]
    }
    fn switches(&self) -> &[&str] {
        &["Descending", "Unique"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        input: Option<PipeValue>,
        _env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let Some(input) = input else {
            return Ok(None);
        };
        let property = inv.args.param("property", 0);
        let mut keyed: Vec<(String, PipeValue)> = input
            .into_items()
            .into_iter()
            .map(|item| (item_key(&item, property), item))
            .collect();
        if inv.args.flag("descending") {
            keyed.sort_by(|a, b| compare_keys(&b.0, &a.0));
        } else {
            keyed.sort_by(|a, b| compare_keys(&a.0, &b.0));
        }
        if inv.args.flag("unique") {
            keyed.dedup_by(|a, b| a.0.eq_ignore_ascii_case(&b.0));
        }
        Ok(Some(PipeValue::List(
            keyed.into_iter().map(|(_, item)| item).collect(),
        )))
    }
}

struct SelectObjectCmd;
impl Command for SelectObjectCmd {
    fn name(&self) -> &str {
        "Select-Object"
    }
    fn aliases(&self) -> &[&str] {
        &["select"]
    }
    fn description(&self) -> &str {
        "Take a slice of items or pick properties"
    }
    fn usage(&self) -> &str {
        "Select-Object [-First n] [-Last n] [-Skip n] [-Property a,b] [-ExpandProperty p] [-Unique]"
    }
    fn category(&self) -> &str {
        "pipeline"
    }
    fn parameters(&self) -> &[&str] {
        &["First", "Last", "Skip", "Property", "ExpandProperty", "Unique"]
    }
    fn switches(&self) -> &[&str] {
        &["Unique"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        input: Option<PipeValue>,
        _env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let args = &inv.args;
        let Some(input) = input else {
            return Ok(None);
        };
        let mut items = input.into_items();

        if let Some(n) = args.get("skip") {
            let n = parse_count(n, "Skip")?.min(items.len());
            items.drain(..n);
        }
        if let Some(n) = args.get("first") {
            items.truncate(parse_count(n, "First")?);
        }
        if let Some(n) = args.get("last") {
            let skip = items.len().saturating_sub(parse_count(n, "Last")?);
            items.drain(..skip);
        }
        if args.flag("unique") {
            let mut seen: Vec<String> = Vec::new();
            items.retain(|item| {
                let text = item.to_text();
                let fresh = !seen.contains(&text);
                if fresh {
                    seen.push(text);
                }
                fresh
            });
        }

        if let Some(p) = args.get("expandproperty") {
            let values = items
                .iter()
                .filter_map(|item| item.property(p).map(PipeValue::Text))
                .collect();
            return Ok(Some(PipeValue::List(values)));
        }
        if let Some(props) = args.param("property", 0) {
            let props = name_list(props);
            let projected = items
                .iter()
                .map(|item| {
                    let record = props.iter().fold(GenericRecord::new(), |rec, p| {
                        rec.with(p, item.property(p).unwrap_or_default())
                    });
                    PipeValue::Record(Record::Generic(record))
                })
                .collect();
            return Ok(Some(PipeValue::List(projected)));
        }
        Ok(Some(PipeValue::List(items)))
    }
}

// ---------------------------------------------------------------------------
// Measure-Object
// ---------------------------------------------------------------------------

struct MeasureObjectCmd;
impl Command for MeasureObjectCmd {
    fn name(&self) -> &str {
        "Measure-Object"
    }
    fn aliases(&self) -> &[&str] {
        &["measure"]
    }
    fn description(&self) -> &str {
        "Count items, sum a property, or count lines/words/characters"
    }
    fn usage(&self) -> &str {
        "Measure-Object [-Property p] [-Sum] [-Average] [-Maximum] [-Minimum] [-Line] [-Word] [-Character]"
    }
    fn category(&self) -> &str {
        "pipeline"
    }
    fn parameters(&self) -> &[&str] {
        &[
            "Property", "Sum", "Average", "Maximum", "Minimum", "Line", "Word", "Character",
        ]
    }
    fn switches(&self) -> &[&str] {
        &["Sum", "Average", "Maximum", "Minimum", "Line", "Word", "Character"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        input: Option<PipeValue>,
        _env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let args = &inv.args;
        let items = input.map(PipeValue::into_items).unwrap_or_default();

        let text_stats = ["line", "word", "character"];
        if text_stats.iter().any(|s| args.flag(s)) {
            let texts: Vec<String> = items.iter().map(PipeValue::to_text).collect();
            let mut record = GenericRecord::new();
            if args.flag("line") {
                let lines: usize = texts.iter().map(|t| t.lines().count()).sum();
                record = record.with("Lines", lines.to_string());
            }
            if args.flag("word") {
                let words: usize = texts.iter().map(|t| t.split_whitespace().count()).sum();
                record = record.with("Words", words.to_string());
            }
            if args.flag("character") {
                let chars: usize = texts.iter().map(|t| t.chars().count()).sum();
                record = record.with("Characters", chars.to_string());
            }
            return Ok(Some(PipeValue::Record(Record::Generic(record))));
        }

        let mut record = GenericRecord::new().with("Count", items.len().to_string());
        let Some(property) = args.param("property", 0) else {
            return Ok(Some(PipeValue::Record(Record::Generic(record))));
        };
        let numbers: Vec<f64> = items
            .iter()
            .filter_map(|item| item.property(property))
            .filter_map(|v| arith::parse_decimal(&v))
            .collect();
        let sum: f64 = numbers.iter().sum();
        let requested = ["sum", "average", "maximum", "minimum"];
        let all = !requested.iter().any(|s| args.flag(s));
        if all || args.flag("average") {
            let avg = if numbers.is_empty() {
                0.0
            } else {
                sum / numbers.len() as f64
            };
            record = record.with("Average", format_number(avg));
        }
        if all || args.flag("sum") {
            record = record.with("Sum", format_number(sum));
        }
        if all || args.flag("maximum") {
            let max = numbers.iter().copied().reduce(f64::max).unwrap_or(0.0);
            record = record.with("Maximum", format_number(max));
        }
        if all || args.flag("minimum") {
            let min = numbers.iter().copied().reduce(f64::min).unwrap_or(0.0);
            record = record.with("Minimum", format_number(min));
        }
        record = record.with("Property", property);
        Ok(Some(PipeValue::Record(Record::Generic(record))))
    }
}

// ---------------------------------------------------------------------------
// Select-String
// ---------------------------------------------------------------------------

struct SelectStringCmd;
impl Command for SelectStringCmd {
    fn name(&self) -> &str {
        "Select-String"
    }
    fn aliases(&self) -> &[&str] {
        &["sls"]
    }
    fn description(&self) -> &str {
        "Find lines matching a regular expression"
    }
    fn usage(&self) -> &str {
        "Select-String -Pattern p [-Path file] [-CaseSensitive] [-SimpleMatch] [-NotMatch]"
    }
    fn category(&self) -> &str {
        "pipeline"
    }
    fn parameters(&self) -> &[&str] {
        &["Pattern", "Path", "CaseSensitive", "SimpleMatch", "NotMatch"]
    }
    fn switches(&self) -> &[&str] {
        &["CaseSensitive", "SimpleMatch", "NotMatch"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let args = &inv.args;
        let pattern = args
            .param("pattern", 0)
            .ok_or_else(|| usage_error(self.usage()))?;
        let pattern = if args.flag("simplematch") {
            regex::escape(pattern)
        } else {
            pattern.to_string()
        };
        let re = regex::RegexBuilder::new(&pattern)
            .case_insensitive(!args.flag("casesensitive"))
            .build()
            .map_err(|e| PshError::Command(format!("Invalid regular expression: {e}")))?;
        let invert = args.flag("notmatch");
        let keep = |line: &str| re.is_match(line) != invert;

        let path_pos = usize::from(args.get("pattern").is_none());
        if let Some(file) = args.param("path", path_pos) {
            let full = env.resolve(file);
            if !env.vfs.exists(&full) {
                return Err(PshError::PathNotFound(full));
            }
            if env.vfs.is_dir(&full) {
                return Err(PshError::NotAFile(full));
            }
            let name = path::file_name(&full).to_string();
            let content = env.vfs.read_content(&full);
            let hits = content
                .lines()
                .enumerate()
                .filter(|(_, line)| keep(*line))
                .map(|(i, line)| PipeValue::text(format!("{name}:{}:{line}", i + 1)))
                .collect();
            return Ok(Some(PipeValue::List(hits)));
        }

        let Some(input) = input else {
            return Ok(None);
        };
        let hits = input
            .into_items()
            .iter()
            .flat_map(|item| {
                item.to_text()
                    .lines()
                    .filter(|line| keep(*line))
                    .map(PipeValue::text)
                    .collect::<Vec<_>>()
            })
            .collect();
        Ok(Some(PipeValue::List(hits)))
    }
}

// ---------------------------------------------------------------------------
// Format-List
// ---------------------------------------------------------------------------

struct FormatListCmd;
impl Command for FormatListCmd {
    fn name(&self) -> &str {
        "Format-List"
    }
    fn aliases(&self) -> &[&str] {
        &["fl"]
    }
    fn description(&self) -> &str {
        "Show each item's properties one per line"
    }
    fn usage(&self) -> &str {
        "Format-List [-Property a,b]"
    }
    fn category(&self) -> &str {
        "pipeline"
    }
    fn parameters(&self) -> &[&str] {
        &["Property"]
    }
    fn execute(
        &self,
        inv: &Invocation,
        input: Option<PipeValue>,
        env: &mut Environment<'_>,
    ) -> Result<Option<PipeValue>> {
        let Some(input) = input else {
            return Ok(None);
        };
        let wanted = inv.args.param("property", 0).map(name_list);
        for (i, item) in input.into_items().iter().enumerate() {
            if i > 0 {
                env.sink.write_line("", Style::Normal);
            }
            let PipeValue::Record(record) = item else {
                env.sink.write_line(&item.to_text(), Style::Normal);
                continue;
            };
            let props: Vec<(String, String)> = match &wanted {
                Some(names) => names
                    .iter()
                    .map(|n| (n.clone(), record.property(n).unwrap_or_default()))
                    .collect(),
                None => record.properties(),
            };
            let width = props.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
            for (k, v) in props {
                env.sink
                    .write_line(&format!("{k:<width$} : {v}"), Style::Normal);
            }
        }
        Ok(None)
    }
}

/// Register pipeline cmdlets.
pub fn register_pipeline_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(WriteOutputCmd));
    reg.register(Box::new(WriteHostCmd));
    reg.register(Box::new(WhereObjectCmd));
    reg.register(Box::new(ForEachObjectCmd));
    reg.register(Box::new(SortObjectCmd));
    reg.register(Box::new(SelectObjectCmd));
    reg.register(Box::new(MeasureObjectCmd));
    reg.register(Box::new(SelectStringCmd));
    reg.register(Box::new(FormatListCmd));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestShell;

    fn setup() -> TestShell {
        let mut sh = TestShell::new();
        sh.vfs_write("C:\\Users\\user\\small.txt", "abc");
        sh.vfs_write("C:\\Users\\user\\big.txt", "0123456789");
        sh.vfs_write("C:\\Users\\user\\words.txt", "the quick fox\njumps over\nthe lazy dog");
        sh
    }

    fn texts(v: Option<PipeValue>) -> Vec<String> {
        v.map(|v| v.into_items().iter().map(PipeValue::to_text).collect())
            .unwrap_or_default()
    }

    fn record_field(v: &Option<PipeValue>, name: &str) -> Option<String> {
        match v {
            Some(PipeValue::Record(r)) => r.property(name),
            _ => None,
        }
    }

    #[test]
    fn substitute_properties_and_item() {
        let item = PipeValue::text("hello");
        assert_eq!(substitute_item("$_.Length -gt 3", &item), "5 -gt 3");
        assert_eq!(substitute_item("\"$_!\"", &item), "\"hello!\"");
        assert_eq!(substitute_item("$_.Missing", &item), "");
        assert_eq!(substitute_item("no refs", &item), "no refs");
    }

    #[test]
    fn script_block_parsing() {
        assert_eq!(script_block("{ $_ -gt 1 }"), Some("$_ -gt 1"));
        assert_eq!(script_block("Name -eq x"), None);
    }

    #[test]
    fn echo_joins_arguments() {
        let mut sh = setup();
        assert_eq!(sh.exec("echo hello world"), Some(PipeValue::text("hello world")));
        assert_eq!(sh.exec("Write-Output \"a  b\""), Some(PipeValue::text("a  b")));
        assert_eq!(sh.sink.lines(), vec!["hello world", "a  b"]);
    }

    #[test]
    fn write_host_uses_color_style() {
        let mut sh = setup();
        assert_eq!(sh.exec("Write-Host warning! -ForegroundColor Red"), None);
        assert_eq!(sh.sink.lines_with(Style::Error), vec!["warning!"]);
        sh.exec("Write-Host plain");
        assert_eq!(sh.sink.lines_with(Style::Host), vec!["plain"]);
    }

    #[test]
    fn where_object_script_block_on_records() {
        let mut sh = setup();
        let v = sh.exec("ls -File | Where-Object { $_.Length -gt 5 }");
        let names: Vec<String> = v
            .unwrap()
            .into_items()
            .iter()
            .filter_map(|i| i.property("Name"))
            .collect();
        assert_eq!(names, vec!["big.txt", "readme.txt", "words.txt"]);
    }

    #[test]
    fn where_object_simplified_syntax() {
        let mut sh = setup();
        let v = sh.exec("ls | where Name -like *.txt | ForEach-Object Name");
        assert_eq!(texts(v), vec!["big.txt", "readme.txt", "small.txt", "words.txt"]);
    }

    #[test]
    fn where_object_on_text_lines() {
        let mut sh = setup();
        let v = sh.exec("cat words.txt | ? { $_ -match '^the' }");
        assert_eq!(texts(v), vec!["the quick fox", "the lazy dog"]);
    }

    #[test]
    fn foreach_evaluates_expressions() {
        let mut sh = setup();
        sh.vfs_write("C:\\Users\\user\\nums.txt", "1\n2\n3");
        let v = sh.exec("gc nums.txt | % { $_ * 10 }");
        assert_eq!(texts(v), vec!["10", "20", "30"]);
        let v = sh.exec("gc nums.txt | foreach { \"n=$_\" }");
        assert_eq!(texts(v), vec!["n=1", "n=2", "n=3"]);
    }

    #[test]
    fn sort_numeric_and_descending() {
        let mut sh = setup();
        sh.vfs_write("C:\\Users\\user\\nums.txt", "10\n9\n100\n9");
        assert_eq!(texts(sh.exec("gc nums.txt | sort")), vec!["9", "9", "10", "100"]);
        assert_eq!(
            texts(sh.exec("gc nums.txt | Sort-Object -Descending -Unique")),
            vec!["100", "10", "9"]
        );
    }

    #[test]
    fn sort_treats_exponents_as_text() {
        let mut sh = setup();
        sh.vfs_write("C:\\Users\\user\\keys.txt", "20\n1e3");
        assert_eq!(texts(sh.exec("gc keys.txt | sort")), vec!["1e3", "20"]);
    }

    #[test]
    fn sort_by_property() {
        let mut sh = setup();
        let v = sh.exec("ls -File | Sort-Object Length | select -ExpandProperty Name");
        assert_eq!(texts(v), vec!["small.txt", "big.txt", "words.txt", "readme.txt"]);
    }

    #[test]
    fn select_first_last_skip() {
        let mut sh = setup();
        sh.vfs_write("C:\\Users\\user\\nums.txt", "1\n2\n3\n4\n5");
        assert_eq!(texts(sh.exec("gc nums.txt | select -First 2")), vec!["1", "2"]);
        assert_eq!(texts(sh.exec("gc nums.txt | select -Last 2")), vec!["4", "5"]);
        assert_eq!(
            texts(sh.exec("gc nums.txt | Select-Object -Skip 1 -First 2")),
            vec!["2", "3"]
        );
    }

    #[test]
    fn select_properties_builds_records() {
        let mut sh = setup();
        let v = sh.exec("ls small.txt | select Name,Length");
        let items = v.unwrap().into_items();
        assert_eq!(items.len(), 1);
        let PipeValue::Record(r) = &items[0] else {
            panic!("expected record");
        };
        assert_eq!(r.headers(), vec!["Name", "Length"]);
        assert_eq!(r.row(), vec!["small.txt", "3"]);
    }

    #[test]
    fn measure_counts_and_sums() {
        let mut sh = setup();
        let v = sh.exec("ls -File | measure");
        assert_eq!(record_field(&v, "Count").as_deref(), Some("4"));
        let v = sh.exec("ls -File -Filter s* | Measure-Object -Property Length -Sum");
        assert_eq!(record_field(&v, "Sum").as_deref(), Some("3"));
        assert_eq!(record_field(&v, "Average"), None);
    }

    #[test]
    fn measure_text_statistics() {
        let mut sh = setup();
        let v = sh.exec("gc words.txt | Measure-Object -Line -Word -Character");
        assert_eq!(record_field(&v, "Lines").as_deref(), Some("3"));
        assert_eq!(record_field(&v, "Words").as_deref(), Some("8"));
        assert_eq!(record_field(&v, "Characters").as_deref(), Some("35"));
    }

    #[test]
    fn select_string_in_file_and_pipeline() {
        let mut sh = setup();
        let v = sh.exec("Select-String -Pattern THE -Path words.txt");
        assert_eq!(texts(v), vec!["words.txt:1:the quick fox", "words.txt:3:the lazy dog"]);
        let v = sh.exec("sls THE words.txt -CaseSensitive");
        assert_eq!(texts(v), Vec::<String>::new());
        let v = sh.exec("cat words.txt | sls o.e");
        assert_eq!(texts(v), vec!["jumps over"]);
        let v = sh.exec("cat words.txt | sls o.e -SimpleMatch");
        assert_eq!(texts(v), Vec::<String>::new());
    }

    #[test]
    fn select_string_invalid_pattern() {
        let mut sh = setup();
        sh.exec("cat words.txt | sls '('");
        assert!(sh.sink.lines_with(Style::Error)[0].starts_with("Select-String : Invalid"));
    }

    #[test]
    fn format_list_writes_name_value_lines() {
        let mut sh = setup();
        let v = sh.exec("ls small.txt | Format-List -Property Name,Length");
        assert_eq!(v, None);
        assert_eq!(sh.sink.lines(), vec!["Name   : small.txt", "Length : 3"]);
    }
}
