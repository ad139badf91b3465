//! Values threaded between pipeline stages.

use chrono::{DateTime, Utc};

use psh_vfs::{DirEntry, FsNode};

use crate::output::{OutputSink, Style};

/// Result of one pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub enum PipeValue {
    Text(String),
    Record(Record),
    List(Vec<PipeValue>),
}

/// A structured row flowing through a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    File(FileEntry),
    Process(ProcessEntry),
    Generic(GenericRecord),
}

/// Something that can be shown as one table row and queried by property.
pub trait Renderable {
    /// Column headers for table output.
    fn headers(&self) -> Vec<String>;

    /// Cells matching [`Renderable::headers`].
    fn row(&self) -> Vec<String>;

    /// Every property as `(name, value)`, in display order.
    fn properties(&self) -> Vec<(String, String)>;

    /// Look up a property by name, case-insensitively.
    fn property(&self, name: &str) -> Option<String> {
        self.properties()
            .into_iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

// ---------------------------------------------------------------------------
// FileEntry
// ---------------------------------------------------------------------------

/// One `Get-ChildItem` row.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub name: String,
    pub full_name: String,
    pub is_dir: bool,
    pub length: usize,
    pub last_write: DateTime<Utc>,
}

impl FileEntry {
    pub fn from_dir_entry(entry: &DirEntry) -> Self {
        Self::from_node(&entry.name, &entry.path, &entry.node)
    }

    pub fn from_node(name: &str, path: &str, node: &FsNode) -> Self {
        Self {
            name: name.to_string(),
            full_name: path.to_string(),
            is_dir: node.is_dir(),
            length: node.size(),
            last_write: node.modified(),
        }
    }

    fn mode(&self) -> &'static str {
        if self.is_dir { "d-----" } else { "-a----" }
    }

    fn extension(&self) -> String {
        match self.name.rfind('.') {
            Some(i) if !self.is_dir && i > 0 => self.name[i..].to_string(),
            _ => String::new(),
        }
    }

    fn last_write_text(&self) -> String {
        self.last_write.format("%m/%d/%Y %I:%M %p").to_string()
    }
}

impl Renderable for FileEntry {
    fn headers(&self) -> Vec<String> {
        ["Mode", "LastWriteTime", "Length", "Name"]
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    fn row(&self) -> Vec<String> {
        let length = if self.is_dir {
            String::new()
        } else {
            self.length.to_string()
        };
        vec![
            self.mode().to_string(),
            self.last_write_text(),
            length,
            self.name.clone(),
        ]
    }

    fn properties(&self) -> Vec<(String, String)> {
        vec![
            ("Name".into(), self.name.clone()),
            ("FullName".into(), self.full_name.clone()),
            ("Mode".into(), self.mode().into()),
            ("Length".into(), self.length.to_string()),
            ("LastWriteTime".into(), self.last_write_text()),
            ("Extension".into(), self.extension()),
            (
                "PSIsContainer".into(),
                if self.is_dir { "True" } else { "False" }.into(),
            ),
        ]
    }
}

// ---------------------------------------------------------------------------
// ProcessEntry
// ---------------------------------------------------------------------------

/// One `Get-Process` row.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessEntry {
    pub id: u32,
    pub name: String,
    pub cpu_seconds: f64,
    pub working_set_mb: f64,
}

impl Renderable for ProcessEntry {
    fn headers(&self) -> Vec<String> {
        ["Id", "ProcessName", "CPU(s)", "WS(MB)"]
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            format!("{:.2}", self.cpu_seconds),
            format!("{:.1}", self.working_set_mb),
        ]
    }

    fn properties(&self) -> Vec<(String, String)> {
        vec![
            ("Id".into(), self.id.to_string()),
            ("ProcessName".into(), self.name.clone()),
            ("Name".into(), self.name.clone()),
            ("CPU".into(), format!("{:.2}", self.cpu_seconds)),
            ("WS".into(), format!("{:.1}", self.working_set_mb)),
        ]
    }
}

// ---------------------------------------------------------------------------
// GenericRecord
// ---------------------------------------------------------------------------

/// Ordered name/value pairs for everything else (variables, history, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericRecord {
    pub fields: Vec<(String, String)>,
}

impl GenericRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field append.
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }
}

impl Renderable for GenericRecord {
    fn headers(&self) -> Vec<String> {
        self.fields.iter().map(|(k, _)| k.clone()).collect()
    }

    fn row(&self) -> Vec<String> {
        self.fields.iter().map(|(_, v)| v.clone()).collect()
    }

    fn properties(&self) -> Vec<(String, String)> {
        self.fields.clone()
    }
}

// ---------------------------------------------------------------------------
// Record / PipeValue
// ---------------------------------------------------------------------------

impl Record {
    fn inner(&self) -> &dyn Renderable {
        match self {
            Record::File(f) => f,
            Record::Process(p) => p,
            Record::Generic(g) => g,
        }
    }

    /// Text used when a record is treated as a string (`$_`, `Out-File`).
    pub fn display_text(&self) -> String {
        match self {
            Record::File(f) => f.name.clone(),
            Record::Process(p) => p.name.clone(),
            Record::Generic(g) => g.row().join(" "),
        }
    }
}

impl Renderable for Record {
    fn headers(&self) -> Vec<String> {
        self.inner().headers()
    }

    fn row(&self) -> Vec<String> {
        self.inner().row()
    }

    fn properties(&self) -> Vec<(String, String)> {
        self.inner().properties()
    }
}

impl PipeValue {
    pub fn text(s: impl Into<String>) -> Self {
        PipeValue::Text(s.into())
    }

    /// A list with one text item per line of `s`.
    pub fn lines(s: &str) -> Self {
        PipeValue::List(s.lines().map(PipeValue::text).collect())
    }

    /// Flatten to a string. List items are joined with newlines.
    pub fn to_text(&self) -> String {
        match self {
            PipeValue::Text(s) => s.clone(),
            PipeValue::Record(r) => r.display_text(),
            PipeValue::List(items) => items
                .iter()
                .map(PipeValue::to_text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// The items a per-item cmdlet iterates over. Non-lists are one item.
    pub fn into_items(self) -> Vec<PipeValue> {
        match self {
            PipeValue::List(items) => items,
            other => vec![other],
        }
    }

    /// Property lookup: records by name, text only supports `Length`.
    pub fn property(&self, name: &str) -> Option<String> {
        match self {
            PipeValue::Record(r) => r.property(name),
            PipeValue::Text(s) if name.eq_ignore_ascii_case("length") => {
                Some(s.chars().count().to_string())
            },
            _ => None,
        }
    }
}

/// Render a value: text as lines, records as tables. Consecutive records
/// with the same columns are grouped into one table.
pub fn render_value(sink: &mut dyn OutputSink, value: &PipeValue) {
    match value {
        PipeValue::Text(s) => {
            for line in s.split('\n') {
                sink.write_line(line, Style::Normal);
            }
        },
        PipeValue::Record(r) => sink.write_table(&r.headers(), &[r.row()]),
        PipeValue::List(items) => {
            let mut pending: Vec<&Record> = Vec::new();
            for item in items {
                match item {
                    PipeValue::Record(r) => {
                        if pending.first().is_some_and(|p| p.headers() != r.headers()) {
                            flush_records(sink, &mut pending);
                        }
                        pending.push(r);
                    },
                    other => {
                        flush_records(sink, &mut pending);
                        render_value(sink, other);
                    },
                }
            }
            flush_records(sink, &mut pending);
        },
    }
}

fn flush_records(sink: &mut dyn OutputSink, pending: &mut Vec<&Record>) {
    let Some(first) = pending.first() else {
        return;
    };
    let headers = first.headers();
    let rows: Vec<Vec<String>> = pending.iter().map(|r| r.row()).collect();
    sink.write_table(&headers, &rows);
    pending.clear();
}
