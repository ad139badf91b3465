//! Rendering sink the interpreter writes to.
//!
//! The interpreter never knows how output is drawn. It emits styled lines
//! and tables; the embedding decides what they look like.

/// Visual class of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Normal,
    Error,
    Warning,
    Info,
    Success,
    /// Direct host output (`Write-Host`).
    Host,
}

impl Style {
    /// Map a console colour name (as passed to `-ForegroundColor`) to a style.
    pub fn from_color(name: &str) -> Style {
        match name.to_ascii_lowercase().as_str() {
            "red" | "darkred" | "magenta" => Style::Error,
            "yellow" | "darkyellow" => Style::Warning,
            "cyan" | "blue" | "darkcyan" | "darkblue" => Style::Info,
            "green" | "darkgreen" => Style::Success,
            _ => Style::Host,
        }
    }
}

/// Destination for command output.
pub trait OutputSink {
    /// Emit one line of text.
    fn write_line(&mut self, text: &str, style: Style);

    /// Emit a table. Every row has one cell per header.
    fn write_table(&mut self, headers: &[String], rows: &[Vec<String>]);

    /// Wipe everything shown so far.
    fn clear(&mut self);
}

/// One recorded call on a [`BufferSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEvent {
    Line { text: String, style: Style },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Clear,
}

/// Sink that records everything it is given.
#[derive(Debug, Default, Clone)]
pub struct BufferSink {
    pub events: Vec<OutputEvent>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of every line event, in order, ignoring tables.
    pub fn lines(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                OutputEvent::Line { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Lines written with `style`.
    pub fn lines_with(&self, style: Style) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                OutputEvent::Line { text, style: s } if *s == style => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Everything as plain text, tables laid out with [`format_table`].
    pub fn text(&self) -> String {
        let mut out: Vec<String> = Vec::new();
        for e in &self.events {
            match e {
                OutputEvent::Line { text, .. } => out.push(text.clone()),
                OutputEvent::Table { headers, rows } => out.extend(format_table(headers, rows)),
                OutputEvent::Clear => out.clear(),
            }
        }
        out.join("\n")
    }

    pub fn take(&mut self) -> Vec<OutputEvent> {
        std::mem::take(&mut self.events)
    }
}

impl OutputSink for BufferSink {
    fn write_line(&mut self, text: &str, style: Style) {
        self.events.push(OutputEvent::Line {
            text: text.to_string(),
            style,
        });
    }

    fn write_table(&mut self, headers: &[String], rows: &[Vec<String>]) {
        self.events.push(OutputEvent::Table {
            headers: headers.to_vec(),
            rows: rows.to_vec(),
        });
    }

    fn clear(&mut self) {
        self.events.push(OutputEvent::Clear);
    }
}

fn pad_cells(cells: impl Iterator<Item = String>, widths: &[usize]) -> String {
    let parts: Vec<String> = cells
        .zip(widths)
        .map(|(c, &w)| format!("{c:<w$}"))
        .collect();
    parts.join(" ").trim_end().to_string()
}

/// Lay out a table as aligned text lines: header, dashed underline, rows.
pub fn format_table(headers: &[String], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(pad_cells(headers.iter().cloned(), &widths));
    out.push(pad_cells(
        headers.iter().map(|h| "-".repeat(h.chars().count())),
        &widths,
    ));
    for row in rows {
        out.push(pad_cells(row.iter().cloned(), &widths));
    }
    out
}
