//! Terminal output: ANSI-coloured lines and aligned tables.

use std::io::Write;

use psh_terminal::output::format_table;
use psh_terminal::{OutputSink, Style};

const RESET: &str = "\x1b[0m";

fn ansi(style: Style) -> Option<&'static str> {
    match style {
        Style::Normal => None,
        Style::Error => Some("\x1b[31m"),
        Style::Warning => Some("\x1b[33m"),
        Style::Info => Some("\x1b[36m"),
        Style::Success => Some("\x1b[32m"),
        Style::Host => Some("\x1b[37m"),
    }
}

/// Sink writing to a byte stream, optionally with colour escapes.
pub struct ConsoleSink<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            log::warn!("Console write failed: {e}");
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> OutputSink for ConsoleSink<W> {
    fn write_line(&mut self, text: &str, style: Style) {
        let line = match ansi(style).filter(|_| self.color) {
            Some(code) => format!("{code}{text}{RESET}\n"),
            None => format!("{text}\n"),
        };
        self.emit(&line);
    }

    fn write_table(&mut self, headers: &[String], rows: &[Vec<String>]) {
        let mut block = String::from("\n");
        for line in format_table(headers, rows) {
            block.push_str(&line);
            block.push('\n');
        }
        block.push('\n');
        self.emit(&block);
    }

    fn clear(&mut self) {
        if self.color {
            self.emit("\x1b[2J\x1b[H");
        }
    }
}
