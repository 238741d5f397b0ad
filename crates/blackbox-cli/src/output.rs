//! CLI output utilities: tables and JSON mode.
//!
//! Everything is written through an [`Output`] so commands can be driven
//! against in-memory buffers in tests.

#![forbid(unsafe_code)]

use std::io::{self, Write};

use serde::Serialize;

// ── Simple table renderer ────────────────────────────────────────────────

/// A plain-text table that sizes its columns to fit.
pub struct CliTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CliTable {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(String::len).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }

    /// Render to a `String`; an empty table renders as nothing.
    #[must_use]
    pub fn render_to_string(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        let widths = self.column_widths();
        let mut out = format_row(&self.headers, &widths);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format_row(row, &widths));
            out.push('\n');
        }
        out
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let last = widths.len().saturating_sub(1);
    widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let cell = cells.get(i).map_or("", String::as_str);
            if i == last {
                cell.to_string()
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

// ── Output sink ──────────────────────────────────────────────────────────

pub struct Output<'a> {
    out: &'a mut dyn Write,
    json: bool,
}

impl<'a> Output<'a> {
    pub fn new(out: &'a mut dyn Write, json: bool) -> Self {
        Self { out, json }
    }

    #[must_use]
    pub const fn is_json(&self) -> bool {
        self.json
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    /// Print `data` as pretty JSON, or run `render` for human output.
    pub fn json_or<T, F>(&mut self, data: &T, render: F) -> io::Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        if self.json {
            let text = serde_json::to_string_pretty(data).map_err(io::Error::other)?;
            self.line(&text)
        } else {
            render(self)
        }
    }

    pub fn table(&mut self, table: &CliTable, empty_message: &str) -> io::Result<()> {
        let text = table.render_to_string();
        if text.is_empty() {
            self.line(empty_message)
        } else {
            write!(self.out, "{text}")
        }
    }

    /// Print a key/value pair with aligned values.
    pub fn kv(&mut self, key: &str, value: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.out, "  {key:<16} {value}")
    }
}
