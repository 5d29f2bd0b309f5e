//! Rendering results for the terminal.

use clap::ValueEnum;
use serde::Serialize;

use crate::Result;

/// Output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Pretty-printed JSON on stdout
    Json,
    /// Box-drawn table
    #[default]
    Table,
}

/// Two-column table of labelled values.
#[derive(Debug, Default)]
pub struct Table {
    title: String,
    rows: Vec<(String, String)>,
}

impl Table {
    /// Empty table with a heading.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    /// Append a row.
    pub fn row(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.rows.push((label.into(), value.into()));
        self
    }

    /// Render with box-drawing characters.
    pub fn render(&self) -> String {
        let left = self
            .rows
            .iter()
            .map(|(l, _)| l.chars().count())
            .max()
            .unwrap_or(0)
            .max(self.title.chars().count());
        let right = self
            .rows
            .iter()
            .map(|(_, v)| v.chars().count())
            .max()
            .unwrap_or(0);

        let bar = |l: char, m: char, r: char| {
            format!("{l}{}{m}{}{r}\n", "─".repeat(left + 2), "─".repeat(right + 2))
        };
        let mut out = String::new();
        out.push_str(&bar('┌', '┬', '┐'));
        out.push_str(&format!("│ {:<left$} │ {:<right$} │\n", self.title, ""));
        out.push_str(&bar('├', '┼', '┤'));
        for (label, value) in &self.rows {
            out.push_str(&format!("│ {label:<left$} │ {value:>right$} │\n"));
        }
        out.push_str(&bar('└', '┴', '┘'));
        out
    }
}

/// Print `value` as JSON or `table` depending on `format`.
pub fn emit<T: Serialize>(format: Format, value: &T, table: impl FnOnce() -> Table) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(value)?),
        Format::Table => print!("{}", table().render()),
    }
    Ok(())
}

/// Money with two decimals and thousands separators.
pub fn money(value: f64) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.2}", value.abs());
    let (int, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{}{grouped}.{frac}", if negative { "-" } else { "" })
}

/// Fraction as a percentage with two decimals.
pub fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Payback months, or "never".
pub fn months(value: Option<f64>) -> String {
    value.map_or_else(|| "never".to_string(), |m| format!("{m:.1} months"))
}
