//! Generic tabular renderer
//!
//! A [`Column`] names one field of a row record and optionally carries a
//! custom render function. [`render_grid`] projects rows through the columns
//! into a [`Grid`] of styled cells without touching any terminal state, so the
//! same grid feeds both the TUI table widget and plain-text CLI output.

use ratatui::text::Span;
use unicode_width::UnicodeWidthStr;

/// Raw value of one record field
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Text(String),
    Integer(i64),
    Number(f64),
}

impl CellValue {
    /// Default presentation; `Null` renders as the empty string
    pub fn stringify(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Integer(n) => n.to_string(),
            CellValue::Number(n) => format_number(*n),
        }
    }
}

/// Print whole numbers without a trailing `.0`
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Integer(n.into())
    }
}

impl From<usize> for CellValue {
    fn from(n: usize) -> Self {
        i64::try_from(n)
            .map(CellValue::Integer)
            .unwrap_or_else(|_| CellValue::Text(n.to_string()))
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// A record that can be projected into table cells
///
/// `Field` is usually a field-less enum, so a column can only ever name an
/// attribute the record actually has.
pub trait TableRecord {
    type Field: Copy;

    fn value(&self, field: Self::Field) -> CellValue;
}

pub type CellRenderer<R> = Box<dyn Fn(&CellValue, &R) -> Span<'static> + Send + Sync>;

/// Column descriptor: header label, projected field and optional custom renderer
pub struct Column<R: TableRecord> {
    pub label: String,
    pub field: R::Field,
    render: Option<CellRenderer<R>>,
}

impl<R: TableRecord> Column<R> {
    pub fn new(label: &str, field: R::Field) -> Self {
        Self {
            label: label.to_string(),
            field,
            render: None,
        }
    }

    /// Replace default stringification for this column's cells
    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&CellValue, &R) -> Span<'static> + Send + Sync + 'static,
    {
        self.render = Some(Box::new(render));
        self
    }

    pub fn cell(&self, row: &R) -> Span<'static> {
        let value = row.value(self.field);
        match &self.render {
            Some(render) => render(&value, row),
            None => Span::raw(value.stringify()),
        }
    }
}

impl<R: TableRecord> std::fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("label", &self.label)
            .field("custom_render", &self.render.is_some())
            .finish()
    }
}

/// Projected table: header labels plus one cell per column for every row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    pub header: Vec<String>,
    pub body: Vec<Vec<Span<'static>>>,
}

/// Project `rows` through `columns`, preserving both orders
pub fn render_grid<R: TableRecord>(columns: &[Column<R>], rows: &[R]) -> Grid {
    let header = columns.iter().map(|c| c.label.clone()).collect();
    let body = rows
        .iter()
        .map(|row| columns.iter().map(|column| column.cell(row)).collect())
        .collect();

    Grid { header, body }
}

impl Grid {
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn row_count(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Display width of each column, header included
    pub fn column_widths(&self) -> Vec<usize> {
        self.header
            .iter()
            .enumerate()
            .map(|(i, label)| {
                self.body
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.content.width())
                    .chain(std::iter::once(label.width()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Lay the grid out as aligned text for terminals without the TUI
    pub fn to_plain_text(&self) -> String {
        let widths = self.column_widths();
        let mut lines = Vec::with_capacity(self.body.len() + 2);

        lines.push(join_padded(self.header.iter().map(String::as_str), &widths));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        for row in &self.body {
            lines.push(join_padded(row.iter().map(|c| c.content.as_ref()), &widths));
        }

        lines.join("\n")
    }
}

fn join_padded<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| {
            let fill = width.saturating_sub(cell.width());
            format!("{}{}", cell, " ".repeat(fill))
        })
        .collect();
    padded.join(" | ").trim_end().to_string()
}
