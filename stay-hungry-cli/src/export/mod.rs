//! Spreadsheet export.
//!
//! Datasets are turned into named sheets of records; a record is an ordered
//! list of `(column, value)` pairs. A sheet's header row is the union of its
//! records' columns in order of first appearance.

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod reports;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to build workbook: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}

/// Single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Number(f64::from(value))
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Empty)
    }
}

pub type Record = Vec<(&'static str, Cell)>;

/// Build a record from `column => value` pairs
#[macro_export]
macro_rules! record {
    ($($key:expr => $value:expr),* $(,)?) => {
        vec![$(($key, $crate::export::Cell::from($value))),*]
    };
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
    pub column_widths: Vec<f64>,
}

impl Sheet {
    /// Lay out records under the union of their columns. An empty dataset
    /// becomes a single blank row.
    pub fn from_records(name: &str, records: Vec<Record>) -> Self {
        let mut headers: Vec<&'static str> = Vec::new();
        for record in &records {
            for (key, _) in record {
                if !headers.contains(key) {
                    headers.push(*key);
                }
            }
        }

        let mut rows: Vec<Vec<Cell>> = records
            .into_iter()
            .map(|record| {
                let mut row = vec![Cell::Empty; headers.len()];
                for (key, value) in record {
                    if let Some(col) = headers.iter().position(|h| *h == key) {
                        row[col] = value;
                    }
                }
                row
            })
            .collect();

        if rows.is_empty() {
            rows.push(vec![Cell::Empty; headers.len()]);
        }

        Self {
            name: name.to_string(),
            headers,
            rows,
            column_widths: Vec::new(),
        }
    }

    /// Like `from_records`, but an empty dataset keeps `columns` as a header
    /// over one blank row
    pub fn with_columns(name: &str, columns: &[&'static str], records: Vec<Record>) -> Self {
        if records.is_empty() {
            let blank = columns.iter().map(|c| (*c, Cell::Empty)).collect();
            return Self::from_records(name, vec![blank]);
        }
        Self::from_records(name, records)
    }

    pub fn column_widths(mut self, widths: &[f64]) -> Self {
        self.column_widths = widths.to_vec();
        self
    }

    fn to_worksheet(&self, header_format: &Format) -> Result<Worksheet, XlsxError> {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(&self.name)?;

        for (col, header) in self.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, header_format)?;
        }

        for (i, row) in self.rows.iter().enumerate() {
            let row_num = i as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Empty => {}
                    Cell::Text(text) => {
                        worksheet.write_string(row_num, col as u16, text.as_str())?;
                    }
                    Cell::Number(number) => {
                        worksheet.write_number(row_num, col as u16, *number)?;
                    }
                }
            }
        }

        for (col, width) in self.column_widths.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
        }

        let last_col = self.headers.len().saturating_sub(1) as u16;
        worksheet.autofilter(0, 0, self.rows.len() as u32, last_col)?;

        Ok(worksheet)
    }
}

/// Render sheets into xlsx bytes, one worksheet per sheet
pub fn workbook_bytes(sheets: &[Sheet]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for sheet in sheets {
        workbook.push_worksheet(sheet.to_worksheet(&header_format)?);
    }

    Ok(workbook.save_to_buffer()?)
}

/// Write export bytes to `dir/filename`, creating the directory if needed
pub fn write_file(dir: &Path, filename: &str, contents: &[u8]) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    fs::write(&path, contents)?;

    tracing::info!("Exported {:?} ({} bytes)", path, contents.len());
    Ok(path)
}

/// `YYYY-MM-DD`, as used in export file names
pub(crate) fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_union_in_first_appearance_order() {
        let sheet = Sheet::from_records(
            "Adherencia",
            vec![
                record! { "total" => 10.0, "pct" => 50.0 },
                vec![],
                record! { "Entrenador" => "Ana", "pct" => 75.0 },
            ],
        );

        assert_eq!(sheet.headers, vec!["total", "pct", "Entrenador"]);
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[1], vec![Cell::Empty, Cell::Empty, Cell::Empty]);
        assert_eq!(
            sheet.rows[2],
            vec![Cell::Empty, Cell::Number(75.0), Cell::Text("Ana".to_string())]
        );
    }

    #[test]
    fn test_empty_dataset_is_one_blank_row() {
        let sheet = Sheet::from_records("PRs", Vec::new());
        assert!(sheet.headers.is_empty());
        assert_eq!(sheet.rows.len(), 1);

        let sheet = Sheet::with_columns("Peso", &["Fecha", "Peso_kg"], Vec::new());
        assert_eq!(sheet.headers, vec!["Fecha", "Peso_kg"]);
        assert_eq!(sheet.rows, vec![vec![Cell::Empty, Cell::Empty]]);
    }

    #[test]
    fn test_option_cells() {
        assert_eq!(Cell::from(None::<f64>), Cell::Empty);
        assert_eq!(Cell::from(Some(2.5)), Cell::Number(2.5));
        assert_eq!(Cell::from(Some("x")), Cell::Text("x".to_string()));
    }

    #[test]
    fn test_workbook_bytes_for_empty_sheets() -> Result<(), ExportError> {
        let sheets = vec![
            Sheet::from_records("Uno", Vec::new()),
            Sheet::from_records("Dos", Vec::new()),
        ];
        let bytes = workbook_bytes(&sheets)?;
        assert!(bytes.starts_with(b"PK"));
        Ok(())
    }

    #[test]
    fn test_write_file_creates_directory() -> Result<(), ExportError> {
        let dir = tempfile::tempdir()?;
        let target = dir.path().join("exports");
        let path = write_file(&target, "a.csv", b"date,weight_kg\n")?;
        assert_eq!(fs::read_to_string(path)?, "date,weight_kg\n");
        Ok(())
    }
}
