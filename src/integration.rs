//! Spreadsheet upload: the first sheet of a CSV or workbook file becomes a
//! table of display strings, and each successful import is logged in an
//! [`IntegrationHistory`].
//!
//! The parsed table stands on its own; it is not reconciled with generated
//! series.

use crate::error::{DashboardError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{DateTime, Local};
use log::{info, warn};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpreadsheetFormat {
    Csv,
    Xls,
    Xlsx,
    Xlsb,
    Ods,
}

impl SpreadsheetFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xls" => Some(Self::Xls),
            "xlsx" => Some(Self::Xlsx),
            "xlsb" => Some(Self::Xlsb),
            "ods" => Some(Self::Ods),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| DashboardError::UnsupportedSpreadsheet(path.display().to_string()))
    }

    pub fn is_workbook(&self) -> bool {
        !matches!(self, Self::Csv)
    }
}

/// Rows of the first sheet, header row included.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedSheet {
    pub sheet_name: Option<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParsedSheet {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = SpreadsheetFormat::from_path(path)?;

        let sheet = if format.is_workbook() {
            Self::from_workbook(path)?
        } else {
            Self::from_csv_reader(File::open(path)?)?
        };

        info!(
            "Parsed {:?} file '{}': {} rows, {} columns",
            format,
            path.display(),
            sheet.rows.len(),
            sheet.column_count()
        );

        Ok(sheet)
    }

    /// Rows may have different lengths; blank lines are skipped.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in rdr.records() {
            let row: Vec<String> = record?.iter().map(|field| field.to_string()).collect();
            if !is_blank(&row) {
                rows.push(row);
            }
        }

        Ok(Self {
            sheet_name: None,
            rows,
        })
    }

    /// Reads the first sheet of an xls/xlsx/xlsb/ods workbook.
    pub fn from_workbook(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path).map_err(|e| {
            DashboardError::SpreadsheetError(format!("Failed to open '{}': {}", path.display(), e))
        })?;

        let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
            return Err(DashboardError::SpreadsheetError(format!(
                "'{}' contains no sheets",
                path.display()
            )));
        };

        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            DashboardError::SpreadsheetError(format!(
                "Failed to read sheet '{}': {}",
                sheet_name, e
            ))
        })?;

        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
            .filter(|row| !is_blank(row))
            .collect();

        Ok(Self {
            sheet_name: Some(sheet_name),
            rows,
        })
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(|row| row.as_slice())
    }

    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|row| row.len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Display text of a workbook cell. Whole floats print without decimals.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrationEntry {
    pub file_name: String,
    pub integrated_at: DateTime<Local>,
    pub rows: usize,
}

impl fmt::Display for IntegrationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - Integrado em {}",
            self.file_name,
            self.integrated_at.format("%d/%m/%Y %H:%M:%S")
        )
    }
}

/// Successful imports of the current session, oldest first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrationHistory {
    entries: Vec<IntegrationEntry>,
}

impl IntegrationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `path` and records it. A failed parse leaves the history as is.
    pub fn integrate(&mut self, path: impl AsRef<Path>) -> Result<ParsedSheet> {
        let path = path.as_ref();
        let sheet = match ParsedSheet::from_path(path) {
            Ok(sheet) => sheet,
            Err(e) => {
                warn!("Integration of '{}' failed: {}", path.display(), e);
                return Err(e);
            }
        };

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.record(&file_name, sheet.rows.len(), Local::now());

        Ok(sheet)
    }

    pub fn record(&mut self, file_name: &str, rows: usize, integrated_at: DateTime<Local>) {
        self.entries.push(IntegrationEntry {
            file_name: file_name.to_string(),
            integrated_at,
            rows,
        });
    }

    pub fn entries(&self) -> &[IntegrationEntry] {
        &self.entries
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
