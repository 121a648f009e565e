use crate::domain::model::{FieldValue, Record};
use crate::domain::ports::RecordSource;
use crate::utils::error::{LabelError, Result};
use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use std::collections::HashSet;
use std::path::PathBuf;

pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceFormat {
    Csv,
    Workbook,
}

/// 從試算表 (xlsx/xls/ods) 或 CSV 讀取記錄，第一列為標題
#[derive(Debug, Clone)]
pub struct SpreadsheetSource {
    path: PathBuf,
    sheet: Option<String>,
}

impl SpreadsheetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet: None,
        }
    }

    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    fn format(&self) -> Result<SourceFormat> {
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if extension == "csv" {
            Ok(SourceFormat::Csv)
        } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
            Ok(SourceFormat::Workbook)
        } else {
            Err(LabelError::source_read(
                self.display_path(),
                format!(
                    "unsupported file extension '{}', expected one of: {}",
                    extension,
                    SUPPORTED_EXTENSIONS.join(", ")
                ),
            ))
        }
    }

    fn load_csv(&self) -> Result<Vec<Record>> {
        let path = self.display_path();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| LabelError::source_read(&path, e))?;

        let headers = dedupe_headers(
            reader
                .headers()
                .map_err(|e| LabelError::source_read(&path, e))?
                .iter()
                .map(|h| h.to_string()),
        );

        let mut records = Vec::new();
        for (row_index, result) in reader.records().enumerate() {
            let row = result.map_err(|e| LabelError::source_read(&path, e))?;
            let cells: Vec<FieldValue> = row
                .iter()
                .map(|value| {
                    if value.is_empty() {
                        FieldValue::Empty
                    } else {
                        FieldValue::Text(value.to_string())
                    }
                })
                .collect();
            if let Some(record) = build_record(row_index, &headers, cells) {
                records.push(record);
            }
        }

        Ok(records)
    }

    fn load_workbook(&self) -> Result<Vec<Record>> {
        let path = self.display_path();
        let mut workbook =
            open_workbook_auto(&self.path).map_err(|e| LabelError::source_read(&path, e))?;

        let range: Range<Data> = match &self.sheet {
            Some(name) => {
                if !workbook.sheet_names().iter().any(|s| s == name) {
                    return Err(LabelError::source_read(
                        &path,
                        format!("worksheet '{}' does not exist", name),
                    ));
                }
                workbook
                    .worksheet_range(name)
                    .map_err(|e| LabelError::source_read(&path, e))?
            }
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| LabelError::source_read(&path, "workbook has no worksheets"))?
                .map_err(|e| LabelError::source_read(&path, e))?,
        };

        let mut rows = range.rows();
        let headers = match rows.next() {
            Some(header_row) => dedupe_headers(header_row.iter().map(|cell| cell.to_string())),
            None => return Ok(Vec::new()),
        };

        let mut records = Vec::new();
        for (row_index, row) in rows.enumerate() {
            let cells = row.iter().map(cell_to_value).collect();
            if let Some(record) = build_record(row_index, &headers, cells) {
                records.push(record);
            }
        }

        Ok(records)
    }
}

impl RecordSource for SpreadsheetSource {
    fn load(&self) -> Result<Vec<Record>> {
        if !self.path.exists() {
            return Err(LabelError::SourceNotFound {
                path: self.display_path(),
            });
        }

        let records = match self.format()? {
            SourceFormat::Csv => self.load_csv()?,
            SourceFormat::Workbook => self.load_workbook()?,
        };

        tracing::debug!(
            "Loaded {} records from {}",
            records.len(),
            self.display_path()
        );
        Ok(records)
    }
}

fn cell_to_value(cell: &Data) -> FieldValue {
    match cell {
        Data::Empty => FieldValue::Empty,
        Data::String(s) => FieldValue::Text(s.clone()),
        Data::Int(i) => FieldValue::Integer(*i),
        Data::Float(f) => FieldValue::Float(*f),
        Data::Bool(b) => FieldValue::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) => FieldValue::DateTime(dt),
            None => FieldValue::Text(cell.to_string()),
        },
        other => FieldValue::Text(other.to_string()),
    }
}

// 重複的標題依序改名為 `Lote.1`、`Lote.2`…，第一個保留原名
fn dedupe_headers(headers: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut result = Vec::new();

    for header in headers {
        let mut name = header.clone();
        let mut suffix = 1;
        while !header.trim().is_empty() && seen.contains(&name) {
            name = format!("{}.{}", header, suffix);
            suffix += 1;
        }
        seen.insert(name.clone());
        result.push(name);
    }

    result
}

// `row` 是原始資料列索引（空白列也計入）；空白標題的欄位略過；整列皆空則回傳 None；短列以 Empty 補齊
fn build_record(row: usize, headers: &[String], cells: Vec<FieldValue>) -> Option<Record> {
    if cells.iter().all(|cell| matches!(cell, FieldValue::Empty)) {
        return None;
    }

    let mut cells = cells.into_iter();
    let mut record = Record::new(row);
    for header in headers {
        let value = cells.next().unwrap_or(FieldValue::Empty);
        if header.trim().is_empty() {
            continue;
        }
        record.data.insert(header.clone(), value);
    }
    Some(record)
}
