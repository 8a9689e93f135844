use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::task::JoinSet;

use crate::calendar::{CourtesyEvent, format_date};
use crate::spreadsheet::rows::{DATE, HEADERS, SHEET_NAME, SheetRow, normalize_date_text};
use crate::sync::sync_engine::StoreClient;

#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("Failed to read spreadsheet: {0}")]
    ReadError(#[from] calamine::Error),
    #[error("Failed to write spreadsheet: {0}")]
    WriteError(#[from] rust_xlsxwriter::XlsxError),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Workbook has no sheets")]
    NoSheet,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// Data rows read from the file.
    pub rows: usize,
    /// Rows whose create succeeded.
    pub created: usize,
}

impl ImportReport {
    pub fn failed(&self) -> usize {
        self.rows - self.created
    }

    pub fn message(&self) -> String {
        let mut message = format!("{}건의 데이터가 성공적으로 불러와졌습니다.", self.rows);
        if self.failed() > 0 {
            message.push_str(&format!(" (실패 {}건)", self.failed()));
        }
        message
    }
}

pub fn export_file_name(today: NaiveDate) -> String {
    format!("경조사관리_{}.xlsx", format_date(today))
}

/// Writes every event to `<dir>/경조사관리_<today>.xlsx`.
///
/// Returns `None` without touching the disk when there is nothing to export.
pub fn export_events(
    events: &[CourtesyEvent],
    dir: &Path,
    today: NaiveDate,
) -> Result<Option<PathBuf>, SpreadsheetError> {
    if events.is_empty() {
        tracing::info!("Export skipped: no events");
        return Ok(None);
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(today));

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, label) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *label, &header_format)?;
    }

    for (index, event) in events.iter().enumerate() {
        let row = SheetRow::from_event(event);
        for (col, cell) in row.cells().iter().enumerate() {
            worksheet.write_string(index as u32 + 1, col as u16, *cell)?;
        }
    }

    workbook.save(&path)?;
    tracing::info!("Exported {} events to {}", events.len(), path.display());

    Ok(Some(path))
}

fn cell_text(cell: &Data, is_date_column: bool) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => format_date(datetime.date()),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    };

    if is_date_column {
        Some(normalize_date_text(&text))
    } else {
        Some(text)
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Reads the data rows of the first sheet.
///
/// The first row is the header; columns are matched by exact label. Only
/// fully blank rows are skipped, so a row with text in unknown columns
/// still imports with defaults.
pub fn read_rows(path: &Path) -> Result<Vec<SheetRow>, SpreadsheetError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(SpreadsheetError::NoSheet)?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let labels: Vec<Option<&str>> = header
        .iter()
        .map(|cell| match cell {
            Data::String(s) if HEADERS.contains(&s.as_str()) => Some(s.as_str()),
            _ => None,
        })
        .collect();

    let mut result = Vec::new();
    for cells in rows {
        if cells.iter().all(is_blank) {
            continue;
        }
        let mut row = SheetRow::default();
        for (label, cell) in labels.iter().zip(cells) {
            let Some(label) = label else { continue };
            if let Some(text) = cell_text(cell, *label == DATE) {
                row.set(label, text);
            }
        }
        result.push(row);
    }

    tracing::debug!("Read {} rows from {}", result.len(), path.display());
    Ok(result)
}

/// Creates one event per row, all at once, and waits for every create.
pub async fn import_file(
    client: &StoreClient,
    path: &Path,
    today: NaiveDate,
) -> Result<ImportReport, SpreadsheetError> {
    let rows = read_rows(path)?;
    let total = rows.len();

    let mut creates = JoinSet::new();
    for row in rows {
        let client = client.clone();
        let draft = row.into_draft(today);
        creates.spawn(async move { client.create(draft).await });
    }

    let mut created = 0;
    while let Some(result) = creates.join_next().await {
        match result {
            Ok(true) => created += 1,
            Ok(false) => {}
            Err(e) => tracing::error!("Import task failed: {}", e),
        }
    }

    let report = ImportReport { rows: total, created };
    tracing::info!("Imported {} of {} rows from {}", created, total, path.display());
    Ok(report)
}
