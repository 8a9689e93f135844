pub mod rows;
pub mod workbook;

pub use rows::{HEADERS, SHEET_NAME, SheetRow};
pub use workbook::{ImportReport, SpreadsheetError, export_events, import_file, read_rows};
