use std::fmt;
use std::str::FromStr;

use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};

use crate::data::model::OccupationTable;
use crate::error::ExportError;

/// Worksheet name used for Excel exports.
pub const EXCEL_SHEET: &str = "Data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Csv,
    Excel,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => f.write_str("CSV"),
            ExportFormat::Excel => f.write_str("Excel"),
        }
    }
}

/// A serialized table ready to be saved or offered for download.
#[derive(Debug, Clone)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    /// `<base_name>.<ext>`
    pub filename: String,
    pub mime: &'static str,
}

/// Serialize `table` as `format`. No index column is written.
pub fn export(table: &OccupationTable, base_name: &str, format: ExportFormat) -> Result<ExportPayload, ExportError> {
    let bytes = match format {
        ExportFormat::Csv => to_csv(table)?,
        ExportFormat::Excel => to_excel(table)?,
    };
    Ok(ExportPayload {
        bytes,
        filename: format!("{base_name}.{}", format.extension()),
        mime: format.mime(),
    })
}

/// Cells of one row padded to the header width; absent values are empty.
fn row_cells(table: &OccupationTable, i: usize) -> Vec<String> {
    let row = &table.rows[i];
    let mut cells = Vec::with_capacity(table.column_count());
    cells.push(row.soc_code.clone());
    cells.push(row.title.clone());
    cells.extend(row.probs.iter().map(|p| p.map(|v| v.to_string()).unwrap_or_default()));
    cells.resize(table.column_count().max(cells.len()), String::new());
    cells
}

fn to_csv(table: &OccupationTable) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for i in 0..table.len() {
        writer.write_record(row_cells(table, i))?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

fn to_excel(table: &OccupationTable) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(EXCEL_SHEET)?;

    for (col, header) in table.headers.iter().enumerate() {
        sheet.write_string(0, col as u16, header)?;
    }
    for (i, row) in table.rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, &row.soc_code)?;
        sheet.write_string(r, 1, &row.title)?;
        for (j, p) in row.probs.iter().enumerate() {
            if let Some(v) = p {
                sheet.write_number(r, (j + 2) as u16, *v)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
