use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{OccupationRow, OccupationTable};
use super::years::ID_COLUMNS;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an occupation table from in-memory bytes, using `name` only to pick
/// the format.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet
/// * `.csv`     – comma separated, header row first
/// * `.parquet` – one column per sheet column
///
/// In every format the first row (or the Parquet schema) names the columns;
/// column 0 is the SOC code, column 1 the title, the rest yearly
/// probabilities.
pub fn load_bytes(name: &str, bytes: &[u8]) -> Result<OccupationTable> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_spreadsheet(bytes),
        "csv" => load_csv(bytes),
        "parquet" | "pq" => load_parquet(bytes),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Cell coercion shared by all formats
// ---------------------------------------------------------------------------

/// A source cell reduced to what the table cares about.
#[derive(Debug, Clone, PartialEq)]
enum RawCell {
    Text(String),
    Number(f64),
    Empty,
}

impl RawCell {
    fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            RawCell::Number(_) => false,
        }
    }

    /// Identifier / header form. Whole numbers drop their fraction so that
    /// a numeric `2017.0` header reads as `2017`.
    fn into_text(self) -> String {
        match self {
            RawCell::Text(s) => s.trim().to_string(),
            RawCell::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
            RawCell::Number(v) => v.to_string(),
            RawCell::Empty => String::new(),
        }
    }

    /// Probability form: numbers pass through, numeric text parses,
    /// anything else is absent.
    fn into_prob(self) -> Option<f64> {
        match self {
            RawCell::Number(v) if v.is_finite() => Some(v),
            RawCell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }
}

/// One body row, with exactly `width` probability cells unless the row
/// carries values past the header.
fn build_row(cells: Vec<RawCell>, width: usize) -> OccupationRow {
    let mut cells = cells.into_iter();
    let soc_code = cells.next().map(RawCell::into_text).unwrap_or_default();
    let title = cells.next().map(RawCell::into_text).unwrap_or_default();
    let mut probs: Vec<Option<f64>> = cells.map(RawCell::into_prob).collect();
    // Blanks beyond the header are sheet padding; short rows read as absent.
    while probs.len() > width && matches!(probs.last(), Some(None)) {
        probs.pop();
    }
    if probs.len() < width {
        probs.resize(width, None);
    }
    OccupationRow {
        soc_code,
        title,
        probs,
    }
}

fn build_table(header: Vec<RawCell>, body: Vec<Vec<RawCell>>) -> OccupationTable {
    let mut headers: Vec<String> = header.into_iter().map(RawCell::into_text).collect();
    while headers.len() > ID_COLUMNS && headers.last().is_some_and(|h| h.is_empty()) {
        headers.pop();
    }
    let width = headers.len().saturating_sub(ID_COLUMNS);
    let rows = body
        .into_iter()
        .filter(|cells| !cells.iter().all(RawCell::is_empty))
        .map(|cells| build_row(cells, width))
        .collect();
    OccupationTable::new(headers, rows)
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn load_spreadsheet(bytes: &[u8]) -> Result<OccupationTable> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .map(|r| r.iter().map(spreadsheet_cell).collect())
        .unwrap_or_default();
    let body = rows
        .map(|r| r.iter().map(spreadsheet_cell).collect())
        .collect();

    Ok(build_table(header, body))
}

fn spreadsheet_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Float(v) => RawCell::Number(*v),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Bool(b) => RawCell::Text(b.to_string()),
        Data::Empty => RawCell::Empty,
        // Dates, durations and #N/A-style errors are never probabilities.
        other => RawCell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(bytes: &[u8]) -> Result<OccupationTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let header = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(csv_cell)
        .collect();

    let mut body = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        body.push(record.iter().map(csv_cell).collect());
    }

    Ok(build_table(header, body))
}

fn csv_cell(s: &str) -> RawCell {
    if s.is_empty() {
        RawCell::Empty
    } else {
        RawCell::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding one country sheet.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`): string identifier columns followed by
/// numeric year columns named after their year.
fn load_parquet(data: &[u8]) -> Result<OccupationTable> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes::Bytes::copy_from_slice(data))
        .context("reading parquet metadata")?;
    let header = builder
        .schema()
        .fields()
        .iter()
        .map(|f| RawCell::Text(f.name().clone()))
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut body = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| parquet_cell(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row}"))?;
            body.push(cells);
        }
    }

    Ok(build_table(header, body))
}

/// Extract a single cell from an Arrow column at a given row.
fn parquet_cell(col: &Arc<dyn Array>, row: usize) -> Result<RawCell> {
    if col.is_null(row) {
        return Ok(RawCell::Empty);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            RawCell::Text(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => RawCell::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            RawCell::Number(arr.value(row) as f64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            RawCell::Number(arr.value(row) as f64)
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            RawCell::Number(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            RawCell::Number(arr.value(row))
        }
        _ => RawCell::Empty,
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::stats::extract;

    #[test]
    fn csv_with_year_headers() {
        let text = "SOC Code,Occupation,2017,2018,2019\n\
                    15-1252,Software Developer,0.1,0.12,0.14\n\
                    11-1011,Chief Executives,0.01,n/a,\n";
        let table = load_bytes("USA_corrected.csv", text.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.column_count(), 5);
        assert_eq!(table.years.years(), &[2017, 2018, 2019]);
        assert_eq!(table.rows[0].title, "Software Developer");
        assert_eq!(table.rows[0].probs, vec![Some(0.1), Some(0.12), Some(0.14)]);
        // "n/a" and the trailing empty cell are both absent, not dropped.
        assert_eq!(table.rows[1].probs, vec![Some(0.01), None, None]);
    }

    #[test]
    fn rows_span_the_header_width() {
        let text = "SOC Code,Occupation,2017,2018,2019\n\
                    15-1252,Software Developer,0.1,0.4,\n\
                    43-9021,Data Entry Keyers,0.6\n\
                    41-2011,Cashiers,0.2,0.3,0.5,,\n";
        let table = load_bytes("x.csv", text.as_bytes()).unwrap();

        assert_eq!(table.column_count(), 5);
        assert_eq!(table.rows[0].probs, vec![Some(0.1), Some(0.4), None]);
        assert_eq!(table.rows[1].probs, vec![Some(0.6), None, None]);
        // Blank cells past the header are padding.
        assert_eq!(table.rows[2].probs, vec![Some(0.2), Some(0.3), Some(0.5)]);
    }

    #[test]
    fn blank_final_cell_reads_as_zero() {
        let text = "SOC Code,Occupation,2017,2018,2019\n\
                    15-1252,Software Developer,0.1,0.4,\n\
                    43-9021,Data Entry Keyers,0.2,0.6,n/a\n";
        let table = load_bytes("x.csv", text.as_bytes()).unwrap();

        for row in &table.rows {
            let s = extract(row, &table.years);
            assert_eq!(s.final_value, 0.0, "{}", row.title);
            assert_eq!(s.final_year, Some(2019), "{}", row.title);
            assert_eq!(s.probabilities.len(), 3);
        }
    }

    #[test]
    fn blank_rows_are_skipped() {
        let text = "code,title,2017\n,,\na,A,0.5\n";
        let table = load_bytes("x.csv", text.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].soc_code, "a");
    }

    #[test]
    fn numeric_identifiers_lose_fraction() {
        assert_eq!(RawCell::Number(2017.0).into_text(), "2017");
        assert_eq!(RawCell::Number(0.25).into_text(), "0.25");
        assert_eq!(RawCell::Text(" 0.3 ".into()).into_prob(), Some(0.3));
        assert_eq!(RawCell::Text("NaN".into()).into_prob(), None);
    }

    #[test]
    fn unsupported_extension_fails() {
        let err = load_bytes("data.txt", b"").unwrap_err();
        assert!(err.to_string().contains(".txt"));
    }

    #[test]
    fn corrupt_workbook_fails() {
        assert!(load_bytes("USA_corrected.xlsx", b"not a zip archive").is_err());
    }
}
