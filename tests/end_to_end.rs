// tests/end_to_end.rs
//
// Load country files from disk, look up an occupation in each, and export.

use std::path::Path;

use automation_dashboard::config::{default_countries, Country};
use automation_dashboard::data::aggregate::overview;
use automation_dashboard::data::index::{find_row, search};
use automation_dashboard::data::loader::load_bytes;
use automation_dashboard::data::model::{OccupationRow, OccupationTable, RiskTier};
use automation_dashboard::data::stats::{extract, occupation_across};
use automation_dashboard::data::store::{load, DatasetStore, Upload};
use automation_dashboard::export::{export, ExportFormat};

fn developer_probs() -> Vec<f64> {
    // 0.1, 0.12, 0.14, ... one value per year, 2017..=2107
    (0..91).map(|i| 0.1 + 0.02 * i as f64).map(|p| p.min(1.0)).collect()
}

fn country_table(extra: &str) -> OccupationTable {
    OccupationTable::from_rows(vec![
        OccupationRow::new("11-1011", "Chief Executives", vec![0.01; 91]),
        OccupationRow::new("15-1252", "Software Developer", developer_probs()),
        OccupationRow::new("99-0000", extra, vec![0.9; 91]),
    ])
}

fn write_excel(dir: &Path, country: &Country, table: &OccupationTable) {
    let payload = export(table, "ignored", ExportFormat::Excel).unwrap();
    std::fs::write(dir.join(&country.file), payload.bytes).unwrap();
}

#[test]
fn software_developer_across_two_countries() {
    let dir = tempfile::tempdir().unwrap();
    let countries = default_countries();
    write_excel(dir.path(), &countries[0], &country_table("Only in USA"));
    write_excel(dir.path(), &countries[5], &country_table("Only in Mali"));

    let report = load(&countries, dir.path());
    assert_eq!(report.tables.len(), 2);
    assert_eq!(report.missing.len(), 4);

    let usa = &report.tables["USA"];
    let mali = &report.tables["Mali"];
    let a = extract(find_row(usa, "Software Developer").unwrap(), &usa.years);
    let b = extract(find_row(mali, "Software Developer").unwrap(), &mali.years);
    assert_eq!(a, b);
    assert!((a.current_2024 - 0.24).abs() < 1e-9);
    assert_eq!(a.final_year, Some(2107));
    assert_eq!(a.risk(), RiskTier::Medium);

    let across = occupation_across("Software Developer", &report.tables);
    assert_eq!(across.len(), 2);
    assert_eq!(occupation_across("Only in Mali", &report.tables).len(), 1);

    assert_eq!(RiskTier::classify(0.1), RiskTier::Low);
    assert_eq!(RiskTier::classify(0.55), RiskTier::High);
}

#[test]
fn overview_of_loaded_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let countries = default_countries();
    write_excel(dir.path(), &countries[1], &country_table("Extra"));

    let report = load(&countries, dir.path());
    let o = overview(&report.tables["Germany"]);
    assert_eq!(o.total_occupations, 3);
    // 2024: 0.01, 0.24, 0.9
    assert!((o.avg_2024 - (0.01 + 0.24 + 0.9) / 3.0).abs() < 1e-9);
    // 2050: 0.01, 0.76, 0.9
    assert_eq!(o.high_risk_2050, 2);
}

#[test]
fn csv_export_reloads_with_same_rows() {
    let dir = tempfile::tempdir().unwrap();
    let table = country_table("Extra");
    let payload = export(&table, "Germany_automation", ExportFormat::Csv).unwrap();
    let path = dir.path().join(&payload.filename);
    std::fs::write(&path, &payload.bytes).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let reloaded = load_bytes(&payload.filename, &bytes).unwrap();
    assert_eq!(reloaded.len(), table.len());
    assert_eq!(reloaded.rows, table.rows);
    assert_eq!(search(&reloaded, "15-1252").len(), 1);
}

#[test]
fn uploads_load_alongside_disk_files() {
    let dir = tempfile::tempdir().unwrap();
    let countries = default_countries();
    write_excel(dir.path(), &countries[0], &country_table("Extra"));

    let mut store = DatasetStore::new();
    let mut report = store.load(&countries, dir.path());

    let bytes = export(&country_table("Extra"), "x", ExportFormat::Excel).unwrap().bytes;
    report.merge(store.load_uploads(
        &countries,
        &[
            Upload { filename: "China_corrected.xlsx".into(), bytes: bytes.clone() },
            Upload { filename: "Atlantis_corrected.xlsx".into(), bytes },
        ],
    ));

    assert_eq!(report.tables.keys().collect::<Vec<_>>(), vec!["China", "USA"]);
    assert!(!report.missing.contains(&"China_corrected.xlsx".to_string()));
    // USA from disk plus the China upload; the unmatched upload is never parsed.
    assert_eq!(store.cached_sources(), 2);
}
