use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use automation_dashboard::config::{find_country, Country, DashboardConfig};
use automation_dashboard::data::aggregate::RankBy;
use automation_dashboard::data::index::filter_titles;
use automation_dashboard::data::model::OccupationTable;
use automation_dashboard::data::store::{DatasetStore, LoadReport, Upload};
use automation_dashboard::export::{export, ExportFormat, ExportPayload};

/// How many occupations the multi-occupation view preselects.
const MULTI_DEFAULT_PICKS: usize = 3;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Compare,
    MultiOccupation,
    Browse,
    Rankings,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Compare, Tab::MultiOccupation, Tab::Browse, Tab::Rankings];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Compare => "🔍 Compare countries",
            Tab::MultiOccupation => "📊 Multi-occupation",
            Tab::Browse => "📋 Browse occupations",
            Tab::Rankings => "📈 Country rankings",
        }
    }
}

/// The session context: loaded data plus every user selection. Passed
/// explicitly to the UI functions; the data layer never sees it.
pub struct AppState {
    pub config: DashboardConfig,
    store: DatasetStore,

    /// Loaded tables and missing files.
    pub report: LoadReport,

    /// Countries ticked in the side panel, in registry order.
    pub selected_countries: Vec<String>,
    /// Countries that had data after the previous load.
    known: Vec<String>,
    /// Occupations collected from the browse view.
    pub selected_occupations: Vec<String>,

    pub tab: Tab,

    pub compare_search: String,
    pub compare_occupation: Option<String>,

    pub multi_country: Option<String>,
    pub multi_search: String,
    pub multi_occupations: Vec<String>,

    pub browse_country: Option<String>,
    pub browse_filter: String,
    /// Title shown in the browse detail block.
    pub analyzed: Option<String>,

    pub rank_by: RankBy,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            store: DatasetStore::new(),
            report: LoadReport::default(),
            selected_countries: Vec::new(),
            known: Vec::new(),
            selected_occupations: Vec::new(),
            tab: Tab::default(),
            compare_search: String::new(),
            compare_occupation: None,
            multi_country: None,
            multi_search: String::new(),
            multi_occupations: Vec::new(),
            browse_country: None,
            browse_filter: String::new(),
            analyzed: None,
            rank_by: RankBy::default(),
            status_message: None,
        }
    }

    // -- Loading --

    /// (Re)load every country from the configured data directory.
    pub fn load_from_disk(&mut self) {
        let report = self.store.load(&self.config.countries, &self.config.data_dir);
        self.report = report;
        self.after_load();
    }

    /// Point the dashboard at another folder and reload.
    pub fn set_data_dir(&mut self, dir: PathBuf) {
        log::info!("Data directory set to {}", dir.display());
        self.config.data_dir = dir;
        self.load_from_disk();
    }

    /// Merge user-supplied files into the loaded tables.
    pub fn ingest_uploads(&mut self, uploads: &[Upload]) {
        let report = self.store.load_uploads(&self.config.countries, uploads);
        let added = report.tables.len();
        self.report.merge(report);
        self.after_load();
        if self.has_data() {
            self.status_message = Some(format!(
                "Loaded {added} uploaded file(s); data for {} countries",
                self.report.tables.len()
            ));
        }
    }

    /// Read the picked files and ingest them.
    pub fn ingest_upload_paths(&mut self, paths: &[PathBuf]) {
        let mut uploads = Vec::with_capacity(paths.len());
        let mut failures = Vec::new();
        for path in paths {
            match read_upload(path) {
                Ok(upload) => uploads.push(upload),
                Err(e) => {
                    log::error!("{e:#}");
                    failures.push(format!("{e:#}"));
                }
            }
        }
        self.ingest_uploads(&uploads);
        // Read failures outrank the load summary.
        if !failures.is_empty() {
            self.status_message = Some(format!("Error: {}", failures.join("; ")));
        }
    }

    fn after_load(&mut self) {
        // Keep earlier choices, and tick countries that only just got data.
        let selected: Vec<String> = self
            .config
            .countries
            .iter()
            .filter(|c| self.report.tables.contains_key(&c.code))
            .filter(|c| self.selected_countries.contains(&c.code) || !self.known.contains(&c.code))
            .map(|c| c.code.clone())
            .collect();
        self.selected_countries = selected;
        self.known = self.report.tables.keys().cloned().collect();

        let first = self.loaded_countries().first().map(|c| c.code.clone());
        if self.multi_country.as_ref().map_or(true, |c| !self.report.tables.contains_key(c)) {
            if let Some(code) = first.clone() {
                self.set_multi_country(code);
            }
        }
        if self.browse_country.as_ref().map_or(true, |c| !self.report.tables.contains_key(c)) {
            self.browse_country = first;
        }

        self.status_message = if self.has_data() {
            Some(format!("Loaded data for {} countries", self.report.tables.len()))
        } else {
            Some("Could not load any data files".to_string())
        };
    }

    // -- Queries --

    pub fn has_data(&self) -> bool {
        !self.report.is_empty()
    }

    pub fn country(&self, code: &str) -> Option<&Country> {
        find_country(&self.config.countries, code)
    }

    /// Countries with a loaded table, in registry order.
    pub fn loaded_countries(&self) -> Vec<&Country> {
        self.config
            .countries
            .iter()
            .filter(|c| self.report.tables.contains_key(&c.code))
            .collect()
    }

    pub fn table(&self, code: &str) -> Option<&Arc<OccupationTable>> {
        self.report.tables.get(code)
    }

    // -- Selections --

    pub fn is_country_selected(&self, code: &str) -> bool {
        self.selected_countries.iter().any(|c| c == code)
    }

    /// Tick / untick a country, keeping registry order.
    pub fn toggle_country(&mut self, code: &str) {
        if self.is_country_selected(code) {
            self.selected_countries.retain(|c| c != code);
        } else {
            let mut selected = std::mem::take(&mut self.selected_countries);
            selected.push(code.to_string());
            self.selected_countries = self
                .config
                .countries
                .iter()
                .filter(|c| selected.contains(&c.code))
                .map(|c| c.code.clone())
                .collect();
        }
    }

    /// Add or remove an occupation from the session list.
    pub fn toggle_occupation(&mut self, title: &str) {
        if let Some(pos) = self.selected_occupations.iter().position(|t| t == title) {
            self.selected_occupations.remove(pos);
        } else {
            self.selected_occupations.push(title.to_string());
        }
    }

    /// Switch the multi-occupation view to `code` and preselect the first
    /// few occupations matching the current search.
    pub fn set_multi_country(&mut self, code: String) {
        let picks = self
            .table(&code)
            .map(|t| {
                let titles: Vec<&str> = t.titles().collect();
                filter_titles(&titles, &self.multi_search)
                    .into_iter()
                    .take(MULTI_DEFAULT_PICKS)
                    .collect()
            })
            .unwrap_or_default();
        self.multi_occupations = picks;
        self.multi_country = Some(code);
    }

    pub fn toggle_multi_occupation(&mut self, title: &str) {
        if let Some(pos) = self.multi_occupations.iter().position(|t| t == title) {
            self.multi_occupations.remove(pos);
        } else {
            self.multi_occupations.push(title.to_string());
        }
    }

    // -- Export --

    /// Serialize one country's table as `<name>_automation.<ext>`.
    pub fn export_country(&self, code: &str, format: ExportFormat) -> Result<ExportPayload> {
        let table = self
            .table(code)
            .with_context(|| format!("no data loaded for {code}"))?;
        let name = self.country(code).map_or(code, |c| c.name.as_str());
        let payload = export(table, &format!("{name}_automation"), format)
            .with_context(|| format!("exporting {name} as {format}"))?;
        Ok(payload)
    }
}

fn read_upload(path: &Path) -> Result<Upload> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?
        .to_string();
    Ok(Upload { filename, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "SOC Code,Occupation,2017\n\
                         11-1011,Chief Executives,0.01\n\
                         15-1252,Software Developer,0.1\n\
                         43-9021,Data Entry Keyers,0.9\n\
                         29-1141,Registered Nurses,0.02\n";

    fn csv_config(dir: &Path) -> DashboardConfig {
        let mut config = DashboardConfig::default();
        config.data_dir = dir.to_path_buf();
        for c in &mut config.countries {
            c.file = c.file.replace(".xlsx", ".csv");
        }
        config
    }

    #[test]
    fn no_files_means_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(csv_config(dir.path()));
        state.load_from_disk();

        assert!(!state.has_data());
        assert_eq!(state.report.missing.len(), 6);
        assert!(state.selected_countries.is_empty());
    }

    #[test]
    fn loaded_countries_are_selected_in_registry_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Mali_corrected.csv"), SHEET).unwrap();
        std::fs::write(dir.path().join("USA_corrected.csv"), SHEET).unwrap();

        let mut state = AppState::new(csv_config(dir.path()));
        state.load_from_disk();

        assert_eq!(state.selected_countries, vec!["USA".to_string(), "Mali".to_string()]);
        assert_eq!(state.multi_country.as_deref(), Some("USA"));
        assert_eq!(state.multi_occupations.len(), 3);
        assert_eq!(state.browse_country.as_deref(), Some("USA"));

        state.toggle_country("USA");
        assert_eq!(state.selected_countries, vec!["Mali".to_string()]);
        state.toggle_country("USA");
        assert_eq!(state.selected_countries, vec!["USA".to_string(), "Mali".to_string()]);
    }

    #[test]
    fn uploads_fill_in_missing_countries() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(csv_config(dir.path()));
        state.load_from_disk();

        state.ingest_uploads(&[Upload {
            filename: "China_corrected.csv".into(),
            bytes: SHEET.into(),
        }]);
        assert!(state.has_data());
        assert_eq!(state.selected_countries, vec!["China".to_string()]);
        assert!(!state.report.missing.contains(&"China_corrected.csv".to_string()));
    }

    #[test]
    fn unreadable_upload_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("USA_corrected.csv");
        std::fs::write(&good, SHEET).unwrap();
        let gone = dir.path().join("Mali_corrected.csv");

        let mut state = AppState::new(csv_config(dir.path()));
        state.ingest_upload_paths(&[good, gone]);

        assert!(state.has_data());
        let status = state.status_message.as_deref().unwrap();
        assert!(status.starts_with("Error:"), "{status}");
        assert!(status.contains("Mali_corrected.csv"), "{status}");
    }

    #[test]
    fn occupation_selection_toggles() {
        let mut state = AppState::new(DashboardConfig::default());
        state.toggle_occupation("Software Developer");
        state.toggle_occupation("Registered Nurses");
        state.toggle_occupation("Software Developer");
        assert_eq!(state.selected_occupations, vec!["Registered Nurses".to_string()]);
    }

    #[test]
    fn export_uses_country_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("USA_corrected.csv"), SHEET).unwrap();
        let mut state = AppState::new(csv_config(dir.path()));
        state.load_from_disk();

        let payload = state.export_country("USA", ExportFormat::Csv).unwrap();
        assert_eq!(payload.filename, "United States_automation.csv");
        assert!(state.export_country("Mali", ExportFormat::Csv).is_err());
    }
}
