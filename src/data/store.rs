use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use crate::config::Country;
use crate::error::LoadError;

use super::loader;
use super::model::OccupationTable;

/// Loaded tables keyed by country code.
pub type CountryTables = BTreeMap<String, Arc<OccupationTable>>;

// ---------------------------------------------------------------------------
// LoadReport
// ---------------------------------------------------------------------------

/// Outcome of loading every configured country: what loaded, what did not.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub tables: CountryTables,
    /// Filenames loaded into `tables`.
    pub loaded: Vec<String>,
    /// Filenames that were absent or failed to parse.
    pub missing: Vec<String>,
}

impl LoadReport {
    /// Fold a later report (e.g. uploads) into this one. Later tables win,
    /// and files that loaded later are no longer missing.
    pub fn merge(&mut self, other: LoadReport) {
        self.tables.extend(other.tables);
        for file in other.loaded {
            self.missing.retain(|m| *m != file);
            if !self.loaded.contains(&file) {
                self.loaded.push(file);
            }
        }
        for file in other.missing {
            if !self.missing.contains(&file) && !self.loaded.contains(&file) {
                self.missing.push(file);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// A user-supplied file.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

// ---------------------------------------------------------------------------
// DatasetStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SourceKey {
    name: String,
    len: usize,
    fingerprint: u64,
}

impl SourceKey {
    fn new(name: &str, bytes: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        SourceKey {
            name: name.to_string(),
            len: bytes.len(),
            fingerprint: hasher.finish(),
        }
    }
}

/// Session-lifetime cache of parsed tables keyed by source identity.
///
/// Sources are immutable for the session, so entries are never evicted.
#[derive(Debug, Default)]
pub struct DatasetStore {
    cache: HashMap<SourceKey, Arc<OccupationTable>>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct sources parsed so far.
    pub fn cached_sources(&self) -> usize {
        self.cache.len()
    }

    /// Load every country's file from `data_dir`. Failures are collected in
    /// [`LoadReport::missing`]; they never stop the other countries.
    pub fn load(&mut self, countries: &[Country], data_dir: &Path) -> LoadReport {
        let mut report = LoadReport::default();

        for country in countries {
            match self.load_path(&data_dir.join(&country.file)) {
                Ok(table) => {
                    log::info!(
                        "Loaded {} ({} occupations, {} columns)",
                        country.file,
                        table.len(),
                        table.column_count()
                    );
                    report.tables.insert(country.code.clone(), table);
                    report.loaded.push(country.file.clone());
                }
                Err(LoadError::NotFound(path)) => {
                    log::warn!("Data file not found: {}", path.display());
                    report.missing.push(country.file.clone());
                }
                Err(e) => {
                    log::error!("Error loading {}: {:#}", country.file, anyhow::Error::from(e));
                    report.missing.push(country.file.clone());
                }
            }
        }

        report
    }

    /// Load user-supplied files. Each filename must equal a configured
    /// country's `file` exactly; anything else is ignored.
    pub fn load_uploads(&mut self, countries: &[Country], uploads: &[Upload]) -> LoadReport {
        let mut report = LoadReport::default();

        for upload in uploads {
            let Some(country) = countries.iter().find(|c| c.file == upload.filename) else {
                log::debug!("Ignoring upload {}: no country uses that file", upload.filename);
                continue;
            };

            match self.load_source(&upload.filename, &upload.bytes) {
                Ok(table) => {
                    log::info!("Loaded upload {} ({} occupations)", upload.filename, table.len());
                    report.tables.insert(country.code.clone(), table);
                    report.loaded.push(upload.filename.clone());
                }
                Err(e) => {
                    log::error!("Error loading {}: {:#}", upload.filename, anyhow::Error::from(e));
                    report.missing.push(upload.filename.clone());
                }
            }
        }

        report
    }

    /// Read and parse one file, using the cache when the bytes were seen before.
    pub fn load_path(&mut self, path: &Path) -> Result<Arc<OccupationTable>, LoadError> {
        if !path.is_file() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.load_source(name, &bytes)
    }

    /// Parse `bytes` named `name`, memoized on (name, content).
    pub fn load_source(&mut self, name: &str, bytes: &[u8]) -> Result<Arc<OccupationTable>, LoadError> {
        let key = SourceKey::new(name, bytes);
        if let Some(table) = self.cache.get(&key) {
            log::debug!("Cache hit for {name}");
            return Ok(Arc::clone(table));
        }

        let table = loader::load_bytes(name, bytes).map_err(|source| LoadError::Parse {
            file: name.to_string(),
            source,
        })?;
        for m in table.years.check_offsets() {
            log::warn!(
                "{name}: year {} expected at probability offset {} but header has it at {:?}",
                m.year,
                m.expected_offset,
                m.header_offset
            );
        }

        let table = Arc::new(table);
        self.cache.insert(key, Arc::clone(&table));
        Ok(table)
    }
}

/// One-shot load with a fresh store.
pub fn load(countries: &[Country], data_dir: &Path) -> LoadReport {
    DatasetStore::new().load(countries, data_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_countries;

    const SHEET: &str = "SOC Code,Occupation,2017,2018\n15-1252,Software Developer,0.1,0.12\n";

    fn csv_countries() -> Vec<Country> {
        default_countries()
            .into_iter()
            .take(2)
            .map(|mut c| {
                c.file = c.file.replace(".xlsx", ".csv");
                c
            })
            .collect()
    }

    #[test]
    fn missing_files_do_not_stop_other_countries() {
        let dir = tempfile::tempdir().unwrap();
        let countries = csv_countries();
        std::fs::write(dir.path().join(&countries[0].file), SHEET).unwrap();

        let report = load(&countries, dir.path());
        assert_eq!(report.tables.len(), 1);
        assert!(report.tables.contains_key("USA"));
        assert_eq!(report.missing, vec!["Germany_corrected.csv".to_string()]);
    }

    #[test]
    fn corrupt_file_is_reported_missing() {
        let dir = tempfile::tempdir().unwrap();
        let countries = default_countries();
        std::fs::write(dir.path().join("USA_corrected.xlsx"), b"garbage").unwrap();

        let report = load(&countries, dir.path());
        assert!(report.is_empty());
        assert_eq!(report.missing.len(), 6);
        assert!(report.missing.contains(&"USA_corrected.xlsx".to_string()));
    }

    #[test]
    fn uploads_match_exact_filenames_only() {
        let countries = csv_countries();
        let uploads = vec![
            Upload { filename: "Germany_corrected.csv".into(), bytes: SHEET.into() },
            Upload { filename: "germany_corrected.csv".into(), bytes: SHEET.into() },
            Upload { filename: "notes.csv".into(), bytes: SHEET.into() },
        ];

        let report = DatasetStore::new().load_uploads(&countries, &uploads);
        assert_eq!(report.tables.keys().collect::<Vec<_>>(), vec!["Germany"]);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn merged_uploads_clear_missing_entries() {
        let dir = tempfile::tempdir().unwrap();
        let countries = csv_countries();
        let mut store = DatasetStore::new();

        let mut report = store.load(&countries, dir.path());
        assert_eq!(report.missing.len(), 2);

        let uploads = vec![Upload { filename: "USA_corrected.csv".into(), bytes: SHEET.into() }];
        report.merge(store.load_uploads(&countries, &uploads));
        assert_eq!(report.tables.len(), 1);
        assert_eq!(report.missing, vec!["Germany_corrected.csv".to_string()]);
    }

    #[test]
    fn identical_sources_are_parsed_once() {
        let mut store = DatasetStore::new();
        let a = store.load_source("USA_corrected.csv", SHEET.as_bytes()).unwrap();
        let b = store.load_source("USA_corrected.csv", SHEET.as_bytes()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.cached_sources(), 1);

        let other = format!("{SHEET}11-1011,Chief Executives,0.01,0.02\n");
        let c = store.load_source("USA_corrected.csv", other.as_bytes()).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(store.cached_sources(), 2);
    }
}
