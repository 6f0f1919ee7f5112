use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Directory holding the country workbooks.
pub const DATA_DIR_ENV: &str = "AUTOMATION_DATA_DIR";
/// Optional JSON file replacing the built-in country list.
pub const COUNTRIES_ENV: &str = "AUTOMATION_COUNTRIES";

// ---------------------------------------------------------------------------
// Country – static reference data
// ---------------------------------------------------------------------------

/// One configured country and where its data lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Registry key, e.g. `"USA"`.
    pub code: String,
    pub name: String,
    pub flag: String,
    /// Source filename, matched exactly against uploads.
    pub file: String,
    #[serde(default)]
    pub description: String,
    /// Display colour as `#rrggbb`.
    pub color: String,
}

impl Country {
    fn new(code: &str, name: &str, flag: &str, file: &str, description: &str, color: &str) -> Self {
        Country {
            code: code.to_string(),
            name: name.to_string(),
            flag: flag.to_string(),
            file: file.to_string(),
            description: description.to_string(),
            color: color.to_string(),
        }
    }

    /// `"🇺🇸 United States"`
    pub fn label(&self) -> String {
        format!("{} {}", self.flag, self.name)
    }
}

/// The six countries the dashboard ships with, in display order.
pub fn default_countries() -> Vec<Country> {
    vec![
        Country::new("USA", "United States", "🇺🇸", "USA_corrected.xlsx",
            "Advanced economy with high tech adoption", "#1f77b4"),
        Country::new("Germany", "Germany", "🇩🇪", "Germany_corrected.xlsx",
            "Industrial leader with strong manufacturing", "#ff7f0e"),
        Country::new("China", "China", "🇨🇳", "China_corrected.xlsx",
            "Rapidly developing with massive AI investments", "#2ca02c"),
        Country::new("Algeria", "Algeria", "🇩🇿", "Algeria_corrected.xlsx",
            "North African economy with emerging tech sector", "#d62728"),
        Country::new("MENA", "MENA Region", "🏺", "Mena_corrected.xlsx",
            "Middle East & North Africa regional perspective", "#9467bd"),
        Country::new("Mali", "Mali", "🇲🇱", "Mali_corrected.xlsx",
            "West African developing economy", "#8c564b"),
    ]
}

/// Look a country up by code.
pub fn find_country<'a>(countries: &'a [Country], code: &str) -> Option<&'a Country> {
    countries.iter().find(|c| c.code == code)
}

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub countries: Vec<Country>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            countries: default_countries(),
        }
    }
}

impl DashboardConfig {
    /// Build the configuration from the environment.
    ///
    /// A broken registry file is logged and the built-in countries are used.
    pub fn from_env() -> Self {
        let mut config = DashboardConfig::default();

        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(path) = std::env::var_os(COUNTRIES_ENV) {
            match load_countries(Path::new(&path)) {
                Ok(countries) => {
                    log::info!("Loaded {} countries from {:?}", countries.len(), path);
                    config.countries = countries;
                }
                Err(e) => {
                    let e = anyhow::Error::from(e);
                    log::error!("Using built-in countries: {e:#}");
                }
            }
        }

        config
    }
}

/// Read a JSON array of [`Country`] objects.
pub fn load_countries(path: &Path) -> Result<Vec<Country>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let countries: Vec<Country> =
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    if countries.is_empty() {
        return Err(ConfigError::Empty(path.to_path_buf()));
    }
    Ok(countries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_unique_codes_and_files() {
        let countries = default_countries();
        assert_eq!(countries.len(), 6);
        for (i, a) in countries.iter().enumerate() {
            for b in &countries[i + 1..] {
                assert_ne!(a.code, b.code);
                assert_ne!(a.file, b.file);
            }
        }
        assert_eq!(find_country(&countries, "MENA").unwrap().file, "Mena_corrected.xlsx");
    }

    #[test]
    fn registry_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("countries.json");
        std::fs::write(
            &path,
            r##"[{"code":"FR","name":"France","flag":"🇫🇷","file":"France.xlsx","color":"#0055a4"}]"##,
        )
        .unwrap();

        let countries = load_countries(&path).unwrap();
        assert_eq!(countries[0].code, "FR");
        assert_eq!(countries[0].description, "");
    }

    #[test]
    fn empty_registry_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("countries.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(load_countries(&path), Err(ConfigError::Empty(_))));
    }
}
