use std::collections::BTreeMap;

use super::index::find_row;
use super::model::{OccupationRow, RiskTier};
use super::store::CountryTables;
use super::years::{YearAxis, CURRENT_YEAR, MIDTERM_YEAR, OUTLOOK_YEAR};

/// Point values of one occupation in one country.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupationStats {
    /// Full probability sequence, missing values read as 0.
    pub probabilities: Vec<f64>,
    /// Year label for each entry of `probabilities`.
    pub years: Vec<i32>,
    pub current_2024: f64,
    pub outlook_2030: f64,
    pub midterm_2050: f64,
    /// Last probability in the row (2107 on a complete sheet).
    pub final_value: f64,
    pub final_year: Option<i32>,
}

impl OccupationStats {
    /// Tier of the current (2024) probability.
    pub fn risk(&self) -> RiskTier {
        RiskTier::classify(self.current_2024)
    }
}

/// Probability of `row` in `year`, 0 when the year is off the axis or past
/// the end of the row.
pub fn value_in_year(row: &OccupationRow, axis: &YearAxis, year: i32) -> f64 {
    axis.offset_of(year).map_or(0.0, |off| row.prob(off))
}

/// Extract the point statistics of `row`. Never fails.
pub fn extract(row: &OccupationRow, axis: &YearAxis) -> OccupationStats {
    let probabilities = row.coerced_probs();
    let years = (0..probabilities.len()).map(|i| axis.year_at(i)).collect();
    let final_value = probabilities.last().copied().unwrap_or(0.0);
    let final_year = probabilities.len().checked_sub(1).map(|i| axis.year_at(i));

    OccupationStats {
        current_2024: value_in_year(row, axis, CURRENT_YEAR),
        outlook_2030: value_in_year(row, axis, OUTLOOK_YEAR),
        midterm_2050: value_in_year(row, axis, MIDTERM_YEAR),
        final_value,
        final_year,
        probabilities,
        years,
    }
}

/// Stats of the occupation titled `title` in every table that has it.
pub fn occupation_across(title: &str, tables: &CountryTables) -> BTreeMap<String, OccupationStats> {
    tables
        .iter()
        .filter_map(|(code, table)| {
            find_row(table, title).map(|row| (code.clone(), extract(row, &table.years)))
        })
        .collect()
}
