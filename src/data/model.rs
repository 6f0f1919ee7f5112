use std::fmt;

use serde::{Deserialize, Serialize};

use super::years::{AxisSource, YearAxis, ID_COLUMNS};

// ---------------------------------------------------------------------------
// RiskTier – qualitative label for a single probability
// ---------------------------------------------------------------------------

/// Qualitative bucket for an automation probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// `p > 0.5` is High, `0.2 < p <= 0.5` is Medium, anything else Low.
    pub fn classify(p: f64) -> Self {
        if p > 0.5 {
            RiskTier::High
        } else if p > 0.2 {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// OccupationRow – one row of a country sheet
// ---------------------------------------------------------------------------

/// A single occupation (one row of the source sheet).
#[derive(Debug, Clone, PartialEq)]
pub struct OccupationRow {
    /// SOC code (column 0).
    pub soc_code: String,
    /// Occupation title (column 1).
    pub title: String,
    /// Yearly probabilities; `None` where the cell was empty or not a number.
    pub probs: Vec<Option<f64>>,
}

impl OccupationRow {
    pub fn new(soc_code: impl Into<String>, title: impl Into<String>, probs: Vec<f64>) -> Self {
        OccupationRow {
            soc_code: soc_code.into(),
            title: title.into(),
            probs: probs.into_iter().map(Some).collect(),
        }
    }

    /// Probability at `offset`, with missing and out-of-range values read as 0.
    pub fn prob(&self, offset: usize) -> f64 {
        self.probs.get(offset).copied().flatten().unwrap_or(0.0)
    }

    /// Full probability sequence with missing values coerced to 0.
    pub fn coerced_probs(&self) -> Vec<f64> {
        self.probs.iter().map(|p| p.unwrap_or(0.0)).collect()
    }

    /// Number of cells in the full row (identifiers included).
    pub fn width(&self) -> usize {
        ID_COLUMNS + self.probs.len()
    }
}

// ---------------------------------------------------------------------------
// OccupationTable – one country's dataset
// ---------------------------------------------------------------------------

/// A parsed country sheet: headers, year axis and rows.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupationTable {
    /// Column names of the full row (identifiers first).
    pub headers: Vec<String>,
    /// Year label for each probability column.
    pub years: YearAxis,
    pub rows: Vec<OccupationRow>,
}

impl OccupationTable {
    /// Build a table, deriving the year axis from `headers`.
    ///
    /// Missing headers are synthesized (`SOC Code`, `Occupation`, then the
    /// positional years) so that the header always covers the widest row.
    pub fn new(mut headers: Vec<String>, rows: Vec<OccupationRow>) -> Self {
        let widest = rows.iter().map(OccupationRow::width).max().unwrap_or(0);
        let prob_headers: Vec<String> = headers.iter().skip(ID_COLUMNS).cloned().collect();
        let mut years = YearAxis::from_headers(&prob_headers);

        while headers.len() < widest.max(ID_COLUMNS) {
            let name = match headers.len() {
                0 => "SOC Code".to_string(),
                1 => "Occupation".to_string(),
                n => years.year_at(n - ID_COLUMNS).to_string(),
            };
            headers.push(name);
        }

        // Re-derive over the padded header so the axis spans every column.
        let prob_len = headers.len() - ID_COLUMNS;
        if prob_len != years.len() {
            years = match years.source() {
                AxisSource::Header => YearAxis::from_headers(&headers[ID_COLUMNS..]),
                AxisSource::Positional => YearAxis::positional(prob_len),
            };
        }

        OccupationTable { headers, years, rows }
    }

    /// Table with positional year headers (2017..) for `rows`.
    pub fn from_rows(rows: Vec<OccupationRow>) -> Self {
        OccupationTable::new(Vec::new(), rows)
    }

    /// Same headers and axis, different rows.
    pub fn with_rows(&self, rows: Vec<OccupationRow>) -> Self {
        OccupationTable {
            headers: self.headers.clone(),
            years: self.years.clone(),
            rows,
        }
    }

    /// Number of occupations.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns of the full table (identifiers included).
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Occupation titles in row order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.title.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_tier_thresholds() {
        assert_eq!(RiskTier::classify(0.1), RiskTier::Low);
        assert_eq!(RiskTier::classify(0.2), RiskTier::Low);
        assert_eq!(RiskTier::classify(0.2001), RiskTier::Medium);
        assert_eq!(RiskTier::classify(0.5), RiskTier::Medium);
        assert_eq!(RiskTier::classify(0.55), RiskTier::High);
    }

    #[test]
    fn missing_probabilities_read_as_zero() {
        let row = OccupationRow {
            soc_code: "11-1011".into(),
            title: "Chief Executives".into(),
            probs: vec![Some(0.3), None, Some(0.4)],
        };
        assert_eq!(row.prob(1), 0.0);
        assert_eq!(row.prob(2), 0.4);
        assert_eq!(row.prob(50), 0.0);
        assert_eq!(row.coerced_probs(), vec![0.3, 0.0, 0.4]);
    }

    #[test]
    fn synthesized_headers_cover_widest_row() {
        let table = OccupationTable::from_rows(vec![
            OccupationRow::new("a", "A", vec![0.1; 3]),
            OccupationRow::new("b", "B", vec![0.1; 5]),
        ]);
        assert_eq!(table.column_count(), 7);
        assert_eq!(table.headers[0], "SOC Code");
        assert_eq!(table.headers[2], "2017");
        assert_eq!(table.headers[6], "2021");
    }
}
