use std::cmp::Ordering;

use serde::Serialize;

use super::model::OccupationTable;
use super::store::CountryTables;
use super::years::{CURRENT_YEAR, ID_COLUMNS, MIDTERM_YEAR};

/// Probability above which an occupation counts as high risk in 2050.
pub const HIGH_RISK_THRESHOLD: f64 = 0.5;

/// Summary metrics for one country.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CountryOverview {
    pub total_occupations: usize,
    /// Mean 2024 probability over all rows.
    pub avg_2024: f64,
    /// Rows whose 2050 probability exceeds [`HIGH_RISK_THRESHOLD`].
    pub high_risk_2050: usize,
    pub high_risk_pct: f64,
}

/// Full-row column holding `year`, if the table is wide enough to have it.
fn year_column(table: &OccupationTable, year: i32) -> Option<usize> {
    table
        .years
        .column_of(year)
        .filter(|&col| table.column_count() > col)
}

/// Compute the overview of one table. Empty or narrow tables give zeros.
pub fn overview(table: &OccupationTable) -> CountryOverview {
    let total = table.len();

    let avg_2024 = match year_column(table, CURRENT_YEAR) {
        Some(col) if total > 0 => {
            let off = col - ID_COLUMNS;
            table.rows.iter().map(|r| r.prob(off)).sum::<f64>() / total as f64
        }
        _ => 0.0,
    };

    let high_risk_2050 = match year_column(table, MIDTERM_YEAR) {
        Some(col) => {
            let off = col - ID_COLUMNS;
            table
                .rows
                .iter()
                .filter(|r| r.prob(off) > HIGH_RISK_THRESHOLD)
                .count()
        }
        None => 0,
    };

    let high_risk_pct = if total > 0 {
        high_risk_2050 as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    CountryOverview {
        total_occupations: total,
        avg_2024,
        high_risk_2050,
        high_risk_pct,
    }
}

/// Overview of every loaded country, in code order.
pub fn overview_all(tables: &CountryTables) -> Vec<(String, CountryOverview)> {
    tables
        .iter()
        .map(|(code, table)| (code.clone(), overview(table)))
        .collect()
}

/// Ranking criterion for [`rank_countries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankBy {
    #[default]
    Avg2024,
    HighRiskShare,
}

impl RankBy {
    pub fn label(self) -> &'static str {
        match self {
            RankBy::Avg2024 => "Average 2024 probability",
            RankBy::HighRiskShare => "High-risk share by 2050",
        }
    }

    fn key(self, o: &CountryOverview) -> f64 {
        match self {
            RankBy::Avg2024 => o.avg_2024,
            RankBy::HighRiskShare => o.high_risk_pct,
        }
    }
}

/// Sort overviews highest first by `by`; ties fall back to country code.
pub fn rank_countries(mut overviews: Vec<(String, CountryOverview)>, by: RankBy) -> Vec<(String, CountryOverview)> {
    overviews.sort_by(|(ca, a), (cb, b)| {
        by.key(b)
            .partial_cmp(&by.key(a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| ca.cmp(cb))
    });
    overviews
}
