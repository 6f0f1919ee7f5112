use std::collections::BTreeSet;

use super::model::{OccupationRow, OccupationTable};
use super::store::CountryTables;

// ---------------------------------------------------------------------------
// Exact lookups
// ---------------------------------------------------------------------------

/// First row whose title equals `title` exactly.
pub fn find_row<'a>(table: &'a OccupationTable, title: &str) -> Option<&'a OccupationRow> {
    table.rows.iter().find(|r| r.title == title)
}

/// First row whose SOC code equals `code` exactly.
pub fn find_row_by_code<'a>(table: &'a OccupationTable, code: &str) -> Option<&'a OccupationRow> {
    table.rows.iter().find(|r| r.soc_code == code)
}

// ---------------------------------------------------------------------------
// Substring search
// ---------------------------------------------------------------------------

fn row_matches(row: &OccupationRow, needle: &str) -> bool {
    row.soc_code.to_lowercase().contains(needle) || row.title.to_lowercase().contains(needle)
}

/// Indices of rows whose code or title contains `term`, case-insensitively.
/// An empty term matches every row.
pub fn search_indices(table: &OccupationTable, term: &str) -> Vec<usize> {
    if term.is_empty() {
        return (0..table.len()).collect();
    }
    let needle = term.to_lowercase();
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row_matches(row, &needle))
        .map(|(i, _)| i)
        .collect()
}

/// The rows of `table` whose code or title contains `term`, in table order.
/// An empty term returns the table unchanged.
pub fn search(table: &OccupationTable, term: &str) -> OccupationTable {
    if term.is_empty() {
        return table.clone();
    }
    let needle = term.to_lowercase();
    let rows = table
        .rows
        .iter()
        .filter(|row| row_matches(row, &needle))
        .cloned()
        .collect();
    table.with_rows(rows)
}

/// Case-insensitive substring filter over a list of titles.
pub fn filter_titles<S: AsRef<str>>(titles: &[S], term: &str) -> Vec<String> {
    let needle = term.to_lowercase();
    titles
        .iter()
        .map(|t| t.as_ref())
        .filter(|t| needle.is_empty() || t.to_lowercase().contains(&needle))
        .map(str::to_string)
        .collect()
}

/// Sorted titles present in every listed country's table. Codes without a
/// loaded table are skipped; no usable code gives an empty list.
pub fn common_titles(tables: &CountryTables, codes: &[String]) -> Vec<String> {
    let mut common: Option<BTreeSet<&str>> = None;
    for code in codes {
        let Some(table) = tables.get(code) else {
            continue;
        };
        let titles: BTreeSet<&str> = table.titles().collect();
        common = Some(match common {
            None => titles,
            Some(acc) => acc.intersection(&titles).copied().collect(),
        });
    }
    common
        .unwrap_or_default()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn table() -> OccupationTable {
        OccupationTable::from_rows(vec![
            OccupationRow::new("11-1011", "Chief Executives", vec![0.05; 10]),
            OccupationRow::new("15-1252", "Software Developers", vec![0.1; 10]),
            OccupationRow::new("43-9021", "Data Entry Keyers", vec![0.8; 10]),
        ])
    }

    #[test]
    fn empty_search_is_identity() {
        let t = table();
        assert_eq!(search(&t, ""), t);
        assert_eq!(search_indices(&t, ""), vec![0, 1, 2]);
    }

    #[test]
    fn search_matches_code_or_title() {
        let t = table();

        let by_code = search(&t, "15-12");
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code.rows[0].title, "Software Developers");

        let by_title = search(&t, "DATA entry");
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title.rows[0].soc_code, "43-9021");

        assert!(search(&t, "astronaut").is_empty());
        // Headers survive filtering.
        assert_eq!(search(&t, "astronaut").headers, t.headers);
    }

    #[test]
    fn search_keeps_table_order() {
        let t = table();
        // "e" appears in every title
        assert_eq!(search_indices(&t, "e"), vec![0, 1, 2]);
        assert_eq!(search_indices(&t, "1"), vec![0, 1, 2]);
        assert_eq!(search_indices(&t, "-90"), vec![2]);
    }

    #[test]
    fn find_row_is_exact() {
        let t = table();
        assert_eq!(find_row(&t, "Chief Executives").unwrap().soc_code, "11-1011");
        assert!(find_row(&t, "chief executives").is_none());
        assert!(find_row(&t, "Chief").is_none());
        assert_eq!(find_row_by_code(&t, "43-9021").unwrap().title, "Data Entry Keyers");
    }

    #[test]
    fn common_titles_intersects_selected_countries() {
        let a = table();
        let b = OccupationTable::from_rows(vec![
            OccupationRow::new("15-1252", "Software Developers", vec![0.2; 10]),
            OccupationRow::new("11-1011", "Chief Executives", vec![0.1; 10]),
            OccupationRow::new("29-1141", "Registered Nurses", vec![0.1; 10]),
        ]);
        let mut tables = CountryTables::new();
        tables.insert("USA".into(), Arc::new(a));
        tables.insert("Mali".into(), Arc::new(b));

        let codes = vec!["USA".to_string(), "Mali".to_string(), "Nowhere".to_string()];
        assert_eq!(
            common_titles(&tables, &codes),
            vec!["Chief Executives".to_string(), "Software Developers".to_string()]
        );
        assert!(common_titles(&tables, &[]).is_empty());
    }

    #[test]
    fn title_filter_is_case_insensitive() {
        let titles = ["Chief Executives", "Software Developers"];
        assert_eq!(filter_titles(&titles, "SOFT"), vec!["Software Developers".to_string()]);
        assert_eq!(filter_titles(&titles, "").len(), 2);
    }
}
