//! Year axis of an occupation table.
//!
//! Probability columns are yearly values starting in [`BASE_YEAR`]. Two
//! offset bases are in use and must not be mixed up:
//!
//! * **probability offsets** index the bare probability sequence of a row
//!   (`CURRENT_OFFSET = 7` is 2024);
//! * **column offsets** index the full row including the two identifier
//!   columns (`CURRENT_COLUMN = 9` is 2024).

/// Calendar year of the first probability column.
pub const BASE_YEAR: i32 = 2017;

/// Number of probability columns in a complete table (2017..=2107).
pub const YEAR_COUNT: usize = 91;

/// Leading identifier columns (SOC code, title) before the probabilities.
pub const ID_COLUMNS: usize = 2;

pub const CURRENT_YEAR: i32 = 2024;
pub const OUTLOOK_YEAR: i32 = 2030;
pub const MIDTERM_YEAR: i32 = 2050;

/// Probability offset of [`CURRENT_YEAR`].
pub const CURRENT_OFFSET: usize = (CURRENT_YEAR - BASE_YEAR) as usize;
/// Probability offset of [`OUTLOOK_YEAR`].
pub const OUTLOOK_OFFSET: usize = (OUTLOOK_YEAR - BASE_YEAR) as usize;
/// Probability offset of [`MIDTERM_YEAR`].
pub const MIDTERM_OFFSET: usize = (MIDTERM_YEAR - BASE_YEAR) as usize;

/// Column offset of [`CURRENT_YEAR`] in a full row.
pub const CURRENT_COLUMN: usize = ID_COLUMNS + CURRENT_OFFSET;
/// Column offset of [`MIDTERM_YEAR`] in a full row.
pub const MIDTERM_COLUMN: usize = ID_COLUMNS + MIDTERM_OFFSET;

const _: () = assert!(CURRENT_OFFSET == 7 && OUTLOOK_OFFSET == 13 && MIDTERM_OFFSET == 33);
const _: () = assert!(CURRENT_COLUMN == 9 && MIDTERM_COLUMN == 35);

/// The named positional offsets, checked against header years at load time.
const NAMED_OFFSETS: [(i32, usize); 3] = [
    (CURRENT_YEAR, CURRENT_OFFSET),
    (OUTLOOK_YEAR, OUTLOOK_OFFSET),
    (MIDTERM_YEAR, MIDTERM_OFFSET),
];

// ---------------------------------------------------------------------------
// YearAxis
// ---------------------------------------------------------------------------

/// Where the year labels of a table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSource {
    /// Every probability header parsed as a year.
    Header,
    /// Headers were missing or not years; `BASE_YEAR + position` is assumed.
    Positional,
}

/// Maps probability positions to calendar years.
#[derive(Debug, Clone, PartialEq)]
pub struct YearAxis {
    years: Vec<i32>,
    source: AxisSource,
}

/// A named offset whose header year disagrees with the positional assumption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetMismatch {
    pub year: i32,
    pub expected_offset: usize,
    /// Position of `year` in the header, if it appears at all.
    pub header_offset: Option<usize>,
}

impl YearAxis {
    /// Positional axis of `len` years starting at [`BASE_YEAR`].
    pub fn positional(len: usize) -> Self {
        YearAxis {
            years: (0..len).map(|i| BASE_YEAR + i as i32).collect(),
            source: AxisSource::Positional,
        }
    }

    /// Build the axis from the probability column headers (identifier
    /// columns already stripped). Falls back to a positional axis unless
    /// every header is a year.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let parsed: Option<Vec<i32>> = headers.iter().map(|h| parse_year(h.as_ref())).collect();
        match parsed {
            Some(years) if !years.is_empty() => YearAxis {
                years,
                source: AxisSource::Header,
            },
            _ => YearAxis::positional(headers.len()),
        }
    }

    pub fn source(&self) -> AxisSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Probability offset of `year`.
    ///
    /// A positional axis extrapolates past its header length so that rows
    /// longer than the header still resolve; the caller bounds-checks
    /// against the actual row.
    pub fn offset_of(&self, year: i32) -> Option<usize> {
        match self.source {
            AxisSource::Header => self.years.iter().position(|&y| y == year),
            AxisSource::Positional => usize::try_from(year - BASE_YEAR).ok(),
        }
    }

    /// Full-row column offset of `year`.
    pub fn column_of(&self, year: i32) -> Option<usize> {
        self.offset_of(year).map(|off| off + ID_COLUMNS)
    }

    /// Year label of probability position `offset`.
    pub fn year_at(&self, offset: usize) -> i32 {
        match self.years.get(offset) {
            Some(&y) => y,
            None => match self.years.last() {
                Some(&last) if self.source == AxisSource::Header => {
                    last + (offset + 1 - self.years.len()) as i32
                }
                _ => BASE_YEAR + offset as i32,
            },
        }
    }

    /// Compare the named positional offsets against the header years.
    /// Always empty for a positional axis.
    pub fn check_offsets(&self) -> Vec<OffsetMismatch> {
        if self.source == AxisSource::Positional {
            return Vec::new();
        }
        NAMED_OFFSETS
            .iter()
            .filter_map(|&(year, expected)| {
                let header_offset = self.offset_of(year);
                if header_offset == Some(expected) {
                    None
                } else {
                    Some(OffsetMismatch {
                        year,
                        expected_offset: expected,
                        header_offset,
                    })
                }
            })
            .collect()
    }
}

/// Accepts `"2024"`, `" 2024 "` and `"2024.0"` (numeric headers read back
/// from spreadsheets).
fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    let year = match s.parse::<i32>() {
        Ok(y) => y,
        Err(_) => {
            let f = s.parse::<f64>().ok()?;
            if f.fract() != 0.0 {
                return None;
            }
            f as i32
        }
    };
    (1900..=2500).contains(&year).then_some(year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_axis_matches_named_offsets() {
        let axis = YearAxis::positional(YEAR_COUNT);
        assert_eq!(axis.offset_of(CURRENT_YEAR), Some(7));
        assert_eq!(axis.offset_of(OUTLOOK_YEAR), Some(13));
        assert_eq!(axis.offset_of(MIDTERM_YEAR), Some(33));
        assert_eq!(axis.column_of(MIDTERM_YEAR), Some(35));
        assert_eq!(axis.year_at(90), 2107);
        assert!(axis.check_offsets().is_empty());
    }

    #[test]
    fn header_axis_detects_shifted_years() {
        // Table starting in 2018 instead of 2017.
        let headers: Vec<String> = (2018..2060).map(|y| y.to_string()).collect();
        let axis = YearAxis::from_headers(&headers);
        assert_eq!(axis.source(), AxisSource::Header);
        assert_eq!(axis.offset_of(2024), Some(6));

        let mismatches = axis.check_offsets();
        assert_eq!(mismatches.len(), 3);
        assert_eq!(mismatches[0].year, 2024);
        assert_eq!(mismatches[0].header_offset, Some(6));
    }

    #[test]
    fn non_year_headers_fall_back_to_positional() {
        let axis = YearAxis::from_headers(&["p0", "p1", "p2"]);
        assert_eq!(axis.source(), AxisSource::Positional);
        assert_eq!(axis.years(), &[2017, 2018, 2019]);
    }

    #[test]
    fn float_headers_parse_as_years() {
        assert_eq!(parse_year("2024.0"), Some(2024));
        assert_eq!(parse_year("2024.5"), None);
        assert_eq!(parse_year("Unnamed: 3"), None);
    }
}
