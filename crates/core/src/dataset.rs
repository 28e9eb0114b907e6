// crates/core/src/dataset.rs
//! Loading and writing the review table.
//!
//! The table is kept as raw text cells so that every source column survives
//! into the enriched output untouched. Typed access goes through
//! [`ReviewTable::records`] and the numeric column helpers.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, Reader, ReaderBuilder, Writer};

use crate::error::DatasetError;
use crate::types::ReviewRecord;

pub const NAME_COLUMN: &str = "name";
pub const REVIEWS_COLUMN: &str = "reviews";
pub const DESCRIPTION_COLUMN: &str = "description";
pub const RATING_COLUMN: &str = "rating";
pub const REVENUE_COLUMN: &str = "revenue";
pub const SALARIES_COLUMN: &str = "salaries";
pub const LOCATIONS_COLUMN: &str = "locations";

/// Cell values that mean "no value", matching the usual dataframe NA markers.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a raw cell represents a missing value.
pub fn is_missing(cell: &str) -> bool {
    NA_VALUES.contains(&cell)
}

/// Parse a raw cell as a number. Missing cells and non-numeric text give `None`.
pub fn parse_number(cell: &str) -> Option<f64> {
    if is_missing(cell) {
        return None;
    }
    cell.trim().parse::<f64>().ok()
}

/// Open a CSV reader over `path` that tolerates ragged rows.
pub fn open_reader(path: &Path) -> Result<Reader<File>, DatasetError> {
    let file = File::open(path).map_err(|e| DatasetError::io(path, e))?;
    Ok(ReaderBuilder::new().flexible(true).from_reader(file))
}

/// Decode a byte record into exactly `width` text cells.
///
/// Invalid UTF-8 is replaced rather than rejected. Short rows are padded with
/// empty cells; cells past `width` are dropped.
pub fn decode_record(record: &ByteRecord, width: usize) -> Vec<String> {
    let mut cells: Vec<String> = record
        .iter()
        .take(width)
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect();
    cells.resize(width, String::new());
    cells
}

/// An in-memory review table: headers plus rows of raw text cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ReviewTable {
    /// Build a table from headers and rows. Rows are padded or cut to the
    /// header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Load a table from a CSV file.
    ///
    /// Any malformed record aborts the load: the primary pipeline must not
    /// produce output from a partially read table.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let mut reader = open_reader(path)?;

        let headers: Vec<String> = reader
            .byte_headers()
            .map_err(|e| DatasetError::csv(path, e))?
            .iter()
            .map(|h| String::from_utf8_lossy(h).trim().to_string())
            .collect();
        let width = headers.len();

        let mut rows = Vec::new();
        let mut record = ByteRecord::new();
        loop {
            match reader.read_byte_record(&mut record) {
                Ok(true) => rows.push(decode_record(&record, width)),
                Ok(false) => break,
                Err(e) => return Err(DatasetError::csv(path, e)),
            }
        }

        tracing::debug!(path = %path.display(), rows = rows.len(), columns = width, "Loaded review table");
        Ok(Self { headers, rows })
    }

    /// Load the first of `candidates` that exists.
    pub fn load_first_existing(candidates: &[PathBuf]) -> Result<(Self, PathBuf), DatasetError> {
        for path in candidates {
            if path.exists() {
                return Ok((Self::load(path)?, path.clone()));
            }
        }
        let shown = candidates.first().cloned().unwrap_or_default();
        Err(DatasetError::not_found(shown))
    }

    /// Write the table as CSV, headers first.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let path = path.as_ref();
        let mut writer = Writer::from_path(path).map_err(|e| DatasetError::csv(path, e))?;
        writer
            .write_record(&self.headers)
            .map_err(|e| DatasetError::csv(path, e))?;
        for row in &self.rows {
            writer.write_record(row).map_err(|e| DatasetError::csv(path, e))?;
        }
        writer.flush().map_err(|e| DatasetError::io(path, e))?;
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Raw cell text, or `None` when the column is absent or the cell is missing.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        let value = self.rows.get(row)?.get(idx)?;
        (!is_missing(value)).then_some(value.as_str())
    }

    /// Numeric view of a column. `None` if the column does not exist.
    ///
    /// Cells that are missing or do not parse become `None`.
    pub fn numeric_column(&self, column: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(|row| parse_number(&row[idx])).collect())
    }

    /// Whether a column exists and every non-missing cell is already a number.
    pub fn is_numeric_column(&self, column: &str) -> bool {
        let Some(idx) = self.column_index(column) else {
            return false;
        };
        self.rows
            .iter()
            .map(|row| row[idx].as_str())
            .filter(|cell| !is_missing(cell))
            .all(|cell| cell.trim().parse::<f64>().is_ok())
    }

    /// Typed records in table order.
    pub fn records(&self) -> Vec<ReviewRecord> {
        (0..self.rows.len())
            .map(|i| ReviewRecord {
                index: i,
                company: self.cell(i, NAME_COLUMN).map(str::to_string),
                review: self.cell(i, REVIEWS_COLUMN).map(str::to_string),
                description: self.cell(i, DESCRIPTION_COLUMN).map(str::to_string),
                rating: self.cell(i, RATING_COLUMN).and_then(parse_number),
                revenue: self.cell(i, REVENUE_COLUMN).map(str::to_string),
                location: self.cell(i, LOCATIONS_COLUMN).map(str::to_string),
            })
            .collect()
    }

    /// Return a copy with `columns` appended. Each column must have one cell per row.
    pub fn with_columns(&self, columns: Vec<(String, Vec<String>)>) -> Self {
        let mut headers = self.headers.clone();
        let mut rows = self.rows.clone();
        for (name, cells) in columns {
            debug_assert_eq!(cells.len(), rows.len(), "derived column {name} has wrong length");
            headers.push(name);
            for (row, cell) in rows.iter_mut().zip(cells) {
                row.push(cell);
            }
        }
        Self { headers, rows }
    }

    /// Indices of rows whose `name` cell equals `company` exactly.
    pub fn rows_for_company(&self, company: &str) -> Vec<usize> {
        (0..self.rows.len())
            .filter(|&i| self.cell(i, NAME_COLUMN) == Some(company))
            .collect()
    }

    /// Distinct non-missing company names, sorted.
    pub fn company_names(&self) -> Vec<String> {
        let mut names: Vec<String> = (0..self.rows.len())
            .filter_map(|i| self.cell(i, NAME_COLUMN))
            .map(str::to_string)
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_missing_markers() {
        assert!(is_missing(""));
        assert!(is_missing("nan"));
        assert!(is_missing("NaN"));
        assert!(is_missing("N/A"));
        assert!(!is_missing("Acme"));
        assert!(!is_missing(" "));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("4.5"), Some(4.5));
        assert_eq!(parse_number(" 3 "), Some(3.0));
        assert_eq!(parse_number("nan"), None);
        assert_eq!(parse_number("$1M"), None);
    }

    #[test]
    fn test_load_pads_ragged_rows_and_keeps_multiline_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "reviews.csv",
            b"name,reviews,rating\nAcme,\"Good\nteam\",4.1\nBeta\n",
        );

        let table = ReviewTable::load(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "reviews"), Some("Good\nteam"));
        assert_eq!(table.cell(1, "name"), Some("Beta"));
        assert_eq!(table.cell(1, "rating"), None);
    }

    #[test]
    fn test_load_replaces_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "bad.csv", b"name,reviews\nAcme,caf\xff ok\n");

        let table = ReviewTable::load(&path).unwrap();
        let review = table.cell(0, "reviews").unwrap();
        assert!(review.starts_with("caf"));
        assert!(review.ends_with(" ok"));
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let err = ReviewTable::load("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, DatasetError::NotFound { .. }));
    }

    #[test]
    fn test_records_map_known_columns() {
        let table = ReviewTable::new(
            vec!["name".into(), "description".into(), "rating".into(), "revenue".into()],
            vec![
                vec!["Acme".into(), "Nice".into(), "4.0".into(), "$5M".into()],
                vec!["nan".into(), "".into(), "x".into()],
            ],
        );
        let records = table.records();
        assert_eq!(records[0].company.as_deref(), Some("Acme"));
        assert_eq!(records[0].rating, Some(4.0));
        assert_eq!(records[0].revenue.as_deref(), Some("$5M"));
        assert_eq!(records[0].location, None);
        assert_eq!(records[1].index, 1);
        assert_eq!(records[1].company, None);
        assert_eq!(records[1].description, None);
        assert_eq!(records[1].rating, None);
    }

    #[test]
    fn test_is_numeric_column() {
        let table = ReviewTable::new(
            vec!["salaries".into(), "revenue".into()],
            vec![
                vec!["1000".into(), "$1M".into()],
                vec!["".into(), "2".into()],
                vec!["2500.5".into(), "".into()],
            ],
        );
        assert!(table.is_numeric_column("salaries"));
        assert!(!table.is_numeric_column("revenue"));
        assert!(!table.is_numeric_column("locations"));
    }

    #[test]
    fn test_with_columns_and_write_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let table = ReviewTable::new(
            vec!["name".into()],
            vec![vec!["Acme".into()], vec!["Beta, Inc".into()]],
        );
        let enriched = table.with_columns(vec![(
            "score".to_string(),
            vec!["0.5".to_string(), "-0.1".to_string()],
        )]);

        let out = dir.path().join("out.csv");
        enriched.write(&out).unwrap();
        let reloaded = ReviewTable::load(&out).unwrap();

        assert_eq!(reloaded.headers(), &["name".to_string(), "score".to_string()]);
        assert_eq!(reloaded.cell(1, "name"), Some("Beta, Inc"));
        assert_eq!(reloaded.cell(1, "score"), Some("-0.1"));
    }

    #[test]
    fn test_company_names_sorted_distinct() {
        let table = ReviewTable::new(
            vec!["name".into()],
            vec![
                vec!["Zeta".into()],
                vec!["Acme".into()],
                vec!["".into()],
                vec!["Zeta".into()],
            ],
        );
        assert_eq!(table.company_names(), vec!["Acme".to_string(), "Zeta".to_string()]);
        assert_eq!(table.rows_for_company("Zeta"), vec![0, 3]);
        assert!(table.rows_for_company("zeta").is_empty());
    }

    #[test]
    fn test_load_first_existing_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let raw = write_csv(&dir, "raw.csv", b"name\nAcme\n");
        let processed = dir.path().join("processed.csv");

        let (table, used) = ReviewTable::load_first_existing(&[processed.clone(), raw.clone()]).unwrap();
        assert_eq!(used, raw);
        assert_eq!(table.len(), 1);

        let err = ReviewTable::load_first_existing(&[processed]).unwrap_err();
        assert!(matches!(err, DatasetError::NotFound { .. }));
    }
}
