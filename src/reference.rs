//! pH reference tables.
//!
//! A table is an ordered list of `(label, red, green, blue)` rows loaded
//! from a headerless CSV file, one table per read kind.  Row order is
//! preserved because the classifier breaks ties in favour of the earliest
//! row.  Validation happens entirely at load time so the classifier never
//! sees a row it cannot take an angle against.

use std::io::Read;
use std::path::Path;

use log::debug;

use crate::error::TableError;

/// One reference row: a pH label and its RGB-frequency signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceEntry {
    pub label: String,
    pub rgb: [f64; 3],
}

/// An ordered, validated reference table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceTable {
    /// Load and validate a table from a CSV file.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file)?;
        debug!("loaded {} reference rows from {}", table.len(), path.display());
        Ok(table)
    }

    /// Load and validate a table from any reader producing headerless CSV.
    pub fn from_reader(reader: impl Read) -> Result<Self, TableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();
        for (idx, record) in csv_reader.records().enumerate() {
            let row = idx + 1;
            let record = record?;
            if record.len() < 4 {
                return Err(TableError::MissingField { row });
            }

            let mut rgb = [0.0f64; 3];
            for (slot, field) in rgb.iter_mut().zip(record.iter().skip(1)) {
                let value: f64 = field
                    .parse()
                    .map_err(|_| TableError::BadComponent { row })?;
                if !value.is_finite() || value < 0.0 {
                    return Err(TableError::OutOfRange { row });
                }
                *slot = value;
            }
            if rgb == [0.0, 0.0, 0.0] {
                return Err(TableError::ZeroMagnitude { row });
            }

            entries.push(ReferenceEntry {
                label: record[0].to_owned(),
                rgb,
            });
        }

        if entries.is_empty() {
            return Err(TableError::Empty);
        }
        Ok(Self { entries })
    }

    /// Build a table from rows already in memory.  No validation — callers
    /// own the invariants (used by tests and synthetic fixtures).
    pub fn from_entries(entries: Vec<ReferenceEntry>) -> Self {
        Self { entries }
    }

    /// Rows in file order.
    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_in_order() {
        let csv = "6.5,1200,600,300\n7.0,400,900,800\n7.5,200,700,1100\n";
        let table = ReferenceTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.entries()[0].label, "6.5");
        assert_eq!(table.entries()[0].rgb, [1200.0, 600.0, 300.0]);
        assert_eq!(table.entries()[2].label, "7.5");
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let csv = " 7.0 , 400 , 900 , 800 \n";
        let table = ReferenceTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.entries()[0].label, "7.0");
        assert_eq!(table.entries()[0].rgb, [400.0, 900.0, 800.0]);
    }

    #[test]
    fn short_row_is_rejected_with_its_row_number() {
        let csv = "6.5,1200,600,300\n7.0,400\n";
        match ReferenceTable::from_reader(csv.as_bytes()) {
            Err(TableError::MissingField { row }) => assert_eq!(row, 2),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_component_is_rejected() {
        let csv = "7.0,400,apple,800\n";
        assert!(matches!(
            ReferenceTable::from_reader(csv.as_bytes()),
            Err(TableError::BadComponent { row: 1 })
        ));
    }

    #[test]
    fn negative_component_is_rejected() {
        let csv = "7.0,400,-900,800\n";
        assert!(matches!(
            ReferenceTable::from_reader(csv.as_bytes()),
            Err(TableError::OutOfRange { row: 1 })
        ));
    }

    #[test]
    fn zero_magnitude_row_is_rejected() {
        let csv = "7.0,400,900,800\nghost,0,0,0\n";
        assert!(matches!(
            ReferenceTable::from_reader(csv.as_bytes()),
            Err(TableError::ZeroMagnitude { row: 2 })
        ));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            ReferenceTable::from_reader("".as_bytes()),
            Err(TableError::Empty)
        ));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = ReferenceTable::from_csv_path("/nonexistent/ref.csv").unwrap_err();
        assert!(matches!(err, TableError::Io(_)));
    }
}
