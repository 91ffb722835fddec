//! Per-sample antigenic measurements against the strains of the tree
//!
//! Each record links a participant (sample) to a strain with a single
//! value, a log HI titer or an IC50 depending on the assay.

use std::{collections::HashMap, path::Path};

use itertools::{Itertools, MinMaxResult};
use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::table::{Table, TableError};

/// Column holding the participant identifiers
pub const PARTICIPANT_COLUMN: &str = "participant_id";
/// Column holding the strain names, matching the tree leaf names
pub const STRAIN_COLUMN: &str = "strain";

/// Errors that can occur when reading [`TiterTable`] structs.
#[derive(Error, Debug)]
pub enum TiterError {
    /// There was a [`TableError`] reading the underlying table
    #[error("Could not read titer table")]
    TableError(#[from] TableError),
    /// A measurement is not a number
    #[error("Invalid {column} value {value:?} on line {line}")]
    InvalidValue {
        /// Line of the record
        line: usize,
        /// Name of the value column
        column: String,
        /// The offending text
        value: String,
    },
}

/// The kind of measurement stored in a titer table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Assay {
    /// Hemagglutination inhibition, `log_hi_titer` column
    #[default]
    HiTiter,
    /// Half maximal inhibitory concentration, `ic50` column
    Ic50,
    /// Any other column name
    Custom(String),
}

impl Assay {
    /// Get the assay stored in column `column`
    pub fn from_column(column: &str) -> Self {
        match column {
            "log_hi_titer" => Self::HiTiter,
            "ic50" => Self::Ic50,
            _ => Self::Custom(column.to_string()),
        }
    }

    /// Name of the value column
    pub fn column(&self) -> &str {
        match self {
            Self::HiTiter => "log_hi_titer",
            Self::Ic50 => "ic50",
            Self::Custom(column) => column.as_str(),
        }
    }
}

/// A single measurement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiterRecord {
    /// Sample identifier
    pub participant_id: String,
    /// Strain the sample was measured against
    pub strain: String,
    /// Measured value
    pub value: f64,
}

/// Measurements of many participants against many strains
#[derive(Debug, Clone)]
pub struct TiterTable {
    assay: Assay,
    records: Vec<TiterRecord>,
    index: HashMap<String, HashMap<String, f64>>,
}

impl TiterTable {
    /// Build the table from a set of records. If the same
    /// participant/strain pair appears twice, the first value is used.
    pub fn new(assay: Assay, records: Vec<TiterRecord>) -> Self {
        let mut index: HashMap<String, HashMap<String, f64>> = HashMap::new();
        for record in records.iter() {
            index
                .entry(record.participant_id.clone())
                .or_default()
                .entry(record.strain.clone())
                .or_insert(record.value);
        }

        Self {
            assay,
            records,
            index,
        }
    }

    /// Read titers from comma separated text with `participant_id`,
    /// `strain` and the value column of `assay`. Records with an empty
    /// value are skipped.
    /// ```
    /// use neutscape::titers::{Assay, TiterTable};
    ///
    /// let csv = "participant_id,strain,ic50\nP1,A/HK/1968,12.5\nP1,A/Vic/1975,\n";
    /// let titers = TiterTable::from_csv(csv, &Assay::Ic50).unwrap();
    ///
    /// assert_eq!(titers.value("P1", "A/HK/1968"), Some(12.5));
    /// assert_eq!(titers.value("P1", "A/Vic/1975"), None);
    /// ```
    pub fn from_csv(csv: &str, assay: &Assay) -> Result<Self, TiterError> {
        Self::from_table(&Table::from_csv(csv)?, assay)
    }

    /// Reads titers from a comma separated file, see [`TiterTable::from_csv`]
    pub fn from_file(path: &Path, assay: &Assay) -> Result<Self, TiterError> {
        Self::from_table(&Table::from_file(path)?, assay)
    }

    fn from_table(table: &Table, assay: &Assay) -> Result<Self, TiterError> {
        let participant = table.column(PARTICIPANT_COLUMN)?;
        let strain = table.column(STRAIN_COLUMN)?;
        let value = table.column(assay.column())?;

        let mut records = Vec::with_capacity(table.len());
        for row in table.rows() {
            let raw = row.get(value).unwrap_or_default();
            if raw.is_empty() {
                debug!("Skipping line {} without {}", row.line(), assay.column());
                continue;
            }
            let parsed = raw.parse().map_err(|_| TiterError::InvalidValue {
                line: row.line(),
                column: assay.column().to_string(),
                value: raw.to_string(),
            })?;

            records.push(TiterRecord {
                participant_id: row.get(participant).unwrap_or_default().to_string(),
                strain: row.get(strain).unwrap_or_default().to_string(),
                value: parsed,
            });
        }

        debug!("Read {} {} measurements", records.len(), assay.column());

        Ok(Self::new(assay.clone(), records))
    }

    /// The assay of the measurements
    pub fn assay(&self) -> &Assay {
        &self.assay
    }

    /// All measurements in input order
    pub fn records(&self) -> &[TiterRecord] {
        &self.records
    }

    /// Value measured for `participant` against `strain`
    pub fn value(&self, participant: &str, strain: &str) -> Option<f64> {
        self.index.get(participant)?.get(strain).copied()
    }

    /// Participants in order of first appearance
    pub fn participants(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|record| record.participant_id.as_str())
            .unique()
            .collect()
    }

    /// Smallest and largest measured values, the domain of the colour scale
    pub fn extent(&self) -> Option<(f64, f64)> {
        match self
            .records
            .iter()
            .map(|record| record.value)
            .filter(|value| !value.is_nan())
            .minmax_by(|a, b| a.total_cmp(b))
        {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(value) => Some((value, value)),
            MinMaxResult::MinMax(min, max) => Some((min, max)),
        }
    }

    /// Largest measured value
    pub fn max(&self) -> Option<f64> {
        self.extent().map(|(_, max)| max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TITERS: &str = "\
participant_id,strain,log_hi_titer,age
P1,A/HongKong/1968,3.5,12
P1,A/Victoria/1975,1,12
P2,A/HongKong/1968,-0.5,40
P1,A/HongKong/1968,7,12
P3,A/Bangkok/1979,,60
";

    #[test]
    fn read_titers() -> Result<(), TiterError> {
        let titers = TiterTable::from_csv(TITERS, &Assay::HiTiter)?;

        assert_eq!(titers.records().len(), 4);
        assert_eq!(titers.value("P1", "A/HongKong/1968"), Some(3.5));
        assert_eq!(titers.value("P2", "A/HongKong/1968"), Some(-0.5));
        assert_eq!(titers.value("P2", "A/Victoria/1975"), None);
        assert_eq!(titers.value("P3", "A/Bangkok/1979"), None);
        assert_eq!(titers.participants(), vec!["P1", "P2"]);
        assert_eq!(titers.extent(), Some((-0.5, 7.)));
        assert_eq!(titers.max(), Some(7.));
        assert_eq!(titers.assay(), &Assay::HiTiter);

        Ok(())
    }

    #[test]
    fn read_titers_errors() {
        assert!(matches!(
            TiterTable::from_csv(TITERS, &Assay::Ic50),
            Err(TiterError::TableError(TableError::MissingColumn(column))) if column == "ic50"
        ));
        assert!(matches!(
            TiterTable::from_csv("participant_id,strain,log_hi_titer\nP1,A,high\n", &Assay::HiTiter),
            Err(TiterError::InvalidValue { line: 2, .. })
        ));
    }

    #[test]
    fn assay_columns() {
        assert_eq!(Assay::from_column("ic50"), Assay::Ic50);
        assert_eq!(Assay::from_column("log_hi_titer"), Assay::HiTiter);
        let custom = Assay::from_column("neut");
        assert_eq!(custom.column(), "neut");

        let titers = TiterTable::from_csv(TITERS, &Assay::from_column("age")).unwrap();
        assert_eq!(titers.extent(), Some((12., 60.)));
        assert_eq!(titers.value("P3", "A/Bangkok/1979"), Some(60.));
    }

    #[test]
    fn empty_extent() {
        let titers = TiterTable::new(Assay::HiTiter, vec![]);
        assert_eq!(titers.extent(), None);
        assert!(titers.participants().is_empty());
    }
}
