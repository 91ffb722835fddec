//! Samples placed in a two dimensional embedding (e.g. UMAP)

use std::path::Path;

use itertools::{Itertools, MinMaxResult};
use serde::Serialize;
use thiserror::Error;

use crate::table::{Table, TableError};
use crate::titers::PARTICIPANT_COLUMN;

/// Default column used to group samples
pub const DEFAULT_GROUP_COLUMN: &str = "age_at_sampling";

/// Errors that can occur when reading [`SampleTable`] structs.
#[derive(Error, Debug)]
pub enum SampleError {
    /// There was a [`TableError`] reading the underlying table
    #[error("Could not read sample table")]
    TableError(#[from] TableError),
    /// A coordinate is not a number
    #[error("Invalid coordinate {value:?} on line {line}")]
    InvalidCoordinate {
        /// Line of the record
        line: usize,
        /// The offending text
        value: String,
    },
}

/// A sample of the embedding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Sample identifier
    pub participant_id: String,
    /// First embedding coordinate
    pub x: f64,
    /// Second embedding coordinate
    pub y: f64,
    /// Group label of the sample
    pub group: String,
}

/// The samples of an embedding
#[derive(Debug, Clone, Default)]
pub struct SampleTable {
    samples: Vec<Sample>,
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    match values.minmax_by(|a, b| a.total_cmp(b)) {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(v) => Some((v, v)),
        MinMaxResult::MinMax(min, max) => Some((min, max)),
    }
}

impl SampleTable {
    /// Create a table from samples
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Read samples from comma separated text with `participant_id`,
    /// `UMAP1`, `UMAP2` and `group_column` columns.
    /// ```
    /// use neutscape::samples::SampleTable;
    ///
    /// let csv = "participant_id,UMAP1,UMAP2,age_at_sampling\nP1,0.5,-1,20-29\nP2,2,3,0-9\n";
    /// let samples = SampleTable::from_csv(csv, "age_at_sampling").unwrap();
    ///
    /// assert_eq!(samples.groups(), vec!["0-9", "20-29"]);
    /// assert_eq!(samples.extent_x(), Some((0.5, 2.)));
    /// ```
    pub fn from_csv(csv: &str, group_column: &str) -> Result<Self, SampleError> {
        Self::from_table(&Table::from_csv(csv)?, group_column)
    }

    /// Reads samples from a comma separated file, see [`SampleTable::from_csv`]
    pub fn from_file(path: &Path, group_column: &str) -> Result<Self, SampleError> {
        Self::from_table(&Table::from_file(path)?, group_column)
    }

    fn from_table(table: &Table, group_column: &str) -> Result<Self, SampleError> {
        let participant = table.column(PARTICIPANT_COLUMN)?;
        let x = table.column("UMAP1")?;
        let y = table.column("UMAP2")?;
        let group = table.column(group_column)?;

        let coordinate = |line: usize, value: &str| {
            value.parse::<f64>().map_err(|_| SampleError::InvalidCoordinate {
                line,
                value: value.to_string(),
            })
        };

        let samples = table
            .rows()
            .iter()
            .map(|row| {
                Ok(Sample {
                    participant_id: row.get(participant).unwrap_or_default().to_string(),
                    x: coordinate(row.line(), row.get(x).unwrap_or_default())?,
                    y: coordinate(row.line(), row.get(y).unwrap_or_default())?,
                    group: row.get(group).unwrap_or_default().to_string(),
                })
            })
            .collect::<Result<Vec<_>, SampleError>>()?;

        Ok(Self { samples })
    }

    /// All samples in input order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Get a sample by identifier
    pub fn get(&self, participant_id: &str) -> Option<&Sample> {
        self.samples
            .iter()
            .find(|sample| sample.participant_id == participant_id)
    }

    /// Sorted, deduplicated group labels
    pub fn groups(&self) -> Vec<&str> {
        self.samples
            .iter()
            .map(|sample| sample.group.as_str())
            .unique()
            .sorted()
            .collect()
    }

    /// Range of the first embedding coordinate
    pub fn extent_x(&self) -> Option<(f64, f64)> {
        extent(self.samples.iter().map(|sample| sample.x))
    }

    /// Range of the second embedding coordinate
    pub fn extent_y(&self) -> Option<(f64, f64)> {
        extent(self.samples.iter().map(|sample| sample.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UMAP: &str = "\
participant_id,UMAP1,UMAP2,age_at_sampling,cohort
P1,1.5,2,40-49,a
P2,-3,0.25,0-9,b
P3,0,-1e1,40-49,a
";

    #[test]
    fn read_samples() -> Result<(), SampleError> {
        let samples = SampleTable::from_csv(UMAP, DEFAULT_GROUP_COLUMN)?;

        assert_eq!(samples.samples().len(), 3);
        assert_eq!(samples.groups(), vec!["0-9", "40-49"]);
        assert_eq!(samples.extent_x(), Some((-3., 1.5)));
        assert_eq!(samples.extent_y(), Some((-10., 2.)));
        assert_eq!(samples.get("P2").map(|s| s.x), Some(-3.));
        assert!(samples.get("P4").is_none());

        let by_cohort = SampleTable::from_csv(UMAP, "cohort")?;
        assert_eq!(by_cohort.groups(), vec!["a", "b"]);

        Ok(())
    }

    #[test]
    fn read_samples_errors() {
        assert!(matches!(
            SampleTable::from_csv(UMAP, "sex"),
            Err(SampleError::TableError(TableError::MissingColumn(_)))
        ));
        assert!(matches!(
            SampleTable::from_csv(
                "participant_id,UMAP1,UMAP2,age_at_sampling\nP1,x,0,1\n",
                DEFAULT_GROUP_COLUMN
            ),
            Err(SampleError::InvalidCoordinate { line: 2, .. })
        ));
        assert_eq!(SampleTable::default().extent_x(), None);
    }
}
