//! Read the comma separated tables that accompany a tree
//!
//! Only the subset of CSV produced by common dataframe exports is handled:
//! one record per line, comma separated fields, optional double quotes
//! around a field. Quoted fields may contain commas and `""` escaped quotes
//! but not line breaks.

use std::{fs, path::Path};

use thiserror::Error;

/// Errors that can occur when reading [`Table`] structs.
#[derive(Error, Debug)]
pub enum TableError {
    /// The text has no header line
    #[error("Table is empty.")]
    EmptyTable,
    /// A record does not have as many fields as the header
    #[error("Line {line} has {found} fields, expected {expected}.")]
    RowLength {
        /// Line number of the record (starting at 1)
        line: usize,
        /// Number of columns in the header
        expected: usize,
        /// Number of fields in the record
        found: usize,
    },
    /// We are trying to access a column that is not in the header
    #[error("Missing column {0:?}.")]
    MissingColumn(String),
    /// There was a [`std::io::Error`] when reading a table file
    #[error("Problem reading file")]
    IoError(#[from] std::io::Error),
}

/// A record of a [`Table`]
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    line: usize,
    fields: Vec<String>,
}

impl Row {
    /// Line number of the record in the source text (starting at 1)
    pub fn line(&self) -> usize {
        self.line
    }

    /// Field at column index `column`
    pub fn get(&self, column: usize) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

/// A table with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Row>,
}

fn split_fields(line: &str) -> Vec<String> {
    let mut fields = vec![];
    let mut field = String::new();
    let mut quoted = false;

    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);

    fields
        .into_iter()
        .map(|field| field.trim().to_string())
        .collect()
}

impl Table {
    /// Build a table from comma separated text. The first non blank
    /// line is the header, blank lines are skipped.
    /// ```
    /// use neutscape::table::Table;
    ///
    /// let table = Table::from_csv("strain,\"titer\"\nA/HK/1968, 3.5\n").unwrap();
    /// let titer = table.column("titer").unwrap();
    ///
    /// assert_eq!(table.rows()[0].get(titer), Some("3.5"));
    /// ```
    pub fn from_csv(csv: &str) -> Result<Self, TableError> {
        let mut lines = csv
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header) = lines.next().ok_or(TableError::EmptyTable)?;
        let header = split_fields(header);

        let rows = lines
            .map(|(i, line)| {
                let fields = split_fields(line);
                if fields.len() != header.len() {
                    return Err(TableError::RowLength {
                        line: i + 1,
                        expected: header.len(),
                        found: fields.len(),
                    });
                }
                Ok(Row { line: i + 1, fields })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { header, rows })
    }

    /// Reads a table from a comma separated file
    pub fn from_file(path: &Path) -> Result<Self, TableError> {
        let csv = fs::read_to_string(path)?;
        Self::from_csv(&csv)
    }

    /// Index of the column named `name`
    pub fn column(&self, name: &str) -> Result<usize, TableError> {
        self.header
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Column names
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Records of the table
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no records
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_csv() -> Result<(), TableError> {
        let csv = "participant_id,strain,log_hi_titer\r\n\n P1 ,A/Vic/1975,4\n\"P2\",A/HK/1968,2.5\n";
        let table = Table::from_csv(csv)?;

        assert_eq!(table.header(), ["participant_id", "strain", "log_hi_titer"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].get(0), Some("P1"));
        assert_eq!(table.rows()[0].line(), 3);
        assert_eq!(table.rows()[1].get(0), Some("P2"));
        assert_eq!(table.rows()[1].get(2), Some("2.5"));
        assert_eq!(table.rows()[1].get(3), None);
        assert_eq!(table.column("strain")?, 1);

        Ok(())
    }

    #[test]
    fn quoted_fields() -> Result<(), TableError> {
        let csv = "participant_id,strain,log_hi_titer\nP1,\"A/Hong Kong, 1968\",2\nP2,\"say \"\"hi\"\"\",3\n";
        let table = Table::from_csv(csv)?;

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].get(1), Some("A/Hong Kong, 1968"));
        assert_eq!(table.rows()[0].get(2), Some("2"));
        assert_eq!(table.rows()[1].get(1), Some("say \"hi\""));

        assert_eq!(split_fields(",,"), vec!["", "", ""]);
        assert_eq!(split_fields(" a , \"b\" "), vec!["a", "b"]);

        Ok(())
    }

    #[test]
    fn from_csv_errors() {
        assert!(matches!(Table::from_csv(""), Err(TableError::EmptyTable)));
        assert!(matches!(
            Table::from_csv(" \n\n"),
            Err(TableError::EmptyTable)
        ));
        assert!(matches!(
            Table::from_csv("a,b\n1,2\n3\n"),
            Err(TableError::RowLength {
                line: 3,
                expected: 2,
                found: 1
            })
        ));

        let table = Table::from_csv("a,b\n").unwrap();
        assert!(table.is_empty());
        assert!(matches!(
            table.column("c"),
            Err(TableError::MissingColumn(name)) if name == "c"
        ));
    }
}
