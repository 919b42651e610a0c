//! Record source: parses the headerless municipality CSV into typed records
//!
//! Layout (7 columns, no header):
//!
//! ```text
//! id, name, region_code, population_2018, population_2019, population_2020, population_2021
//! ```
//!
//! Parsing is all-or-nothing. The first malformed row aborts the whole read
//! and is reported with its 1-based line number and raw content.

use crate::record::Record;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::{Path, PathBuf};

pub const COLUMN_COUNT: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecordError {
    pub line: u64,
    pub content: String,
    pub reason: String,
}

impl std::fmt::Display for MalformedRecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Malformed record at line {}: {} ({:?})", self.line, self.reason, self.content)
    }
}

impl std::error::Error for MalformedRecordError {}

#[derive(Debug)]
pub enum SourceError {
    Io { path: PathBuf, source: std::io::Error },
    Malformed(MalformedRecordError),
}

impl From<MalformedRecordError> for SourceError {
    fn from(err: MalformedRecordError) -> Self {
        SourceError::Malformed(err)
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Io { path, source } => {
                write!(f, "IO error reading {}: {}", path.display(), source)
            }
            SourceError::Malformed(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io { source, .. } => Some(source),
            SourceError::Malformed(e) => Some(e),
        }
    }
}

/// Read and parse a whole source file
pub fn read_path(path: impl AsRef<Path>) -> Result<Vec<Record>, SourceError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse(&raw)?;
    log::info!("📄 Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse raw CSV text, preserving input order
pub fn parse(raw: &str) -> Result<Vec<Record>, MalformedRecordError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(raw.as_bytes());

    let mut records = Vec::new();
    let mut row = StringRecord::new();

    loop {
        match reader.read_record(&mut row) {
            Ok(true) => {
                let line = row.position().map(|p| p.line()).unwrap_or(0);
                records.push(parse_row(&row, line)?);
            }
            Ok(false) => break,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                return Err(MalformedRecordError {
                    line,
                    content: String::new(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(records)
}

fn parse_row(row: &StringRecord, line: u64) -> Result<Record, MalformedRecordError> {
    let malformed = |reason: String| MalformedRecordError {
        line,
        content: row.iter().collect::<Vec<_>>().join(","),
        reason,
    };

    if row.len() != COLUMN_COUNT {
        return Err(malformed(format!(
            "expected {} columns, found {}",
            COLUMN_COUNT,
            row.len()
        )));
    }

    let number = |idx: usize, field: &str| -> Result<u32, MalformedRecordError> {
        row[idx].parse::<u32>().map_err(|e| {
            malformed(format!(
                "{} '{}' is not a non-negative integer: {}",
                field, &row[idx], e
            ))
        })
    };

    let id = number(0, "id")?;

    let name = &row[1];
    if name.is_empty() {
        return Err(malformed("name is empty".to_string()));
    }

    let region_code = &row[2];
    if region_code.chars().count() != 2 {
        return Err(malformed(format!(
            "region code '{}' must be exactly two characters",
            region_code
        )));
    }

    let population = [
        number(3, "population_2018")?,
        number(4, "population_2019")?,
        number(5, "population_2020")?,
        number(6, "population_2021")?,
    ];

    Ok(Record::new(id, name, region_code, population))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Year;

    #[test]
    fn test_parse_preserves_order() {
        let raw = "\
3304557,Rio de Janeiro,RJ,6718903,6718903,6747815,6775561
3550308,São Paulo,SP,12176866,12252023,12325232,12396372
4106902,Curitiba,PR,1917185,1933105,1948626,1963726
";
        let records = parse(raw).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, 3304557);
        assert_eq!(records[1].name, "São Paulo");
        assert_eq!(records[2].region_code, "PR");
        assert_eq!(records[2].population(Year::Y2020), 1948626);
    }

    #[test]
    fn test_parse_quoted_name_with_comma() {
        let raw = "1,\"Pau D'Arco, do Piauí\",PI,10,11,12,13\n";
        let records = parse(raw).unwrap();

        assert_eq!(records[0].name, "Pau D'Arco, do Piauí");
        assert_eq!(records[0].population, [10, 11, 12, 13]);
    }

    #[test]
    fn test_parse_is_restartable() {
        let raw = "1,A,AA,1,2,3,4\n2,B,BB,5,6,7,8\n";
        assert_eq!(parse(raw).unwrap(), parse(raw).unwrap());
    }

    #[test]
    fn test_non_numeric_population_reports_line() {
        let raw = "1,A,AA,1,2,3,4\n2,B,BB,5,six,7,8\n3,C,CC,1,1,1,1\n";
        let err = parse(raw).unwrap_err();

        assert_eq!(err.line, 2);
        assert_eq!(err.content, "2,B,BB,5,six,7,8");
        assert!(err.reason.contains("population_2019"));
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        let err = parse("1,A,AA,1,2,3\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.reason.contains("expected 7 columns, found 6"));

        assert!(parse("1,A,AA,1,2,3,4,5\n").is_err());
    }

    #[test]
    fn test_negative_and_missing_fields_are_rejected() {
        assert!(parse("1,A,AA,-1,2,3,4\n").is_err());
        assert!(parse("1,A,AA,,2,3,4\n").is_err());
        assert!(parse("x,A,AA,1,2,3,4\n").is_err());
        assert!(parse("1,,AA,1,2,3,4\n").is_err());
    }

    #[test]
    fn test_region_code_must_have_two_chars() {
        assert!(parse("1,A,SPX,1,2,3,4\n").is_err());
        assert!(parse("1,A,S,1,2,3,4\n").is_err());
    }

    #[test]
    fn test_read_path_missing_file() {
        let err = read_path("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
