//! Delimited text tables: contact tables, centroid tables, grain positions
//! and contact pair lists.
//!
//! Every table starts with one header line, which is skipped when reading.
//! Fields may be separated by commas, whitespace, or both. A line that
//! cannot be parsed is rejected on its own (and logged); the rest of the
//! file still loads.

use crate::error::Result;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// Header of the contact table
pub const CONTACT_HEADER: &str = "Label1,Label2,ContactStrength";
/// Header of the centroid table
pub const CENTROID_HEADER: &str = "X,Y,Z,Label";

/// One row of the contact table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactRecord {
    pub label1: i32,
    pub label2: i32,
    pub strength: usize,
}

/// One row of the centroid table; `x`, `y`, `z` are the `i`, `j`, `k` indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CentroidRecord {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub label: i32,
}

/// A grain position from a tracking file (columns `Label Z Y X`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionRecord {
    pub label: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A contact between two labels from a contact file (columns `Label1 Label2`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairRecord {
    pub label1: i32,
    pub label2: i32,
}

/// A line that was skipped while reading a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    /// 1-based line number in the source
    pub line: usize,
    pub content: String,
    pub reason: String,
}

/// Records parsed from a table plus the lines that were rejected
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable<T> {
    pub records: Vec<T>,
    pub rejected: Vec<RejectedLine>,
}

impl<T> ParsedTable<T> {
    /// Whether every data line parsed
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

// ─── Writers ────────────────────────────────────────────────────────────

/// Write the contact table (`Label1,Label2,ContactStrength`)
pub fn write_contact_table<P: AsRef<Path>>(path: P, records: &[ContactRecord]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path.as_ref())?);
    writeln!(out, "{}", CONTACT_HEADER)?;
    for r in records {
        writeln!(out, "{},{},{}", r.label1, r.label2, r.strength)?;
    }
    out.flush()?;
    Ok(())
}

/// Write the centroid table (`X,Y,Z,Label`)
pub fn write_centroid_table<P: AsRef<Path>>(path: P, records: &[CentroidRecord]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path.as_ref())?);
    writeln!(out, "{}", CENTROID_HEADER)?;
    for r in records {
        writeln!(out, "{},{},{},{}", r.x, r.y, r.z, r.label)?;
    }
    out.flush()?;
    Ok(())
}

// ─── Readers ────────────────────────────────────────────────────────────

/// Read a contact table written by [`write_contact_table`]
pub fn read_contact_table<P: AsRef<Path>>(path: P) -> Result<ParsedTable<ContactRecord>> {
    read_table(path.as_ref(), 3, |f| {
        Ok(ContactRecord {
            label1: field(f, 0)?,
            label2: field(f, 1)?,
            strength: field(f, 2)?,
        })
    })
}

/// Read a centroid table (`X,Y,Z,Label`)
pub fn read_centroid_table<P: AsRef<Path>>(path: P) -> Result<ParsedTable<CentroidRecord>> {
    read_table(path.as_ref(), 4, |f| {
        Ok(CentroidRecord {
            x: field(f, 0)?,
            y: field(f, 1)?,
            z: field(f, 2)?,
            label: field(f, 3)?,
        })
    })
}

/// Read grain positions from a tracking file with columns `Label Z Y X`
pub fn read_positions<P: AsRef<Path>>(path: P) -> Result<ParsedTable<PositionRecord>> {
    read_table(path.as_ref(), 4, |f| {
        Ok(PositionRecord {
            label: field(f, 0)?,
            z: field(f, 1)?,
            y: field(f, 2)?,
            x: field(f, 3)?,
        })
    })
}

/// Read contact pairs (`Label1 Label2`, further columns ignored)
pub fn read_contact_pairs<P: AsRef<Path>>(path: P) -> Result<ParsedTable<PairRecord>> {
    read_table(path.as_ref(), 2, |f| {
        Ok(PairRecord {
            label1: field(f, 0)?,
            label2: field(f, 1)?,
        })
    })
}

fn read_table<T, F>(path: &Path, min_fields: usize, parse: F) -> Result<ParsedTable<T>>
where
    F: Fn(&[&str]) -> std::result::Result<T, String>,
{
    let reader = BufReader::new(File::open(path)?);
    parse_lines(reader, &path.display().to_string(), min_fields, parse)
}

fn parse_lines<R, T, F>(
    reader: R,
    source: &str,
    min_fields: usize,
    parse: F,
) -> Result<ParsedTable<T>>
where
    R: BufRead,
    F: Fn(&[&str]) -> std::result::Result<T, String>,
{
    let mut records = Vec::new();
    let mut rejected = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        // Header
        if idx == 0 {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let fields = split_fields(trimmed);
        let outcome = if fields.len() < min_fields {
            Err(format!("expected at least {} fields, found {}", min_fields, fields.len()))
        } else {
            parse(&fields)
        };

        match outcome {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!("{} line {}: {}", source, idx + 1, reason);
                rejected.push(RejectedLine {
                    line: idx + 1,
                    content: trimmed.to_string(),
                    reason,
                });
            }
        }
    }

    Ok(ParsedTable { records, rejected })
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect()
}

fn field<T>(fields: &[&str], idx: usize) -> std::result::Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = fields[idx];
    raw.parse::<T>()
        .map_err(|e| format!("field {} '{}': {}", idx + 1, raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    #[test]
    fn test_split_mixed_delimiters() {
        assert_eq!(split_fields("1, 2\t3  4"), vec!["1", "2", "3", "4"]);
        assert_eq!(split_fields("5,6,7"), vec!["5", "6", "7"]);
    }

    #[test]
    fn test_bad_line_is_rejected_not_fatal() {
        let text = "Label1 Label2\n1 2\nx 3\n\n4\n5 6\n";
        let table = parse_lines(Cursor::new(text), "pairs", 2, |f| {
            Ok(PairRecord {
                label1: field(f, 0)?,
                label2: field(f, 1)?,
            })
        })
        .unwrap();
        assert_eq!(
            table.records,
            vec![
                PairRecord { label1: 1, label2: 2 },
                PairRecord { label1: 5, label2: 6 },
            ]
        );
        assert_eq!(table.rejected.len(), 2);
        assert_eq!(table.rejected[0].line, 3);
        assert_eq!(table.rejected[1].line, 5);
        assert!(!table.is_clean());
    }

    #[test]
    fn test_contact_table_roundtrip() {
        let records = vec![
            ContactRecord { label1: 1, label2: 2, strength: 1 },
            ContactRecord { label1: 2, label2: 9, strength: 4 },
        ];
        let file = tempfile::NamedTempFile::new().unwrap();
        write_contact_table(file.path(), &records).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(text, "Label1,Label2,ContactStrength\n1,2,1\n2,9,4\n");

        let back = read_contact_table(file.path()).unwrap();
        assert!(back.is_clean());
        assert_eq!(back.records, records);
    }

    #[test]
    fn test_centroid_table_format() {
        let records = vec![CentroidRecord { x: 3, y: 4, z: 5, label: 12 }];
        let file = tempfile::NamedTempFile::new().unwrap();
        write_centroid_table(file.path(), &records).unwrap();
        let text = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(text, "X,Y,Z,Label\n3,4,5,12\n");
        assert_eq!(read_centroid_table(file.path()).unwrap().records, records);
    }

    #[test]
    fn test_positions_column_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Label Zpos Ypos Xpos").unwrap();
        writeln!(file, "7 1.5 2.5 3.5").unwrap();
        let table = read_positions(file.path()).unwrap();
        let p = table.records[0];
        assert_eq!(p.label, 7);
        assert_relative_eq!(p.z, 1.5);
        assert_relative_eq!(p.y, 2.5);
        assert_relative_eq!(p.x, 3.5);
    }

    #[test]
    fn test_contact_pairs_accept_contact_table() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_contact_table(
            file.path(),
            &[ContactRecord { label1: 3, label2: 8, strength: 2 }],
        )
        .unwrap();
        let pairs = read_contact_pairs(file.path()).unwrap();
        assert_eq!(pairs.records, vec![PairRecord { label1: 3, label2: 8 }]);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(read_positions("/definitely/not/here.txt").is_err());
    }
}
