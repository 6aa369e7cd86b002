use crate::models::Interaction;
use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// Line reader for the header-first, tab-separated export files.
pub struct TsvReader {
    path: PathBuf,
    header: Vec<String>,
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

pub struct TsvRecord {
    location: String,
    fields: Vec<String>,
}

impl TsvRecord {
    pub fn field(&self, col: usize) -> Result<&str> {
        self.fields
            .get(col)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("{}: missing column {}", self.location, col + 1))
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl TsvReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let mut lines = BufReader::new(file).lines();
        let header = lines
            .next()
            .ok_or_else(|| anyhow!("{}: empty file", path.display()))?
            .with_context(|| format!("failed to read {}", path.display()))?
            .split('\t')
            .map(|h| h.trim().to_string())
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            header,
            lines,
            line_no: 1,
        })
    }

    pub fn column(&self, name: &str) -> Result<usize> {
        self.header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("{}: no '{}' column in header {:?}", self.path.display(), name, self.header))
    }

    /// Next non-blank line, or `None` at end of file.
    pub fn next_record(&mut self) -> Result<Option<TsvRecord>> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let location = format!("{}:{}", self.path.display(), self.line_no);
            let line = line.with_context(|| location.clone())?;
            if line.trim().is_empty() {
                continue;
            }
            return Ok(Some(TsvRecord {
                location,
                fields: line.split('\t').map(|f| f.trim().to_string()).collect(),
            }));
        }
        Ok(None)
    }
}

/// Interactions from a `userId`, `<item_column>`, `weight` export such as
/// `playlist_track.dat` (`songNo`) or `playlist_artist.dat` (`artistNo`).
pub fn load_interactions_tsv(path: &Path, item_column: &str) -> Result<Vec<Interaction>> {
    let mut reader = TsvReader::open(path)?;
    let user_col = reader.column("userId")?;
    let item_col = reader.column(item_column)?;
    let weight_col = reader.column("weight")?;

    let mut interactions = Vec::new();
    while let Some(record) = reader.next_record()? {
        let parse_index = |col: usize, what: &str| -> Result<usize> {
            record
                .field(col)?
                .parse()
                .with_context(|| format!("{}: invalid {}", record.location(), what))
        };
        let user = parse_index(user_col, "userId")?;
        let item = parse_index(item_col, item_column)?;
        let weight: f32 = record
            .field(weight_col)?
            .parse()
            .with_context(|| format!("{}: invalid weight", record.location()))?;
        interactions.push(Interaction::new(user, item, weight));
    }

    tracing::info!("Loaded {} interactions from {}", interactions.len(), path.display());
    Ok(interactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tsv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_load_interactions() {
        let file = tsv("userId\tsongNo\tweight\n0\t3\t12\n1\t0\t1.5\n\n");
        let interactions = load_interactions_tsv(file.path(), "songNo").unwrap();
        assert_eq!(
            interactions,
            vec![Interaction::new(0, 3, 12.0), Interaction::new(1, 0, 1.5)]
        );
    }

    #[test]
    fn test_bad_value_reports_line() {
        let file = tsv("userId\tartistNo\tweight\n0\t1\t2\n0\tx\t2\n");
        let err = load_interactions_tsv(file.path(), "artistNo").unwrap_err();
        assert!(format!("{:#}", err).contains(":3"));
    }

    #[test]
    fn test_missing_column() {
        let file = tsv("userId\tweight\n0\t2\n");
        assert!(load_interactions_tsv(file.path(), "songNo").is_err());
    }
}
