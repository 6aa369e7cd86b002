use crate::services::ingest::TsvReader;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// External catalog ids ⇄ dense model indices.
///
/// `forward` answers request lookups, `inverse` translates results back.
/// Indices need not be contiguous; gaps simply have no id.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMap {
    forward: HashMap<String, usize>,
    inverse: Vec<Option<String>>,
}

impl IdentifierMap {
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let mut map = Self::default();
        for (id, index) in pairs {
            map.insert(id.into(), index)?;
        }
        Ok(map)
    }

    fn insert(&mut self, id: String, index: usize) -> Result<()> {
        if self.forward.contains_key(&id) {
            bail!("identifier '{}' mapped more than once", id);
        }
        if index >= self.inverse.len() {
            self.inverse.resize(index + 1, None);
        }
        if let Some(existing) = &self.inverse[index] {
            bail!("index {} already mapped to '{}'", index, existing);
        }
        self.inverse[index] = Some(id.clone());
        self.forward.insert(id, index);
        Ok(())
    }

    /// Reads a header line containing `no` and `id_column`, e.g.
    /// `no<TAB>trackId`.
    pub fn load_tsv(path: &Path, id_column: &str) -> Result<Self> {
        let mut reader = TsvReader::open(path)?;
        let index_col = reader.column("no")?;
        let id_col = reader.column(id_column)?;

        let mut map = Self::default();
        while let Some(record) = reader.next_record()? {
            let index: usize = record
                .field(index_col)?
                .parse()
                .with_context(|| format!("{}: invalid index", record.location()))?;
            let id = record.field(id_col)?.to_string();
            map.insert(id, index)
                .with_context(|| record.location().to_string())?;
        }

        tracing::info!("Loaded {} identifiers from {}", map.len(), path.display());
        Ok(map)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.forward.get(id).copied()
    }

    pub fn id_of(&self, index: usize) -> Option<&str> {
        self.inverse.get(index).and_then(|id| id.as_deref())
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Size of the index space, including gaps.
    pub fn universe(&self) -> usize {
        self.inverse.len()
    }
}
