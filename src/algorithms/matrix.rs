use crate::error::{RecError, RecResult};
use crate::models::Interaction;
use std::collections::BTreeMap;

/// Compressed sparse rows: `indptr[r]..indptr[r + 1]` spans row `r` in
/// `indices`/`values`, column indices ascending within a row.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    rows: usize,
    cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<f32>,
}

impl CsrMatrix {
    /// Entries must be sorted by (row, col) with no duplicate keys.
    fn from_sorted(rows: usize, cols: usize, entries: impl IntoIterator<Item = (usize, usize, f32)>) -> Self {
        let mut indptr = vec![0usize; rows + 1];
        let mut indices = Vec::new();
        let mut values = Vec::new();

        for (row, col, value) in entries {
            indptr[row + 1] += 1;
            indices.push(col);
            values.push(value);
        }
        for r in 0..rows {
            indptr[r + 1] += indptr[r];
        }

        Self { rows, cols, indptr, indices, values }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        let span = self.indptr[row]..self.indptr[row + 1];
        self.indices[span.clone()]
            .iter()
            .copied()
            .zip(self.values[span].iter().copied())
    }

    pub fn row_len(&self, row: usize) -> usize {
        self.indptr[row + 1] - self.indptr[row]
    }

    pub fn transpose(&self) -> Self {
        let mut entries: Vec<(usize, usize, f32)> = (0..self.rows)
            .flat_map(|r| self.row(r).map(move |(c, v)| (c, r, v)))
            .collect();
        entries.sort_by_key(|&(r, c, _)| (r, c));
        Self::from_sorted(self.cols, self.rows, entries)
    }
}

/// User × item matrix of summed raw interaction weights.
///
/// Confidence scaling is left to the factorizer. Only positive entries are
/// stored, so [`ConfidenceMatrix::nnz`] counts observed preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceMatrix {
    by_user: CsrMatrix,
    by_item: CsrMatrix,
}

impl ConfidenceMatrix {
    pub fn num_users(&self) -> usize {
        self.by_user.rows()
    }

    pub fn num_items(&self) -> usize {
        self.by_user.cols()
    }

    pub fn nnz(&self) -> usize {
        self.by_user.nnz()
    }

    pub fn by_user(&self) -> &CsrMatrix {
        &self.by_user
    }

    pub fn by_item(&self) -> &CsrMatrix {
        &self.by_item
    }

    pub fn get(&self, user: usize, item: usize) -> f32 {
        if user >= self.num_users() {
            return 0.0;
        }
        self.by_user
            .row(user)
            .find(|&(i, _)| i == item)
            .map(|(_, w)| w)
            .unwrap_or(0.0)
    }

    /// Items the user has a stored interaction with, ascending.
    pub fn user_items(&self, user: usize) -> Vec<usize> {
        if user >= self.num_users() {
            return Vec::new();
        }
        self.by_user.row(user).map(|(i, _)| i).collect()
    }
}

#[derive(Debug, Default)]
pub struct InteractionMatrixBuilder {
    num_users: Option<usize>,
    num_items: Option<usize>,
}

impl InteractionMatrixBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the user dimension instead of inferring it from the data.
    pub fn with_num_users(mut self, num_users: usize) -> Self {
        self.num_users = Some(num_users);
        self
    }

    pub fn with_num_items(mut self, num_items: usize) -> Self {
        self.num_items = Some(num_items);
        self
    }

    pub fn build<'a, I>(&self, interactions: I) -> RecResult<ConfidenceMatrix>
    where
        I: IntoIterator<Item = &'a Interaction>,
    {
        let mut summed: BTreeMap<(usize, usize), f32> = BTreeMap::new();
        let mut max_user = None;
        let mut max_item = None;

        for interaction in interactions {
            let Interaction { user, item, weight } = *interaction;
            if !weight.is_finite() || weight < 0.0 {
                return Err(RecError::InvalidWeight { user, item, weight });
            }
            max_user = max_user.max(Some(user));
            max_item = max_item.max(Some(item));
            *summed.entry((user, item)).or_insert(0.0) += weight;
        }

        let num_users = self.num_users.unwrap_or_else(|| max_user.map_or(0, |u| u + 1));
        let num_items = self.num_items.unwrap_or_else(|| max_item.map_or(0, |i| i + 1));

        if let Some(&(user, item)) = summed
            .keys()
            .find(|&&(u, i)| u >= num_users || i >= num_items)
        {
            return Err(RecError::InteractionOutOfBounds { user, item, num_users, num_items });
        }

        let by_user = CsrMatrix::from_sorted(
            num_users,
            num_items,
            summed
                .into_iter()
                .filter(|&(_, w)| w > 0.0)
                .map(|((u, i), w)| (u, i, w)),
        );
        let by_item = by_user.transpose();

        Ok(ConfidenceMatrix { by_user, by_item })
    }
}

/// Build a matrix sized from the data unless explicit dimensions are given.
pub fn build_matrix(
    interactions: &[Interaction],
    num_users: Option<usize>,
    num_items: Option<usize>,
) -> RecResult<ConfidenceMatrix> {
    let mut builder = InteractionMatrixBuilder::new();
    if let Some(n) = num_users {
        builder = builder.with_num_users(n);
    }
    if let Some(n) = num_items {
        builder = builder.with_num_items(n);
    }
    builder.build(interactions)
}
