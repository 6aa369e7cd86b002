use super::Recommender;
use crate::error::RecResult;
use crate::utils::dedup_stable;
use std::collections::HashSet;
use tracing::debug;

/// Over-fetch applied per seed when nothing else is configured.
pub const DEFAULT_OVER_FETCH_MARGIN: usize = 20;

/// Merges per-seed similarity lists for "more like these" queries.
///
/// Candidates keep the order in which they were first seen (seed order, then
/// each seed's ranking); duplicates and seeds are dropped and the list is cut
/// to `n`. There is no re-ranking across seeds.
#[derive(Debug, Clone, Copy)]
pub struct SimilarItemSelector {
    margin: usize,
}

impl Default for SimilarItemSelector {
    fn default() -> Self {
        Self::new(DEFAULT_OVER_FETCH_MARGIN)
    }
}

impl SimilarItemSelector {
    pub fn new(margin: usize) -> Self {
        Self { margin }
    }

    /// A seed's list can contain every other seed, so the margin never drops
    /// below the seed count.
    pub fn effective_margin(&self, distinct_seeds: usize) -> usize {
        self.margin.max(distinct_seeds)
    }

    pub fn select<R>(&self, source: &R, seeds: &[usize], n: usize) -> RecResult<Vec<usize>>
    where
        R: Recommender + ?Sized,
    {
        let seeds = dedup_stable(seeds.iter().copied());
        if seeds.is_empty() || n == 0 {
            return Ok(Vec::new());
        }

        // `n` may exceed the universe; the source caps each list itself.
        let fetch = n.saturating_add(self.effective_margin(seeds.len()));
        let mut candidates = Vec::new();
        for &seed in &seeds {
            candidates.extend(source.similar_items(seed, fetch)?.into_iter().map(|s| s.item));
        }

        let seed_set: HashSet<usize> = seeds.iter().copied().collect();
        let mut selected: Vec<usize> = dedup_stable(candidates)
            .into_iter()
            .filter(|item| !seed_set.contains(item))
            .collect();
        selected.truncate(n);

        debug!(
            "Selected {} similar items for {} seeds (fetched {} per seed)",
            selected.len(),
            seeds.len(),
            fetch
        );
        Ok(selected)
    }
}

/// Items similar to a set of seeds with the default over-fetch margin.
pub fn select_similar_for_seeds<R>(source: &R, seeds: &[usize], n: usize) -> RecResult<Vec<usize>>
where
    R: Recommender + ?Sized,
{
    SimilarItemSelector::default().select(source, seeds, n)
}
