use crate::models::ScoredItem;
use std::cmp::Ordering;

pub mod validation;

/// Descending score, then ascending item index.
pub fn rank_order(a: &ScoredItem, b: &ScoredItem) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.item.cmp(&b.item))
}

/// Keep the `n` best candidates in [`rank_order`].
pub fn top_n<I>(candidates: I, n: usize) -> Vec<ScoredItem>
where
    I: IntoIterator<Item = ScoredItem>,
{
    if n == 0 {
        return Vec::new();
    }

    let mut scored: Vec<ScoredItem> = candidates.into_iter().collect();
    if scored.len() > n {
        scored.select_nth_unstable_by(n - 1, rank_order);
        scored.truncate(n);
    }
    scored.sort_unstable_by(rank_order);
    scored
}

/// Stable de-duplication keeping the first occurrence.
pub fn dedup_stable<T, I>(items: I) -> Vec<T>
where
    T: std::hash::Hash + Eq + Copy,
    I: IntoIterator<Item = T>,
{
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|item| seen.insert(*item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(raw: &[(usize, f32)]) -> Vec<ScoredItem> {
        raw.iter().map(|&(item, score)| ScoredItem { item, score }).collect()
    }

    #[test]
    fn test_top_n() {
        let top = top_n(scored(&[(0, 0.1), (1, 0.5), (2, 0.3), (3, 0.9), (4, 0.2)]), 2);
        assert_eq!(top, scored(&[(3, 0.9), (1, 0.5)]));
    }

    #[test]
    fn test_top_n_ties_by_index() {
        let top = top_n(scored(&[(5, 1.0), (2, 1.0), (7, 1.0), (1, 0.0)]), 3);
        assert_eq!(top, scored(&[(2, 1.0), (5, 1.0), (7, 1.0)]));
    }

    #[test]
    fn test_top_n_short_input() {
        assert_eq!(top_n(scored(&[(1, 0.2), (0, 0.4)]), 10), scored(&[(0, 0.4), (1, 0.2)]));
        assert!(top_n(scored(&[(1, 0.2)]), 0).is_empty());
    }

    #[test]
    fn test_dedup_stable() {
        assert_eq!(dedup_stable(vec![3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }
}
