//! Rank vectors and stable ordering of score entries.
//!
//! For each [`SortMetric`] two rank vectors are computed over the scored
//! entries, one per direction. Equal metric values share a rank. Entries
//! without a recorded score rank after every scored entry in every vector,
//! in their input order. Sorting uses `(rank, input index)`, so ties keep
//! their input order.

use std::cmp::Ordering;

use crate::constants::{COMBO_TIERS, SortMetric, SortMode};
use crate::model::{ScoreEntry, ScoreRecord};

/// Rank of every entry for one metric, best first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RankVectors {
    pub score_desc: Vec<usize>,
    pub score_asc: Vec<usize>,
    pub deluxe_desc: Vec<usize>,
    pub deluxe_asc: Vec<usize>,
    pub combo_desc: Vec<usize>,
    pub combo_asc: Vec<usize>,
}

impl RankVectors {
    #[must_use]
    pub fn compute(entries: &[ScoreEntry]) -> Self {
        Self {
            score_desc: ranks(entries, SortMetric::Score, true),
            score_asc: ranks(entries, SortMetric::Score, false),
            deluxe_desc: ranks(entries, SortMetric::DeluxeRatio, true),
            deluxe_asc: ranks(entries, SortMetric::DeluxeRatio, false),
            combo_desc: ranks(entries, SortMetric::ComboGrade, true),
            combo_asc: ranks(entries, SortMetric::ComboGrade, false),
        }
    }

    /// The vector a sort mode orders by.
    #[must_use]
    pub fn for_mode(&self, mode: SortMode) -> &[usize] {
        match mode {
            SortMode::ScoreDesc => &self.score_desc,
            SortMode::ScoreAsc => &self.score_asc,
            SortMode::DeluxeDesc => &self.deluxe_desc,
            SortMode::DeluxeAsc => &self.deluxe_asc,
            SortMode::ComboDesc => &self.combo_desc,
            SortMode::ComboAsc => &self.combo_asc,
        }
    }
}

/// Value of `metric`; higher is better for every metric.
fn metric_value(record: &ScoreRecord, metric: SortMetric) -> f64 {
    match metric {
        SortMetric::Score => f64::from(record.achievement.0),
        SortMetric::DeluxeRatio => record.deluxe_ratio(),
        // AP+ is tier 0; no combo flag ranks below FC.
        SortMetric::ComboGrade => record
            .combo_tier()
            .map_or(0.0, |tier| f64::from(u32::try_from(COMBO_TIERS.len() - tier).unwrap_or(0))),
    }
}

fn ranks(entries: &[ScoreEntry], metric: SortMetric, descending: bool) -> Vec<usize> {
    let order = |a: &f64, b: &f64| -> Ordering {
        if descending { b.total_cmp(a) } else { a.total_cmp(b) }
    };

    let mut distinct: Vec<f64> = entries
        .iter()
        .filter_map(|entry| entry.score.as_ref())
        .map(|record| metric_value(record, metric))
        .collect();
    distinct.sort_by(order);
    distinct.dedup_by(|a, b| a.total_cmp(b).is_eq());

    let scored_ranks = distinct.len();
    let mut unscored = 0;
    entries
        .iter()
        .map(|entry| match &entry.score {
            Some(record) => {
                let value = metric_value(record, metric);
                distinct
                    .binary_search_by(|candidate| order(candidate, &value))
                    .unwrap_or_else(|position| position)
            }
            None => {
                unscored += 1;
                scored_ranks + unscored - 1
            }
        })
        .collect()
}

/// Orders `entries` by `mode`, keeping input order among ties.
#[must_use]
pub fn sort_entries(entries: Vec<ScoreEntry>, mode: SortMode) -> Vec<ScoreEntry> {
    let vectors = RankVectors::compute(&entries);
    let ranks = vectors.for_mode(mode);

    let mut keyed: Vec<(usize, usize, ScoreEntry)> = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| (ranks[index], index, entry))
        .collect();
    keyed.sort_by_key(|(rank, index, _)| (*rank, *index));
    keyed.into_iter().map(|(_, _, entry)| entry).collect()
}
