//! Query evaluation.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::rank::sort_entries;
use super::{CustomQuery, NormalizedQuery};
use crate::client::ClientError;
use crate::constants::{Difficulty, Dimension};
use crate::model::{IdentityKey, ScoreCategory, ScoreList};

/// Fetches one score search page.
#[async_trait]
pub trait ScoreSource: Send {
    /// Fetches the page listing `id` of `dimension`. `difficulty` is `None`
    /// for level pages, which list every difficulty.
    async fn score_page(
        &mut self,
        dimension: Dimension,
        id: u32,
        difficulty: Option<Difficulty>,
    ) -> Result<ScoreList, ClientError>;
}

/// Runs `query` against `source`, one fetch at a time.
///
/// # Errors
///
/// [`ClientError::Parameter`] before any fetch when a value does not
/// normalize; otherwise the first fetch error.
#[instrument(skip(source, query), fields(filters = query.filters.len()))]
pub async fn run<S: ScoreSource + ?Sized>(
    source: &mut S,
    query: &CustomQuery,
) -> Result<ScoreList, ClientError> {
    let query = query.normalize()?;
    let mut fetches = 0_usize;

    let Some(((head, head_ids), rest)) = query.filters.split_first() else {
        return Ok(ScoreList::default());
    };

    let mut buckets = Buckets::default();
    for id in expand(*head, head_ids.as_deref()) {
        for difficulty in fetch_difficulties(*head, &query) {
            let page = source.score_page(*head, id, difficulty).await?;
            fetches += 1;
            buckets.merge(page, &query);
        }
    }
    let mut candidates = buckets.identities();
    debug!(dimension = %head, candidates = candidates.len(), "head filter fetched");

    let representative = query.representative_difficulty();
    for (dimension, ids) in rest {
        let Some(ids) = ids else {
            continue;
        };
        if candidates.is_empty() {
            debug!(%dimension, "no candidates left, skipping remaining filters");
            break;
        }

        let mut matched = HashSet::new();
        for id in ids {
            let difficulty = if *dimension == Dimension::Level { None } else { representative };
            let page = source.score_page(*dimension, *id, difficulty).await?;
            fetches += 1;
            matched.extend(
                page.entries()
                    .filter(|entry| {
                        *dimension != Dimension::Level
                            || query.difficulties.contains(&entry.chart.difficulty)
                    })
                    .map(crate::model::ScoreEntry::identity),
            );
        }
        candidates.retain(|key| matched.contains(key));
        debug!(%dimension, candidates = candidates.len(), "filter applied");
    }

    let list = buckets.finish(&candidates, &query);
    info!(fetches, entries = list.len(), sort = ?query.sort, "custom query finished");
    Ok(list)
}

/// Ids to fetch for the head dimension.
fn expand(dimension: Dimension, ids: Option<&[u32]>) -> Vec<u32> {
    match ids {
        Some(ids) => ids.to_vec(),
        None => dimension
            .all_id()
            .map_or_else(|| dimension.concrete_ids(), |all| vec![all]),
    }
}

/// Difficulties to fetch for each head value; level pages are fetched once.
fn fetch_difficulties(dimension: Dimension, query: &NormalizedQuery) -> Vec<Option<Difficulty>> {
    if dimension == Dimension::Level {
        vec![None]
    } else {
        query.difficulties.iter().copied().map(Some).collect()
    }
}

/// Head results grouped by (category, difficulty), in first-seen order.
#[derive(Debug, Default)]
struct Buckets {
    categories: Vec<ScoreCategory>,
    seen: Vec<HashSet<IdentityKey>>,
}

impl Buckets {
    fn merge(&mut self, page: ScoreList, query: &NormalizedQuery) {
        for category in page.categories {
            for entry in category.entries {
                let difficulty = entry.chart.difficulty;
                if !query.difficulties.contains(&difficulty) {
                    continue;
                }
                let index = self.bucket(&category.name, difficulty);
                if self.seen[index].insert(entry.identity()) {
                    self.categories[index].entries.push(entry);
                }
            }
        }
    }

    fn bucket(&mut self, name: &str, difficulty: Difficulty) -> usize {
        if let Some(index) = self
            .categories
            .iter()
            .position(|category| category.name == name && category.difficulty == difficulty)
        {
            return index;
        }
        self.categories.push(ScoreCategory {
            name: name.to_string(),
            difficulty,
            entries: Vec::new(),
        });
        self.seen.push(HashSet::new());
        self.categories.len() - 1
    }

    fn identities(&self) -> HashSet<IdentityKey> {
        self.seen.iter().flatten().cloned().collect()
    }

    /// Keeps the candidates, sorts every bucket and drops empty ones.
    fn finish(self, candidates: &HashSet<IdentityKey>, query: &NormalizedQuery) -> ScoreList {
        let categories = self
            .categories
            .into_iter()
            .filter_map(|mut category| {
                category.entries.retain(|entry| candidates.contains(&entry.identity()));
                if category.entries.is_empty() {
                    return None;
                }
                category.entries = sort_entries(category.entries, query.sort);
                Some(category)
            })
            .collect();
        ScoreList { categories }
    }
}
