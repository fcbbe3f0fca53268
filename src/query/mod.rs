//! Multi-criteria best-score queries.
//!
//! A [`CustomQuery`] names a sort mode, a set of difficulties and an ordered
//! list of filter dimensions. The first dimension (the head) is fetched for
//! every value and difficulty and seeds the result; each later dimension is
//! fetched once per value and narrows the candidates by [`IdentityKey`]
//! intersection. Entries are then ranked per category bucket; see [`rank`].
//!
//! Every value is normalized before the first fetch, so an invalid query
//! never reaches the network.
//!
//! [`IdentityKey`]: crate::model::IdentityKey

mod engine;
pub mod rank;

pub use engine::{ScoreSource, run};

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    Difficulty, Dimension, FilterValue, ParameterError, SortMode, WebsiteConstant, normalize,
};

/// Values selected for one filter dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterSelection {
    /// No restriction.
    All,
    /// Union of the listed values.
    Values(Vec<FilterValue>),
}

impl FilterSelection {
    #[must_use]
    pub fn values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        Self::Values(values.into_iter().map(Into::into).collect())
    }
}

impl FromStr for FilterSelection {
    type Err = Infallible;

    /// Parses `all` or a comma-separated list of ids and keys.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Ok(Self::Values(
            s.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| FilterValue::from_str(part).unwrap_or_else(|never| match never {}))
                .collect(),
        ))
    }
}

/// A best-score query over several filter dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomQuery {
    pub sort: FilterValue,
    pub difficulties: Vec<FilterValue>,
    /// Filter dimensions in evaluation order; the first is the head.
    pub filters: Vec<(Dimension, FilterSelection)>,
}

impl Default for CustomQuery {
    fn default() -> Self {
        Self {
            sort: SortMode::default().value(),
            difficulties: Vec::new(),
            filters: Vec::new(),
        }
    }
}

impl CustomQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sort(mut self, sort: impl Into<FilterValue>) -> Self {
        self.sort = sort.into();
        self
    }

    #[must_use]
    pub fn difficulties<I, V>(mut self, difficulties: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        self.difficulties = difficulties.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a filter dimension.
    #[must_use]
    pub fn filter(mut self, dimension: Dimension, selection: FilterSelection) -> Self {
        self.filters.push((dimension, selection));
        self
    }

    /// Normalizes every value of the query.
    ///
    /// # Errors
    ///
    /// - [`ParameterError::InvalidParameter`] for out-of-range ids, an empty
    ///   difficulty set, an empty value list, a repeated dimension, or a
    ///   dimension that cannot filter (difficulty, sort).
    /// - [`ParameterError::InvalidType`] for unknown keys.
    pub fn normalize(&self) -> Result<NormalizedQuery, ParameterError> {
        let sort_id = normalize(Dimension::Sort, &self.sort)?;
        let sort = SortMode::from_web_id(sort_id)
            .ok_or_else(|| ParameterError::out_of_range(Dimension::Sort, i64::from(sort_id)))?;

        if self.difficulties.is_empty() {
            return Err(ParameterError::invalid(
                Dimension::Difficulty,
                "[]",
                "Select at least one difficulty",
            ));
        }
        let mut difficulties = BTreeSet::new();
        for value in &self.difficulties {
            let id = normalize(Dimension::Difficulty, value)?;
            let difficulty = Difficulty::from_web_id(id)
                .ok_or_else(|| ParameterError::out_of_range(Dimension::Difficulty, i64::from(id)))?;
            difficulties.insert(difficulty);
        }

        let mut filters: Vec<(Dimension, Option<Vec<u32>>)> =
            Vec::with_capacity(self.filters.len());
        for (dimension, selection) in &self.filters {
            if !is_filter_dimension(*dimension) {
                return Err(ParameterError::invalid(
                    *dimension,
                    dimension.as_str(),
                    "Filter by genre, name_group, level or version",
                ));
            }
            if filters.iter().any(|(seen, _)| seen == dimension) {
                return Err(ParameterError::invalid(
                    *dimension,
                    dimension.as_str(),
                    "List each filter dimension once",
                ));
            }
            filters.push((*dimension, normalize_selection(*dimension, selection)?));
        }
        if filters.is_empty() {
            filters.push((Dimension::Genre, None));
        }

        Ok(NormalizedQuery {
            sort,
            difficulties,
            filters,
        })
    }
}

/// A query whose values are all website ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    pub sort: SortMode,
    /// Requested difficulties, lowest first.
    pub difficulties: BTreeSet<Difficulty>,
    /// Filter dimensions in order; `None` selects every value.
    pub filters: Vec<(Dimension, Option<Vec<u32>>)>,
}

impl NormalizedQuery {
    /// Lowest requested difficulty, used for the narrowing fetches.
    #[must_use]
    pub fn representative_difficulty(&self) -> Option<Difficulty> {
        self.difficulties.first().copied()
    }
}

fn is_filter_dimension(dimension: Dimension) -> bool {
    matches!(
        dimension,
        Dimension::Genre | Dimension::NameGroup | Dimension::Level | Dimension::Version
    )
}

/// Normalized ids in first-seen order; `None` for "all".
fn normalize_selection(
    dimension: Dimension,
    selection: &FilterSelection,
) -> Result<Option<Vec<u32>>, ParameterError> {
    let FilterSelection::Values(values) = selection else {
        return Ok(None);
    };
    if values.is_empty() {
        return Err(ParameterError::invalid(
            dimension,
            "[]",
            "Select at least one value or 'all'",
        ));
    }

    let mut ids = Vec::with_capacity(values.len());
    for value in values {
        let id = normalize(dimension, value)?;
        if dimension.all_id() == Some(id) {
            return Ok(None);
        }
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(Some(ids))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_resolves_keys_and_dedupes() {
        let query = CustomQuery::new()
            .sort("deluxe")
            .difficulties(["master", "expert", "MS"])
            .filter(
                Dimension::Genre,
                FilterSelection::Values(vec![
                    "touhou".into(),
                    FilterValue::Id(103),
                    "pop_anime".into(),
                ]),
            )
            .filter(Dimension::Level, FilterSelection::values(["13+"]));

        let normalized = query.normalize().unwrap();

        assert_eq!(normalized.sort, SortMode::DeluxeDesc);
        assert_eq!(
            normalized.difficulties.iter().copied().collect::<Vec<_>>(),
            vec![Difficulty::Expert, Difficulty::Master]
        );
        assert_eq!(normalized.representative_difficulty(), Some(Difficulty::Expert));
        assert_eq!(
            normalized.filters,
            vec![(Dimension::Genre, Some(vec![103, 101])), (Dimension::Level, Some(vec![20]))]
        );
    }

    #[test]
    fn test_no_filters_defaults_to_all_genres() {
        let normalized = CustomQuery::new().difficulties(["basic"]).normalize().unwrap();
        assert_eq!(normalized.filters, vec![(Dimension::Genre, None)]);
        assert_eq!(normalized.sort, SortMode::ScoreDesc);
    }

    #[test]
    fn test_genre_all_key_selects_everything() {
        let normalized = CustomQuery::new()
            .difficulties(["basic"])
            .filter(Dimension::Genre, FilterSelection::values(["maimai", "all"]))
            .normalize()
            .unwrap();
        assert_eq!(normalized.filters, vec![(Dimension::Genre, None)]);
    }

    #[test]
    fn test_invalid_queries() {
        let base = || CustomQuery::new().difficulties(["master"]);

        let err = CustomQuery::new().normalize().unwrap_err();
        assert_eq!(err.dimension(), Dimension::Difficulty);

        let err = base().sort(7_i64).normalize().unwrap_err();
        assert!(matches!(err, ParameterError::InvalidParameter { dimension: Dimension::Sort, .. }));

        let err = base()
            .filter(Dimension::Version, FilterSelection::values([99_i64]))
            .normalize()
            .unwrap_err();
        assert!(matches!(err, ParameterError::InvalidParameter { .. }));

        let err = base()
            .filter(Dimension::NameGroup, FilterSelection::values(["nope"]))
            .normalize()
            .unwrap_err();
        assert!(matches!(err, ParameterError::InvalidType { .. }));

        let err = base()
            .filter(Dimension::Genre, FilterSelection::Values(Vec::new()))
            .normalize()
            .unwrap_err();
        assert!(matches!(err, ParameterError::InvalidParameter { .. }));

        let err = base()
            .filter(Dimension::Genre, FilterSelection::All)
            .filter(Dimension::Genre, FilterSelection::values(["maimai"]))
            .normalize()
            .unwrap_err();
        assert!(matches!(err, ParameterError::InvalidParameter { .. }));

        let err = base()
            .filter(Dimension::Sort, FilterSelection::All)
            .normalize()
            .unwrap_err();
        assert!(matches!(err, ParameterError::InvalidParameter { dimension: Dimension::Sort, .. }));
    }

    #[test]
    fn test_filter_selection_from_str() {
        assert_eq!("ALL".parse::<FilterSelection>().unwrap(), FilterSelection::All);
        assert_eq!(
            "pop_anime, 103".parse::<FilterSelection>().unwrap(),
            FilterSelection::Values(vec!["pop_anime".into(), FilterValue::Id(103)])
        );
    }
}
