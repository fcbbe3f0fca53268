//! Website constant tables and value normalization.
//!
//! Every category the score pages can be filtered by is a closed table that
//! maps a symbolic key to the numeric id used in website query parameters.
//! [`normalize`] turns caller input (either form) into that numeric id and
//! [`lookup`] is its inverse.
//!
//! Numeric input is validated by membership in the dimension's fixed id
//! ranges, never by attempting a lookup and catching the failure.

mod difficulty;
mod error;
mod flag;
mod genre;
mod level;
mod name_group;
mod rank;
mod sort;
mod version;

pub use difficulty::Difficulty;
pub use error::ParameterError;
pub use flag::{AchievementFlag, COMBO_TIERS};
pub use genre::Genre;
pub use level::LevelGroup;
pub use name_group::NameGroup;
pub use rank::ScoreRank;
pub use sort::{SortMetric, SortMode};
pub use version::GameVersion;

use std::convert::Infallible;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A closed table of website constants.
pub trait WebsiteConstant: Copy + Sized {
    /// Dimension this table normalizes.
    const DIMENSION: Dimension;

    /// Numeric id used by website query parameters.
    fn web_id(self) -> u32;

    /// Canonical symbolic key.
    fn key(self) -> String;

    /// Every entry of the table, in id order.
    fn all() -> Vec<Self>;

    /// Resolves a symbolic key, ignoring ASCII case.
    fn from_key(key: &str) -> Option<Self>;

    /// Resolves a website id.
    fn from_web_id(id: u32) -> Option<Self> {
        Self::all().into_iter().find(|entry| entry.web_id() == id)
    }

    /// Returns this entry as a filter value.
    fn value(self) -> FilterValue {
        FilterValue::Id(i64::from(self.web_id()))
    }
}

/// A normalization dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Difficulty,
    Genre,
    NameGroup,
    Level,
    Version,
    Sort,
}

const DIFFICULTY_IDS: &[RangeInclusive<u32>] = &[0..=4, 10..=10];
const GENRE_IDS: &[RangeInclusive<u32>] = &[101..=106, 99..=99];
const NAME_GROUP_IDS: &[RangeInclusive<u32>] = &[0..=15];
const LEVEL_IDS: &[RangeInclusive<u32>] = &[1..=24];
const VERSION_IDS: &[RangeInclusive<u32>] = &[0..=26];
const SORT_IDS: &[RangeInclusive<u32>] = &[1..=6];

impl Dimension {
    /// Returns the symbolic name of the dimension.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Difficulty => "difficulty",
            Self::Genre => "genre",
            Self::NameGroup => "name_group",
            Self::Level => "level",
            Self::Version => "version",
            Self::Sort => "sort",
        }
    }

    /// Returns the legal website id ranges for this dimension.
    #[must_use]
    pub fn id_ranges(self) -> &'static [RangeInclusive<u32>] {
        match self {
            Self::Difficulty => DIFFICULTY_IDS,
            Self::Genre => GENRE_IDS,
            Self::NameGroup => NAME_GROUP_IDS,
            Self::Level => LEVEL_IDS,
            Self::Version => VERSION_IDS,
            Self::Sort => SORT_IDS,
        }
    }

    /// Returns true if `id` lies in one of the dimension's id ranges.
    #[must_use]
    pub fn contains_id(self, id: u32) -> bool {
        self.id_ranges().iter().any(|range| range.contains(&id))
    }

    /// Renders the id ranges for error messages.
    #[must_use]
    pub fn describe_ranges(self) -> String {
        self.id_ranges()
            .iter()
            .map(|range| {
                if range.start() == range.end() {
                    range.start().to_string()
                } else {
                    format!("{}..={}", range.start(), range.end())
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The website id that already means "every value", if the site has one.
    #[must_use]
    pub fn all_id(self) -> Option<u32> {
        match self {
            Self::Genre => Some(Genre::All.web_id()),
            _ => None,
        }
    }

    /// Every concrete (non-"all") id of the dimension, in id order.
    #[must_use]
    pub fn concrete_ids(self) -> Vec<u32> {
        match self {
            Self::Difficulty => ids_of::<Difficulty>(),
            Self::Genre => Genre::all()
                .into_iter()
                .filter(|genre| *genre != Genre::All)
                .map(WebsiteConstant::web_id)
                .collect(),
            Self::NameGroup => ids_of::<NameGroup>(),
            Self::Level => ids_of::<LevelGroup>(),
            Self::Version => ids_of::<GameVersion>(),
            Self::Sort => ids_of::<SortMode>(),
        }
    }

    fn resolve_key(self, key: &str) -> Option<u32> {
        match self {
            Self::Difficulty => key_to_id::<Difficulty>(key),
            Self::Genre => key_to_id::<Genre>(key),
            Self::NameGroup => key_to_id::<NameGroup>(key),
            Self::Level => key_to_id::<LevelGroup>(key),
            Self::Version => key_to_id::<GameVersion>(key),
            Self::Sort => key_to_id::<SortMode>(key),
        }
    }

    fn key_of(self, id: u32) -> Option<String> {
        match self {
            Self::Difficulty => id_to_key::<Difficulty>(id),
            Self::Genre => id_to_key::<Genre>(id),
            Self::NameGroup => id_to_key::<NameGroup>(id),
            Self::Level => id_to_key::<LevelGroup>(id),
            Self::Version => id_to_key::<GameVersion>(id),
            Self::Sort => id_to_key::<SortMode>(id),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn ids_of<T: WebsiteConstant>() -> Vec<u32> {
    T::all().into_iter().map(WebsiteConstant::web_id).collect()
}

fn key_to_id<T: WebsiteConstant>(key: &str) -> Option<u32> {
    T::from_key(key.trim()).map(WebsiteConstant::web_id)
}

fn id_to_key<T: WebsiteConstant>(id: u32) -> Option<String> {
    T::from_web_id(id).map(WebsiteConstant::key)
}

/// Caller-supplied value for a dimension: a raw website id or a symbolic key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Id(i64),
    Key(String),
}

impl FromStr for FilterValue {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(trimmed
            .parse::<i64>()
            .map_or_else(|_| Self::Key(trimmed.to_string()), Self::Id))
    }
}

impl From<i64> for FilterValue {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for FilterValue {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Key(key) => f.write_str(key),
        }
    }
}

/// Normalizes a caller value into the dimension's numeric website id.
///
/// # Errors
///
/// - [`ParameterError::InvalidParameter`] when a numeric id lies outside the
///   dimension's id ranges.
/// - [`ParameterError::InvalidType`] when a key is not in the table.
pub fn normalize(dimension: Dimension, value: &FilterValue) -> Result<u32, ParameterError> {
    match value {
        FilterValue::Id(raw) => u32::try_from(*raw)
            .ok()
            .filter(|id| dimension.contains_id(*id))
            .ok_or_else(|| ParameterError::out_of_range(dimension, *raw)),
        FilterValue::Key(key) => dimension
            .resolve_key(key)
            .ok_or_else(|| ParameterError::unknown_key(dimension, key)),
    }
}

/// Maps a website id back to its symbolic key.
#[must_use]
pub fn lookup(dimension: Dimension, id: u32) -> Option<String> {
    dimension.key_of(id)
}
