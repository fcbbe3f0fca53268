use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, FromRepr, IntoEnumIterator, IntoStaticStr};

use super::{Dimension, WebsiteConstant};

/// Metric a score list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMetric {
    /// Achievement rate.
    Score,
    /// Deluxe score over its maximum.
    DeluxeRatio,
    /// Best combo grade in [`super::COMBO_TIERS`].
    ComboGrade,
}

/// Sort mode selector of the score search pages.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    FromRepr,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
pub enum SortMode {
    #[default]
    #[strum(to_string = "score_desc", serialize = "score")]
    ScoreDesc = 1,
    #[strum(to_string = "score_asc")]
    ScoreAsc = 2,
    #[strum(to_string = "deluxe_desc", serialize = "deluxe")]
    DeluxeDesc = 3,
    #[strum(to_string = "deluxe_asc")]
    DeluxeAsc = 4,
    #[strum(to_string = "combo_desc", serialize = "combo")]
    ComboDesc = 5,
    #[strum(to_string = "combo_asc")]
    ComboAsc = 6,
}

impl SortMode {
    #[must_use]
    pub fn metric(self) -> SortMetric {
        match self {
            Self::ScoreDesc | Self::ScoreAsc => SortMetric::Score,
            Self::DeluxeDesc | Self::DeluxeAsc => SortMetric::DeluxeRatio,
            Self::ComboDesc | Self::ComboAsc => SortMetric::ComboGrade,
        }
    }

    /// Best first.
    #[must_use]
    pub fn is_descending(self) -> bool {
        matches!(self, Self::ScoreDesc | Self::DeluxeDesc | Self::ComboDesc)
    }
}

impl WebsiteConstant for SortMode {
    const DIMENSION: Dimension = Dimension::Sort;

    fn web_id(self) -> u32 {
        u32::from(self as u8)
    }

    fn key(self) -> String {
        let key: &'static str = self.into();
        key.to_string()
    }

    fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    fn from_key(key: &str) -> Option<Self> {
        key.parse().ok()
    }

    fn from_web_id(id: u32) -> Option<Self> {
        u8::try_from(id).ok().and_then(Self::from_repr)
    }
}
