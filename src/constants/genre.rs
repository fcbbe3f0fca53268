use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use super::{Dimension, WebsiteConstant};

/// Song genre as grouped by the genre search page.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Genre {
    #[strum(to_string = "pop_anime", serialize = "pops_anime")]
    PopAnime,
    Niconico,
    Touhou,
    Variety,
    Maimai,
    #[strum(to_string = "siblings", serialize = "ongeki_chunithm")]
    Siblings,
    All,
}

impl WebsiteConstant for Genre {
    const DIMENSION: Dimension = Dimension::Genre;

    fn web_id(self) -> u32 {
        match self {
            Self::PopAnime => 101,
            Self::Niconico => 102,
            Self::Touhou => 103,
            Self::Variety => 104,
            Self::Maimai => 105,
            Self::Siblings => 106,
            Self::All => 99,
        }
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
}
