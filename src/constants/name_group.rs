use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, FromRepr, IntoEnumIterator, IntoStaticStr};

use super::{Dimension, WebsiteConstant};

/// Title index group used by the title search page (kana rows, then latin).
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
    FromRepr,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[repr(u8)]
pub enum NameGroup {
    JapaneseA = 0,
    JapaneseKa = 1,
    JapaneseSa = 2,
    JapaneseTa = 3,
    JapaneseNa = 4,
    JapaneseHa = 5,
    JapaneseMa = 6,
    JapaneseYa = 7,
    JapaneseRa = 8,
    JapaneseMisc = 9,
    LatinA = 10,
    LatinE = 11,
    LatinK = 12,
    LatinP = 13,
    LatinT = 14,
    LatinMisc = 15,
}

impl WebsiteConstant for NameGroup {
    const DIMENSION: Dimension = Dimension::NameGroup;

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
}
