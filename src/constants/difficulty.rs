use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, FromRepr, IntoEnumIterator, IntoStaticStr};

use super::{Dimension, WebsiteConstant};

/// Chart difficulty, numbered by its website id.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
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
pub enum Difficulty {
    #[strum(to_string = "basic", serialize = "bs")]
    Basic = 0,
    #[strum(to_string = "advanced", serialize = "ad")]
    Advanced = 1,
    #[strum(to_string = "expert", serialize = "ex")]
    Expert = 2,
    #[strum(to_string = "master", serialize = "ms")]
    Master = 3,
    #[strum(to_string = "remaster", serialize = "rms", serialize = "re_master")]
    Remaster = 4,
    #[strum(to_string = "utage")]
    Utage = 10,
}

impl Difficulty {
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::from_repr(value)
    }

    /// Short label printed on chart jackets.
    pub fn abbrev(self) -> &'static str {
        match self {
            Self::Basic => "BS",
            Self::Advanced => "AD",
            Self::Expert => "EX",
            Self::Master => "MS",
            Self::Remaster => "RMS",
            Self::Utage => "UTAGE",
        }
    }

    /// The name used in page class names and image file names
    /// (`music_master_score_back`, `diff_master.png`).
    pub fn page_name(self) -> &'static str {
        self.into()
    }
}

impl WebsiteConstant for Difficulty {
    const DIMENSION: Dimension = Dimension::Difficulty;

    fn web_id(self) -> u32 {
        u32::from(self as u8)
    }

    fn key(self) -> String {
        self.page_name().to_string()
    }

    fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    fn from_key(key: &str) -> Option<Self> {
        key.parse().ok()
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.page_name())
    }
}
