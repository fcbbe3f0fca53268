use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

/// Score rank reached by an achievement rate, worst to best.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum ScoreRank {
    D,
    C,
    B,
    Bb,
    Bbb,
    A,
    Aa,
    Aaa,
    S,
    #[strum(to_string = "sp", serialize = "splus")]
    Sp,
    Ss,
    #[strum(to_string = "ssp", serialize = "ssplus")]
    Ssp,
    Sss,
    #[strum(to_string = "sssp", serialize = "sssplus")]
    Sssp,
}

impl ScoreRank {
    /// Parses an icon key (`sssp`, `sssplus`, `aaa`).
    #[must_use]
    pub fn from_icon_key(key: &str) -> Option<Self> {
        key.parse().ok()
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for ScoreRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.key().to_ascii_uppercase();
        match key.strip_suffix('P') {
            Some(base) => write!(f, "{base}+"),
            None => f.write_str(&key),
        }
    }
}
