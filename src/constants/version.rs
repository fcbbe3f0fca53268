use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, FromRepr, IntoEnumIterator, IntoStaticStr};

use super::{Dimension, WebsiteConstant};

/// Game release, numbered by its version search page id (release order).
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[repr(u8)]
pub enum GameVersion {
    Maimai = 0,
    MaimaiPlus,
    Green,
    GreenPlus,
    Orange,
    OrangePlus,
    Pink,
    PinkPlus,
    Murasaki,
    MurasakiPlus,
    Milk,
    MilkPlus,
    Finale,
    Deluxe,
    DeluxePlus,
    Splash,
    SplashPlus,
    Universe,
    UniversePlus,
    Festival,
    FestivalPlus,
    Buddies,
    BuddiesPlus,
    Prism,
    PrismPlus,
    Circle,
    CirclePlus,
}

impl GameVersion {
    /// Returns true for the releases before the deluxe generation.
    #[must_use]
    pub fn is_original(self) -> bool {
        self < Self::Deluxe
    }

    /// Internal game version code (`maimai` = 100, `FiNALE` = 199,
    /// `DX` = 200, each deluxe release +5).
    #[must_use]
    pub fn version_code(self) -> u32 {
        let index = u32::from(self as u8);
        let deluxe_index = u32::from(Self::Deluxe as u8);
        match index {
            0..=8 => 100 + index * 10,
            _ if index < deluxe_index => (180 + (index - 8) * 5).min(199),
            _ => 200 + (index - deluxe_index) * 5,
        }
    }
}

impl WebsiteConstant for GameVersion {
    const DIMENSION: Dimension = Dimension::Version;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_web_ids_follow_release_order() {
        assert_eq!(GameVersion::Maimai.web_id(), 0);
        assert_eq!(GameVersion::Finale.web_id(), 12);
        assert_eq!(GameVersion::Deluxe.web_id(), 13);
        assert_eq!(GameVersion::CirclePlus.web_id(), 26);
    }

    #[test]
    fn test_version_codes() {
        assert_eq!(GameVersion::Maimai.version_code(), 100);
        assert_eq!(GameVersion::Murasaki.version_code(), 180);
        assert_eq!(GameVersion::MurasakiPlus.version_code(), 185);
        assert_eq!(GameVersion::Milk.version_code(), 190);
        assert_eq!(GameVersion::MilkPlus.version_code(), 195);
        assert_eq!(GameVersion::Finale.version_code(), 199);
        assert_eq!(GameVersion::Deluxe.version_code(), 200);
        assert_eq!(GameVersion::PrismPlus.version_code(), 255);
    }

    #[test]
    fn test_version_keys() {
        assert_eq!(GameVersion::from_key("festival_plus"), Some(GameVersion::FestivalPlus));
        assert_eq!(GameVersion::BuddiesPlus.key(), "BUDDIES_PLUS");
        assert!(GameVersion::Finale.is_original());
        assert!(!GameVersion::Deluxe.is_original());
    }
}
