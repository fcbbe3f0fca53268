use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

/// Achievement flag shown as an icon next to a score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum AchievementFlag {
    Fc,
    FcPlus,
    Ap,
    ApPlus,
    Sync,
    Fs,
    FsPlus,
    Fsd,
    FsdPlus,
}

/// Combo grades from best to worst; a score without any of them ranks last.
pub const COMBO_TIERS: [AchievementFlag; 4] = [
    AchievementFlag::ApPlus,
    AchievementFlag::Ap,
    AchievementFlag::FcPlus,
    AchievementFlag::Fc,
];

impl AchievementFlag {
    /// Key used in record icon file names (`music_icon_fcp.png`).
    #[must_use]
    pub fn record_key(self) -> &'static str {
        match self {
            Self::Fc => "fc",
            Self::FcPlus => "fcp",
            Self::Ap => "ap",
            Self::ApPlus => "app",
            Self::Sync => "sync",
            Self::Fs => "fs",
            Self::FsPlus => "fsp",
            Self::Fsd => "fsd",
            Self::FsdPlus => "fsdp",
        }
    }

    /// Key used in play result icon file names (`fcplus.png`).
    #[must_use]
    pub fn result_key(self) -> &'static str {
        match self {
            Self::Fc => "fc",
            Self::FcPlus => "fcplus",
            Self::Ap => "ap",
            Self::ApPlus => "applus",
            Self::Sync => "sync",
            Self::Fs => "fs",
            Self::FsPlus => "fsplus",
            Self::Fsd => "fsd",
            Self::FsdPlus => "fsdplus",
        }
    }

    #[must_use]
    pub fn from_record_key(key: &str) -> Option<Self> {
        Self::iter().find(|flag| flag.record_key().eq_ignore_ascii_case(key))
    }

    #[must_use]
    pub fn from_result_key(key: &str) -> Option<Self> {
        Self::iter().find(|flag| flag.result_key().eq_ignore_ascii_case(key))
    }

    /// Position in [`COMBO_TIERS`], or `None` for non-combo flags.
    #[must_use]
    pub fn combo_tier(self) -> Option<usize> {
        COMBO_TIERS.iter().position(|tier| *tier == self)
    }
}

impl fmt::Display for AchievementFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fc => "FC",
            Self::FcPlus => "FC+",
            Self::Ap => "AP",
            Self::ApPlus => "AP+",
            Self::Sync => "SYNC",
            Self::Fs => "FS",
            Self::FsPlus => "FS+",
            Self::Fsd => "FSD",
            Self::FsdPlus => "FSD+",
        })
    }
}
