//! Typed records produced by page extraction.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::constants::{AchievementFlag, COMBO_TIERS, Difficulty, ScoreRank};

/// Chart type shown by the kind icon of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Standard,
    Dx,
    Unknown,
}

impl ChartType {
    /// Parses the suffix of an icon file name (`music_dx.png` -> `dx`).
    #[must_use]
    pub fn from_icon_key(key: &str) -> Self {
        match key.to_ascii_lowercase().as_str() {
            "standard" => Self::Standard,
            "dx" | "deluxe" => Self::Dx,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standard => "standard",
            Self::Dx => "dx",
            Self::Unknown => "unknown",
        })
    }
}

/// Identifies a chart across differently filtered pages.
///
/// Website row ids are not used: they change with the page that listed the row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityKey {
    pub chart_type: ChartType,
    pub title: String,
}

/// A `value / max` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Progress {
    pub value: u32,
    pub max: u32,
}

impl Progress {
    /// `value / max`, zero when `max` is zero.
    #[must_use]
    pub fn ratio(self) -> f64 {
        if self.max == 0 {
            0.0
        } else {
            f64::from(self.value) / f64::from(self.max)
        }
    }
}

/// Achievement rate in ten-thousandths of a percent (`100.5000%` = `1_005_000`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Achievement(pub u32);

impl Achievement {
    /// Parses `"99.1234%"` or `"99.1234"`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim().trim_end_matches('%').trim();
        let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
        if whole.is_empty()
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
            || fraction.len() > 4
        {
            return None;
        }
        let whole: u32 = whole.parse().ok()?;
        let fraction: u32 = format!("{fraction:0<4}").parse().ok()?;
        whole.checked_mul(10_000)?.checked_add(fraction).map(Self)
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:04}%", self.0 / 10_000, self.0 % 10_000)
    }
}

/// Chart metadata of a listed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartInfo {
    pub title: String,
    pub chart_type: ChartType,
    pub difficulty: Difficulty,
    /// Level as displayed (`13+`, `14`).
    pub level: String,
}

/// A recorded best score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub achievement: Achievement,
    pub deluxe_score: Progress,
    pub flags: Vec<AchievementFlag>,
}

impl ScoreRecord {
    #[must_use]
    pub fn deluxe_ratio(&self) -> f64 {
        self.deluxe_score.ratio()
    }

    /// Best combo grade reached, as a position in [`COMBO_TIERS`].
    #[must_use]
    pub fn combo_tier(&self) -> Option<usize> {
        self.flags.iter().filter_map(|flag| flag.combo_tier()).min()
    }

    /// Best combo flag reached.
    #[must_use]
    pub fn combo_flag(&self) -> Option<AchievementFlag> {
        self.combo_tier().map(|tier| COMBO_TIERS[tier])
    }
}

/// One row of a score list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Website row id; only valid for the page it was read from.
    pub row_id: Option<String>,
    pub chart: ChartInfo,
    /// `None` when the chart has never been played.
    pub score: Option<ScoreRecord>,
}

impl ScoreEntry {
    #[must_use]
    pub fn identity(&self) -> IdentityKey {
        IdentityKey {
            chart_type: self.chart.chart_type,
            title: self.chart.title.clone(),
        }
    }
}

/// Rows listed under one category header for one difficulty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCategory {
    pub name: String,
    pub difficulty: Difficulty,
    pub entries: Vec<ScoreEntry>,
}

/// A score search page, or an aggregate of several.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreList {
    pub categories: Vec<ScoreCategory>,
}

impl ScoreList {
    /// Every entry, in page order.
    pub fn entries(&self) -> impl Iterator<Item = &ScoreEntry> {
        self.categories.iter().flat_map(|category| category.entries.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.iter().map(|category| category.entries.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `achieved / total` counter from the player statistics page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SongCount {
    pub achieved: u32,
    pub total: u32,
}

/// Per-difficulty song counters of the player page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyStatistic {
    pub difficulty: Difficulty,
    pub clears: SongCount,
    pub ranks: BTreeMap<ScoreRank, SongCount>,
    /// Keyed by star count (1 to 5).
    pub dx_ranks: BTreeMap<u8, SongCount>,
    /// Combo flags (FC, FC+, AP, AP+).
    pub flags: BTreeMap<AchievementFlag, SongCount>,
    /// Sync flags (SYNC, FS, FS+, FSD, FSD+).
    pub sync_flags: BTreeMap<AchievementFlag, SongCount>,
}

/// Player profile plate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerData {
    pub name: String,
    pub title: String,
    /// Course rank image.
    pub grade: Option<String>,
    /// Class rank image.
    pub class_grade: Option<String>,
    pub icon: Option<String>,
    pub rating: Option<u32>,
    pub partner_star_total: Option<u32>,
    pub play_count: Option<u32>,
    /// Song counters of the difficulty the page was opened for.
    pub statistics: Option<DifficultyStatistic>,
}

/// Life counter of a challenge play (perfect challenge, course).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Challenge icon key (`perfect`, `course`).
    pub kind: String,
    pub lives: Progress,
}

/// One recently played track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackResult {
    /// Position within the credit.
    pub order: u32,
    pub played_at: DateTime<FixedOffset>,
    pub chart: ChartInfo,
    pub achievement: Achievement,
    pub rank: Option<ScoreRank>,
    pub deluxe_score: Option<Progress>,
    pub flags: Vec<AchievementFlag>,
    pub jacket: Option<String>,
    pub challenge: Option<Challenge>,
    /// Website reference of the detail page.
    pub reference: Option<String>,
}

/// Point balances kept from maimai FiNALE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Currency {
    pub amount: u32,
    pub piece: u32,
    pub parts: u32,
}

/// Song counters of one FiNALE category (`all` or a difficulty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinaleStatistic {
    pub category: String,
    pub total_score: u32,
    pub clears: SongCount,
    /// Keyed by `s`, `sp`, `ss`, `ssp`, `sss` and `max`.
    pub ranks: BTreeMap<String, SongCount>,
    /// Keyed by `fc`, `gfc` and `ap`.
    pub flags: BTreeMap<String, SongCount>,
    /// Keyed by `play` and `max`.
    pub sync_flags: BTreeMap<String, SongCount>,
    /// Keyed by `max_fever` and `strong_max_fever`.
    pub multi_flags: BTreeMap<String, SongCount>,
}

/// Player record carried over from maimai FiNALE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinaleArchive {
    pub name: String,
    pub title: String,
    pub grade: Option<String>,
    pub icon: Option<String>,
    pub player_frame: Option<String>,
    pub nameplate: Option<String>,
    pub rating: Option<f64>,
    pub rating_highest: Option<f64>,
    pub region_count: Option<u32>,
    pub currency: Currency,
    pub partner_level_total: Option<u32>,
    pub statistics: Vec<FinaleStatistic>,
}

/// One uploaded photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub title: String,
    pub difficulty: Option<Difficulty>,
    pub image_url: String,
    pub uploaded_at: DateTime<FixedOffset>,
}

/// Value returned by a page extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "page", content = "data", rename_all = "snake_case")]
pub enum Record {
    PlayerData(PlayerData),
    MusicList(ScoreList),
    RecentTracks(Vec<TrackResult>),
    PhotoAlbum(Vec<Photo>),
    FinaleArchive(FinaleArchive),
}

impl Record {
    /// Returns the score list of a music list page.
    #[must_use]
    pub fn into_score_list(self) -> Option<ScoreList> {
        match self {
            Self::MusicList(list) => Some(list),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_achievement_parse() {
        assert_eq!(Achievement::parse("100.5000%"), Some(Achievement(1_005_000)));
        assert_eq!(Achievement::parse(" 99.1% "), Some(Achievement(991_000)));
        assert_eq!(Achievement::parse("0.0000%"), Some(Achievement(0)));
        assert_eq!(Achievement::parse("97"), Some(Achievement(970_000)));
        assert_eq!(Achievement::parse("-"), None);
        assert_eq!(Achievement::parse("99.12345%"), None);
        assert_eq!(Achievement(1_005_000).to_string(), "100.5000%");
    }

    #[test]
    fn test_deluxe_ratio_zero_max() {
        assert!((Progress { value: 10, max: 0 }.ratio()).abs() < f64::EPSILON);
        assert!((Progress { value: 1, max: 4 }.ratio() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_combo_tier_picks_best_flag() {
        let record = ScoreRecord {
            achievement: Achievement(1_000_000),
            deluxe_score: Progress { value: 0, max: 0 },
            flags: vec![AchievementFlag::Fc, AchievementFlag::Sync, AchievementFlag::Ap],
        };
        assert_eq!(record.combo_tier(), Some(1));
        assert_eq!(record.combo_flag(), Some(AchievementFlag::Ap));
    }

    #[test]
    fn test_chart_type_icon_keys() {
        assert_eq!(ChartType::from_icon_key("DX"), ChartType::Dx);
        assert_eq!(ChartType::from_icon_key("standard"), ChartType::Standard);
        assert_eq!(ChartType::from_icon_key("utage"), ChartType::Unknown);
    }
}
