//! Player profile page (`playerData/`).
//!
//! The page may carry a song counter grid for one difficulty. Its
//! `.musiccount_block` cells are laid out in rows closed by `.clearfix`
//! and are read column by column.

use std::collections::BTreeMap;

use scraper::ElementRef;

use super::{PageError, PageKind, html};
use crate::constants::{AchievementFlag, Difficulty, ScoreRank, WebsiteConstant};
use crate::model::{DifficultyStatistic, PlayerData, SongCount};

const KIND: PageKind = PageKind::PlayerData;
const PAGE: &str = "player_data";

const PLAY_COUNT_MARKERS: [&str; 2] = ["play count", "プレイ回数"];

/// Meaning of each grid cell, in column-major order.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Clear,
    Rank(ScoreRank),
    Stars(u8),
    Flag(AchievementFlag),
}

const GRID: [Slot; 21] = [
    Slot::Rank(ScoreRank::Sssp),
    Slot::Rank(ScoreRank::Sss),
    Slot::Rank(ScoreRank::Ssp),
    Slot::Rank(ScoreRank::Ss),
    Slot::Rank(ScoreRank::Sp),
    Slot::Rank(ScoreRank::S),
    Slot::Clear,
    Slot::Flag(AchievementFlag::ApPlus),
    Slot::Flag(AchievementFlag::Ap),
    Slot::Flag(AchievementFlag::FcPlus),
    Slot::Flag(AchievementFlag::Fc),
    Slot::Flag(AchievementFlag::FsdPlus),
    Slot::Flag(AchievementFlag::Fsd),
    Slot::Flag(AchievementFlag::FsPlus),
    Slot::Flag(AchievementFlag::Fs),
    Slot::Flag(AchievementFlag::Sync),
    Slot::Stars(5),
    Slot::Stars(4),
    Slot::Stars(3),
    Slot::Stars(2),
    Slot::Stars(1),
];

pub(super) fn extract(root: ElementRef<'_>) -> Result<PlayerData, PageError> {
    let name = html::first(PAGE, root, ".name_block")?
        .map(html::text)
        .ok_or_else(|| PageError::missing(KIND, ".name_block"))?;
    let title = html::first(PAGE, root, ".trophy_inner_block")?
        .map(html::text)
        .unwrap_or_default();
    let rating = html::first(PAGE, root, ".rating_block")?
        .and_then(|block| html::get_int(&html::text(block)));
    let icon = html::first(PAGE, root, "img.w_112")?.and_then(|img| html::attr(img, "src"));
    let grade = html::first(PAGE, root, r#"img[src*="course_rank"]"#)?
        .and_then(|img| html::attr(img, "src"));
    let class_grade = html::first(PAGE, root, r#"img[src*="class_rank"]"#)?
        .and_then(|img| html::attr(img, "src"));
    let partner_star_total = html::all(PAGE, root, "div")?
        .into_iter()
        .map(html::text)
        .find(|text| text.starts_with('×'))
        .and_then(|text| html::get_int(&text));

    Ok(PlayerData {
        name,
        title,
        grade,
        class_grade,
        icon,
        rating,
        partner_star_total,
        play_count: play_count(&html::text(root)),
        statistics: statistics(root)?,
    })
}

fn play_count(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    PLAY_COUNT_MARKERS.iter().find_map(|marker| {
        let at = lower.find(marker)?;
        html::get_int(&lower[at + marker.len()..])
    })
}

/// Reads the counter grid; `None` when the page has none.
fn statistics(root: ElementRef<'_>) -> Result<Option<DifficultyStatistic>, PageError> {
    let counts = counter_columns(root)?;
    if counts.is_empty() {
        return Ok(None);
    }
    if counts.len() < GRID.len() {
        return Err(PageError::malformed(
            KIND,
            format!("expected {} song counters, found {}", GRID.len(), counts.len()),
        ));
    }
    let difficulty = html::first(PAGE, root, r#"img[src*="diff_"]"#)?
        .and_then(html::src_key)
        .and_then(|key| Difficulty::from_key(&key))
        .ok_or_else(|| PageError::malformed(KIND, "song counters without a difficulty icon"))?;

    let mut statistic = DifficultyStatistic {
        difficulty,
        clears: SongCount::default(),
        ranks: BTreeMap::new(),
        dx_ranks: BTreeMap::new(),
        flags: BTreeMap::new(),
        sync_flags: BTreeMap::new(),
    };
    for (slot, count) in GRID.into_iter().zip(counts) {
        match slot {
            Slot::Clear => statistic.clears = count,
            Slot::Rank(rank) => {
                statistic.ranks.insert(rank, count);
            }
            Slot::Stars(stars) => {
                statistic.dx_ranks.insert(stars, count);
            }
            Slot::Flag(flag) if flag.combo_tier().is_some() => {
                statistic.flags.insert(flag, count);
            }
            Slot::Flag(flag) => {
                statistic.sync_flags.insert(flag, count);
            }
        }
    }
    Ok(Some(statistic))
}

/// Counter cells grouped into rows, then flattened column by column.
fn counter_columns(root: ElementRef<'_>) -> Result<Vec<SongCount>, PageError> {
    let mut rows: Vec<Vec<SongCount>> = Vec::new();
    let mut row = Vec::new();
    for element in html::all(PAGE, root, ".musiccount_block, .clearfix")? {
        if element.value().classes().any(|class| class == "clearfix") {
            if !row.is_empty() {
                rows.push(std::mem::take(&mut row));
            }
            continue;
        }
        let text = html::text(element);
        match html::scan_int(&text).as_slice() {
            [achieved, total, ..] => row.push(SongCount {
                achieved: *achieved,
                total: *total,
            }),
            _ => {
                return Err(PageError::malformed(
                    KIND,
                    format!("unreadable song counter '{text}'"),
                ));
            }
        }
    }
    if !row.is_empty() {
        rows.push(row);
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    Ok((0..columns)
        .flat_map(|column| rows.iter().filter_map(move |row| row.get(column).copied()))
        .collect())
}
