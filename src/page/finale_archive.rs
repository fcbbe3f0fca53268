//! maimai FiNALE archive (`home/congratulations/`).
//!
//! The archive shows the plate and counters the player had when the
//! previous game generation closed. Each `.finale_musiccount_block` holds
//! fourteen counters in two columns, listed row by row.

use std::collections::BTreeMap;

use scraper::ElementRef;

use super::{PageError, PageKind, html};
use crate::model::{Currency, FinaleArchive, FinaleStatistic, SongCount};

const KIND: PageKind = PageKind::FinaleArchive;
const PAGE: &str = "finale_archive";

/// Statistic block ids are a category followed by a four-character suffix.
const CATEGORIES: [&str; 7] = ["all", "easy", "basic", "advanced", "expert", "master", "remaster"];
const CATEGORY_SUFFIX_LEN: usize = 4;

/// Counter groups in reading order (clear, S, S+, ...), column-major.
const COUNTERS: [(Group, &str); 14] = [
    (Group::Clear, "clear"),
    (Group::Rank, "s"),
    (Group::Rank, "sp"),
    (Group::Rank, "ss"),
    (Group::Rank, "ssp"),
    (Group::Rank, "sss"),
    (Group::Rank, "max"),
    (Group::Flag, "fc"),
    (Group::Flag, "gfc"),
    (Group::Flag, "ap"),
    (Group::Sync, "play"),
    (Group::Multi, "max_fever"),
    (Group::Multi, "strong_max_fever"),
    (Group::Sync, "max"),
];

#[derive(Debug, Clone, Copy)]
enum Group {
    Clear,
    Rank,
    Flag,
    Sync,
    Multi,
}

pub(super) fn extract(root: ElementRef<'_>) -> Result<FinaleArchive, PageError> {
    let area = html::require(PAGE, root, ".finale_area")?;
    let player = html::require(PAGE, area, ".basic_block")?;

    let name = html::text(html::require(PAGE, player, ".finale_username")?);
    let title = html::first(PAGE, player, ".finale_trophy_inner_block")?
        .map(html::text)
        .unwrap_or_default();
    let src = |css: &str| -> Result<Option<String>, PageError> {
        Ok(html::first(PAGE, player, css)?.and_then(|img| html::attr(img, "src")))
    };

    let ratings = html::first(PAGE, player, ".finale_rating")?
        .map(|block| html::scan_float(&html::text(block)))
        .unwrap_or_default();
    let mut points = html::first(PAGE, player, ".finale_point_block")?
        .map(|block| html::scan_int(&html::text(block)))
        .unwrap_or_default();
    points.resize(3, 0);
    let first_int = |css: &str| -> Result<Option<u32>, PageError> {
        Ok(html::first(PAGE, player, css)?.and_then(|block| html::get_int(&html::text(block))))
    };

    Ok(FinaleArchive {
        name,
        title,
        grade: src("img.finale_grade")?,
        icon: src("img.finale_icon")?,
        player_frame: html::first(PAGE, player, ".finale_user_block")?.and_then(html::style_url),
        nameplate: src("img.finale_nameplate")?,
        rating: ratings.first().copied(),
        rating_highest: ratings.get(1).copied(),
        region_count: first_int(".finale_region_block")?,
        currency: Currency {
            amount: points[0],
            piece: points[1],
            parts: points[2],
        },
        partner_level_total: first_int(".finale_totallv")?,
        statistics: html::all(PAGE, area, "div.finale_musiccount_block")?
            .into_iter()
            .map(statistic)
            .collect::<Result<_, _>>()?,
    })
}

fn statistic(block: ElementRef<'_>) -> Result<FinaleStatistic, PageError> {
    let id = block.value().id().unwrap_or_default();
    let category = id
        .len()
        .checked_sub(CATEGORY_SUFFIX_LEN)
        .and_then(|end| id.get(..end))
        .filter(|category| CATEGORIES.contains(category))
        .ok_or_else(|| PageError::malformed(KIND, format!("unknown statistic block '{id}'")))?;

    let total_score = html::first(PAGE, block, "div")?
        .and_then(|score| html::get_int(&html::text(score)))
        .ok_or_else(|| PageError::malformed(KIND, format!("missing total score of '{category}'")))?;

    let counts = html::all(PAGE, block, ".musiccount_counter_block")?
        .into_iter()
        .map(|counter| match html::scan_int(&html::text(counter)).as_slice() {
            [achieved, total, ..] => Some(SongCount {
                achieved: *achieved,
                total: *total,
            }),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .filter(|counts| counts.len() >= COUNTERS.len())
        .ok_or_else(|| PageError::malformed(KIND, format!("unreadable counters of '{category}'")))?;

    let mut result = FinaleStatistic {
        category: category.to_string(),
        total_score,
        clears: SongCount::default(),
        ranks: BTreeMap::new(),
        flags: BTreeMap::new(),
        sync_flags: BTreeMap::new(),
        multi_flags: BTreeMap::new(),
    };
    for (index, (group, key)) in COUNTERS.into_iter().enumerate() {
        let count = counts[column_major(index)];
        let key = key.to_string();
        match group {
            Group::Clear => result.clears = count,
            Group::Rank => {
                result.ranks.insert(key, count);
            }
            Group::Flag => {
                result.flags.insert(key, count);
            }
            Group::Sync => {
                result.sync_flags.insert(key, count);
            }
            Group::Multi => {
                result.multi_flags.insert(key, count);
            }
        }
    }
    Ok(result)
}

/// Position in the row-by-row listing of the `index`-th counter read
/// column by column.
fn column_major(index: usize) -> usize {
    let rows = COUNTERS.len().div_ceil(2);
    if index % 2 == 0 {
        index / 2
    } else {
        index / 2 + rows
    }
}
