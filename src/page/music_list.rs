//! Score search result pages (`record/music*/search/`).

use scraper::ElementRef;

use super::{PageError, PageKind, html};
use crate::constants::{AchievementFlag, Difficulty, WebsiteConstant};
use crate::model::{
    Achievement, ChartInfo, ChartType, Progress, ScoreCategory, ScoreEntry, ScoreList, ScoreRecord,
};

const KIND: PageKind = PageKind::MusicList;
const PAGE: &str = "music_list";

const HEADER_OR_ROW: &str = r#".screw_block, div[class*="_score_back"]"#;
const FLAG_ICON_PREFIX: &str = "music_icon_";

pub(super) fn extract(root: ElementRef<'_>) -> Result<ScoreList, PageError> {
    let mut list = ScoreList::default();
    let mut category = String::new();

    for element in html::all(PAGE, root, HEADER_OR_ROW)? {
        if element.value().classes().any(|class| class == "screw_block") {
            category = html::text(element);
            continue;
        }
        let Some(difficulty) = row_difficulty(element) else {
            continue;
        };
        let entry = extract_row(element, difficulty)?;
        push_entry(&mut list, &category, difficulty, entry);
    }

    Ok(list)
}

/// Appends to the `(category, difficulty)` bucket, creating it on first use.
fn push_entry(list: &mut ScoreList, category: &str, difficulty: Difficulty, entry: ScoreEntry) {
    match list
        .categories
        .iter_mut()
        .find(|bucket| bucket.name == category && bucket.difficulty == difficulty)
    {
        Some(bucket) => bucket.entries.push(entry),
        None => list.categories.push(ScoreCategory {
            name: category.to_string(),
            difficulty,
            entries: vec![entry],
        }),
    }
}

/// Reads the difficulty from a `music_<difficulty>_score_back` class.
fn row_difficulty(row: ElementRef<'_>) -> Option<Difficulty> {
    row.value().classes().find_map(|class| {
        class
            .strip_prefix("music_")
            .and_then(|rest| rest.strip_suffix("_score_back"))
            .and_then(Difficulty::from_key)
    })
}

fn extract_row(row: ElementRef<'_>, difficulty: Difficulty) -> Result<ScoreEntry, PageError> {
    let title = html::text(
        html::first(PAGE, row, ".music_name_block")?
            .ok_or_else(|| PageError::missing(KIND, ".music_name_block"))?,
    );
    let level = html::first(PAGE, row, ".music_lv_block")?
        .map(html::text)
        .unwrap_or_default();
    let row_id = html::first(PAGE, row, r#"input[name="idx"]"#)?
        .and_then(|input| html::attr(input, "value"));

    Ok(ScoreEntry {
        row_id,
        chart: ChartInfo {
            title,
            chart_type: chart_type(row)?,
            difficulty,
            level,
        },
        score: score(row)?,
    })
}

/// The kind icon sits in the row or, on grouped pages, beside it.
fn chart_type(row: ElementRef<'_>) -> Result<ChartType, PageError> {
    let icon = match html::first(PAGE, row, "img.music_kind_icon")? {
        Some(icon) => Some(icon),
        None => match row.parent().and_then(ElementRef::wrap) {
            Some(parent) => html::first(PAGE, parent, "img.music_kind_icon")?,
            None => None,
        },
    };
    Ok(icon
        .and_then(html::src_key)
        .map_or(ChartType::Unknown, |key| ChartType::from_icon_key(&key)))
}

fn score(row: ElementRef<'_>) -> Result<Option<ScoreRecord>, PageError> {
    let blocks: Vec<String> = html::all(PAGE, row, ".music_score_block")?
        .into_iter()
        .map(html::text)
        .collect();
    let Some(achievement_text) = blocks.iter().find(|block| block.contains('%')) else {
        return Ok(None);
    };
    let achievement = Achievement::parse(achievement_text).ok_or_else(|| {
        PageError::malformed(KIND, format!("unreadable achievement '{achievement_text}'"))
    })?;

    let deluxe_score = match blocks.iter().find(|block| block.contains('/')) {
        Some(block) => match html::scan_int(block).as_slice() {
            [value, max] => Progress {
                value: *value,
                max: *max,
            },
            _ => {
                return Err(PageError::malformed(
                    KIND,
                    format!("unreadable deluxe score '{block}'"),
                ));
            }
        },
        None => Progress { value: 0, max: 0 },
    };

    let flags = html::all(PAGE, row, "img")?
        .into_iter()
        .filter_map(html::src_stem)
        .filter_map(|stem| {
            stem.strip_prefix(FLAG_ICON_PREFIX)
                .and_then(AchievementFlag::from_record_key)
        })
        .collect();

    Ok(Some(ScoreRecord {
        achievement,
        deluxe_score,
        flags,
    }))
}
