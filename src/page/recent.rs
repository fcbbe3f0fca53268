//! Recent play history (`record/`).

use scraper::ElementRef;

use super::{PageError, PageKind, html};
use crate::constants::{AchievementFlag, Difficulty, ScoreRank, WebsiteConstant};
use crate::model::{Achievement, Challenge, ChartInfo, ChartType, Progress, TrackResult};

const KIND: PageKind = PageKind::RecentTracks;
const PAGE: &str = "recent_tracks";

pub(super) fn extract(root: ElementRef<'_>) -> Result<Vec<TrackResult>, PageError> {
    html::all(PAGE, root, ".playlog_top_container")?
        .into_iter()
        .map(|header| {
            let block = header
                .parent()
                .and_then(ElementRef::wrap)
                .ok_or_else(|| PageError::malformed(KIND, "play log header has no container"))?;
            extract_track(header, block)
        })
        .collect()
}

fn extract_track(header: ElementRef<'_>, block: ElementRef<'_>) -> Result<TrackResult, PageError> {
    let difficulty = html::first(PAGE, header, "img.playlog_diff")?
        .and_then(html::src_key)
        .and_then(|key| Difficulty::from_key(&key))
        .ok_or_else(|| PageError::malformed(KIND, "unreadable difficulty icon"))?;

    let sub_title: Vec<String> = html::all(PAGE, header, ".sub_title > span")?
        .into_iter()
        .map(html::text)
        .collect();
    let (order, played_at) = match sub_title.as_slice() {
        [order, time, ..] => (
            html::get_padded_int(order),
            html::service_time(time),
        ),
        _ => (None, None),
    };
    let order = order.ok_or_else(|| PageError::malformed(KIND, "missing track number"))?;
    let played_at = played_at.ok_or_else(|| PageError::malformed(KIND, "missing play time"))?;

    let container_css = format!(".playlog_{}_container", difficulty.page_name());
    let info = html::require(PAGE, block, &container_css)?;
    let chart_header = html::require(PAGE, info, ".basic_block")?;
    let level = html::first(PAGE, chart_header, "div")?
        .map(html::text)
        .unwrap_or_default();
    let title = chart_header
        .children()
        .filter_map(|node| node.value().as_text().map(|text| text.trim().to_string()))
        .filter(|text| !text.is_empty())
        .last()
        .ok_or_else(|| PageError::malformed(KIND, "missing track title"))?;

    let chart_type = html::first(PAGE, info, "img.playlog_music_kind_icon")?
        .and_then(html::src_key)
        .map_or(ChartType::Unknown, |key| ChartType::from_icon_key(&key));

    let achievement_text = html::text(html::require(PAGE, info, ".playlog_achievement_txt")?);
    let achievement = Achievement::parse(&achievement_text).ok_or_else(|| {
        PageError::malformed(KIND, format!("unreadable achievement '{achievement_text}'"))
    })?;

    let rank = html::first(PAGE, info, "img.playlog_scorerank")?
        .and_then(html::src_key)
        .and_then(|key| ScoreRank::from_icon_key(&key));

    let deluxe_score = html::first(PAGE, info, ".playlog_score_block div")?
        .and_then(|block| progress(&html::text(block)));

    let flags = html::all(PAGE, info, ".playlog_result_innerblock > img")?
        .into_iter()
        .filter_map(html::src_stem)
        .filter_map(|stem| AchievementFlag::from_result_key(&stem))
        .collect();

    let jacket = html::first(PAGE, block, "img.music_img")?.and_then(|img| html::attr(img, "src"));

    let reference = html::first(PAGE, block, r#"input[name="idx"]"#)?
        .and_then(|input| html::attr(input, "value"));

    Ok(TrackResult {
        order,
        played_at,
        chart: ChartInfo {
            title,
            chart_type,
            difficulty,
            level,
        },
        achievement,
        rank,
        deluxe_score,
        flags,
        jacket,
        challenge: challenge(block)?,
        reference,
    })
}

/// `value / max` as a pair; anything else reads as absent.
fn progress(text: &str) -> Option<Progress> {
    match html::scan_int(text).as_slice() {
        [value, max] => Some(Progress {
            value: *value,
            max: *max,
        }),
        _ => None,
    }
}

/// Remaining lives of a challenge play, next to the challenge icon.
fn challenge(block: ElementRef<'_>) -> Result<Option<Challenge>, PageError> {
    let Some(life) = html::first(PAGE, block, ".playlog_life_block")? else {
        return Ok(None);
    };
    let kind = life
        .parent()
        .and_then(ElementRef::wrap)
        .map(|holder| html::first(PAGE, holder, "img"))
        .transpose()?
        .flatten()
        .and_then(html::src_key)
        .ok_or_else(|| PageError::malformed(KIND, "life counter without a challenge icon"))?;
    let text = html::text(life);
    let lives = progress(&text)
        .ok_or_else(|| PageError::malformed(KIND, format!("unreadable life counter '{text}'")))?;
    Ok(Some(Challenge { kind, lives }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::{Extractor, PageExtractor};
    use super::*;
    use crate::model::Record;
    use crate::test_support::fixtures::recent_page;

    #[test]
    fn test_recent_tracks() {
        let record = PageExtractor.extract(PageKind::RecentTracks, &recent_page()).unwrap();
        let Record::RecentTracks(tracks) = record else {
            panic!("expected recent tracks, got {record:?}");
        };
        assert_eq!(tracks.len(), 2);

        let first = &tracks[0];
        assert_eq!(first.order, 4);
        assert_eq!(first.played_at.to_rfc3339(), "2024-03-05T21:07:00+09:00");
        assert_eq!(first.chart.title, "Song A");
        assert_eq!(first.chart.difficulty, Difficulty::Master);
        assert_eq!(first.chart.level, "13+");
        assert_eq!(first.chart.chart_type, ChartType::Dx);
        assert_eq!(first.achievement, Achievement(1_003_456));
        assert_eq!(first.deluxe_score, Some(Progress { value: 2801, max: 3000 }));
        assert_eq!(first.flags, vec![AchievementFlag::FcPlus, AchievementFlag::Sync]);
        assert_eq!(first.reference.as_deref(), Some("3,1709640420"));
        assert_eq!(first.rank, Some(ScoreRank::Sssp));
        assert!(first.jacket.as_deref().unwrap().ends_with("/jacket/0a1b2c3d.png"));
        assert_eq!(
            first.challenge,
            Some(Challenge {
                kind: "perfect".to_string(),
                lives: Progress { value: 1, max: 1 },
            })
        );

        assert_eq!(tracks[1].chart.difficulty, Difficulty::Expert);
        assert_eq!(tracks[1].chart.chart_type, ChartType::Standard);
        assert!(tracks[1].flags.is_empty());
        assert_eq!(tracks[1].rank, None);
        assert_eq!(tracks[1].challenge, None);
        assert_eq!(tracks[1].deluxe_score, None);
    }

    #[test]
    fn test_life_counter_without_icon_is_malformed() {
        let body = recent_page().replace("playlog/life_perfect.png", "playlog/");
        let err = PageExtractor.extract(PageKind::RecentTracks, &body).unwrap_err();
        assert!(err.to_string().contains("challenge icon"), "{err}");
    }

    #[test]
    fn test_no_tracks_is_empty() {
        let record = PageExtractor
            .extract(PageKind::RecentTracks, r#"<div class="main_wrapper"></div>"#)
            .unwrap();
        assert_eq!(record, Record::RecentTracks(Vec::new()));
    }
}
