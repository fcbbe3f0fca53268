//! Small helpers over `scraper` shared by the page strategies.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::PageError;
use crate::region::service_timezone;

/// Integers with optional thousands separators; leading zeros start a new number.
#[allow(clippy::expect_used)]
static GROUPED_INTEGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"0|[1-9][0-9]*(?:,[0-9]+)*").expect("grouped integer pattern is valid")
});

/// Decimal numbers such as ratings (`12.34`).
#[allow(clippy::expect_used)]
static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+\.[0-9]+").expect("decimal pattern is valid"));

/// Parses a CSS selector; a bad selector reads as a malformed page for `page`.
pub(crate) fn selector(page: &str, css: &str) -> Result<Selector, PageError> {
    Selector::parse(css)
        .map_err(|error| PageError::malformed_named(page, format!("selector '{css}': {error}")))
}

/// First match of `css` under `scope`.
pub(crate) fn first<'a>(
    page: &str,
    scope: ElementRef<'a>,
    css: &str,
) -> Result<Option<ElementRef<'a>>, PageError> {
    Ok(scope.select(&selector(page, css)?).next())
}

/// First match of `css` in the whole document.
pub(crate) fn first_in<'a>(
    page: &str,
    document: &'a Html,
    css: &str,
) -> Result<Option<ElementRef<'a>>, PageError> {
    Ok(document.select(&selector(page, css)?).next())
}

/// First match of `css` under `scope`, failing when absent.
pub(crate) fn require<'a>(
    page: &str,
    scope: ElementRef<'a>,
    css: &str,
) -> Result<ElementRef<'a>, PageError> {
    first(page, scope, css)?
        .ok_or_else(|| PageError::malformed_named(page, format!("no element matches '{css}'")))
}

/// Every match of `css` under `scope`, in document order.
pub(crate) fn all<'a>(
    page: &str,
    scope: ElementRef<'a>,
    css: &str,
) -> Result<Vec<ElementRef<'a>>, PageError> {
    Ok(scope.select(&selector(page, css)?).collect())
}

/// Text content with runs of whitespace collapsed.
pub(crate) fn text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element.value().attr(name).map(str::to_string)
}

/// File stem of an image source (`https://x/img/diff_master.png?v=1` -> `diff_master`).
pub(crate) fn src_stem(element: ElementRef<'_>) -> Option<String> {
    let src = element.value().attr("src")?;
    let path = src.split(['?', '#']).next().unwrap_or(src);
    let file = path.rsplit('/').next().unwrap_or(path);
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    (!stem.is_empty()).then(|| stem.to_string())
}

/// Last `_`-separated part of an image stem (`diff_master` -> `master`).
pub(crate) fn src_key(element: ElementRef<'_>) -> Option<String> {
    let stem = src_stem(element)?;
    Some(stem.rsplit('_').next().unwrap_or(&stem).to_string())
}

/// Removes thousands separators and parses.
pub(crate) fn int(text: &str) -> Option<u32> {
    text.replace(',', "").parse().ok()
}

/// First grouped integer in `text`.
pub(crate) fn get_int(text: &str) -> Option<u32> {
    GROUPED_INTEGER.find(text).and_then(|found| int(found.as_str()))
}

/// First run of digits in `text`, keeping zero padding (`TRACK 03` -> 3).
pub(crate) fn get_padded_int(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .collect();
    int(digits.trim_end_matches(','))
}

/// Every grouped integer in `text`.
pub(crate) fn scan_int(text: &str) -> Vec<u32> {
    GROUPED_INTEGER
        .find_iter(text)
        .filter_map(|found| int(found.as_str()))
        .collect()
}

/// Every decimal number in `text`.
pub(crate) fn scan_float(text: &str) -> Vec<f64> {
    DECIMAL
        .find_iter(text)
        .filter_map(|found| found.as_str().parse().ok())
        .collect()
}

/// Target of the first `url(...)` in an inline style.
pub(crate) fn style_url(element: ElementRef<'_>) -> Option<String> {
    let style = element.value().attr("style")?;
    let start = style.find("url(")? + "url(".len();
    let end = start + style[start..].find(')')?;
    let url = style[start..end].trim().trim_matches(['\'', '"']);
    (!url.is_empty()).then(|| url.to_string())
}

/// Parses `YYYY/MM/DD hh:mm` as service-local time.
pub(crate) fn service_time(text: &str) -> Option<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(text.trim(), "%Y/%m/%d %H:%M").ok()?;
    service_timezone().from_local_datetime(&naive).single()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped_integers() {
        assert_eq!(get_int("play count: 1,234"), Some(1234));
        assert_eq!(scan_int("2,345 / 3,000"), vec![2345, 3000]);
        assert_eq!(scan_int("TRACK 03"), vec![0, 3]);
        assert_eq!(get_int("none"), None);
        assert_eq!(get_padded_int("TRACK 03"), Some(3));
    }

    #[test]
    fn test_decimals_and_style_urls() {
        assert_eq!(scan_float("12.34 (MAX 13.05)"), vec![12.34, 13.05]);
        assert!(scan_float("1,234").is_empty());

        let html = Html::parse_fragment(
            r#"<div style="background-image: url('https://x/img/frame_01.png');"></div>
            <p style="color: red"></p>"#,
        );
        let div = first_in("test", &html, "div").unwrap().unwrap();
        assert_eq!(style_url(div).as_deref(), Some("https://x/img/frame_01.png"));
        let p = first_in("test", &html, "p").unwrap().unwrap();
        assert_eq!(style_url(p), None);
    }

    #[test]
    fn test_src_helpers() {
        let html = Html::parse_fragment(
            r#"<img class="a"
                src="https://maimaidx.jp/maimai-mobile/img/music_icon_fcp.png?ver=1.40">"#,
        );
        let img = first_in("test", &html, "img").unwrap().unwrap();
        assert_eq!(src_stem(img).as_deref(), Some("music_icon_fcp"));
        assert_eq!(src_key(img).as_deref(), Some("fcp"));
    }

    #[test]
    fn test_text_collapses_whitespace() {
        let html = Html::parse_fragment("<div>\n  100.<span>5000</span>%\n  <b>x  y</b></div>");
        let div = first_in("test", &html, "div").unwrap().unwrap();
        assert_eq!(text(div), "100.5000% x y");
    }

    #[test]
    fn test_service_time_is_jst() {
        let time = service_time("2024/03/05 21:07").unwrap();
        assert_eq!(time.to_rfc3339(), "2024-03-05T21:07:00+09:00");
        assert!(service_time("yesterday").is_none());
    }
}
