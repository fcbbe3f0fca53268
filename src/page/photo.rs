//! Photo album (`playerData/photo/`).

use scraper::ElementRef;

use super::{PageError, PageKind, html};
use crate::constants::{Difficulty, WebsiteConstant};
use crate::model::Photo;

const KIND: PageKind = PageKind::PhotoAlbum;
const PAGE: &str = "photo_album";

pub(super) fn extract(root: ElementRef<'_>) -> Result<Vec<Photo>, PageError> {
    let mut photos = Vec::new();
    for block in html::all(PAGE, root, ".see_through_block")? {
        let Some(image) =
            html::first(PAGE, block, "img.w_430")?.and_then(|img| html::attr(img, "src"))
        else {
            continue;
        };
        let uploaded_at = html::first(PAGE, block, ".block_info")?
            .and_then(|info| html::service_time(&html::text(info)))
            .ok_or_else(|| PageError::malformed(KIND, "missing upload time"))?;
        let title = html::first(PAGE, block, ".black_block")?
            .map(html::text)
            .ok_or_else(|| PageError::missing(KIND, ".black_block"))?;
        let difficulty = html::first(PAGE, block, r#"img[src*="diff_"]"#)?
            .and_then(html::src_key)
            .and_then(|key| Difficulty::from_key(&key));

        photos.push(Photo {
            title,
            difficulty,
            image_url: image,
            uploaded_at,
        });
    }
    Ok(photos)
}
