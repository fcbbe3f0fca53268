//! Page extraction.
//!
//! The connection hands every successfully classified body to an
//! [`Extractor`] together with the [`PageKind`] the route expects. The
//! default [`PageExtractor`] parses the document once and dispatches to one
//! strategy per page kind; each strategy returns a typed [`Record`] or fails
//! with [`PageError::MalformedDocument`]. Strategies never return partial data.

mod error;
mod finale_archive;
pub(crate) mod html;
mod music_list;
mod photo;
mod player_data;
mod recent;

pub use error::PageError;

use std::fmt;

use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::model::Record;

/// Root element every player-site page carries.
const ROOT_SELECTOR: &str = ".main_wrapper";

/// Page shapes the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    PlayerData,
    MusicList,
    RecentTracks,
    PhotoAlbum,
    FinaleArchive,
}

impl PageKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlayerData => "player_data",
            Self::MusicList => "music_list",
            Self::RecentTracks => "recent_tracks",
            Self::PhotoAlbum => "photo_album",
            Self::FinaleArchive => "finale_archive",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns a response body into a typed record.
pub trait Extractor: Send + Sync {
    /// Extracts the record for `kind` from `body`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::MalformedDocument`] when the body does not have
    /// the structure of `kind`.
    fn extract(&self, kind: PageKind, body: &str) -> Result<Record, PageError>;
}

/// HTML extractor for the player site.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageExtractor;

impl Extractor for PageExtractor {
    #[instrument(level = "debug", skip(self, body), fields(body_len = body.len()))]
    fn extract(&self, kind: PageKind, body: &str) -> Result<Record, PageError> {
        let document = Html::parse_document(body);
        let root = html::first_in(kind.as_str(), &document, ROOT_SELECTOR)?
            .ok_or_else(|| PageError::missing(kind, ROOT_SELECTOR))?;

        let record = match kind {
            PageKind::PlayerData => Record::PlayerData(player_data::extract(root)?),
            PageKind::MusicList => Record::MusicList(music_list::extract(root)?),
            PageKind::RecentTracks => Record::RecentTracks(recent::extract(root)?),
            PageKind::PhotoAlbum => Record::PhotoAlbum(photo::extract(root)?),
            PageKind::FinaleArchive => Record::FinaleArchive(finale_archive::extract(root)?),
        };
        debug!(%kind, "page extracted");
        Ok(record)
    }
}
