//! Authenticated connection to the player site.
//!
//! A [`Connection`] owns one cookie session and sends every request through
//! the dispatch [`pipeline`]. Each response is classified; a login challenge
//! is answered once per call by submitting the stored credentials, and the
//! resulting page is handed to the [`Extractor`] for the route's
//! [`PageKind`].
//!
//! # Example
//!
//! ```no_run
//! use maimai_net_core::client::{Connection, Credentials};
//! use maimai_net_core::region::RegionConfig;
//!
//! # async fn run() -> Result<(), maimai_net_core::client::ClientError> {
//! let credentials = Credentials::new("player", "secret");
//! let mut connection = Connection::new(credentials, RegionConfig::japan())?;
//! let player = connection.player_data().await?;
//! println!("{} ({:?})", player.name, player.rating);
//! # Ok(())
//! # }
//! ```

mod classify;
pub mod constants;
mod error;
mod login;
mod maintenance;
pub mod pipeline;
mod request;
mod retry;
mod transport;

pub use classify::{Classification, SessionErrorKind, classify, classify_code};
pub use error::{ClientError, TransportError};
pub use login::{Credentials, handshake};
pub use maintenance::{
    Clock, FixedClock, MaintenanceGuard, MaintenanceWindow, SystemClock, maintenance_period,
};
pub use pipeline::{BaseDispatch, Dispatch, Pipeline, build_pipeline};
pub use request::{Method, PageKind, Params, RawResponse, RequestSpec};
pub use retry::{
    Backoff, DEFAULT_MAX_RETRIES, FailureType, RetryBudget, RetryPolicy, Retrying,
    classify_error, classify_http_status,
};
pub use transport::{HttpTransport, Transport, TransportOptions};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::constants::{Difficulty, Dimension, FilterValue, ParameterError, WebsiteConstant};
use crate::model::{FinaleArchive, Photo, PlayerData, Record, ScoreList, TrackResult};
use crate::page::{Extractor, PageError, PageExtractor};
use crate::query::{CustomQuery, FilterSelection, ScoreSource};
use crate::region::RegionConfig;

use constants::{LOGIN_ERROR_CODE, routes};

/// Settings applied when a connection is built.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub region: RegionConfig,
    pub retry: RetryPolicy,
    pub transport: TransportOptions,
}

/// Where a call stands in the login handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Initial,
    Authenticating,
}

/// Builder for [`Connection`].
pub struct ConnectionBuilder {
    credentials: Credentials,
    options: ClientOptions,
    clock: Arc<dyn Clock>,
    extractor: Arc<dyn Extractor>,
}

impl ConnectionBuilder {
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            options: ClientOptions::default(),
            clock: Arc::new(SystemClock),
            extractor: Arc::new(PageExtractor),
        }
    }

    #[must_use]
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn region(mut self, region: RegionConfig) -> Self {
        self.options.region = region;
        self
    }

    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.options.retry = policy;
        self
    }

    #[must_use]
    pub fn transport_options(mut self, options: TransportOptions) -> Self {
        self.options.transport = options;
        self
    }

    /// Replaces the clock used by the maintenance guard.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Builds a connection over a fresh HTTP transport with its own cookie jar.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the HTTP client cannot be built.
    pub fn build(self) -> Result<Connection<HttpTransport>, ClientError> {
        let transport = HttpTransport::new(self.options.transport).map_err(ClientError::Transport)?;
        Ok(self.build_with_transport(transport))
    }

    /// Builds a connection over `transport`.
    #[must_use]
    pub fn build_with_transport<T: Transport>(self, transport: T) -> Connection<T> {
        let pipeline = build_pipeline(transport, self.options.retry, self.clock);
        Connection {
            region: self.options.region,
            credentials: self.credentials,
            pipeline,
            extractor: self.extractor,
        }
    }
}

/// One authenticated session with the player site.
///
/// Calls take `&mut self`: a connection issues one request at a time and the
/// session cookies it holds are not shared between connections.
pub struct Connection<T: Transport = HttpTransport> {
    region: RegionConfig,
    credentials: Credentials,
    pipeline: Pipeline<T>,
    extractor: Arc<dyn Extractor>,
}

impl Connection {
    /// Creates a connection with default options for `region`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the HTTP client cannot be built.
    pub fn new(credentials: Credentials, region: RegionConfig) -> Result<Self, ClientError> {
        ConnectionBuilder::new(credentials).region(region).build()
    }

    #[must_use]
    pub fn builder(credentials: Credentials) -> ConnectionBuilder {
        ConnectionBuilder::new(credentials)
    }
}

impl<T: Transport> fmt::Debug for Connection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("region", &self.region.region())
            .field("credentials", &self.credentials)
            .field("retry", self.retry_policy())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Connection<T> {
    #[must_use]
    pub fn region(&self) -> &RegionConfig {
        &self.region
    }

    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        self.pipeline.inner().policy()
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        self.pipeline.inner().inner().transport()
    }

    /// Sends a request to `path` (relative to the website base) and extracts
    /// `expected` from the final page.
    ///
    /// Returns `Ok(None)` when `expected` is `None`.
    ///
    /// # Errors
    ///
    /// See [`Connection::send`].
    pub async fn request(
        &mut self,
        method: Method,
        path: &str,
        params: Params,
        expected: Option<PageKind>,
    ) -> Result<Option<Record>, ClientError> {
        let target = self
            .region
            .url_for(path)
            .map_err(|error| ClientError::invalid_url(path, error))?;
        self.send(RequestSpec {
            method,
            target,
            params,
            expected,
        })
        .await
    }

    /// Sends a prepared request through the pipeline.
    ///
    /// One retry budget covers the whole call, including the re-dispatch
    /// after a login handshake.
    ///
    /// # Errors
    ///
    /// - [`ClientError::RoutineMaintenance`] inside the daily window (no
    ///   network call is made).
    /// - [`ClientError::RetryExhausted`] when every attempt failed transiently.
    /// - [`ClientError::Login`] when the site answers the credential
    ///   submission with the login page again.
    /// - [`ClientError::SessionRefresh`], [`ClientError::SessionExpired`] or
    ///   [`ClientError::General`] for error pages.
    /// - [`ClientError::Page`] when the page cannot be extracted.
    #[instrument(skip(self, request), fields(request = %request))]
    pub async fn send(&mut self, request: RequestSpec) -> Result<Option<Record>, ClientError> {
        let mut budget = self.retry_policy().budget();
        let mut phase = Phase::Initial;
        let mut current = request;

        loop {
            let response = self.pipeline.dispatch(&current, &mut budget).await?;
            match classify(&self.region, &response)? {
                Classification::Success => {
                    debug!(
                        final_url = %response.final_url,
                        attempts = budget.attempts(),
                        "request succeeded"
                    );
                    return self.extract(current.expected, &response.body);
                }
                Classification::LoginChallenge if phase == Phase::Initial => {
                    info!(
                        final_url = %response.final_url,
                        "login required, submitting credentials"
                    );
                    current = handshake(
                        &response.final_url,
                        &response.body,
                        &current,
                        &self.credentials,
                    )?;
                    phase = Phase::Authenticating;
                }
                Classification::LoginChallenge => {
                    warn!("login page returned after submitting credentials");
                    return Err(ClientError::Login {
                        code: LOGIN_ERROR_CODE,
                    });
                }
                Classification::SessionError { kind, code } => {
                    warn!(?kind, code, "session error page");
                    return Err(kind.error(code));
                }
                Classification::GenericError(code) => {
                    warn!(code, "error page");
                    return Err(ClientError::General { code });
                }
            }
        }
    }

    fn extract(
        &self,
        expected: Option<PageKind>,
        body: &str,
    ) -> Result<Option<Record>, ClientError> {
        match expected {
            Some(kind) => Ok(Some(self.extractor.extract(kind, body)?)),
            None => Ok(None),
        }
    }

    async fn fetch(
        &mut self,
        path: &str,
        params: Params,
        kind: PageKind,
    ) -> Result<Record, ClientError> {
        self.request(Method::Get, path, params, Some(kind))
            .await?
            .ok_or_else(|| unexpected_record(kind))
    }

    /// Opens the home page. This also refreshes a session that the site
    /// flagged with a refresh error.
    ///
    /// # Errors
    ///
    /// See [`Connection::send`].
    pub async fn home(&mut self) -> Result<(), ClientError> {
        self.request(Method::Get, routes::HOME, Params::new(), None).await?;
        Ok(())
    }

    /// Ends the session on the site.
    ///
    /// # Errors
    ///
    /// See [`Connection::send`].
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        self.request(Method::Get, routes::LOGOUT, Params::new(), None).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// See [`Connection::send`].
    pub async fn player_data(&mut self) -> Result<PlayerData, ClientError> {
        match self.fetch(routes::PLAYER_DATA, Params::new(), PageKind::PlayerData).await? {
            Record::PlayerData(data) => Ok(data),
            _ => Err(unexpected_record(PageKind::PlayerData)),
        }
    }

    /// Player profile with the song counters of `difficulty`.
    ///
    /// # Errors
    ///
    /// See [`Connection::send`].
    pub async fn player_statistics(
        &mut self,
        difficulty: Difficulty,
    ) -> Result<PlayerData, ClientError> {
        let mut params = Params::new();
        params.push("diff", difficulty.web_id().to_string());
        match self.fetch(routes::PLAYER_DATA, params, PageKind::PlayerData).await? {
            Record::PlayerData(data) => Ok(data),
            _ => Err(unexpected_record(PageKind::PlayerData)),
        }
    }

    /// The most recent plays, newest first.
    ///
    /// # Errors
    ///
    /// See [`Connection::send`].
    pub async fn recent_plays(&mut self) -> Result<Vec<TrackResult>, ClientError> {
        match self.fetch(routes::RECENT_PLAYS, Params::new(), PageKind::RecentTracks).await? {
            Record::RecentTracks(tracks) => Ok(tracks),
            _ => Err(unexpected_record(PageKind::RecentTracks)),
        }
    }

    /// # Errors
    ///
    /// See [`Connection::send`].
    pub async fn photo_album(&mut self) -> Result<Vec<Photo>, ClientError> {
        match self.fetch(routes::PHOTO_ALBUM, Params::new(), PageKind::PhotoAlbum).await? {
            Record::PhotoAlbum(photos) => Ok(photos),
            _ => Err(unexpected_record(PageKind::PhotoAlbum)),
        }
    }

    /// Player record kept from maimai FiNALE.
    ///
    /// # Errors
    ///
    /// See [`Connection::send`].
    pub async fn finale_archive(&mut self) -> Result<FinaleArchive, ClientError> {
        match self.fetch(routes::FINALE_ARCHIVE, Params::new(), PageKind::FinaleArchive).await? {
            Record::FinaleArchive(archive) => Ok(archive),
            _ => Err(unexpected_record(PageKind::FinaleArchive)),
        }
    }

    /// Best scores of the given genres (union), for each difficulty.
    ///
    /// # Errors
    ///
    /// [`ClientError::Parameter`] for unknown values, before any request;
    /// otherwise see [`Connection::send`].
    pub async fn song_list_by_genre(
        &mut self,
        genres: FilterSelection,
        difficulties: Vec<FilterValue>,
    ) -> Result<ScoreList, ClientError> {
        let query = CustomQuery::new()
            .difficulties(difficulties)
            .filter(Dimension::Genre, genres);
        self.song_list_by_custom(&query).await
    }

    /// Best scores of songs whose title starts in the given name groups.
    ///
    /// # Errors
    ///
    /// See [`Connection::song_list_by_genre`].
    pub async fn song_list_by_title(
        &mut self,
        name_groups: FilterSelection,
        difficulties: Vec<FilterValue>,
    ) -> Result<ScoreList, ClientError> {
        let query = CustomQuery::new()
            .difficulties(difficulties)
            .filter(Dimension::NameGroup, name_groups);
        self.song_list_by_custom(&query).await
    }

    /// Best scores of the charts in the given level groups. The level pages
    /// list every difficulty; rows outside `difficulties` are dropped.
    ///
    /// # Errors
    ///
    /// See [`Connection::song_list_by_genre`].
    pub async fn song_list_by_level(
        &mut self,
        levels: FilterSelection,
        difficulties: Vec<FilterValue>,
    ) -> Result<ScoreList, ClientError> {
        let query = CustomQuery::new()
            .difficulties(difficulties)
            .filter(Dimension::Level, levels);
        self.song_list_by_custom(&query).await
    }

    /// Best scores of songs introduced in the given versions.
    ///
    /// # Errors
    ///
    /// See [`Connection::song_list_by_genre`].
    pub async fn song_list_by_version(
        &mut self,
        versions: FilterSelection,
        difficulties: Vec<FilterValue>,
    ) -> Result<ScoreList, ClientError> {
        let query = CustomQuery::new()
            .difficulties(difficulties)
            .filter(Dimension::Version, versions);
        self.song_list_by_custom(&query).await
    }

    /// Runs a multi-filter query; see [`crate::query`].
    ///
    /// # Errors
    ///
    /// See [`Connection::song_list_by_genre`].
    pub async fn song_list_by_custom(
        &mut self,
        query: &CustomQuery,
    ) -> Result<ScoreList, ClientError> {
        crate::query::run(self, query).await
    }

    /// Today's maintenance window by this connection's clock.
    #[must_use]
    pub fn maintenance_period(&self) -> MaintenanceWindow {
        maintenance_period(self.pipeline.clock())
    }
}

#[async_trait]
impl<T: Transport> ScoreSource for Connection<T> {
    async fn score_page(
        &mut self,
        dimension: Dimension,
        id: u32,
        difficulty: Option<Difficulty>,
    ) -> Result<ScoreList, ClientError> {
        let (path, name) = match dimension {
            Dimension::Genre => (routes::MUSIC_GENRE, "genre"),
            Dimension::NameGroup => (routes::MUSIC_WORD, "word"),
            Dimension::Level => (routes::MUSIC_LEVEL, "level"),
            Dimension::Version => (routes::MUSIC_VERSION, "version"),
            Dimension::Difficulty | Dimension::Sort => {
                return Err(ParameterError::invalid(
                    dimension,
                    dimension.as_str(),
                    "Filter by genre, name_group, level or version",
                )
                .into());
            }
        };

        let mut params = Params::new();
        params.push(name, id.to_string());
        if let Some(difficulty) = difficulty {
            params.push("diff", difficulty.web_id().to_string());
        }

        match self.fetch(path, params, PageKind::MusicList).await? {
            Record::MusicList(list) => Ok(list),
            _ => Err(unexpected_record(PageKind::MusicList)),
        }
    }
}

fn unexpected_record(kind: PageKind) -> ClientError {
    PageError::malformed(kind, "extractor returned a different record type").into()
}
