//! Constants for the client module (error codes, timeouts, routes).

/// Default HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default HTTP read timeout (30 seconds).
pub const READ_TIMEOUT_SECS: u64 = 30;

/// Redirect hops followed per request.
pub const MAX_REDIRECTS: usize = 10;

/// Error page code for rejected credentials.
pub const LOGIN_ERROR_CODE: u32 = 100_101;

/// Error page code asking for a session refresh.
pub const SESSION_REFRESH_CODE: u32 = 200_002;

/// Error page code for an expired session.
pub const SESSION_EXPIRED_CODE: u32 = 200_004;

pub const SESSION_REFRESH_HINT: &str = "Please access the home page before accessing other pages.";

/// Login id field names, in preference order.
pub const USERNAME_FIELDS: [&str; 2] = ["segaId", "sid"];

pub mod routes {
    //! Paths under the website base.

    pub const HOME: &str = "home/";
    pub const LOGOUT: &str = "home/userOption/logout/";
    pub const PLAYER_DATA: &str = "playerData/";
    pub const RECENT_PLAYS: &str = "record/";
    pub const PHOTO_ALBUM: &str = "playerData/photo/";
    pub const FINALE_ARCHIVE: &str = "home/congratulations/";
    pub const MUSIC_GENRE: &str = "record/musicGenre/search/";
    pub const MUSIC_WORD: &str = "record/musicWord/search/";
    pub const MUSIC_LEVEL: &str = "record/musicLevel/search/";
    pub const MUSIC_VERSION: &str = "record/musicVersion/search/";
}
