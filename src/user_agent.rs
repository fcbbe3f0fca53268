//! User-Agent sent to the player site.

/// Identifies the client and its version on every request.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");
    format!("{name}/{version} (player-data-client)")
}
