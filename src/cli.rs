//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgMatches, Args, Parser, Subcommand};

use maimai_net_core::client::{Backoff, ClientOptions, RetryPolicy};
use maimai_net_core::config::FileConfig;
use maimai_net_core::constants::{Difficulty, Dimension, FilterValue};
use maimai_net_core::query::{CustomQuery, FilterSelection};
use maimai_net_core::region::{Region, RegionConfig};

/// Read player data and best scores from maimai DX NET.
#[derive(Parser, Debug)]
#[command(name = "maimai-net")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Server region (japan, asia)
    #[arg(long, env = "MAIMAI_NET_REGION", global = true)]
    pub region: Option<Region>,

    /// Login id (SEGA ID or Aime login)
    #[arg(short, long, env = "MAIMAI_NET_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password
    #[arg(short, long, env = "MAIMAI_NET_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Maximum retries for transient failures (0-10)
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u32).range(0..=10), global = true)]
    pub max_retries: Option<u32>,

    /// Base delay of exponential backoff between retries in milliseconds (0 retries immediately)
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=60000), global = true)]
    pub backoff_ms: Option<u64>,

    /// Config file (defaults to $XDG_CONFIG_HOME/maimai-net/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Open the home page (refreshes the session)
    Home,
    /// End the session
    Logout,
    /// Print the player profile
    Player(PlayerArgs),
    /// Print the most recent plays
    Recent,
    /// Print the photo album
    Photos,
    /// Print the player record kept from maimai FiNALE
    Finale,
    /// Print today's maintenance window (no login needed)
    Maintenance,
    /// Query best scores across filters
    Scores(ScoresArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PlayerArgs {
    /// Include the song counters of one difficulty (basic, ..., remaster)
    #[arg(short = 'd', long = "diff")]
    pub diff: Option<Difficulty>,
}

/// Filters of the `scores` command. Each filter takes `all` or
/// comma-separated keys or ids and may be repeated; filters are applied in
/// the order they first appear on the command line.
#[derive(Args, Debug, Clone)]
pub struct ScoresArgs {
    /// Genre filter (pop_anime, niconico, touhou, variety, maimai, siblings, all)
    #[arg(long, value_name = "VALUES")]
    pub genre: Vec<String>,

    /// Title name-group filter (japanese_a, ..., latin_misc, all)
    #[arg(long, value_name = "VALUES")]
    pub title: Vec<String>,

    /// Level filter by level name, not website id (13, 13+, L13, ..., all)
    #[arg(long, value_name = "VALUES")]
    pub level: Vec<String>,

    /// Game version filter (universe, festival_plus, ..., all)
    #[arg(long = "game-version", value_name = "VALUES")]
    pub game_version: Vec<String>,

    /// Difficulties (repeatable or comma-separated)
    #[arg(short = 'd', long = "diff", value_delimiter = ',', default_value = "master")]
    pub diff: Vec<String>,

    /// Sort mode (score_desc, score_asc, deluxe_desc, deluxe_asc, combo_desc, combo_asc)
    #[arg(short, long, default_value = "score_desc")]
    pub sort: String,
}

impl ScoresArgs {
    /// Builds the query; `matches` are the `scores` subcommand matches and
    /// give the command-line position of each filter.
    #[must_use]
    pub fn query(&self, matches: Option<&ArgMatches>) -> CustomQuery {
        let mut filters: Vec<(usize, Dimension, &[String])> = [
            ("genre", Dimension::Genre, self.genre.as_slice()),
            ("title", Dimension::NameGroup, self.title.as_slice()),
            ("level", Dimension::Level, self.level.as_slice()),
            ("game_version", Dimension::Version, self.game_version.as_slice()),
        ]
        .into_iter()
        .enumerate()
        .filter(|(_, (_, _, values))| !values.is_empty())
        .map(|(fallback, (id, dimension, values))| {
            let position = matches.and_then(|m| m.index_of(id)).unwrap_or(fallback);
            (position, dimension, values)
        })
        .collect();
        filters.sort_by_key(|(position, _, _)| *position);

        let mut query = CustomQuery::new()
            .sort(filter_value(&self.sort))
            .difficulties(
                self.diff
                    .iter()
                    .filter(|value| !value.trim().is_empty())
                    .map(|value| filter_value(value)),
            );
        for (_, dimension, values) in filters {
            let selection = if dimension == Dimension::Level {
                level_selection(values)
            } else {
                selection(values)
            };
            query = query.filter(dimension, selection);
        }
        query
    }
}

fn filter_value(text: &str) -> FilterValue {
    text.parse().unwrap_or_else(|never| match never {})
}

/// Union of every occurrence of one filter flag.
fn selection(values: &[String]) -> FilterSelection {
    values
        .join(",")
        .parse::<FilterSelection>()
        .unwrap_or_else(|never| match never {})
}

/// Level values are always names: `13` is level 13, not website id 13.
fn level_selection(values: &[String]) -> FilterSelection {
    match selection(values) {
        FilterSelection::Values(values) => FilterSelection::values(values.into_iter().map(|value| {
            match value {
                FilterValue::Id(id) => FilterValue::Key(id.to_string()),
                key @ FilterValue::Key(_) => key,
            }
        })),
        FilterSelection::All => FilterSelection::All,
    }
}

impl Cli {
    /// Client options: command line (and environment) over the config file
    /// over built-in defaults.
    #[must_use]
    pub fn client_options(&self, file: &FileConfig) -> ClientOptions {
        let mut options = file.client_options();
        if let Some(region) = self.region {
            options.region = RegionConfig::for_region(region);
        }
        let max_retries = self.max_retries.unwrap_or(options.retry.max_retries());
        let backoff = match self.backoff_ms {
            Some(0) => None,
            Some(ms) => Some(Backoff::from_base(Duration::from_millis(ms))),
            None => options.retry.backoff(),
        };
        options.retry = RetryPolicy::new(max_retries, backoff);
        options
    }

    /// Login id from the command line, environment or config file.
    #[must_use]
    pub fn resolved_username(&self, file: &FileConfig) -> Option<String> {
        self.username.clone().or_else(|| file.username.clone())
    }
}
