//! CLI entry point for the maimai DX NET client.

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{ArgMatches, CommandFactory, FromArgMatches};
use maimai_net_core::config::{load_default_file_config, load_file_config};
use maimai_net_core::{
    ClientOptions, Connection, Credentials, FileConfig, SystemClock, maintenance_period,
};
use serde::Serialize;
use tracing::{debug, info};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(command = ?cli.command, "CLI arguments parsed");

    let file = load_config(&cli)?;
    let options = cli.client_options(&file);

    match &cli.command {
        Command::Maintenance => print_json(&maintenance_period(&SystemClock))?,
        Command::Home => {
            connect(&cli, &file, options)?.home().await?;
            info!("Session refreshed");
        }
        Command::Logout => {
            connect(&cli, &file, options)?.logout().await?;
            info!("Logged out");
        }
        Command::Player(args) => {
            let mut connection = connect(&cli, &file, options)?;
            let player = match args.diff {
                Some(difficulty) => connection.player_statistics(difficulty).await?,
                None => connection.player_data().await?,
            };
            print_json(&player)?;
        }
        Command::Recent => print_json(&connect(&cli, &file, options)?.recent_plays().await?)?,
        Command::Photos => print_json(&connect(&cli, &file, options)?.photo_album().await?)?,
        Command::Finale => print_json(&connect(&cli, &file, options)?.finale_archive().await?)?,
        Command::Scores(args) => {
            let query = args.query(scores_matches(&matches));
            debug!(?query, "Score query built");
            let scores = connect(&cli, &file, options)?
                .song_list_by_custom(&query)
                .await?;
            print_json(&scores)?;
        }
    }

    Ok(())
}

/// Loads `--config` when given, otherwise the default config file if present.
fn load_config(cli: &Cli) -> Result<FileConfig> {
    if let Some(path) = &cli.config {
        return Ok(load_file_config(path)?);
    }
    let loaded = load_default_file_config()?;
    if loaded.config.is_none() {
        debug!(path = ?loaded.path, "no config file found; using defaults");
    }
    Ok(loaded.config.unwrap_or_default())
}

fn connect(cli: &Cli, file: &FileConfig, options: ClientOptions) -> Result<Connection> {
    let username = cli
        .resolved_username(file)
        .context(
            "no login id: pass --username, set MAIMAI_NET_USERNAME, \
             or add `username` to the config file",
        )?;
    let password = cli
        .password
        .clone()
        .context("no password: pass --password or set MAIMAI_NET_PASSWORD")?;

    let connection = Connection::builder(Credentials::new(username, password))
        .options(options)
        .build()?;
    info!(region = %connection.region().region(), "Connecting");
    Ok(connection)
}

fn scores_matches(matches: &ArgMatches) -> Option<&ArgMatches> {
    matches.subcommand_matches("scores")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
