mod batch;
mod config;
mod logging;
mod normalize;
mod pagination;
mod playlist;
mod ports;
mod services;
mod spotify_rs;
#[cfg(test)]
mod test_utils;
mod xspf;

use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{
    config::Config,
    logging::init_tracing,
    ports::spotify::SpotifyClient,
    services::{
        export::PlaylistExporter,
        import::{ImportOutcome, PlaylistImporter},
        prompt::TerminalPrompt,
    },
    spotify_rs::client::SpotifyHttpClient,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, global = true, env = "SPOTIFY_PLAYLISTS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level or tracing filter directive
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// Export spans to this OTLP collector
    #[arg(long, global = true, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    /// Spotify access token, overrides the config file
    #[arg(long, global = true, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export every playlist and the saved tracks as XSPF files
    Export {
        /// Directory to write the files to, created if missing
        directory: PathBuf,
    },
    /// Import an XSPF file into the account
    Import {
        /// The XSPF file to import
        file: PathBuf,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(error)
            if matches!(
                error.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) =>
        {
            error.exit()
        }
        Err(_) => {
            let program = std::env::args()
                .next()
                .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
            eprintln!("Usage: {program} <import FILENAME / export DIR>");
            std::process::exit(0);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = parse_args();
    let tracer_provider = init_tracing(&args.log_level, args.otlp_endpoint.as_deref())?;

    let result = run(args).await;

    if let Some(provider) = tracer_provider {
        if let Err(error) = provider.shutdown() {
            eprintln!("Failed to flush traces: {error}");
        }
    }
    result
}

fn run_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::CreateDefault => {
            let path = Config::create_default()?;
            tracing::info!(path = %path.display(), "Default config created");
        }
        ConfigCommands::Path => match Config::config_path() {
            Some(path) => println!("{}", path.display()),
            None => println!("No default config path found"),
        },
    }
    Ok(())
}

/// Builds the API client and resolves which account it acts for.
async fn connect(
    config: &Config,
    access_token: Option<String>,
) -> Result<(SpotifyHttpClient, String)> {
    let client = SpotifyHttpClient::new(
        config.access_token(access_token)?,
        config.api_base_url()?,
        config.request_timeout(),
    );
    let account_id = match &config.spotify.username {
        Some(username) => username.clone(),
        None => client
            .current_user_id()
            .await
            .wrap_err("Failed to look up the current Spotify user")?,
    };
    tracing::debug!(account = %account_id, "Using Spotify account");
    Ok((client, account_id))
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    tracing::debug!("Loading configuration");
    match path {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .wrap_err("Failed to load spotify-playlists config")
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Config(command) => run_config_command(command)?,
        Commands::Export { directory } => {
            let config = load_config(args.config.as_deref())?;
            let (client, account_id) = connect(&config, args.access_token).await?;

            let summary = PlaylistExporter::new(client, account_id)
                .export_all(&directory)
                .await?;
            for failure in &summary.failed {
                tracing::error!(playlist = %failure.playlist, reason = %failure.reason, "Playlist was not exported");
            }
            tracing::info!(
                written = summary.written.len(),
                failed = summary.failed.len(),
                "Export finished"
            );
        }
        Commands::Import { file } => {
            let config = load_config(args.config.as_deref())?;
            let (client, account_id) = connect(&config, args.access_token).await?;

            let outcome = PlaylistImporter::new(client, TerminalPrompt, account_id, config.batch)
                .import_one(&file)
                .await?;
            match outcome {
                ImportOutcome::Followed { playlist_id } => {
                    tracing::info!(%playlist_id, "Import finished, followed original playlist");
                }
                ImportOutcome::Copied {
                    playlist_id,
                    added,
                    failed_chunks,
                } => {
                    tracing::info!(%playlist_id, added, failed_chunks, "Import finished, created playlist");
                }
                ImportOutcome::SavedToLibrary {
                    saved,
                    failed_chunks,
                } => {
                    tracing::info!(saved, failed_chunks, "Import finished, saved tracks to library");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_and_import() {
        let args = Args::try_parse_from(["spotify-playlists", "export", "out"]).unwrap();
        assert!(matches!(args.command, Commands::Export { directory } if directory == Path::new("out")));

        let args = Args::try_parse_from(["spotify-playlists", "import", "Mix.xspf"]).unwrap();
        assert!(matches!(args.command, Commands::Import { file } if file == Path::new("Mix.xspf")));
    }

    #[test]
    fn test_misuse_is_a_parse_error_not_help() {
        for argv in [
            vec!["spotify-playlists"],
            vec!["spotify-playlists", "export"],
            vec!["spotify-playlists", "sync", "x"],
        ] {
            let error = Args::try_parse_from(argv.iter().copied()).unwrap_err();
            assert!(
                !matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion),
                "{argv:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_config_path_runs_without_config_or_token() {
        let args = Args::try_parse_from([
            "spotify-playlists",
            "--config",
            "/nonexistent/config.toml",
            "config",
            "path",
        ])
        .unwrap();

        run(args).await.unwrap();
    }
}
