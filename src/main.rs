use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use overlay_serve::config::ConfigError;
use overlay_serve::{AppState, Config, Settings};

#[derive(Parser, Debug)]
#[command(name = "serve")]
#[command(about = "HTTP server for files spanning multiple directories")]
#[command(version)]
struct Cli {
    /// Directories to serve, highest priority first (default: current directory)
    #[arg(value_name = "DIR")]
    dirs: Vec<PathBuf>,

    /// Port to bind to [default: 8080]
    #[arg(short, long, env = "SERVE_PORT")]
    port: Option<u16>,

    /// Host to bind to [default: localhost]
    #[arg(long, env = "SERVE_HOST")]
    host: Option<String>,

    /// Serve all paths to this file if nothing else matches
    #[arg(short, long, env = "SERVE_INDEX", value_name = "PATH")]
    index: Option<String>,

    /// Disable file listings
    #[arg(long = "no-list", env = "SERVE_NO_LIST")]
    no_list: bool,

    /// Display extra information
    #[arg(short, long, env = "SERVE_VERBOSE")]
    verbose: bool,

    /// Config file path (optional)
    #[arg(short, long, env = "SERVE_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Error, Debug)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl Cli {
    /// Layer command-line values over the optional config file.
    fn settings(&self) -> Result<Settings, ConfigError> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };

        if !self.dirs.is_empty() {
            settings.roots = self.dirs.clone();
        }
        if self.port.is_some() {
            settings.port = self.port;
        }
        if self.host.is_some() {
            settings.host = self.host.clone();
        }
        if self.index.is_some() {
            settings.index = self.index.clone();
        }
        settings.no_list |= self.no_list;
        settings.verbose |= self.verbose;

        Ok(settings)
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "overlay_serve=debug,serve=debug,tower_http=debug"
    } else {
        "overlay_serve=info,serve=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn display_address(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("failed to install signal handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

async fn run(settings: Settings) -> Result<(), StartupError> {
    let config: Config = settings.to_config();

    for root in config.roots.iter() {
        if root.is_dir() {
            info!("Serving files from: {}", root.display());
        } else {
            warn!("Root is not a directory, it will be skipped: {}", root.display());
        }
    }
    if let Some(fallback) = &config.fallback {
        info!("Fallback resource: {}", fallback.display());
    }
    if !config.listing_enabled {
        info!("Directory listings disabled");
    }

    let address = display_address(settings.host(), settings.port());
    let listener = TcpListener::bind((settings.host(), settings.port()))
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    info!("starting on: http://{}", address);

    let app = overlay_serve::app(AppState::new(config));
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(StartupError::Serve)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(settings.verbose);

    match run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "serve", "-p", "9000", "--host", "0.0.0.0", "-i", "dist/index.html", "--no-list",
            "-v", "public", "assets",
        ])
        .unwrap();

        let settings = cli.settings().unwrap();
        assert_eq!(settings.port(), 9000);
        assert_eq!(settings.host(), "0.0.0.0");
        assert_eq!(
            settings.roots,
            vec![PathBuf::from("public"), PathBuf::from("assets")]
        );

        let config = settings.to_config();
        assert!(!config.listing_enabled);
        assert!(config.verbose);
        assert_eq!(config.fallback, Some(PathBuf::from("dist/index.html")));
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("serve.toml");
        std::fs::write(&path, "roots = [\"from-file\"]\nport = 7000\nhost = \"0.0.0.0\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "serve",
            "--config",
            path.to_str().unwrap(),
            "--port",
            "7001",
        ])
        .unwrap();
        let settings = cli.settings().unwrap();
        assert_eq!(settings.port(), 7001);
        assert_eq!(settings.host(), "0.0.0.0");
        assert_eq!(settings.roots, vec![PathBuf::from("from-file")]);
    }

    #[test]
    fn test_display_address() {
        assert_eq!(display_address("localhost", 8080), "localhost:8080");
        assert_eq!(display_address("::1", 8080), "[::1]:8080");
    }
}
