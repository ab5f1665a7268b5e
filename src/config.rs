use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Ordered, never-empty list of directories making up the overlay.
///
/// Earlier roots take priority over later ones when resolving files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSet(Vec<PathBuf>);

impl RootSet {
    /// Build a root set, falling back to the current directory when `roots` is empty.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        if roots.is_empty() {
            Self::default()
        } else {
            Self(roots)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for RootSet {
    fn default() -> Self {
        Self(vec![PathBuf::from(".")])
    }
}

/// Immutable serving configuration consumed by the resolver and handlers.
#[derive(Debug, Clone)]
pub struct Config {
    /// Roots in priority order
    pub roots: RootSet,
    /// Resource served for unmatched requests that accept HTML
    pub fallback: Option<PathBuf>,
    /// Render merged directory listings when no file matches
    pub listing_enabled: bool,
    /// Log every request and served file at info level
    pub verbose: bool,
}

impl Config {
    pub fn new(roots: RootSet) -> Self {
        Self {
            roots,
            fallback: None,
            listing_enabled: true,
            verbose: false,
        }
    }

    /// Set the fallback resource. An empty path disables it.
    pub fn with_fallback(mut self, fallback: impl Into<PathBuf>) -> Self {
        let fallback = fallback.into();
        self.fallback = if fallback.as_os_str().is_empty() {
            None
        } else {
            Some(fallback)
        };
        self
    }

    pub fn with_listing(mut self, enabled: bool) -> Self {
        self.listing_enabled = enabled;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(RootSet::default())
    }
}

/// Settings as read from a TOML file, before command-line overrides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directories to serve, highest priority first
    pub roots: Vec<PathBuf>,
    /// Host to bind to
    pub host: Option<String>,
    /// Port to bind to
    pub port: Option<u16>,
    /// Fallback resource for unmatched HTML requests
    pub index: Option<String>,
    /// Disable directory listings
    pub no_list: bool,
    /// Verbose request logging
    pub verbose: bool,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Turn the settings into the immutable serving configuration.
    pub fn to_config(&self) -> Config {
        Config::new(RootSet::new(self.roots.clone()))
            .with_fallback(self.index.clone().unwrap_or_default())
            .with_listing(!self.no_list)
            .with_verbose(self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_root_set_defaults_to_current_dir() {
        let roots = RootSet::new(Vec::new());
        assert_eq!(roots.len(), 1);
        assert_eq!(roots.iter().next(), Some(Path::new(".")));
    }

    #[test]
    fn test_root_set_keeps_order() {
        let roots = RootSet::new(vec![PathBuf::from("b"), PathBuf::from("a")]);
        let collected: Vec<_> = roots.iter().collect();
        assert_eq!(collected, vec![Path::new("b"), Path::new("a")]);
    }

    #[test]
    fn test_empty_fallback_is_disabled() {
        let config = Config::default().with_fallback("");
        assert!(config.fallback.is_none());

        let config = Config::default().with_fallback("dist/index.html");
        assert_eq!(config.fallback, Some(PathBuf::from("dist/index.html")));
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.host(), "localhost");
        assert_eq!(settings.port(), 8080);

        let config = settings.to_config();
        assert!(config.listing_enabled);
        assert!(config.fallback.is_none());
        assert_eq!(config.roots, RootSet::default());
    }

    #[test]
    fn test_settings_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("serve.toml");
        std::fs::write(
            &path,
            r#"
roots = ["public", "assets"]
port = 9000
index = "public/index.html"
no_list = true
"#,
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.port(), 9000);
        assert_eq!(settings.host(), "localhost");

        let config = settings.to_config();
        assert_eq!(config.roots.len(), 2);
        assert!(!config.listing_enabled);
        assert_eq!(config.fallback, Some(PathBuf::from("public/index.html")));
    }

    #[test]
    fn test_settings_from_file_errors() {
        let temp_dir = TempDir::new().unwrap();

        let missing = temp_dir.path().join("missing.toml");
        assert!(matches!(
            Settings::from_file(&missing),
            Err(ConfigError::Read { .. })
        ));

        let broken = temp_dir.path().join("broken.toml");
        std::fs::write(&broken, "port = \"not a number\"").unwrap();
        assert!(matches!(
            Settings::from_file(&broken),
            Err(ConfigError::Parse { .. })
        ));
    }
}
