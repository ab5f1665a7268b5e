//! Static file server that overlays several directory roots into one tree.
//!
//! A request path is looked up in each configured root in order. The first
//! root holding a matching file (or `index.html`) wins; directories that exist
//! in several roots are listed side by side.

pub mod config;
pub mod content;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod resolve;
pub mod routes;
pub mod validate;

use std::sync::Arc;

pub use config::{Config, RootSet, Settings};
pub use error::ServeError;
pub use resolve::{ResolutionOutcome, resolve};
pub use routes::app;
pub use validate::validate_request_path;

/// Value of the `Server` header sent with every response.
pub const SERVER_HEADER: &str = concat!("serve/", env!("CARGO_PKG_VERSION"));

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Read-only configuration built once at startup
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState from a finished configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}
