//! File responses, served through tower-http's `ServeFile`.

use std::fs::File;
use std::path::{Path, PathBuf};

use axum::{body::Body, extract::Request, response::Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::trace;

/// A regular file that could be stat'ed and opened during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub path: PathBuf,
}

impl ResolvedFile {
    /// Stat and open `path`. Directories, missing files and failed opens yield `None`.
    pub fn open(path: &Path) -> Option<Self> {
        match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => {
                trace!("Not a regular file: {}", path.display());
                return None;
            }
            Err(err) => {
                trace!("Stat failed for {}: {}", path.display(), err);
                return None;
            }
        }

        // The handle is only a readability check; `ServeFile` reopens the path.
        if let Err(err) = File::open(path) {
            trace!("Open failed for {}: {}", path.display(), err);
            return None;
        }

        Some(Self {
            path: path.to_path_buf(),
        })
    }
}

/// Answer `request` with the file's contents.
///
/// Content type, `Last-Modified`, conditional requests and byte ranges are
/// handled by `ServeFile`.
pub async fn serve_file(file: ResolvedFile, request: Request) -> Response {
    match ServeFile::new(&file.path).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}
