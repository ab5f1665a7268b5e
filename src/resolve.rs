//! Overlay resolution: decide what a request path maps to across all roots.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::config::{Config, RootSet};
use crate::content::ResolvedFile;
use crate::listing::DirectoryListing;

const INDEX_FILE: &str = "index.html";

/// Result of resolving one request path against the configured roots.
#[derive(Debug)]
pub enum ResolutionOutcome {
    /// A file (or a directory's `index.html`) found under `root`
    ServedFile { file: ResolvedFile, root: PathBuf },
    /// The configured fallback resource
    ServedFallback(ResolvedFile),
    /// Listings from every root holding a directory at the path, in root order
    RenderedListing(Vec<DirectoryListing>),
    NotFound,
}

/// Join a request path onto `root`.
///
/// Only normal components are kept, so a leading `/` or `.` segment can never
/// replace or climb out of the root.
pub fn join_request_path(root: &Path, request_path: &str) -> PathBuf {
    let mut joined = root.to_path_buf();
    for segment in request_path.split('/').filter(|s| !s.is_empty()) {
        for component in Path::new(segment).components() {
            if let Component::Normal(name) = component {
                joined.push(name);
            }
        }
    }
    joined
}

/// Resolve `request_path`, which must already have passed traversal validation.
pub fn resolve(config: &Config, request_path: &str, accepts_markup: bool) -> ResolutionOutcome {
    if let Some((root, file)) = try_files(&config.roots, request_path) {
        return ResolutionOutcome::ServedFile {
            file,
            root: root.to_path_buf(),
        };
    }

    if !accepts_markup {
        return ResolutionOutcome::NotFound;
    }

    if let Some(file) = config.fallback.as_deref().and_then(try_fallback) {
        return ResolutionOutcome::ServedFallback(file);
    }

    if config.listing_enabled {
        let listings = try_dirs(&config.roots, request_path);
        if !listings.is_empty() {
            return ResolutionOutcome::RenderedListing(listings);
        }
    }

    ResolutionOutcome::NotFound
}

/// First root with the exact file or `<path>/index.html` wins; both candidates
/// are tried for a root before moving to the next.
fn try_files<'a>(roots: &'a RootSet, request_path: &str) -> Option<(&'a Path, ResolvedFile)> {
    roots.iter().find_map(|root| {
        let file_path = join_request_path(root, request_path);
        let index_path = file_path.join(INDEX_FILE);

        ResolvedFile::open(&file_path)
            .or_else(|| ResolvedFile::open(&index_path))
            .map(|file| {
                debug!("Resolved {} to {}", request_path, file.path.display());
                (root, file)
            })
    })
}

fn try_fallback(fallback: &Path) -> Option<ResolvedFile> {
    let file = ResolvedFile::open(fallback);
    if file.is_none() {
        warn!("Fallback resource unavailable: {}", fallback.display());
    }
    file
}

/// Every root that can enumerate the path contributes a listing. Failures
/// (missing, not a directory, permission denied) skip that root.
fn try_dirs(roots: &RootSet, request_path: &str) -> Vec<DirectoryListing> {
    roots
        .iter()
        .filter_map(|root| {
            let dir_path = join_request_path(root, request_path);
            match DirectoryListing::read(root, &dir_path, request_path) {
                Ok(listing) => Some(listing),
                Err(err) => {
                    trace!("No listing from {}: {}", dir_path.display(), err);
                    None
                }
            }
        })
        .collect()
}
