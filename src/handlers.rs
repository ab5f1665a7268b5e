use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, warn};

use crate::AppState;
use crate::content;
use crate::error::ServeError;
use crate::listing;
use crate::resolve::{ResolutionOutcome, resolve};
use crate::validate::validate_request_path;

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// True when the first `Accept` value mentions `text/html`.
pub fn accepts_markup(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html"))
}

fn remote_addr(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Catch-all handler: validate, resolve across roots, then answer.
pub async fn serve_path(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ServeError> {
    let verbose = state.config.verbose;
    let remote = remote_addr(&request);
    let method = request.method().clone();
    let raw_path = request.uri().path();

    if verbose {
        info!("{} → {} {}", remote, method, raw_path);
    } else {
        debug!("{} → {} {}", remote, method, raw_path);
    }

    let request_path = match urlencoding::decode(raw_path) {
        Ok(path) => path.into_owned(),
        Err(_) => {
            warn!("invalid path encoding: {}", raw_path);
            return Err(ServeError::InvalidPath(raw_path.to_string()));
        }
    };

    if !validate_request_path(&request_path) {
        warn!("invalid path: {}", request_path);
        return Err(ServeError::InvalidPath(request_path));
    }

    let accepts_markup = accepts_markup(request.headers());
    let config = state.config.clone();
    let lookup_path = request_path.clone();

    // Stat, open and read_dir all block.
    let outcome =
        tokio::task::spawn_blocking(move || resolve(&config, &lookup_path, accepts_markup))
            .await
            .map_err(|err| ServeError::Internal(err.to_string()))?;

    match outcome {
        ResolutionOutcome::ServedFile { file, root } => {
            if verbose {
                info!("{} ← {}", remote, file.path.display());
            } else {
                debug!(
                    "{} ← {} (root {})",
                    remote,
                    file.path.display(),
                    root.display()
                );
            }
            Ok(content::serve_file(file, request).await)
        }
        ResolutionOutcome::ServedFallback(file) => {
            debug!("{} ← fallback {}", remote, file.path.display());
            Ok(content::serve_file(file, request).await)
        }
        ResolutionOutcome::RenderedListing(listings) => {
            debug!(
                "Rendering {} listing(s) for {}",
                listings.len(),
                request_path
            );
            let html = listing::render(&listings)?;
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, HTML_CONTENT_TYPE)],
                html,
            )
                .into_response())
        }
        ResolutionOutcome::NotFound => Err(ServeError::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_accepts_markup() {
        let mut headers = HeaderMap::new();
        assert!(!accepts_markup(&headers));

        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,*/*;q=0.8"),
        );
        assert!(accepts_markup(&headers));

        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        assert!(!accepts_markup(&headers));

        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        assert!(!accepts_markup(&headers));
    }
}
