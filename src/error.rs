use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("not found")]
    NotFound,

    #[error("failed to render listing: {0}")]
    Render(#[from] std::fmt::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            ServeError::NotFound => StatusCode::NOT_FOUND,
            ServeError::Render(_) | ServeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Bodies stay generic; details only go to the log.
        let body = match &self {
            ServeError::InvalidPath(_) => "invalid path",
            ServeError::NotFound => "404 page not found",
            ServeError::Render(_) | ServeError::Internal(_) => {
                error!("{}", self);
                "internal server error"
            }
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}
