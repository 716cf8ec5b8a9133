//! Error handling for the REST API.
//!
//! `ApiError` is the fixed error vocabulary of the wire protocol. Domain
//! failures are converted here before a handler returns, so the router
//! never emits a raw, unclassified failure.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::albums::AlbumError;

use super::types::json_response;

#[derive(Debug)]
pub enum ApiError {
    /// No route (or no album-root entry) answers to the request.
    InvalidResource,
    NoSuchAlbum,
    /// A required body field is absent; carries the field name.
    MissingData(String),
    BadJson,
    /// Unclassified I/O failure; carries the underlying message.
    File(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidResource => "invalid_resource",
            ApiError::NoSuchAlbum => "no_such_album",
            ApiError::MissingData(_) => "missing_data",
            ApiError::BadJson => "bad_json",
            ApiError::File(_) => "server_file_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidResource | ApiError::NoSuchAlbum => StatusCode::NOT_FOUND,
            ApiError::MissingData(_) | ApiError::BadJson => StatusCode::FORBIDDEN,
            ApiError::File(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidResource => "The requested resource does not exist.".to_string(),
            ApiError::NoSuchAlbum => "The specified album does not exist.".to_string(),
            ApiError::MissingData(field) => format!("Your request is missing: '{}'", field),
            ApiError::BadJson => "The JSON passed to the server was bad.".to_string(),
            ApiError::File(msg) => format!("There was a file error on the server: {}", msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::File(details) = &self {
            tracing::error!(details = %details, "file error");
        }

        let body = serde_json::json!({
            "error": self.code(),
            "message": self.message(),
        });
        json_response(self.status(), &body)
    }
}

impl From<AlbumError> for ApiError {
    fn from(err: AlbumError) -> Self {
        match err {
            AlbumError::NoSuchAlbum(_) => ApiError::NoSuchAlbum,
            // A missing photo and a traversal-shaped identifier get the same
            // answer as an unknown route.
            AlbumError::NoSuchPhoto(_) | AlbumError::InvalidName(_) => ApiError::InvalidResource,
            AlbumError::Io(err) => ApiError::File(err.to_string()),
        }
    }
}
