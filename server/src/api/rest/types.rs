//! Shared types for the REST API.
//!
//! Every JSON response is the uniform envelope: `{"error": null, "data": ...}`
//! on success, `{"error": "<code>", "message": ...}` on failure, one JSON
//! object terminated by a newline.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::albums::{AlbumContents, AlbumEntry, Page};

// ============================================================================
// RESPONSE PAYLOADS
// ============================================================================

#[derive(Serialize)]
pub struct AlbumsData {
    pub albums: Vec<AlbumEntry>,
}

#[derive(Serialize)]
pub struct AlbumData {
    pub album_data: AlbumContents,
}

// ============================================================================
// PAGINATION QUERY
// ============================================================================

/// Raw pagination query parameters.
///
/// Kept as strings: a non-numeric value falls back to its default silently
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

impl PageQuery {
    pub fn window(&self) -> Page {
        let default = Page::default();
        Page {
            page_num: parse_or(self.page.as_deref(), default.page_num),
            page_size: parse_or(self.page_size.as_deref(), default.page_size),
        }
    }
}

fn parse_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.parse().ok()).unwrap_or(default)
}

// ============================================================================
// ENVELOPE
// ============================================================================

/// Wrap `data` in the success envelope.
pub fn ok<T: Serialize>(data: T) -> Response {
    let envelope = serde_json::json!({ "error": null, "data": data });
    json_response(StatusCode::OK, &envelope)
}

/// Serialize `value` with the trailing newline every JSON body carries.
pub(super) fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_string(value) {
        Ok(mut body) => {
            body.push('\n');
            (
                status,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!("response serialization failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
