//! Album routes.
//!
//! The wire protocol speaks `.json`-suffixed URLs (`/albums.json`,
//! `/albums/<name>.json`, `/albums/<name>/rename.json`). axum cannot match
//! a suffix inside one segment, so the album-photos route captures the raw
//! segment and peels the suffix itself.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::api::AppState;

use super::error::ApiError;
use super::types::{ok, AlbumData, AlbumsData, PageQuery};

pub fn album_routes() -> Router<AppState> {
    Router::new()
        .route("/albums.json", get(list_albums).fallback(invalid_resource))
        .route("/albums/:name", get(get_album).fallback(invalid_resource))
        .route(
            "/albums/:name/rename.json",
            post(rename_album).fallback(invalid_resource),
        )
        .route(
            "/albums/:name/:filename",
            get(get_photo).fallback(invalid_resource),
        )
}

/// Answer for every unmatched path or method.
pub async fn invalid_resource() -> ApiError {
    ApiError::InvalidResource
}

/// GET /albums.json
async fn list_albums(State(state): State<AppState>) -> Result<Response, ApiError> {
    let albums = state.albums.list_albums().await?;
    Ok(ok(AlbumsData { albums }))
}

/// GET /albums/:name, where the segment must carry the `.json` suffix.
async fn get_album(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let album = name.strip_suffix(".json").ok_or(ApiError::InvalidResource)?;

    let contents = state.albums.album_contents(album, query.window()).await?;

    Ok(ok(AlbumData {
        album_data: contents,
    }))
}

/// POST /albums/:name/rename.json
///
/// The body is read raw and parsed by hand rather than through the `Json`
/// extractor: a malformed body must answer in the envelope vocabulary
/// (`bad_json` / `missing_data`), not with axum's default rejection.
async fn rename_album(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadJson);
    }

    let parsed: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| ApiError::BadJson)?;
    let new_name = match parsed.get("album_name").and_then(|v| v.as_str()) {
        Some(new_name) if !new_name.is_empty() => new_name.to_string(),
        _ => return Err(ApiError::MissingData("album_name".to_string())),
    };

    state.albums.rename_album(&name, &new_name).await?;

    Ok(ok(format!(
        "Album folder was successfully renamed to: {}",
        new_name
    )))
}

/// GET /albums/:name/:filename, serving raw photo bytes.
async fn get_photo(
    State(state): State<AppState>,
    Path((name, filename)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let content = state.albums.read_photo(&name, &filename).await?;

    // Content-Type from the file extension; the bytes are never inspected.
    let content_type = mime_guess::from_path(&filename)
        .first_or_octet_stream()
        .to_string();
    let content_type = header::HeaderValue::from_str(&content_type)
        .unwrap_or_else(|_| header::HeaderValue::from_static("application/octet-stream"));

    Ok(([(header::CONTENT_TYPE, content_type)], content).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::albums::AlbumStore;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    fn app(root: &std::path::Path) -> Router {
        let config = Config {
            server_name: "shoebox-test".to_string(),
            album_root: root.display().to_string(),
            rest_port: 0,
        };
        let state = AppState::new(AlbumStore::new(root), config);
        Router::new()
            .merge(album_routes())
            .fallback(invalid_resource)
            .with_state(state)
    }

    fn fixture(albums: &[(&str, &[&str])]) -> TempDir {
        let temp = tempdir().unwrap();
        for (album, photos) in albums {
            let dir = temp.path().join(album);
            std::fs::create_dir(&dir).unwrap();
            for photo in *photos {
                std::fs::write(dir.join(photo), b"jpeg bytes").unwrap();
            }
        }
        temp
    }

    async fn fetch(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_body(app: Router, uri: &str, body: &str) -> axum::response::Response {
        app.oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.ends_with(b"\n"), "JSON bodies end with a newline");
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn empty_root_lists_no_albums() {
        let temp = fixture(&[]);

        let response = fetch(app(temp.path()), "/albums.json").await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["error"].is_null());
        assert_eq!(json["data"]["albums"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn albums_listing_keeps_only_directories() {
        let temp = fixture(&[("summer", &[]), ("winter", &[])]);
        std::fs::write(temp.path().join("stray.txt"), b"x").unwrap();

        let response = fetch(app(temp.path()), "/albums.json").await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let mut names: Vec<&str> = json["data"]["albums"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["name"].as_str().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["summer", "winter"]);
    }

    #[tokio::test]
    async fn album_photos_are_paginated() {
        let temp = fixture(&[("trip", &["a.jpg", "b.jpg", "c.jpg"])]);

        let response = fetch(app(temp.path()), "/albums/trip.json?page=1&pageSize=2").await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let album_data = &json["data"]["album_data"];
        assert_eq!(album_data["short_name"], "trip");
        assert_eq!(album_data["photos"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_numeric_pagination_falls_back_to_defaults() {
        let temp = fixture(&[("trip", &["a.jpg", "b.jpg", "c.jpg"])]);

        let response = fetch(app(temp.path()), "/albums/trip.json?page=one&pageSize=lots").await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["album_data"]["photos"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn photo_entries_carry_filename_and_desc() {
        let temp = fixture(&[("trip", &["a.jpg"])]);

        let response = fetch(app(temp.path()), "/albums/trip.json").await;

        let json = body_json(response).await;
        let photo = &json["data"]["album_data"]["photos"][0];
        assert_eq!(photo["filename"], "trip/a.jpg");
        assert_eq!(photo["desc"], "trip/a.jpg");
    }

    #[tokio::test]
    async fn missing_album_is_no_such_album() {
        let temp = fixture(&[]);

        let response = fetch(app(temp.path()), "/albums/missing.json").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "no_such_album");
    }

    #[tokio::test]
    async fn scan_failure_is_server_file_error() {
        let temp = fixture(&[]);
        // Point the store at a root that does not exist.
        let response = fetch(app(&temp.path().join("gone")), "/albums.json").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "server_file_error");
    }

    #[tokio::test]
    async fn album_segment_without_json_suffix_is_invalid() {
        let temp = fixture(&[("trip", &[])]);

        let response = fetch(app(temp.path()), "/albums/trip").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "invalid_resource");
    }

    #[tokio::test]
    async fn traversal_attempt_is_rejected() {
        let temp = fixture(&[("trip", &[])]);

        // %2F-encoded separators arrive decoded inside the one segment.
        let response = fetch(app(temp.path()), "/albums/..%2F..%2Fetc.json").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "invalid_resource");
    }

    #[tokio::test]
    async fn unknown_path_is_invalid_resource() {
        let temp = fixture(&[]);

        let response = fetch(app(temp.path()), "/nothing/here").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "invalid_resource");
    }

    #[tokio::test]
    async fn wrong_method_is_invalid_resource() {
        let temp = fixture(&[("trip", &[])]);

        let response = app(temp.path())
            .oneshot(
                Request::delete("/albums.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "invalid_resource");
    }

    #[tokio::test]
    async fn rename_moves_the_album() {
        let temp = fixture(&[("old", &["a.jpg"])]);

        let response = post_body(
            app(temp.path()),
            "/albums/old/rename.json",
            r#"{"album_name": "new"}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["error"].is_null());
        assert_eq!(
            json["data"],
            "Album folder was successfully renamed to: new"
        );
        assert!(temp.path().join("new").join("a.jpg").exists());
        assert!(!temp.path().join("old").exists());
    }

    #[tokio::test]
    async fn rename_missing_album_is_not_found() {
        let temp = fixture(&[]);

        let response = post_body(
            app(temp.path()),
            "/albums/gone/rename.json",
            r#"{"album_name": "new"}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "no_such_album");
    }

    #[tokio::test]
    async fn rename_with_unparsable_body_is_bad_json() {
        let temp = fixture(&[("old", &[])]);

        let response = post_body(app(temp.path()), "/albums/old/rename.json", "not-json").await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["error"], "bad_json");
    }

    #[tokio::test]
    async fn rename_with_empty_body_is_bad_json() {
        let temp = fixture(&[("old", &[])]);

        let response = post_body(app(temp.path()), "/albums/old/rename.json", "").await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["error"], "bad_json");
    }

    #[tokio::test]
    async fn rename_without_album_name_is_missing_data() {
        let temp = fixture(&[("old", &[])]);

        let response = post_body(app(temp.path()), "/albums/old/rename.json", "{}").await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["error"], "missing_data");
        assert!(json["message"]
            .as_str()
            .unwrap()
            .contains("album_name"));
    }

    #[tokio::test]
    async fn rename_to_traversal_name_is_rejected() {
        let temp = fixture(&[("old", &[])]);

        let response = post_body(
            app(temp.path()),
            "/albums/old/rename.json",
            r#"{"album_name": "../escape"}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "invalid_resource");
        assert!(temp.path().join("old").exists());
    }

    #[tokio::test]
    async fn photo_bytes_are_served_with_a_content_type() {
        let temp = fixture(&[("trip", &["a.jpg"])]);

        let response = fetch(app(temp.path()), "/albums/trip/a.jpg").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "image/jpeg"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"jpeg bytes");
    }

    #[tokio::test]
    async fn missing_photo_is_invalid_resource() {
        let temp = fixture(&[("trip", &[])]);

        let response = fetch(app(temp.path()), "/albums/trip/missing.jpg").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "invalid_resource");
    }

    #[tokio::test]
    async fn photo_in_missing_album_is_no_such_album() {
        let temp = fixture(&[]);

        let response = fetch(app(temp.path()), "/albums/gone/a.jpg").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "no_such_album");
    }
}
