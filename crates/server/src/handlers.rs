//! HTTP handlers for the log search endpoint.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::StreamExt;
use tailgate_logs::{Error as SearchError, LineFinder, LogsConfig, SearchRequest};
use tracing::{error, warn};

/// Trailer appended to a 200 body when the stream fails after the header
/// has been sent. In-band by necessity: it cannot be told apart from log
/// data that happens to contain the same bytes.
const PREMATURE_END: &[u8] = b"Premature end of stream\n";

/// `GET /logs?file=<name>&total=<N>[&keywords=<kw>...]`
///
/// Streams the newest matching lines as `application/octet-stream`.
/// Malformed or unresolvable requests get a 422 before any body bytes
/// are written.
pub(crate) async fn logs_handler(
    State(config): State<Arc<LogsConfig>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let request = match parse_search(params) {
        Ok(request) => request,
        Err(reason) => return unprocessable(reason),
    };

    let finder = match LineFinder::build(&config, &request).await {
        Ok(finder) => finder,
        Err(SearchError::InvalidSearch(reason)) => {
            return unprocessable(format!("invalid search: {reason}"));
        }
        Err(e) => {
            error!("failed to open log search: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response();
        }
    };

    // Errors are terminal items on the line stream, so mapping one to
    // the trailer also ends the body.
    let lines = finder.find_latest_lines().map(|item| {
        Ok::<Bytes, Infallible>(match item {
            Ok(line) => line,
            Err(error) => {
                warn!("log stream ended prematurely: {error}");
                Bytes::from_static(PREMATURE_END)
            }
        })
    });

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/octet-stream")],
        Body::from_stream(lines),
    )
        .into_response()
}

fn unprocessable(reason: String) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, reason).into_response()
}

/// Folds raw query pairs into a [`SearchRequest`], rejecting anything
/// malformed. Unknown parameters are ignored.
fn parse_search(params: Vec<(String, String)>) -> Result<SearchRequest, String> {
    let mut file = None;
    let mut total = None;
    let mut keywords = Vec::new();

    for (key, value) in params {
        match key.as_str() {
            "file" => {
                if file.replace(value).is_some() {
                    return Err("duplicate file parameter".to_string());
                }
            }
            "total" => {
                let parsed: u64 = value
                    .parse()
                    .map_err(|_| format!("total must be a non-negative integer, got {value:?}"))?;
                if total.replace(parsed).is_some() {
                    return Err("duplicate total parameter".to_string());
                }
            }
            "keywords" => keywords.push(value),
            _ => {}
        }
    }

    let Some(file) = file else {
        return Err("missing file parameter".to_string());
    };
    if file.is_empty() {
        return Err("file must not be empty".to_string());
    }
    let Some(total) = total else {
        return Err("missing total parameter".to_string());
    };

    Ok(SearchRequest {
        file,
        total,
        keywords,
    })
}
