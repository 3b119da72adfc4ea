use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::{Deserialize, Serialize};
use songport_catalog::Converter;
use songport_core::SongportError;
use tracing::error;

#[derive(Clone)]
pub struct ServerState {
    pub converter: Arc<Converter>,
    pub default_country: String,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/convert", get(convert))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ConvertParams {
    url: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(rename = "providedUrl", skip_serializing_if = "Option::is_none")]
    provided_url: Option<String>,
}

async fn convert(
    State(state): State<ServerState>,
    Query(params): Query<ConvertParams>,
) -> Response {
    let Some(input) = params.url else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "query parameter \"url\" is required",
            None,
        );
    };
    // Unrecognized input never reaches the catalogs.
    let Some(link) = songport_links::parse(&input) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "url not recognized by any catalog dialect",
            Some(input),
        );
    };
    let country = params
        .country
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| state.default_country.clone())
        .to_lowercase();
    match state.converter.convert(&link, &country).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => {
            error!(url = %input, kind = %link.kind, id = %link.id, %err, "conversion failed");
            error_response(status_for(&err), "conversion failed", None)
        }
    }
}

fn status_for(err: &SongportError) -> StatusCode {
    match err {
        SongportError::Unrecognized(_) | SongportError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        // NotFound stays a 500: the upstream contract folds it into the
        // generic failure path.
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, message: &str, provided_url: Option<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
            provided_url,
        }),
    )
        .into_response()
}
