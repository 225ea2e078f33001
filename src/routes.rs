// Account REST API - routes and handlers
//
// Every handler receives its request pieces (path segment, headers, raw body)
// as explicit extractor arguments and returns either a response or an `Error`,
// which renders itself as a JSON error body.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rusqlite::Connection;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db;
use crate::entities::{Account, AccountPatch, NewAccount};
use crate::error::{Error, Result};
use crate::{API_VERSION, SERVICE_NAME};

/// Media type every write endpoint requires, compared verbatim
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    fn db(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| Error::internal("database connection lock poisoned"))
    }
}

/// Build the service router using the provided application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(index))
        .route("/accounts", get(list_accounts).post(create_accounts))
        .route(
            "/accounts/:account_id",
            get(get_account).put(update_account).delete(delete_account),
        )
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Service endpoints
// ============================================================================

/// GET /health
async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "OK" })))
}

/// GET /
async fn index() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "name": SERVICE_NAME,
            "version": API_VERSION,
        })),
    )
}

async fn route_not_found() -> Error {
    Error::RouteNotFound
}

async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}

// ============================================================================
// Account endpoints
// ============================================================================

/// POST /accounts
async fn create_accounts(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    tracing::info!("Request to create an Account");
    check_content_type(&headers, JSON_MEDIA_TYPE)?;

    let new_account = NewAccount::from_json(&body)?;
    let account = db::create_account(&*state.db()?, &new_account)?;
    tracing::info!(account_id = account.id, "Account created");

    let location = format!("/accounts/{}", account.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(account),
    )
        .into_response())
}

/// GET /accounts
async fn list_accounts(State(state): State<AppState>) -> Result<Json<Vec<Account>>> {
    tracing::info!("Request to list all Accounts");

    let accounts = db::all_accounts(&*state.db()?)?;
    tracing::info!(count = accounts.len(), "Returning Accounts");

    Ok(Json(accounts))
}

/// GET /accounts/:account_id
async fn get_account(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Account>> {
    let account_id = parse_account_id(&raw_id)?;
    tracing::info!(account_id, "Request to read an Account");

    let account =
        db::find_account(&*state.db()?, account_id)?.ok_or(Error::AccountNotFound(account_id))?;

    Ok(Json(account))
}

/// PUT /accounts/:account_id
async fn update_account(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Account>> {
    let account_id = parse_account_id(&raw_id)?;
    tracing::info!(account_id, "Request to update an Account");
    check_content_type(&headers, JSON_MEDIA_TYPE)?;

    let conn = state.db()?;
    let mut account =
        db::find_account(&conn, account_id)?.ok_or(Error::AccountNotFound(account_id))?;

    let data: Value = serde_json::from_slice(&body).map_err(|e| {
        Error::validation(format!("body of request contained bad or no data - {e}"))
    })?;
    tracing::info!(account_id, %data, "Data received for update");

    // Field errors surface as 400, store errors as 500
    let patch = AccountPatch::from_json(&data)?;
    if patch.is_empty() {
        tracing::debug!(account_id, "Update body carried no recognized fields");
    }
    account.apply(patch);
    db::update_account(&conn, &account)?;

    Ok(Json(account))
}

/// DELETE /accounts/:account_id
async fn delete_account(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode> {
    let account_id = parse_account_id(&raw_id)?;
    tracing::info!(account_id, "Request to delete an Account");

    let deleted = db::delete_account(&*state.db()?, account_id)?;
    tracing::info!(account_id, deleted, "Delete finished");

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Utility functions
// ============================================================================

/// Reject a request whose Content-Type is not exactly `media_type`
pub fn check_content_type(headers: &HeaderMap, media_type: &str) -> Result<()> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    if content_type == Some(media_type) {
        return Ok(());
    }

    tracing::error!(content_type = ?content_type, "Invalid Content-Type");
    Err(Error::UnsupportedMediaType {
        expected: media_type.to_string(),
        found: content_type.map(str::to_string),
    })
}

/// Account ids are unsigned decimal integers; anything else does not match the route
fn parse_account_id(raw: &str) -> Result<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::RouteNotFound);
    }
    raw.parse::<i64>().map_err(|_| Error::RouteNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(content_type).unwrap(),
        );
        headers
    }

    #[test]
    fn test_content_type_exact_match() {
        assert!(check_content_type(&headers_with("application/json"), JSON_MEDIA_TYPE).is_ok());
    }

    #[test]
    fn test_content_type_mismatch() {
        let err = check_content_type(&headers_with("text/plain"), JSON_MEDIA_TYPE).unwrap_err();

        match err {
            Error::UnsupportedMediaType { expected, found } => {
                assert_eq!(expected, "application/json");
                assert_eq!(found.as_deref(), Some("text/plain"));
            }
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_content_type_parameters_are_not_stripped() {
        let headers = headers_with("application/json; charset=utf-8");
        assert!(check_content_type(&headers, JSON_MEDIA_TYPE).is_err());
    }

    #[test]
    fn test_content_type_missing() {
        let err = check_content_type(&HeaderMap::new(), JSON_MEDIA_TYPE).unwrap_err();
        assert!(matches!(err, Error::UnsupportedMediaType { found: None, .. }));
    }

    #[test]
    fn test_parse_account_id() {
        assert_eq!(parse_account_id("0").unwrap(), 0);
        assert_eq!(parse_account_id("42").unwrap(), 42);

        for raw in ["", "-1", "+1", "abc", "1.5", "99999999999999999999"] {
            assert!(
                matches!(parse_account_id(raw), Err(Error::RouteNotFound)),
                "{raw:?} should not match"
            );
        }
    }
}
