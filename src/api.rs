//! HTTP API
//!
//! TigerStyle: One fallback handler, driven by the routing table.
//!
//! axum only supplies the transport. Every request lands in `dispatch`,
//! which asks `routes::resolve` for the route and then runs exactly one
//! store operation. Status codes:
//! - 200 list/get, 201 create, 204 update/delete
//! - 400 missing form field
//! - 404 unmatched path or missing record (`404 Not Found`, `text/plain`)
//! - 500 persistence failure
//! - 501 unknown method

use crate::routes::{self, Resolution, Route};
use crate::squirrels::{SharedSquirrelStore, SquirrelId, SquirrelInput, StoreError};
use axum::{
    extract::{FromRequest, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Form, Json, Router,
};
use tower_http::trace::TraceLayer;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Content type of every error body
pub const ERROR_CONTENT_TYPE: &str = "text/plain";

// =============================================================================
// State
// =============================================================================

/// State shared by all requests
#[derive(Clone)]
pub struct AppState {
    pub store: SharedSquirrelStore,
}

/// Build the service router
pub fn router(store: SharedSquirrelStore) -> Router {
    Router::new()
        .fallback(dispatch)
        .with_state(AppState { store })
        .layer(TraceLayer::new_for_http())
}

// =============================================================================
// Dispatch
// =============================================================================

async fn dispatch(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    let route = match routes::resolve(request.method(), request.uri().path()) {
        Resolution::Matched(route) => route,
        Resolution::NotFound => return Err(ApiError::NotFound),
        Resolution::NotImplemented => return Err(ApiError::NotImplemented),
    };

    tracing::debug!(?route, "Dispatching request");

    match route {
        Route::List => list_squirrels(&state).await,
        Route::Get(id) => get_squirrel(&state, id).await,
        Route::Create => {
            let input = read_form(request, &state).await;
            create_squirrel(&state, input).await
        }
        Route::Update(id) => {
            let input = read_form(request, &state).await;
            update_squirrel(&state, id, input).await
        }
        Route::Delete(id) => delete_squirrel(&state, id).await,
    }
}

/// Decode the form body; an unreadable body counts as no fields at all
async fn read_form(request: Request, state: &AppState) -> SquirrelInput {
    match Form::<SquirrelInput>::from_request(request, state).await {
        Ok(Form(input)) => input,
        Err(rejection) => {
            tracing::debug!(%rejection, "Unreadable form body");
            SquirrelInput::default()
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn list_squirrels(state: &AppState) -> Result<Response, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.list_all()).into_response())
}

async fn get_squirrel(state: &AppState, id: SquirrelId) -> Result<Response, ApiError> {
    let store = state.store.read().await;
    let squirrel = store.get(id).ok_or(ApiError::NotFound)?;
    Ok(Json(squirrel).into_response())
}

async fn create_squirrel(state: &AppState, input: SquirrelInput) -> Result<Response, ApiError> {
    let mut store = state.store.write().await;
    store.create(input).await?;
    Ok(StatusCode::CREATED.into_response())
}

async fn update_squirrel(
    state: &AppState,
    id: SquirrelId,
    input: SquirrelInput,
) -> Result<Response, ApiError> {
    let mut store = state.store.write().await;
    store.update(id, input).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn delete_squirrel(state: &AppState, id: SquirrelId) -> Result<Response, ApiError> {
    let mut store = state.store.write().await;
    store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

// =============================================================================
// Errors
// =============================================================================

/// Request failures, each mapped to one status code
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(StoreError),

    #[error("not found")]
    NotFound,

    #[error("method not implemented")]
    NotImplemented,

    #[error("internal error: {0}")]
    Internal(StoreError),
}

impl ApiError {
    /// Status code sent for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::MissingField(_) => Self::BadRequest(e),
            StoreError::NotFound(_) => Self::NotFound,
            StoreError::IdsExhausted | StoreError::Persistence(_) => Self::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Internal(e) => tracing::error!(error = %e, "Request failed"),
            Self::BadRequest(e) => tracing::debug!(error = %e, "Rejected request"),
            Self::NotFound | Self::NotImplemented => {}
        }

        // e.g. "404 Not Found"
        let body = format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        );
        (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(ERROR_CONTENT_TYPE))],
            body,
        )
            .into_response()
    }
}

// =============================================================================
// Tests
// =============================================================================
