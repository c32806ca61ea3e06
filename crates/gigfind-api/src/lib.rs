//! HTTP surface of the marketplace: routing, auth, request validation, and
//! response shaping. Business rules live in gigfind-core.

pub mod applications;
pub mod auth;
pub mod error;
pub mod extract;
pub mod gigs;
pub mod messages;
pub mod middleware;
pub mod users;
pub mod validate;

use axum::{
    Json, Router,
    routing::{get, patch, post},
};

use gigfind_core::Marketplace;
use gigfind_types::api::{ApiResponse, HealthResponse};

pub use auth::{AppState, AppStateInner};
pub use error::{ApiError, ApiResult};

/// All routes under `/api`. Handlers that take [`middleware::AuthUser`]
/// require a bearer token; the rest are public.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/users/me", get(users::me))
        .route("/users/{id}", get(users::get_user))
        .route("/gigs", get(gigs::list_gigs).post(gigs::create_gig))
        .route("/gigs/mine", get(gigs::my_gigs))
        .route(
            "/gigs/{id}",
            get(gigs::get_gig).put(gigs::update_gig).delete(gigs::delete_gig),
        )
        .route("/gigs/{id}/status", patch(gigs::set_gig_status))
        .route(
            "/gigs/{id}/applications",
            get(applications::list_for_gig).post(applications::apply),
        )
        .route("/applications/me", get(applications::my_applications))
        .route("/applications/{id}", patch(applications::update_status))
        .route("/messages", get(messages::inbox).post(messages::send_message))
        .route("/messages/{conversation_id}", get(messages::conversation));

    Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .with_state(state)
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    }))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

/// Run marketplace work on the blocking pool. SQLite calls block, so they
/// never run on the async workers.
pub(crate) async fn with_market<F, T>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Marketplace) -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.market))
        .await
        .map_err(|e| ApiError::internal("spawn_blocking join error", e))?
}
