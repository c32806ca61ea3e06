use axum::{Json, extract::State};
use uuid::Uuid;

use gigfind_db::models::UserRow;
use gigfind_types::api::{ApiResponse, UserResponse};

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::extract::ApiPath;
use crate::middleware::AuthUser;
use crate::with_market;

pub(crate) fn user_response(user: UserRow) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email,
        name: user.name,
        created_at: user.created_at,
    }
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user = with_market(&state, move |market| Ok(market.user(auth.id)?)).await?;
    Ok(Json(ApiResponse::ok(user_response(user))))
}

pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user = with_market(&state, move |market| Ok(market.user(id)?)).await?;
    Ok(Json(ApiResponse::ok(user_response(user))))
}
