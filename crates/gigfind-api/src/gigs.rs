use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use gigfind_core::Pagination;
use gigfind_db::models::{GigChanges, GigFilter, GigWithCreator, NewGig};
use gigfind_types::api::{
    ApiResponse, CreateGigRequest, DeletedResponse, GigListQuery, GigListResponse, GigResponse,
    SetGigStatusRequest, UpdateGigRequest, UserRef,
};

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::AuthUser;
use crate::with_market;

fn gig_response(row: GigWithCreator) -> GigResponse {
    let GigWithCreator {
        gig,
        creator_name,
        creator_email,
    } = row;

    GigResponse {
        id: gig.id,
        title: gig.title,
        description: gig.description,
        category: gig.category,
        pay_rate: gig.pay_rate,
        currency: gig.currency,
        created_by: UserRef {
            id: gig.created_by,
            name: Some(creator_name),
            email: Some(creator_email),
        },
        status: gig.status,
        created_at: gig.created_at,
        updated_at: gig.updated_at,
    }
}

/// Public listing of open gigs.
pub async fn list_gigs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<GigListQuery>,
) -> ApiResult<Json<ApiResponse<GigListResponse>>> {
    let pagination = Pagination::new(query.page, query.limit);
    let filter = GigFilter {
        category: query.category,
        min_pay: query.min_pay,
        max_pay: query.max_pay,
        search: query.search,
    };

    let listing = with_market(&state, move |market| Ok(market.list_gigs(&filter, pagination)?)).await?;

    Ok(Json(ApiResponse::ok(GigListResponse {
        gigs: listing.gigs.into_iter().map(gig_response).collect(),
        total: listing.total,
        page: listing.page,
        limit: listing.limit,
        total_pages: listing.total_pages,
    })))
}

pub async fn my_gigs(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<GigResponse>>>> {
    let gigs = with_market(&state, move |market| Ok(market.my_gigs(auth.id)?)).await?;
    Ok(Json(ApiResponse::ok(gigs.into_iter().map(gig_response).collect())))
}

pub async fn get_gig(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<GigResponse>>> {
    let gig = with_market(&state, move |market| Ok(market.gig(id)?)).await?;
    Ok(Json(ApiResponse::ok(gig_response(gig))))
}

pub async fn create_gig(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreateGigRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let new = NewGig {
        title: req.title,
        description: req.description,
        category: req.category,
        pay_rate: req.pay_rate,
        currency: req.currency,
        created_by: auth.id,
    };
    let gig = with_market(&state, move |market| Ok(market.create_gig(&new)?)).await?;
    info!("Gig {} posted by {}", gig.gig.id, auth.id);

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(gig_response(gig)))))
}

pub async fn update_gig(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateGigRequest>,
) -> ApiResult<Json<ApiResponse<GigResponse>>> {
    req.validate()?;

    let changes = GigChanges {
        title: req.title,
        description: req.description,
        category: req.category,
        pay_rate: req.pay_rate,
        currency: req.currency,
    };
    let gig = with_market(&state, move |market| Ok(market.update_gig(id, auth.id, &changes)?)).await?;

    Ok(Json(ApiResponse::ok(gig_response(gig))))
}

/// Owner closes or reopens a gig.
pub async fn set_gig_status(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<SetGigStatusRequest>,
) -> ApiResult<Json<ApiResponse<GigResponse>>> {
    let gig = with_market(&state, move |market| {
        Ok(market.set_gig_status(id, auth.id, req.status)?)
    })
    .await?;

    Ok(Json(ApiResponse::ok(gig_response(gig))))
}

pub async fn delete_gig(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<DeletedResponse>>> {
    with_market(&state, move |market| Ok(market.delete_gig(id, auth.id)?)).await?;
    info!("Gig {} deleted by {}", id, auth.id);

    Ok(Json(ApiResponse::ok(DeletedResponse { id })))
}
