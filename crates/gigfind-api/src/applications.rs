use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;
use validator::Validate;

use gigfind_db::models::{ApplicationWithApplicant, ApplicationWithGig};
use gigfind_types::api::{
    ApiResponse, ApplicationResponse, CreateApplicationRequest, GigRef, GigSummary,
    MyApplicationResponse, UpdateApplicationRequest, UserRef,
};

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::AuthUser;
use crate::with_market;

fn application_response(row: ApplicationWithApplicant) -> ApplicationResponse {
    let app = row.application;
    ApplicationResponse {
        id: app.id,
        gig: GigRef {
            id: app.gig_id,
            title: Some(row.gig_title),
        },
        applicant: UserRef {
            id: app.applicant_id,
            name: Some(row.applicant_name),
            email: Some(row.applicant_email),
        },
        message: app.message,
        status: app.status,
        created_at: app.created_at,
    }
}

fn my_application_response(row: ApplicationWithGig) -> MyApplicationResponse {
    let app = row.application;
    MyApplicationResponse {
        id: app.id,
        gig: GigSummary {
            id: app.gig_id,
            title: row.gig_title,
            category: row.gig_category,
            pay_rate: row.gig_pay_rate,
            status: row.gig_status,
            created_by: row.gig_created_by,
        },
        applicant: app.applicant_id,
        message: app.message,
        status: app.status,
        created_at: app.created_at,
    }
}

pub async fn apply(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(gig_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateApplicationRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let application = with_market(&state, move |market| {
        Ok(market.apply(gig_id, auth.id, &req.message)?)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(application_response(application))),
    ))
}

/// Applications received on one gig; owner only.
pub async fn list_for_gig(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(gig_id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<ApplicationResponse>>>> {
    let applications = with_market(&state, move |market| {
        Ok(market.applications_for_gig(gig_id, auth.id)?)
    })
    .await?;

    Ok(Json(ApiResponse::ok(
        applications.into_iter().map(application_response).collect(),
    )))
}

pub async fn my_applications(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<MyApplicationResponse>>>> {
    let applications = with_market(&state, move |market| Ok(market.my_applications(auth.id)?)).await?;

    Ok(Json(ApiResponse::ok(
        applications.into_iter().map(my_application_response).collect(),
    )))
}

pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateApplicationRequest>,
) -> ApiResult<Json<ApiResponse<ApplicationResponse>>> {
    let application = with_market(&state, move |market| {
        Ok(market.update_application_status(id, req.status, auth.id)?)
    })
    .await?;

    Ok(Json(ApiResponse::ok(application_response(application))))
}
