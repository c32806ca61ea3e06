use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{ApplicationStatus, GigStatus};

// -- Envelope --

/// Every response body is wrapped as `{ success, data | error }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Body of a successful delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub id: Uuid,
}

/// Rejects strings that are empty once surrounding whitespace is removed.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// -- Auth --

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    #[validate(
        custom(function = "not_blank", message = "is required"),
        length(max = 200, message = "must be at most 200 characters")
    )]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

// -- Users --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A user nested inside another resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// -- Gigs --

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateGigRequest {
    #[validate(
        custom(function = "not_blank", message = "is required"),
        length(max = 200, message = "must be at most 200 characters")
    )]
    pub title: String,
    #[validate(custom(function = "not_blank", message = "is required"))]
    pub description: String,
    #[validate(
        custom(function = "not_blank", message = "is required"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub category: String,
    #[validate(range(min = 0.0, message = "must be a non-negative number"))]
    pub pay_rate: f64,
    #[validate(length(max = 10, message = "must be at most 10 characters"))]
    pub currency: Option<String>,
}

/// Same rules as creation, applied only to the fields present.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdateGigRequest {
    #[validate(
        custom(function = "not_blank", message = "is required"),
        length(max = 200, message = "must be at most 200 characters")
    )]
    pub title: Option<String>,
    #[validate(custom(function = "not_blank", message = "is required"))]
    pub description: Option<String>,
    #[validate(
        custom(function = "not_blank", message = "is required"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub category: Option<String>,
    #[validate(range(min = 0.0, message = "must be a non-negative number"))]
    pub pay_rate: Option<f64>,
    #[validate(length(max = 10, message = "must be at most 10 characters"))]
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetGigStatusRequest {
    pub status: GigStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GigListQuery {
    pub category: Option<String>,
    pub min_pay: Option<f64>,
    pub max_pay: Option<f64>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GigResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub pay_rate: f64,
    pub currency: String,
    pub created_by: UserRef,
    pub status: GigStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GigListResponse {
    pub gigs: Vec<GigResponse>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

/// A gig nested inside an application or message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GigRef {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Gig fields shown on the applicant's own application list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GigSummary {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub pay_rate: f64,
    pub status: GigStatus,
    pub created_by: Uuid,
}

// -- Applications --

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateApplicationRequest {
    #[validate(
        custom(function = "not_blank", message = "is required"),
        length(max = 2000, message = "must be at most 2000 characters")
    )]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateApplicationRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub gig: GigRef,
    pub applicant: UserRef,
    pub message: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyApplicationResponse {
    pub id: Uuid,
    pub gig: GigSummary,
    pub applicant: Uuid,
    pub message: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

// -- Messages --

/// The conversation id is always derived from the two participants, so the
/// client cannot supply one.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub gig_id: Uuid,
    pub receiver_id: Uuid,
    #[validate(
        custom(function = "not_blank", message = "is required"),
        length(max = 5000, message = "must be at most 5000 characters")
    )]
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub gig: GigRef,
    pub sender: UserRef,
    pub receiver: UserRef,
    pub body: String,
    pub conversation_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub conversation_id: String,
    pub gig: GigRef,
    pub messages: Vec<MessageResponse>,
}
