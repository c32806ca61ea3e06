//! Database row types. These map directly to SQLite rows and are the
//! contract of the repository; HTTP shaping happens in gigfind-api.
//!
//! Joined views are separate types that embed the base row, so callers pick
//! the shape they need instead of probing optional fields.

use chrono::{DateTime, Utc};
use gigfind_types::models::{ApplicationStatus, GigStatus};
use uuid::Uuid;

pub const DEFAULT_CURRENCY: &str = "USD";

// -- Users --

#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A user together with the stored password hash. Only the credential
/// lookups return this.
#[derive(Debug, Clone, PartialEq)]
pub struct UserCredentials {
    pub user: UserRow,
    pub password_hash: String,
}

// -- Gigs --

#[derive(Debug, Clone, PartialEq)]
pub struct GigRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub pay_rate: f64,
    pub currency: String,
    pub created_by: Uuid,
    pub status: GigStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewGig {
    pub title: String,
    pub description: String,
    pub category: String,
    pub pay_rate: f64,
    /// `None` stores [`DEFAULT_CURRENCY`].
    pub currency: Option<String>,
    pub created_by: Uuid,
}

/// Partial gig update; only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct GigChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub pay_rate: Option<f64>,
    pub currency: Option<String>,
}

impl GigChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.pay_rate.is_none()
            && self.currency.is_none()
    }
}

/// Filters for the public gig listing. Only open gigs are ever listed.
#[derive(Debug, Clone, Default)]
pub struct GigFilter {
    pub category: Option<String>,
    pub min_pay: Option<f64>,
    pub max_pay: Option<f64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GigWithCreator {
    pub gig: GigRow,
    pub creator_name: String,
    pub creator_email: String,
}

#[derive(Debug, Clone)]
pub struct GigPage {
    pub gigs: Vec<GigWithCreator>,
    pub total: u64,
}

// -- Applications --

#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub gig_id: Uuid,
    pub applicant_id: Uuid,
    pub message: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

/// Result of an application insert. Expected rejections are values, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Created(ApplicationRow),
    /// Gig does not exist or is not open.
    GigUnavailable,
    /// The (gig, applicant) unique constraint rejected the insert.
    Duplicate,
}

/// Owner's view: who applied, and to which gig.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationWithApplicant {
    pub application: ApplicationRow,
    pub applicant_name: String,
    pub applicant_email: String,
    pub gig_title: String,
}

/// Applicant's view: what they applied to.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationWithGig {
    pub application: ApplicationRow,
    pub gig_title: String,
    pub gig_category: String,
    pub gig_pay_rate: f64,
    pub gig_status: GigStatus,
    pub gig_created_by: Uuid,
}

// -- Messages --

#[derive(Debug, Clone, PartialEq)]
pub struct MessageRow {
    pub id: Uuid,
    pub gig_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub body: String,
    pub conversation_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub gig_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub body: String,
    pub conversation_id: String,
}

/// Message joined with gig title and both participants. Joins are LEFT
/// joins, so display fields may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageWithParticipants {
    pub message: MessageRow,
    pub gig_title: Option<String>,
    pub sender_name: Option<String>,
    pub sender_email: Option<String>,
    pub receiver_name: Option<String>,
    pub receiver_email: Option<String>,
}
