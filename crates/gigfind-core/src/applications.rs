use gigfind_db::models::{ApplicationWithApplicant, ApplicationWithGig, ApplyOutcome};
use gigfind_types::models::{ApplicationStatus, GigStatus};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::policy::StatusPolicy;
use crate::Marketplace;

const ALREADY_APPLIED: &str = "Already applied to this gig";

impl Marketplace {
    /// Apply to a gig. The gig must exist and be open, and the applicant
    /// must not own it. A second application for the same pair is a
    /// `Conflict`, even when two submissions race past the pre-check.
    pub fn apply(
        &self,
        gig_id: Uuid,
        applicant: Uuid,
        message: &str,
    ) -> DomainResult<ApplicationWithApplicant> {
        let gig = self
            .db
            .get_gig_by_id(gig_id)?
            .ok_or_else(|| DomainError::not_found("Gig not found"))?;

        if gig.status != GigStatus::Open {
            return Err(DomainError::invalid_state("Gig is not accepting applications"));
        }
        if gig.created_by == applicant {
            return Err(DomainError::invalid_state("Cannot apply to your own gig"));
        }
        if self.db.has_application(gig_id, applicant)? {
            return Err(DomainError::conflict(ALREADY_APPLIED));
        }

        let application = match self.db.create_application(gig_id, applicant, message)? {
            ApplyOutcome::Created(row) => row,
            ApplyOutcome::Duplicate => return Err(DomainError::conflict(ALREADY_APPLIED)),
            // closed or deleted between the lookup and the insert
            ApplyOutcome::GigUnavailable => {
                return Err(DomainError::invalid_state("Gig is not accepting applications"));
            }
        };

        debug!("Application {} created on gig {}", application.id, gig_id);
        self.application(application.id)
    }

    pub fn application(&self, id: Uuid) -> DomainResult<ApplicationWithApplicant> {
        self.db
            .get_application_with_details(id)?
            .ok_or_else(|| DomainError::not_found("Application not found"))
    }

    pub fn has_application(&self, gig_id: Uuid, applicant: Uuid) -> DomainResult<bool> {
        Ok(self.db.has_application(gig_id, applicant)?)
    }

    /// Applications on a gig, newest first. Owner only.
    pub fn applications_for_gig(
        &self,
        gig_id: Uuid,
        requester: Uuid,
    ) -> DomainResult<Vec<ApplicationWithApplicant>> {
        match self.db.get_gig_owner_id(gig_id)? {
            Some(owner) if owner == requester => Ok(self.db.list_applications_by_gig(gig_id)?),
            _ => Err(DomainError::not_found("Gig not found or not owner")),
        }
    }

    pub fn my_applications(&self, applicant: Uuid) -> DomainResult<Vec<ApplicationWithGig>> {
        Ok(self.db.list_applications_by_applicant(applicant)?)
    }

    /// Owner-only review decision. Which transitions are legal depends on the
    /// configured [`StatusPolicy`]. The gig itself is never touched.
    pub fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        requester: Uuid,
    ) -> DomainResult<ApplicationWithApplicant> {
        let current = self
            .db
            .get_application_by_id(id)?
            .ok_or_else(|| DomainError::not_found("Application not found"))?;

        if self.db.get_gig_owner_id(current.gig_id)? != Some(requester) {
            warn!("User {} denied status change on application {}", requester, id);
            return Err(DomainError::not_found("Application not found or not gig owner"));
        }

        if !self.policy.allows(current.status, status) {
            return Err(DomainError::invalid_state(format!(
                "Application is already {}",
                current.status
            )));
        }

        let updated = match self.policy {
            StatusPolicy::Reversible => self.db.update_application_status(id, status, requester)?,
            StatusPolicy::OneShot => self.db.transition_application_status(
                id,
                current.status,
                status,
                requester,
            )?,
        };

        match updated {
            Some(row) => {
                debug!("Application {} {} -> {}", id, current.status, row.status);
                self.application(row.id)
            }
            None => Err(DomainError::invalid_state(
                "Application changed while updating; reload and retry",
            )),
        }
    }
}
