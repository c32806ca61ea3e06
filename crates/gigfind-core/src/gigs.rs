use gigfind_db::models::{GigChanges, GigFilter, GigWithCreator, NewGig};
use gigfind_types::models::GigStatus;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::Marketplace;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

const NOT_FOUND_OR_NOT_OWNER: &str = "Gig not found or not owner";

/// 1-indexed page request, clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit))
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone)]
pub struct GigListing {
    pub gigs: Vec<GigWithCreator>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl Marketplace {
    /// New gigs always start `open`; currency defaults to USD.
    pub fn create_gig(&self, new: &NewGig) -> DomainResult<GigWithCreator> {
        let gig = self.db.create_gig(new)?;
        debug!("Gig {} created by {}", gig.id, gig.created_by);
        self.gig(gig.id)
    }

    pub fn gig(&self, id: Uuid) -> DomainResult<GigWithCreator> {
        self.db
            .get_gig_with_creator(id)?
            .ok_or_else(|| DomainError::not_found("Gig not found"))
    }

    /// Public listing: open gigs only, newest first.
    pub fn list_gigs(&self, filter: &GigFilter, pagination: Pagination) -> DomainResult<GigListing> {
        let page = self.db.list_gigs(filter, pagination.page, pagination.limit)?;
        Ok(GigListing {
            total_pages: pagination.total_pages(page.total),
            gigs: page.gigs,
            total: page.total,
            page: pagination.page,
            limit: pagination.limit,
        })
    }

    pub fn my_gigs(&self, owner: Uuid) -> DomainResult<Vec<GigWithCreator>> {
        Ok(self.db.list_gigs_by_user(owner)?)
    }

    pub fn update_gig(
        &self,
        id: Uuid,
        requester: Uuid,
        changes: &GigChanges,
    ) -> DomainResult<GigWithCreator> {
        match self.db.update_gig(id, requester, changes)? {
            Some(gig) => self.gig(gig.id),
            None => Err(self.ownership_failure(id, requester)),
        }
    }

    pub fn set_gig_status(
        &self,
        id: Uuid,
        requester: Uuid,
        status: GigStatus,
    ) -> DomainResult<GigWithCreator> {
        match self.db.set_gig_status(id, requester, status)? {
            Some(gig) => {
                debug!("Gig {} is now {}", id, status);
                self.gig(gig.id)
            }
            None => Err(self.ownership_failure(id, requester)),
        }
    }

    pub fn delete_gig(&self, id: Uuid, requester: Uuid) -> DomainResult<()> {
        if self.db.delete_gig(id, requester)? {
            debug!("Gig {} deleted", id);
            Ok(())
        } else {
            Err(self.ownership_failure(id, requester))
        }
    }

    /// Missing and not-owned look the same to the caller.
    fn ownership_failure(&self, id: Uuid, requester: Uuid) -> DomainError {
        warn!("User {} denied mutation of gig {}", requester, id);
        DomainError::not_found(NOT_FOUND_OR_NOT_OWNER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamps() {
        assert_eq!(Pagination::new(None, None), Pagination { page: 1, limit: 20 });
        assert_eq!(Pagination::new(Some(0), Some(0)), Pagination { page: 1, limit: 1 });
        assert_eq!(Pagination::new(Some(3), Some(500)).limit, MAX_PAGE_SIZE);
        assert_eq!(Pagination::new(Some(3), Some(10)), Pagination { page: 3, limit: 10 });
    }

    #[test]
    fn test_total_pages() {
        let p = Pagination::new(Some(1), Some(10));
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(10), 1);
        assert_eq!(p.total_pages(11), 2);
    }
}
