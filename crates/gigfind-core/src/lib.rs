//! Marketplace rules on top of the repository.
//!
//! Every operation takes the id of an already-authenticated requester and
//! decides ownership and permission before touching storage. Credential
//! checks happen before this layer is reached.

pub mod applications;
pub mod conversation;
pub mod error;
pub mod gigs;
pub mod messages;
pub mod policy;
pub mod users;

use gigfind_db::Database;

pub use conversation::{Conversation, conversation_id, group_conversations};
pub use error::{DomainError, DomainResult};
pub use gigs::{GigListing, Pagination};
pub use policy::StatusPolicy;

/// The domain service. Owns its storage handle; build one per process and
/// share it behind an `Arc`.
pub struct Marketplace {
    db: Database,
    policy: StatusPolicy,
}

impl Marketplace {
    pub fn new(db: Database, policy: StatusPolicy) -> Self {
        Self { db, policy }
    }

    pub fn policy(&self) -> StatusPolicy {
        self.policy
    }
}
