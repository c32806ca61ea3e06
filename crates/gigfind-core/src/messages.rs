use gigfind_db::models::{MessageWithParticipants, NewMessage};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::conversation::{Conversation, conversation_id, group_conversations, is_participant};
use crate::error::{DomainError, DomainResult};
use crate::Marketplace;

impl Marketplace {
    /// Send a message about a gig.
    ///
    /// The owner may write to anyone about their gig. Anyone else needs an
    /// application on the gig and may only write to the owner.
    ///
    /// Nobody may message themselves, the owner included.
    pub fn send_message(
        &self,
        sender: Uuid,
        gig_id: Uuid,
        receiver: Uuid,
        body: &str,
    ) -> DomainResult<MessageWithParticipants> {
        let gig = self
            .db
            .get_gig_by_id(gig_id)?
            .ok_or_else(|| DomainError::not_found("Gig not found"))?;

        if sender == receiver {
            return Err(DomainError::invalid_state("Cannot message yourself"));
        }
        if self.db.get_user_by_id(receiver)?.is_none() {
            return Err(DomainError::not_found("Receiver not found"));
        }

        let is_owner = gig.created_by == sender;
        if !is_owner {
            if !self.db.has_application(gig_id, sender)? {
                warn!("User {} has no application on gig {}; message refused", sender, gig_id);
                return Err(DomainError::forbidden(
                    "Only gig owner or applicants can message",
                ));
            }
            if receiver != gig.created_by {
                warn!("Applicant {} tried to message non-owner {}", sender, receiver);
                return Err(DomainError::forbidden(
                    "Applicants can only message the gig owner",
                ));
            }
        }

        let message = self.db.create_message(&NewMessage {
            gig_id,
            sender_id: sender,
            receiver_id: receiver,
            body: body.to_string(),
            conversation_id: conversation_id(sender, receiver),
        })?;
        debug!("Message {} sent in {}", message.id, message.conversation_id);

        self.db.get_message_with_details(message.id)?.ok_or_else(|| {
            DomainError::Storage(anyhow::anyhow!("Message {} missing after insert", message.id))
        })
    }

    /// Every conversation the user is part of, most recently active first.
    pub fn inbox(&self, user: Uuid) -> DomainResult<Vec<Conversation>> {
        let messages = self.db.list_messages_by_user(user)?;
        Ok(group_conversations(messages))
    }

    /// One conversation in chronological order. Non-participants get an
    /// empty list.
    pub fn conversation(
        &self,
        conversation_id: &str,
        user: Uuid,
    ) -> DomainResult<Vec<MessageWithParticipants>> {
        if !is_participant(conversation_id, user) {
            return Ok(Vec::new());
        }
        Ok(self.db.list_messages_by_conversation(conversation_id, user)?)
    }
}
