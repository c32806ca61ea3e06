use std::collections::HashMap;

use gigfind_db::models::MessageWithParticipants;
use uuid::Uuid;

/// Canonical key for the thread between two users: the two ids sorted and
/// joined with `_`, so either side derives the same key.
pub fn conversation_id(a: Uuid, b: Uuid) -> String {
    let (a, b) = (a.to_string(), b.to_string());
    if a <= b {
        format!("{}_{}", a, b)
    } else {
        format!("{}_{}", b, a)
    }
}

/// Whether `user` is one of the two parties encoded in `conversation_id`.
pub fn is_participant(conversation_id: &str, user: Uuid) -> bool {
    let user = user.to_string();
    conversation_id.split('_').any(|part| part == user)
}

#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: String,
    /// Gig of the first message seen for this conversation.
    pub gig_id: Uuid,
    pub gig_title: Option<String>,
    pub messages: Vec<MessageWithParticipants>,
}

/// Group an inbox listing by conversation id. Conversations keep the order
/// in which they first appear, and messages keep their input order, so a
/// newest-first inbox yields the most recently active conversation first.
pub fn group_conversations(messages: Vec<MessageWithParticipants>) -> Vec<Conversation> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut conversations: Vec<Conversation> = Vec::new();

    for m in messages {
        let key = m.message.conversation_id.clone();
        match index.get(&key) {
            Some(&i) => conversations[i].messages.push(m),
            None => {
                index.insert(key.clone(), conversations.len());
                conversations.push(Conversation {
                    id: key,
                    gig_id: m.message.gig_id,
                    gig_title: m.gig_title.clone(),
                    messages: vec![m],
                });
            }
        }
    }

    conversations
}
