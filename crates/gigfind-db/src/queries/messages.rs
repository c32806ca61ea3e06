use anyhow::Result;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use super::{OptionalExt, now, parse_col};
use crate::Database;
use crate::models::{MessageRow, MessageWithParticipants, NewMessage};

const MESSAGE_COLUMNS: &str =
    "m.id, m.gig_id, m.sender_id, m.receiver_id, m.body, m.conversation_id, m.created_at";
const MESSAGE_COLUMN_COUNT: usize = 7;

/// LEFT JOINs so a message still lists if a display row is gone.
const PARTICIPANT_JOINS: &str = "LEFT JOIN gigs g ON m.gig_id = g.id
     LEFT JOIN users s ON m.sender_id = s.id
     LEFT JOIN users r ON m.receiver_id = r.id";

impl Database {
    // -- Messages --

    pub fn create_message(&self, new: &NewMessage) -> Result<MessageRow> {
        let id = Uuid::new_v4();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, gig_id, sender_id, receiver_id, body, conversation_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                (
                    id.to_string(),
                    new.gig_id.to_string(),
                    new.sender_id.to_string(),
                    new.receiver_id.to_string(),
                    &new.body,
                    &new.conversation_id,
                    now(),
                ),
            )?;

            query_message(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("Message {} vanished after insert", id))
        })
    }

    #[cfg(test)]
    pub(crate) fn get_message_by_id(&self, id: Uuid) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message(conn, id))
    }

    pub fn get_message_with_details(&self, id: Uuid) -> Result<Option<MessageWithParticipants>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {}, g.title, s.name, s.email, r.name, r.email
                 FROM messages m
                 {}
                 WHERE m.id = ?1",
                MESSAGE_COLUMNS, PARTICIPANT_JOINS
            ))?;
            stmt.query_row([id.to_string()], with_participants_from_row)
                .optional()
        })
    }

    /// Inbox view: everything the user sent or received, newest first.
    pub fn list_messages_by_user(&self, user_id: Uuid) -> Result<Vec<MessageWithParticipants>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {}, g.title, s.name, s.email, r.name, r.email
                 FROM messages m
                 {}
                 WHERE m.sender_id = ?1 OR m.receiver_id = ?1
                 ORDER BY m.created_at DESC, m.rowid DESC",
                MESSAGE_COLUMNS, PARTICIPANT_JOINS
            ))?;

            let rows = stmt
                .query_map([user_id.to_string()], with_participants_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Thread view: one conversation in reading order. Rows where `user_id`
    /// is not a participant are never returned.
    pub fn list_messages_by_conversation(
        &self,
        conversation_id: &str,
        user_id: Uuid,
    ) -> Result<Vec<MessageWithParticipants>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {}, g.title, s.name, s.email, r.name, r.email
                 FROM messages m
                 {}
                 WHERE m.conversation_id = ?1 AND (m.sender_id = ?2 OR m.receiver_id = ?2)
                 ORDER BY m.created_at ASC, m.rowid ASC",
                MESSAGE_COLUMNS, PARTICIPANT_JOINS
            ))?;

            let rows = stmt
                .query_map((conversation_id, user_id.to_string()), with_participants_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_message(conn: &Connection, id: Uuid) -> Result<Option<MessageRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM messages m WHERE m.id = ?1",
        MESSAGE_COLUMNS
    ))?;
    stmt.query_row([id.to_string()], message_from_row).optional()
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: parse_col(row, 0)?,
        gig_id: parse_col(row, 1)?,
        sender_id: parse_col(row, 2)?,
        receiver_id: parse_col(row, 3)?,
        body: row.get(4)?,
        conversation_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn with_participants_from_row(row: &Row<'_>) -> rusqlite::Result<MessageWithParticipants> {
    let n = MESSAGE_COLUMN_COUNT;
    Ok(MessageWithParticipants {
        message: message_from_row(row)?,
        gig_title: row.get(n)?,
        sender_name: row.get(n + 1)?,
        sender_email: row.get(n + 2)?,
        receiver_name: row.get(n + 3)?,
        receiver_email: row.get(n + 4)?,
    })
}
