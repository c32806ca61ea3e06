use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id              TEXT PRIMARY KEY,
                email           TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password_hash   TEXT NOT NULL,
                name            TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE gigs (
                id              TEXT PRIMARY KEY,
                title           TEXT NOT NULL,
                description     TEXT NOT NULL,
                category        TEXT NOT NULL,
                pay_rate        REAL NOT NULL CHECK (pay_rate >= 0),
                currency        TEXT NOT NULL DEFAULT 'USD',
                created_by      TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                status          TEXT NOT NULL DEFAULT 'open' CHECK (status IN ('open', 'closed')),
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE INDEX idx_gigs_status_created ON gigs(status, created_at);
            CREATE INDEX idx_gigs_created_by ON gigs(created_by);

            -- One application per (gig, applicant) is enforced here, not only in code
            CREATE TABLE applications (
                id              TEXT PRIMARY KEY,
                gig_id          TEXT NOT NULL REFERENCES gigs(id) ON DELETE CASCADE,
                applicant_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                message         TEXT NOT NULL,
                status          TEXT NOT NULL DEFAULT 'pending'
                                CHECK (status IN ('pending', 'accepted', 'rejected')),
                created_at      TEXT NOT NULL,
                UNIQUE (gig_id, applicant_id)
            );

            CREATE INDEX idx_applications_applicant ON applications(applicant_id);

            CREATE TABLE messages (
                id              TEXT PRIMARY KEY,
                gig_id          TEXT NOT NULL REFERENCES gigs(id) ON DELETE CASCADE,
                sender_id       TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                receiver_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                body            TEXT NOT NULL,
                conversation_id TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_messages_conversation ON messages(conversation_id, created_at);
            CREATE INDEX idx_messages_sender ON messages(sender_id);
            CREATE INDEX idx_messages_receiver ON messages(receiver_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 1);

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
