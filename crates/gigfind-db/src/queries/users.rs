use anyhow::Result;
use rusqlite::{Connection, Row};
use tracing::debug;
use uuid::Uuid;

use super::{OptionalExt, is_unique_violation, now, parse_col};
use crate::Database;
use crate::models::{UserCredentials, UserRow};

const USER_COLUMNS: &str = "id, email, name, created_at, password_hash";

impl Database {
    /// Insert a user. Emails are stored lower-cased; returns `None` when the
    /// address is already registered in any letter case.
    pub fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<Option<UserRow>> {
        let id = Uuid::new_v4();
        let email = email.trim().to_lowercase();

        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, email, password_hash, name, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (id.to_string(), &email, password_hash, name, now()),
            );

            match inserted {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => {
                    debug!("Email {} already registered", email);
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            }

            Ok(query_user(conn, "id", &id.to_string())?.map(|c| c.user))
        })
    }

    pub fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserRow>> {
        Ok(self.get_user_credentials(id)?.map(|c| c.user))
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(self.find_user_credentials_by_email(email)?.map(|c| c.user))
    }

    pub fn get_user_credentials(&self, id: Uuid) -> Result<Option<UserCredentials>> {
        self.with_conn(|conn| query_user(conn, "id", &id.to_string()))
    }

    pub fn find_user_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
        let email = email.trim().to_lowercase();
        self.with_conn(|conn| query_user(conn, "email", &email))
    }
}

fn query_user(conn: &Connection, key: &str, value: &str) -> Result<Option<UserCredentials>> {
    // `key` is one of two internal column names, never caller input.
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users WHERE {} = ?1",
        USER_COLUMNS, key
    ))?;

    stmt.query_row([value], credentials_from_row).optional()
}

fn credentials_from_row(row: &Row<'_>) -> rusqlite::Result<UserCredentials> {
    Ok(UserCredentials {
        user: UserRow {
            id: parse_col(row, 0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            created_at: row.get(3)?,
        },
        password_hash: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use crate::queries::fixtures;

    #[test]
    fn test_create_and_lookup_user() {
        let db = Database::open_in_memory().unwrap();
        let user = fixtures::user(&db, "Ada@Example.com", "Ada");

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name, "Ada");

        let by_id = db.get_user_by_id(user.id).unwrap().unwrap();
        assert_eq!(by_id, user);

        let by_email = db.find_user_by_email("ADA@example.COM").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[test]
    fn test_duplicate_email_is_case_insensitive() {
        let db = Database::open_in_memory().unwrap();
        fixtures::user(&db, "bob@example.com", "Bob");

        let dup = db.create_user("BOB@example.com", "hash", "Other Bob").unwrap();
        assert!(dup.is_none());
    }

    #[test]
    fn test_credentials_only_from_credential_lookup() {
        let db = Database::open_in_memory().unwrap();
        let user = db
            .create_user("carol@example.com", "$argon2id$secret", "Carol")
            .unwrap()
            .unwrap();

        let creds = db.find_user_credentials_by_email("carol@example.com").unwrap().unwrap();
        assert_eq!(creds.password_hash, "$argon2id$secret");
        assert_eq!(creds.user, user);

        assert!(db.get_user_credentials(uuid::Uuid::new_v4()).unwrap().is_none());
    }
}
