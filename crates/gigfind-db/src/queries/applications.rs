use anyhow::Result;
use gigfind_types::models::{ApplicationStatus, GigStatus};
use rusqlite::{Connection, Row};
use tracing::debug;
use uuid::Uuid;

use super::gigs::query_gig;
use super::{OptionalExt, is_unique_violation, now, parse_col};
use crate::Database;
use crate::models::{ApplicationRow, ApplicationWithApplicant, ApplicationWithGig, ApplyOutcome};

const APPLICATION_COLUMNS: &str =
    "a.id, a.gig_id, a.applicant_id, a.message, a.status, a.created_at";
const APPLICATION_COLUMN_COUNT: usize = 6;

impl Database {
    // -- Applications --

    /// Insert an application if the gig exists and is open. A duplicate
    /// (gig, applicant) pair is caught by the unique constraint, so two
    /// racing submissions cannot both succeed.
    pub fn create_application(
        &self,
        gig_id: Uuid,
        applicant_id: Uuid,
        message: &str,
    ) -> Result<ApplyOutcome> {
        let id = Uuid::new_v4();

        self.with_conn(|conn| {
            match query_gig(conn, gig_id)? {
                Some(gig) if gig.status == GigStatus::Open => {}
                _ => return Ok(ApplyOutcome::GigUnavailable),
            }

            let inserted = conn.execute(
                "INSERT INTO applications (id, gig_id, applicant_id, message, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (
                    id.to_string(),
                    gig_id.to_string(),
                    applicant_id.to_string(),
                    message,
                    ApplicationStatus::Pending.as_str(),
                    now(),
                ),
            );

            match inserted {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => {
                    debug!("Duplicate application on gig {} by {}", gig_id, applicant_id);
                    return Ok(ApplyOutcome::Duplicate);
                }
                Err(e) => return Err(e.into()),
            }

            query_application(conn, id)?
                .map(ApplyOutcome::Created)
                .ok_or_else(|| anyhow::anyhow!("Application {} vanished after insert", id))
        })
    }

    pub fn get_application_by_id(&self, id: Uuid) -> Result<Option<ApplicationRow>> {
        self.with_conn(|conn| query_application(conn, id))
    }

    pub fn get_application_with_details(
        &self,
        id: Uuid,
    ) -> Result<Option<ApplicationWithApplicant>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {}, u.name, u.email, g.title
                 FROM applications a
                 JOIN users u ON a.applicant_id = u.id
                 JOIN gigs g ON a.gig_id = g.id
                 WHERE a.id = ?1",
                APPLICATION_COLUMNS
            ))?;
            stmt.query_row([id.to_string()], with_applicant_from_row)
                .optional()
        })
    }

    pub fn list_applications_by_gig(&self, gig_id: Uuid) -> Result<Vec<ApplicationWithApplicant>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {}, u.name, u.email, g.title
                 FROM applications a
                 JOIN users u ON a.applicant_id = u.id
                 JOIN gigs g ON a.gig_id = g.id
                 WHERE a.gig_id = ?1
                 ORDER BY a.created_at DESC, a.rowid DESC",
                APPLICATION_COLUMNS
            ))?;

            let rows = stmt
                .query_map([gig_id.to_string()], with_applicant_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_applications_by_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Vec<ApplicationWithGig>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {}, g.title, g.category, g.pay_rate, g.status, g.created_by
                 FROM applications a
                 JOIN gigs g ON a.gig_id = g.id
                 WHERE a.applicant_id = ?1
                 ORDER BY a.created_at DESC, a.rowid DESC",
                APPLICATION_COLUMNS
            ))?;

            let rows = stmt
                .query_map([applicant_id.to_string()], |row| {
                    let n = APPLICATION_COLUMN_COUNT;
                    Ok(ApplicationWithGig {
                        application: application_from_row(row)?,
                        gig_title: row.get(n)?,
                        gig_category: row.get(n + 1)?,
                        gig_pay_rate: row.get(n + 2)?,
                        gig_status: parse_col(row, n + 3)?,
                        gig_created_by: parse_col(row, n + 4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Set the status if `gig_owner` owns the application's gig. `None`
    /// means the application is missing or the requester is not the owner.
    pub fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        gig_owner: Uuid,
    ) -> Result<Option<ApplicationRow>> {
        self.with_conn(|conn| write_application_status(conn, id, status, gig_owner, None))
    }

    /// Like [`Database::update_application_status`], but only succeeds while
    /// the application is still in `from`. Used to make a transition one-shot.
    pub fn transition_application_status(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
        gig_owner: Uuid,
    ) -> Result<Option<ApplicationRow>> {
        self.with_conn(|conn| write_application_status(conn, id, to, gig_owner, Some(from)))
    }

    pub fn has_application(&self, gig_id: Uuid, applicant_id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM applications WHERE gig_id = ?1 AND applicant_id = ?2",
                    (gig_id.to_string(), applicant_id.to_string()),
                    |row| row.get::<_, i64>(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }
}

fn write_application_status(
    conn: &Connection,
    id: Uuid,
    status: ApplicationStatus,
    gig_owner: Uuid,
    from: Option<ApplicationStatus>,
) -> Result<Option<ApplicationRow>> {
    let changed = conn.execute(
        "UPDATE applications SET status = ?1
         WHERE id = ?2
           AND gig_id IN (SELECT id FROM gigs WHERE created_by = ?3)
           AND (?4 IS NULL OR status = ?4)",
        (
            status.as_str(),
            id.to_string(),
            gig_owner.to_string(),
            from.map(|s| s.as_str()),
        ),
    )?;

    if changed == 0 {
        return Ok(None);
    }
    query_application(conn, id)
}

fn query_application(conn: &Connection, id: Uuid) -> Result<Option<ApplicationRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM applications a WHERE a.id = ?1",
        APPLICATION_COLUMNS
    ))?;
    stmt.query_row([id.to_string()], application_from_row).optional()
}

fn application_from_row(row: &Row<'_>) -> rusqlite::Result<ApplicationRow> {
    Ok(ApplicationRow {
        id: parse_col(row, 0)?,
        gig_id: parse_col(row, 1)?,
        applicant_id: parse_col(row, 2)?,
        message: row.get(3)?,
        status: parse_col(row, 4)?,
        created_at: row.get(5)?,
    })
}

fn with_applicant_from_row(row: &Row<'_>) -> rusqlite::Result<ApplicationWithApplicant> {
    let n = APPLICATION_COLUMN_COUNT;
    Ok(ApplicationWithApplicant {
        application: application_from_row(row)?,
        applicant_name: row.get(n)?,
        applicant_email: row.get(n + 1)?,
        gig_title: row.get(n + 2)?,
    })
}
