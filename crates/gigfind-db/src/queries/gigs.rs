use anyhow::Result;
use gigfind_types::models::GigStatus;
use rusqlite::types::Value;
use rusqlite::{Connection, Row, params_from_iter};
use uuid::Uuid;

use super::{OptionalExt, now, parse_col};
use crate::Database;
use crate::models::{
    DEFAULT_CURRENCY, GigChanges, GigFilter, GigPage, GigRow, GigWithCreator, NewGig,
};

pub(crate) const GIG_COLUMNS: &str = "g.id, g.title, g.description, g.category, g.pay_rate, \
     g.currency, g.created_by, g.status, g.created_at, g.updated_at";

/// Number of columns in [`GIG_COLUMNS`]; joined fields start at this index.
pub(crate) const GIG_COLUMN_COUNT: usize = 10;

impl Database {
    // -- Gigs --

    pub fn create_gig(&self, new: &NewGig) -> Result<GigRow> {
        let id = Uuid::new_v4();
        let t = now();
        let currency = new.currency.as_deref().unwrap_or(DEFAULT_CURRENCY);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO gigs (id, title, description, category, pay_rate, currency, created_by, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                rusqlite::params![
                    id.to_string(),
                    new.title,
                    new.description,
                    new.category,
                    new.pay_rate,
                    currency,
                    new.created_by.to_string(),
                    GigStatus::Open.as_str(),
                    t,
                ],
            )?;

            query_gig(conn, id)?.ok_or_else(|| anyhow::anyhow!("Gig {} vanished after insert", id))
        })
    }

    pub fn get_gig_by_id(&self, id: Uuid) -> Result<Option<GigRow>> {
        self.with_conn(|conn| query_gig(conn, id))
    }

    pub fn get_gig_with_creator(&self, id: Uuid) -> Result<Option<GigWithCreator>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {}, u.name, u.email
                 FROM gigs g JOIN users u ON g.created_by = u.id
                 WHERE g.id = ?1",
                GIG_COLUMNS
            ))?;
            stmt.query_row([id.to_string()], gig_with_creator_from_row)
                .optional()
        })
    }

    pub fn get_gig_owner_id(&self, gig_id: Uuid) -> Result<Option<Uuid>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT created_by FROM gigs WHERE id = ?1",
                [gig_id.to_string()],
                |row| parse_col(row, 0),
            )
            .optional()
        })
    }

    /// Open gigs matching `filter`, newest first, with the total match count.
    /// `page` is 1-indexed.
    pub fn list_gigs(&self, filter: &GigFilter, page: u32, limit: u32) -> Result<GigPage> {
        let mut conditions = vec!["g.status = ?".to_string()];
        let mut args: Vec<Value> = vec![Value::Text(GigStatus::Open.as_str().to_string())];

        if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
            conditions.push("g.category = ?".to_string());
            args.push(Value::Text(category.to_string()));
        }
        if let Some(min) = filter.min_pay {
            conditions.push("g.pay_rate >= ?".to_string());
            args.push(Value::Real(min));
        }
        if let Some(max) = filter.max_pay {
            conditions.push("g.pay_rate <= ?".to_string());
            args.push(Value::Real(max));
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            conditions.push("(g.title LIKE ? ESCAPE '\\' OR g.description LIKE ? ESCAPE '\\')".to_string());
            let pattern = format!("%{}%", escape_like(term));
            args.push(Value::Text(pattern.clone()));
            args.push(Value::Text(pattern));
        }

        let where_clause = conditions.join(" AND ");
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);

        self.with_conn(|conn| {
            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM gigs g WHERE {}", where_clause),
                params_from_iter(args.iter()),
                |row| row.get(0),
            )?;

            let mut list_args = args.clone();
            list_args.push(Value::Integer(i64::from(limit)));
            list_args.push(Value::Integer(offset));

            let mut stmt = conn.prepare(&format!(
                "SELECT {}, u.name, u.email
                 FROM gigs g JOIN users u ON g.created_by = u.id
                 WHERE {}
                 ORDER BY g.created_at DESC, g.rowid DESC
                 LIMIT ? OFFSET ?",
                GIG_COLUMNS, where_clause
            ))?;

            let gigs = stmt
                .query_map(params_from_iter(list_args.iter()), gig_with_creator_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(GigPage {
                gigs,
                total: total.max(0) as u64,
            })
        })
    }

    /// Every gig the user owns, in any status, newest first.
    pub fn list_gigs_by_user(&self, owner: Uuid) -> Result<Vec<GigWithCreator>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {}, u.name, u.email
                 FROM gigs g JOIN users u ON g.created_by = u.id
                 WHERE g.created_by = ?1
                 ORDER BY g.created_at DESC, g.rowid DESC",
                GIG_COLUMNS
            ))?;

            let rows = stmt
                .query_map([owner.to_string()], gig_with_creator_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Apply `changes` if `requester` owns the gig. `None` means missing or
    /// not owned. An empty change set returns the gig untouched.
    pub fn update_gig(
        &self,
        id: Uuid,
        requester: Uuid,
        changes: &GigChanges,
    ) -> Result<Option<GigRow>> {
        self.with_conn(|conn| {
            let gig = match query_gig(conn, id)? {
                Some(gig) if gig.created_by == requester => gig,
                _ => return Ok(None),
            };

            if changes.is_empty() {
                return Ok(Some(gig));
            }

            let mut sets: Vec<&str> = Vec::new();
            let mut args: Vec<Value> = Vec::new();

            if let Some(title) = &changes.title {
                sets.push("title = ?");
                args.push(Value::Text(title.clone()));
            }
            if let Some(description) = &changes.description {
                sets.push("description = ?");
                args.push(Value::Text(description.clone()));
            }
            if let Some(category) = &changes.category {
                sets.push("category = ?");
                args.push(Value::Text(category.clone()));
            }
            if let Some(pay_rate) = changes.pay_rate {
                sets.push("pay_rate = ?");
                args.push(Value::Real(pay_rate));
            }
            if let Some(currency) = &changes.currency {
                sets.push("currency = ?");
                args.push(Value::Text(currency.clone()));
            }

            sets.push("updated_at = ?");
            args.push(Value::Text(now()));
            args.push(Value::Text(id.to_string()));

            conn.execute(
                &format!("UPDATE gigs SET {} WHERE id = ?", sets.join(", ")),
                params_from_iter(args.iter()),
            )?;

            query_gig(conn, id)
        })
    }

    /// Owner-only status change. `None` means missing or not owned.
    pub fn set_gig_status(
        &self,
        id: Uuid,
        requester: Uuid,
        status: GigStatus,
    ) -> Result<Option<GigRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE gigs SET status = ?1, updated_at = ?2 WHERE id = ?3 AND created_by = ?4",
                (status.as_str(), now(), id.to_string(), requester.to_string()),
            )?;

            if changed == 0 {
                return Ok(None);
            }
            query_gig(conn, id)
        })
    }

    /// Returns whether a row was removed. Applications and messages on the
    /// gig go with it.
    pub fn delete_gig(&self, id: Uuid, requester: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM gigs WHERE id = ?1 AND created_by = ?2",
                (id.to_string(), requester.to_string()),
            )?;
            Ok(removed > 0)
        })
    }
}

pub(crate) fn query_gig(conn: &Connection, id: Uuid) -> Result<Option<GigRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM gigs g WHERE g.id = ?1", GIG_COLUMNS))?;
    stmt.query_row([id.to_string()], gig_from_row).optional()
}

pub(crate) fn gig_from_row(row: &Row<'_>) -> rusqlite::Result<GigRow> {
    Ok(GigRow {
        id: parse_col(row, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        pay_rate: row.get(4)?,
        currency: row.get(5)?,
        created_by: parse_col(row, 6)?,
        status: parse_col(row, 7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn gig_with_creator_from_row(row: &Row<'_>) -> rusqlite::Result<GigWithCreator> {
    Ok(GigWithCreator {
        gig: gig_from_row(row)?,
        creator_name: row.get(GIG_COLUMN_COUNT)?,
        creator_email: row.get(GIG_COLUMN_COUNT + 1)?,
    })
}

/// Escape LIKE wildcards so search terms match literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
