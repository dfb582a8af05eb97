use anyhow::Result;
use rusqlite::{Connection, Row};

use super::OptionalExt;
use crate::models::{OpportunityFields, OpportunityRow};
use crate::{Database, timestamp};

const OPPORTUNITY_COLUMNS: &str = "id, title, posted_by, kind, description, needs_approval,
     approved, approved_by, is_paid, amount, created_at, updated_at";

impl Database {
    /// Insert a new posting. It always starts pending, whatever the caller sent.
    pub fn create_opportunity(
        &self,
        id: &str,
        fields: &OpportunityFields<'_>,
    ) -> Result<OpportunityRow> {
        let now = timestamp();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO opportunities (id, title, posted_by, kind, description, needs_approval,
                                            is_paid, amount, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                rusqlite::params![
                    id,
                    fields.title,
                    fields.posted_by,
                    fields.kind,
                    fields.description,
                    fields.needs_approval,
                    fields.is_paid,
                    fields.amount,
                    now,
                ],
            )?;
            query_opportunity(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("Opportunity vanished after insert: {}", id))
        })
    }

    pub fn get_opportunity(&self, id: &str) -> Result<Option<OpportunityRow>> {
        self.with_conn(|conn| query_opportunity(conn, id))
    }

    /// Postings in the given approval state, newest first.
    pub fn list_opportunities(&self, approved: bool) -> Result<Vec<OpportunityRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {OPPORTUNITY_COLUMNS} FROM opportunities WHERE approved = ?1
                 ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt
                .query_map([approved], opportunity_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Replace the content columns. Approval state is left untouched.
    pub fn update_opportunity(
        &self,
        id: &str,
        fields: &OpportunityFields<'_>,
    ) -> Result<Option<OpportunityRow>> {
        let now = timestamp();
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE opportunities
                 SET title = ?2, posted_by = ?3, kind = ?4, description = ?5, needs_approval = ?6,
                     is_paid = ?7, amount = ?8, updated_at = ?9
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    fields.title,
                    fields.posted_by,
                    fields.kind,
                    fields.description,
                    fields.needs_approval,
                    fields.is_paid,
                    fields.amount,
                    now,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_opportunity(conn, id)
        })
    }

    pub fn delete_opportunity(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM opportunities WHERE id = ?1", [id])? > 0)
        })
    }

    /// Mark approved and stamp the approving admin. Repeating the call
    /// overwrites `approved_by` with the latest approver.
    pub fn approve_opportunity(&self, id: &str, approver: &str) -> Result<Option<OpportunityRow>> {
        let now = timestamp();
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE opportunities SET approved = 1, approved_by = ?2, updated_at = ?3
                 WHERE id = ?1",
                rusqlite::params![id, approver, now],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_opportunity(conn, id)
        })
    }
}

fn query_opportunity(conn: &Connection, id: &str) -> Result<Option<OpportunityRow>> {
    let sql = format!("SELECT {OPPORTUNITY_COLUMNS} FROM opportunities WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_row([id], opportunity_from_row).optional()
}

fn opportunity_from_row(row: &Row<'_>) -> rusqlite::Result<OpportunityRow> {
    Ok(OpportunityRow {
        id: row.get(0)?,
        title: row.get(1)?,
        posted_by: row.get(2)?,
        kind: row.get(3)?,
        description: row.get(4)?,
        needs_approval: row.get(5)?,
        approved: row.get(6)?,
        approved_by: row.get(7)?,
        is_paid: row.get(8)?,
        amount: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}
