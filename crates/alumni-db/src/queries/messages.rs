use anyhow::Result;
use rusqlite::{Connection, Row};

use super::OptionalExt;
use crate::models::MessageRow;
use crate::{Database, timestamp};

// JOIN users twice to resolve both display names in a single query (no N+1).
const MESSAGE_SELECT: &str = "SELECT m.id, m.sender, s.user_name, m.recipient, r.user_name,
            m.content, m.is_read, m.created_at
     FROM messages m
     LEFT JOIN users s ON s.id = m.sender
     LEFT JOIN users r ON r.id = m.recipient";

// Microsecond timestamps can still collide; insertion order breaks ties.
const NEWEST_FIRST: &str = "ORDER BY m.created_at DESC, m.rowid DESC";

impl Database {
    pub fn insert_message(
        &self,
        id: &str,
        sender: &str,
        recipient: &str,
        content: &str,
    ) -> Result<MessageRow> {
        let now = timestamp();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, sender, recipient, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, sender, recipient, content, now],
            )?;
            query_message(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("Message vanished after insert: {}", id))
        })
    }

    pub fn get_inbox(&self, user_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!("{MESSAGE_SELECT} WHERE m.recipient = ?1 {NEWEST_FIRST}");
            query_messages(conn, &sql, &[user_id])
        })
    }

    pub fn get_sent(&self, user_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!("{MESSAGE_SELECT} WHERE m.sender = ?1 {NEWEST_FIRST}");
            query_messages(conn, &sql, &[user_id])
        })
    }

    /// Both directions between two users. Symmetric in its arguments.
    pub fn get_conversation(&self, a: &str, b: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                &format!(
                    "{MESSAGE_SELECT}
                     WHERE (m.sender = ?1 AND m.recipient = ?2)
                        OR (m.sender = ?2 AND m.recipient = ?1)
                     {NEWEST_FIRST}"
                ),
                &[a, b],
            )
        })
    }

    /// Set the read flag. Returns `None` if there is no such message.
    pub fn mark_message_read(&self, id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute("UPDATE messages SET is_read = 1 WHERE id = ?1", [id])?;
            if changed == 0 {
                return Ok(None);
            }
            query_message(conn, id)
        })
    }
}

fn query_message(conn: &Connection, id: &str) -> Result<Option<MessageRow>> {
    let mut stmt = conn.prepare(&format!("{MESSAGE_SELECT} WHERE m.id = ?1"))?;
    stmt.query_row([id], message_from_row).optional()
}

fn query_messages(conn: &Connection, sql: &str, params: &[&str]) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params), message_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        sender: row.get(1)?,
        sender_name: row.get(2)?,
        recipient: row.get(3)?,
        recipient_name: row.get(4)?,
        content: row.get(5)?,
        read: row.get(6)?,
        created_at: row.get(7)?,
    })
}
