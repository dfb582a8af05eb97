use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id              TEXT PRIMARY KEY,
                user_name       TEXT NOT NULL,
                first_name      TEXT NOT NULL,
                last_name       TEXT NOT NULL,
                email           TEXT NOT NULL UNIQUE,
                password        TEXT NOT NULL,
                year_graduated  INTEGER NOT NULL,
                major           TEXT,
                company         TEXT,
                title           TEXT,
                linkedin_link   TEXT,
                role            TEXT NOT NULL DEFAULT 'user',
                approved        INTEGER NOT NULL DEFAULT 0,
                refresh_token   TEXT,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_users_approved
                ON users(approved);

            CREATE TABLE IF NOT EXISTS majors (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                department  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS opportunities (
                id              TEXT PRIMARY KEY,
                title           TEXT NOT NULL,
                posted_by       TEXT NOT NULL,
                kind            TEXT,
                description     TEXT NOT NULL,
                needs_approval  INTEGER NOT NULL,
                approved        INTEGER NOT NULL DEFAULT 0,
                approved_by     TEXT,
                is_paid         INTEGER NOT NULL DEFAULT 0,
                amount          TEXT,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL,
                CHECK ((approved = 0) = (approved_by IS NULL))
            );

            CREATE INDEX IF NOT EXISTS idx_opportunities_approved
                ON opportunities(approved);

            -- No foreign keys: sender and recipient are plain id lookups and
            -- messages outlive the accounts that exchanged them.
            CREATE TABLE IF NOT EXISTS messages (
                id          TEXT PRIMARY KEY,
                sender      TEXT NOT NULL,
                recipient   TEXT NOT NULL,
                content     TEXT NOT NULL,
                is_read     INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_messages_recipient
                ON messages(recipient, created_at);

            CREATE INDEX IF NOT EXISTS idx_messages_sender
                ON messages(sender, created_at);

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
    fn running_twice_is_a_no_op() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }
}
