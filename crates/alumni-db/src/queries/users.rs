use anyhow::Result;
use rusqlite::{Connection, Row};

use super::OptionalExt;
use crate::models::{NewUser, UserProfile, UserRow};
use crate::{Database, timestamp};

const USER_COLUMNS: &str = "id, user_name, first_name, last_name, email, password, year_graduated,
     major, company, title, linkedin_link, role, approved, refresh_token, created_at, updated_at";

impl Database {
    pub fn create_user(&self, user: &NewUser<'_>) -> Result<UserRow> {
        let now = timestamp();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, user_name, first_name, last_name, email, password,
                                    year_graduated, major, company, title, linkedin_link,
                                    role, approved, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
                rusqlite::params![
                    user.id,
                    user.user_name,
                    user.first_name,
                    user.last_name,
                    user.email,
                    user.password_hash,
                    user.year_graduated,
                    user.major,
                    user.company,
                    user.title,
                    user.linkedin_link,
                    user.role.as_str(),
                    user.approved,
                    now,
                ],
            )?;
            query_user(conn, "id", user.id)?
                .ok_or_else(|| anyhow::anyhow!("User vanished after insert: {}", user.id))
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    /// Users in the given approval state, oldest account first.
    pub fn list_users(&self, approved: bool) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE approved = ?1 ORDER BY created_at, rowid"
            ))?;
            let rows = stmt
                .query_map([approved], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Replace the profile columns. Returns `None` if no such user.
    pub fn update_user_profile(
        &self,
        id: &str,
        profile: &UserProfile<'_>,
    ) -> Result<Option<UserRow>> {
        let now = timestamp();
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users
                 SET user_name = ?2, first_name = ?3, last_name = ?4, email = ?5,
                     year_graduated = ?6, major = ?7, company = ?8, title = ?9,
                     linkedin_link = ?10, updated_at = ?11
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    profile.user_name,
                    profile.first_name,
                    profile.last_name,
                    profile.email,
                    profile.year_graduated,
                    profile.major,
                    profile.company,
                    profile.title,
                    profile.linkedin_link,
                    now,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_user(conn, "id", id)
        })
    }

    pub fn delete_user(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM users WHERE id = ?1", [id])? > 0))
    }

    /// Flip `approved` on. No approver is recorded for accounts.
    pub fn approve_user(&self, id: &str) -> Result<Option<UserRow>> {
        let now = timestamp();
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET approved = 1, updated_at = ?2 WHERE id = ?1",
                rusqlite::params![id, now],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_user(conn, "id", id)
        })
    }

    /// Overwrite (or clear) the stored refresh token. Returns false if no such user.
    pub fn set_refresh_token(&self, id: &str, token: Option<&str>) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET refresh_token = ?2 WHERE id = ?1",
                rusqlite::params![id, token],
            )?;
            Ok(changed > 0)
        })
    }

    /// Replace the stored refresh token only if it still equals `expected`.
    /// Returns false when another writer got there first (or the user is gone).
    pub fn swap_refresh_token(&self, id: &str, expected: &str, replacement: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET refresh_token = ?3 WHERE id = ?1 AND refresh_token = ?2",
                rusqlite::params![id, expected, replacement],
            )?;
            Ok(changed > 0)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"))?;
    stmt.query_row([value], user_from_row).optional()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        user_name: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        email: row.get(4)?,
        password: row.get(5)?,
        year_graduated: row.get(6)?,
        major: row.get(7)?,
        company: row.get(8)?,
        title: row.get(9)?,
        linkedin_link: row.get(10)?,
        role: row.get(11)?,
        approved: row.get(12)?,
        refresh_token: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::is_unique_violation;
    use alumni_types::models::Role;

    fn new_user<'a>(id: &'a str, email: &'a str) -> NewUser<'a> {
        NewUser {
            id,
            user_name: "alice",
            first_name: "Alice",
            last_name: "Liddell",
            email,
            password_hash: "$argon2id$stub",
            year_graduated: 2020,
            major: Some("Mathematics"),
            company: None,
            title: None,
            linkedin_link: None,
            role: Role::User,
            approved: false,
        }
    }

    #[test]
    fn create_and_fetch() {
        let db = Database::open_in_memory().unwrap();
        let row = db.create_user(&new_user("u1", "a@x.com")).unwrap();
        assert_eq!(row.email, "a@x.com");
        assert!(!row.approved);
        assert_eq!(row.role, "user");
        assert!(row.refresh_token.is_none());

        assert!(db.get_user_by_email("a@x.com").unwrap().is_some());
        assert!(db.get_user_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_a_unique_violation() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&new_user("u1", "a@x.com")).unwrap();
        let err = db.create_user(&new_user("u2", "a@x.com")).unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[test]
    fn listing_splits_on_approval() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&new_user("u1", "a@x.com")).unwrap();
        db.create_user(&new_user("u2", "b@x.com")).unwrap();
        db.approve_user("u2").unwrap().unwrap();

        let pending: Vec<_> = db.list_users(false).unwrap().into_iter().map(|u| u.id).collect();
        let approved: Vec<_> = db.list_users(true).unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(pending, vec!["u1"]);
        assert_eq!(approved, vec!["u2"]);
        assert!(db.approve_user("nope").unwrap().is_none());
    }

    #[test]
    fn refresh_token_swap_requires_the_current_value() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&new_user("u1", "a@x.com")).unwrap();
        assert!(db.set_refresh_token("u1", Some("t1")).unwrap());

        assert!(db.swap_refresh_token("u1", "t1", "t2").unwrap());
        assert!(!db.swap_refresh_token("u1", "t1", "t3").unwrap());
        let row = db.get_user_by_id("u1").unwrap().unwrap();
        assert_eq!(row.refresh_token.as_deref(), Some("t2"));

        assert!(db.set_refresh_token("u1", None).unwrap());
        assert!(!db.swap_refresh_token("u1", "t2", "t4").unwrap());
    }

    #[test]
    fn profile_update_and_delete() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&new_user("u1", "a@x.com")).unwrap();
        let profile = UserProfile {
            user_name: "al",
            first_name: "Al",
            last_name: "L",
            email: "al@x.com",
            year_graduated: 2021,
            major: None,
            company: Some("Acme"),
            title: Some("Engineer"),
            linkedin_link: None,
        };
        let row = db.update_user_profile("u1", &profile).unwrap().unwrap();
        assert_eq!(row.email, "al@x.com");
        assert_eq!(row.company.as_deref(), Some("Acme"));
        assert!(row.major.is_none());
        assert!(db.update_user_profile("nope", &profile).unwrap().is_none());

        assert!(db.delete_user("u1").unwrap());
        assert!(!db.delete_user("u1").unwrap());
    }
}
