use anyhow::Result;
use rusqlite::Row;

use super::OptionalExt;
use crate::Database;
use crate::models::MajorRow;

impl Database {
    pub fn list_majors(&self) -> Result<Vec<MajorRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name, department FROM majors ORDER BY rowid")?;
            let rows = stmt
                .query_map([], major_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_major(&self, id: &str) -> Result<Option<MajorRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, name, department FROM majors WHERE id = ?1",
                [id],
                major_from_row,
            )
            .optional()
        })
    }

    pub fn create_major(&self, id: &str, name: &str, department: &str) -> Result<MajorRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO majors (id, name, department) VALUES (?1, ?2, ?3)",
                (id, name, department),
            )?;
            Ok(MajorRow {
                id: id.to_string(),
                name: name.to_string(),
                department: department.to_string(),
            })
        })
    }

    pub fn update_major(&self, id: &str, name: &str, department: &str) -> Result<Option<MajorRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE majors SET name = ?2, department = ?3 WHERE id = ?1",
                (id, name, department),
            )?;
            Ok((changed > 0).then(|| MajorRow {
                id: id.to_string(),
                name: name.to_string(),
                department: department.to_string(),
            }))
        })
    }

    pub fn delete_major(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM majors WHERE id = ?1", [id])? > 0))
    }
}

fn major_from_row(row: &Row<'_>) -> rusqlite::Result<MajorRow> {
    Ok(MajorRow {
        id: row.get(0)?,
        name: row.get(1)?,
        department: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn major_crud() {
        let db = Database::open_in_memory().unwrap();
        db.create_major("m1", "Physics", "Science").unwrap();
        db.create_major("m2", "History", "Humanities").unwrap();

        let names: Vec<_> = db.list_majors().unwrap().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["Physics", "History"]);

        let updated = db.update_major("m1", "Applied Physics", "Science").unwrap().unwrap();
        assert_eq!(updated.name, "Applied Physics");
        assert_eq!(db.get_major("m1").unwrap().unwrap().name, "Applied Physics");
        assert!(db.update_major("nope", "x", "y").unwrap().is_none());

        assert!(db.delete_major("m2").unwrap());
        assert!(db.get_major("m2").unwrap().is_none());
        assert!(!db.delete_major("m2").unwrap());
    }
}
