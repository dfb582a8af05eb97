use std::sync::Arc;

use uuid::Uuid;

use alumni_db::Database;
use alumni_types::models::Major;

pub struct MajorService {
    db: Arc<Database>,
}

impl MajorService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn list(&self) -> anyhow::Result<Vec<Major>> {
        Ok(self.db.list_majors()?.into_iter().map(Major::from).collect())
    }

    pub fn get(&self, id: Uuid) -> anyhow::Result<Option<Major>> {
        Ok(self.db.get_major(&id.to_string())?.map(Major::from))
    }

    pub fn create(&self, name: &str, department: &str) -> anyhow::Result<Major> {
        let id = Uuid::new_v4().to_string();
        Ok(Major::from(self.db.create_major(&id, name, department)?))
    }

    pub fn update(&self, id: Uuid, name: &str, department: &str) -> anyhow::Result<Option<Major>> {
        Ok(self
            .db
            .update_major(&id.to_string(), name, department)?
            .map(Major::from))
    }

    pub fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        self.db.delete_major(&id.to_string())
    }
}
