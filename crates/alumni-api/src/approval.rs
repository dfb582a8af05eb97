//! Two-state visibility gate shared by accounts and opportunities.
//!
//! Every record starts `pending` and moves to `approved` through an admin
//! action; there is no way back. Pending records are invisible on the public
//! path: listing skips them and fetching one by id reports it as missing, so
//! "does not exist" and "not approved yet" look the same to callers.

use uuid::Uuid;

/// Per-entity persistence the workflow needs.
pub trait ApprovalStore: Send + Sync {
    type Record;

    fn list(&self, approved: bool) -> anyhow::Result<Vec<Self::Record>>;

    /// Fetch regardless of approval state.
    fn find(&self, id: Uuid) -> anyhow::Result<Option<Self::Record>>;

    fn is_approved(record: &Self::Record) -> bool;

    /// Move to `approved`. Stores decide whether `approver` is recorded.
    fn approve(&self, id: Uuid, approver: Uuid) -> anyhow::Result<Option<Self::Record>>;
}

#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub struct ApprovalWorkflow<S> {
    store: S,
}

impl<S: ApprovalStore> ApprovalWorkflow<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Admin view.
    pub fn list_pending(&self) -> Result<Vec<S::Record>, ApprovalError> {
        Ok(self.store.list(false)?)
    }

    /// Public view.
    pub fn list_approved(&self) -> Result<Vec<S::Record>, ApprovalError> {
        Ok(self.store.list(true)?)
    }

    /// Public lookup by id; pending records are reported as `NotFound`.
    pub fn get_visible(&self, id: Uuid) -> Result<S::Record, ApprovalError> {
        match self.store.find(id)? {
            Some(record) if S::is_approved(&record) => Ok(record),
            _ => Err(ApprovalError::NotFound),
        }
    }

    /// Approving an approved record is allowed and lands in the same state.
    pub fn approve(&self, id: Uuid, approver: Uuid) -> Result<S::Record, ApprovalError> {
        self.store.approve(id, approver)?.ok_or(ApprovalError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Post {
        id: Uuid,
        approved: bool,
        approved_by: Option<Uuid>,
    }

    #[derive(Default)]
    struct MemoryStore {
        posts: Mutex<BTreeMap<Uuid, Post>>,
    }

    impl MemoryStore {
        fn add(&self) -> Uuid {
            let id = Uuid::new_v4();
            self.posts.lock().unwrap().insert(
                id,
                Post {
                    id,
                    approved: false,
                    approved_by: None,
                },
            );
            id
        }
    }

    impl ApprovalStore for MemoryStore {
        type Record = Post;

        fn list(&self, approved: bool) -> anyhow::Result<Vec<Post>> {
            Ok(self
                .posts
                .lock()
                .unwrap()
                .values()
                .filter(|p| p.approved == approved)
                .cloned()
                .collect())
        }

        fn find(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
            Ok(self.posts.lock().unwrap().get(&id).cloned())
        }

        fn is_approved(record: &Post) -> bool {
            record.approved
        }

        fn approve(&self, id: Uuid, approver: Uuid) -> anyhow::Result<Option<Post>> {
            let mut posts = self.posts.lock().unwrap();
            Ok(posts.get_mut(&id).map(|p| {
                p.approved = true;
                p.approved_by = Some(approver);
                p.clone()
            }))
        }
    }

    struct BrokenStore;

    impl ApprovalStore for BrokenStore {
        type Record = Post;

        fn list(&self, _approved: bool) -> anyhow::Result<Vec<Post>> {
            anyhow::bail!("store offline")
        }

        fn find(&self, _id: Uuid) -> anyhow::Result<Option<Post>> {
            anyhow::bail!("store offline")
        }

        fn is_approved(record: &Post) -> bool {
            record.approved
        }

        fn approve(&self, _id: Uuid, _approver: Uuid) -> anyhow::Result<Option<Post>> {
            anyhow::bail!("store offline")
        }
    }

    #[test]
    fn pending_records_are_hidden_until_approved() {
        let workflow = ApprovalWorkflow::new(MemoryStore::default());
        let id = workflow.store.add();
        let admin = Uuid::new_v4();

        assert!(matches!(workflow.get_visible(id), Err(ApprovalError::NotFound)));
        assert!(workflow.list_approved().unwrap().is_empty());
        assert_eq!(workflow.list_pending().unwrap().len(), 1);

        let approved = workflow.approve(id, admin).unwrap();
        assert!(approved.approved);
        assert_eq!(approved.approved_by, Some(admin));

        assert_eq!(workflow.get_visible(id).unwrap(), approved);
        assert_eq!(workflow.list_approved().unwrap(), vec![approved]);
        assert!(workflow.list_pending().unwrap().is_empty());
    }

    #[test]
    fn approving_twice_keeps_the_terminal_state() {
        let workflow = ApprovalWorkflow::new(MemoryStore::default());
        let id = workflow.store.add();
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());

        workflow.approve(id, first).unwrap();
        let again = workflow.approve(id, second).unwrap();
        assert!(again.approved);
        assert_eq!(again.approved_by, Some(second));
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let workflow = ApprovalWorkflow::new(MemoryStore::default());
        assert!(matches!(workflow.get_visible(Uuid::new_v4()), Err(ApprovalError::NotFound)));
        assert!(matches!(
            workflow.approve(Uuid::new_v4(), Uuid::new_v4()),
            Err(ApprovalError::NotFound)
        ));
    }

    #[test]
    fn store_failures_are_not_reported_as_missing() {
        let workflow = ApprovalWorkflow::new(BrokenStore);
        assert!(matches!(workflow.get_visible(Uuid::new_v4()), Err(ApprovalError::Store(_))));
        assert!(matches!(workflow.list_pending(), Err(ApprovalError::Store(_))));
    }
}
