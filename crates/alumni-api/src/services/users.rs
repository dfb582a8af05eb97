use std::sync::Arc;

use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use tracing::warn;
use uuid::Uuid;

use alumni_db::models::{NewUser, UserProfile};
use alumni_db::{Database, is_unique_violation};
use alumni_types::models::{Role, User, is_admin};

use crate::approval::{ApprovalStore, ApprovalWorkflow};
use crate::validate::{Profile, Signup};

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Email already registered")]
    EmailTaken,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Account approval. Unlike opportunities, the approving admin is not recorded.
pub struct UserApprovals {
    db: Arc<Database>,
}

impl ApprovalStore for UserApprovals {
    type Record = User;

    fn list(&self, approved: bool) -> anyhow::Result<Vec<User>> {
        Ok(self.db.list_users(approved)?.into_iter().map(User::from).collect())
    }

    fn find(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.db.get_user_by_id(&id.to_string())?.map(User::from))
    }

    fn is_approved(record: &User) -> bool {
        record.approved
    }

    fn approve(&self, id: Uuid, _approver: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.db.approve_user(&id.to_string())?.map(User::from))
    }
}

pub struct UserService {
    db: Arc<Database>,
    approvals: ApprovalWorkflow<UserApprovals>,
}

impl UserService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            approvals: ApprovalWorkflow::new(UserApprovals { db: db.clone() }),
            db,
        }
    }

    pub fn approvals(&self) -> &ApprovalWorkflow<UserApprovals> {
        &self.approvals
    }

    /// Register a regular, not yet approved account.
    pub fn signup(&self, signup: &Signup) -> Result<User, UserError> {
        self.create(&signup.profile, &signup.password, Role::User, false)
    }

    /// Create an approved admin with this email unless the email is already
    /// in use. Returns whether an account was created.
    pub fn ensure_admin(&self, email: &str, password: &str) -> Result<bool, UserError> {
        if let Some(existing) = self.db.get_user_by_email(email)? {
            if !is_admin(&User::from(existing)) {
                warn!("Admin email {} belongs to a regular account; not promoting it", email);
            }
            return Ok(false);
        }
        let profile = Profile {
            user_name: "admin".to_string(),
            first_name: "Site".to_string(),
            last_name: "Administrator".to_string(),
            email: email.to_string(),
            year_graduated: 0,
            major: None,
            company: None,
            title: None,
            linkedin_link: None,
        };
        self.create(&profile, password, Role::Admin, true)?;
        Ok(true)
    }

    fn create(
        &self,
        profile: &Profile,
        password: &str,
        role: Role,
        approved: bool,
    ) -> Result<User, UserError> {
        if self.db.get_user_by_email(&profile.email)?.is_some() {
            return Err(UserError::EmailTaken);
        }

        let password_hash = hash_password(password)?;
        let id = Uuid::new_v4().to_string();

        let row = self
            .db
            .create_user(&NewUser {
                id: &id,
                user_name: &profile.user_name,
                first_name: &profile.first_name,
                last_name: &profile.last_name,
                email: &profile.email,
                password_hash: &password_hash,
                year_graduated: profile.year_graduated,
                major: profile.major.as_deref(),
                company: profile.company.as_deref(),
                title: profile.title.as_deref(),
                linkedin_link: profile.linkedin_link.as_deref(),
                role,
                approved,
            })
            .map_err(|e| {
                // Lost the race against a concurrent signup with the same email.
                if is_unique_violation(&e) { UserError::EmailTaken } else { UserError::Store(e) }
            })?;
        Ok(User::from(row))
    }

    /// The account for these credentials, or `None` if the email is unknown
    /// or the password does not match. Approval is not required.
    pub fn verify_credentials(&self, email: &str, password: &str) -> anyhow::Result<Option<User>> {
        let Some(row) = self.db.get_user_by_email(email)? else {
            return Ok(None);
        };
        if !verify_password(password, &row.password)? {
            return Ok(None);
        }
        Ok(Some(User::from(row)))
    }

    /// Replace the profile. Moving to an email owned by someone else is a conflict.
    pub fn update_profile(&self, id: Uuid, profile: &Profile) -> Result<Option<User>, UserError> {
        let id = id.to_string();
        if let Some(owner) = self.db.get_user_by_email(&profile.email)? {
            if owner.id != id {
                return Err(UserError::EmailTaken);
            }
        }

        let updated = self
            .db
            .update_user_profile(
                &id,
                &UserProfile {
                    user_name: &profile.user_name,
                    first_name: &profile.first_name,
                    last_name: &profile.last_name,
                    email: &profile.email,
                    year_graduated: profile.year_graduated,
                    major: profile.major.as_deref(),
                    company: profile.company.as_deref(),
                    title: profile.title.as_deref(),
                    linkedin_link: profile.linkedin_link.as_deref(),
                },
            )
            .map_err(|e| {
                if is_unique_violation(&e) { UserError::EmailTaken } else { UserError::Store(e) }
            })?;
        Ok(updated.map(User::from))
    }

    pub fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        self.db.delete_user(&id.to_string())
    }
}

/// Argon2id with a random salt, in PHC string form.
fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("Password hashing failed: {}", e))
}

fn verify_password(password: &str, stored_hash: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| anyhow!("Corrupt password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::ApprovalError;

    fn signup_for(email: &str) -> Signup {
        Signup {
            profile: Profile {
                user_name: "alice".into(),
                first_name: "A".into(),
                last_name: "B".into(),
                email: email.into(),
                year_graduated: 2020,
                major: Some("History".into()),
                company: None,
                title: None,
                linkedin_link: None,
            },
            password: "pw".into(),
        }
    }

    fn service() -> UserService {
        UserService::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    #[test]
    fn emails_are_unique() {
        let users = service();
        users.signup(&signup_for("a@x.com")).unwrap();
        assert!(matches!(users.signup(&signup_for("a@x.com")), Err(UserError::EmailTaken)));
        assert!(users.signup(&signup_for("b@x.com")).is_ok());
    }

    #[test]
    fn new_accounts_wait_for_approval() {
        let users = service();
        let alice = users.signup(&signup_for("a@x.com")).unwrap();
        assert!(!alice.approved);
        assert_eq!(alice.role, Role::User);

        let approvals = users.approvals();
        assert!(matches!(approvals.get_visible(alice.id), Err(ApprovalError::NotFound)));
        assert!(approvals.list_approved().unwrap().is_empty());

        let approved = approvals.approve(alice.id, Uuid::new_v4()).unwrap();
        assert!(approved.approved);
        assert_eq!(approvals.get_visible(alice.id).unwrap().id, alice.id);
        assert_eq!(approvals.list_approved().unwrap().len(), 1);
        assert!(approvals.list_pending().unwrap().is_empty());
    }

    #[test]
    fn credentials_check_the_password_hash() {
        let users = service();
        let alice = users.signup(&signup_for("a@x.com")).unwrap();

        let found = users.verify_credentials("a@x.com", "pw").unwrap().unwrap();
        assert_eq!(found.id, alice.id);
        assert!(users.verify_credentials("a@x.com", "wrong").unwrap().is_none());
        assert!(users.verify_credentials("nobody@x.com", "pw").unwrap().is_none());
    }

    #[test]
    fn profile_update_cannot_steal_an_email() {
        let users = service();
        let alice = users.signup(&signup_for("a@x.com")).unwrap();
        users.signup(&signup_for("b@x.com")).unwrap();

        let mut profile = signup_for("b@x.com").profile;
        assert!(matches!(users.update_profile(alice.id, &profile), Err(UserError::EmailTaken)));

        profile.email = "a@x.com".into();
        profile.company = Some("Acme".into());
        let updated = users.update_profile(alice.id, &profile).unwrap().unwrap();
        assert_eq!(updated.company.as_deref(), Some("Acme"));
        let stranger = signup_for("c@x.com").profile;
        assert!(users.update_profile(Uuid::new_v4(), &stranger).unwrap().is_none());
    }

    #[test]
    fn admin_bootstrap_runs_once() {
        let users = service();
        assert!(users.ensure_admin("root@x.com", "secret").unwrap());
        assert!(!users.ensure_admin("root@x.com", "secret").unwrap());

        let admin = users.verify_credentials("root@x.com", "secret").unwrap().unwrap();
        assert!(is_admin(&admin));
        assert!(admin.approved);
    }

    #[test]
    fn admin_bootstrap_leaves_an_existing_member_alone() {
        let users = service();
        let member = users.signup(&signup_for("taken@x.com")).unwrap();

        assert!(!users.ensure_admin("taken@x.com", "secret").unwrap());
        let unchanged = users.verify_credentials("taken@x.com", "pw").unwrap().unwrap();
        assert_eq!(unchanged.id, member.id);
        assert!(!is_admin(&unchanged));
    }
}
