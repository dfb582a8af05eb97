use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Unknown labels fall back to the unprivileged role.
    pub fn parse(s: &str) -> Role {
        match s {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

/// Public view of an account. The password hash and the current refresh
/// token live only in the store and are never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub year_graduated: i32,
    pub major: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub linkedin_link: Option<String>,
    pub role: Role,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn is_admin(user: &User) -> bool {
    user.role.is_admin()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Major {
    pub id: Uuid,
    pub name: String,
    pub department: String,
}

/// A job or internship posting. `approved_by` is set exactly when
/// `approved` is true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: Uuid,
    pub title: String,
    pub posted_by: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: String,
    pub needs_approval: bool,
    pub approved: bool,
    pub approved_by: Option<Uuid>,
    pub is_paid: bool,
    pub amount: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One side of a direct message, resolved to a display label when the
/// account still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender: Participant,
    pub recipient: Participant,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_its_label() {
        assert_eq!(Role::parse(Role::Admin.as_str()), Role::Admin);
        assert_eq!(Role::parse(Role::User.as_str()), Role::User);
        assert_eq!(Role::parse("root"), Role::User);
    }

    #[test]
    fn only_the_admin_role_is_admin() {
        let now = Utc::now();
        let mut user = User {
            id: Uuid::new_v4(),
            user_name: "grace".into(),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@alumni.test".into(),
            year_graduated: 1934,
            major: None,
            company: None,
            title: None,
            linkedin_link: None,
            role: Role::User,
            approved: true,
            created_at: now,
            updated_at: now,
        };
        assert!(!is_admin(&user));

        user.role = Role::Admin;
        assert!(is_admin(&user));
        assert!(!Role::default().is_admin());
    }

    #[test]
    fn opportunity_kind_is_serialized_as_type() {
        let now = Utc::now();
        let opp = Opportunity {
            id: Uuid::new_v4(),
            title: "Intern".into(),
            posted_by: "Acme".into(),
            kind: Some("internship".into()),
            description: "Summer".into(),
            needs_approval: true,
            approved: false,
            approved_by: None,
            is_paid: false,
            amount: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&opp).unwrap();
        assert_eq!(json["type"], "internship");
        assert!(json.get("kind").is_none());
        assert!(json["approved_by"].is_null());
    }
}
