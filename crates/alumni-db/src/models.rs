//! Database row types. These map directly to SQLite rows and stay distinct
//! from the alumni-types API models; the `From` impls below are the only
//! bridge between the two.

use alumni_types::models::{Major, Message, Opportunity, Participant, Role, User};
use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

#[derive(Debug)]
pub struct UserRow {
    pub id: String,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub year_graduated: i32,
    pub major: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub linkedin_link: Option<String>,
    pub role: String,
    pub approved: bool,
    pub refresh_token: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct MajorRow {
    pub id: String,
    pub name: String,
    pub department: String,
}

pub struct OpportunityRow {
    pub id: String,
    pub title: String,
    pub posted_by: String,
    pub kind: Option<String>,
    pub description: String,
    pub needs_approval: bool,
    pub approved: bool,
    pub approved_by: Option<String>,
    pub is_paid: bool,
    pub amount: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A message joined with the current user names of both parties.
/// A name is `None` once the account behind it has been deleted.
pub struct MessageRow {
    pub id: String,
    pub sender: String,
    pub sender_name: Option<String>,
    pub recipient: String,
    pub recipient_name: Option<String>,
    pub content: String,
    pub read: bool,
    pub created_at: String,
}

// -- Write-side inputs --

pub struct NewUser<'a> {
    pub id: &'a str,
    pub user_name: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub year_graduated: i32,
    pub major: Option<&'a str>,
    pub company: Option<&'a str>,
    pub title: Option<&'a str>,
    pub linkedin_link: Option<&'a str>,
    pub role: Role,
    pub approved: bool,
}

/// Profile columns replaced wholesale by a user update.
pub struct UserProfile<'a> {
    pub user_name: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub year_graduated: i32,
    pub major: Option<&'a str>,
    pub company: Option<&'a str>,
    pub title: Option<&'a str>,
    pub linkedin_link: Option<&'a str>,
}

/// Content columns of an opportunity. Approval columns are written only by
/// `approve_opportunity`.
pub struct OpportunityFields<'a> {
    pub title: &'a str,
    pub posted_by: &'a str,
    pub kind: Option<&'a str>,
    pub description: &'a str,
    pub needs_approval: bool,
    pub is_paid: bool,
    pub amount: Option<&'a str>,
}

// -- Row -> model --

fn parse_id(raw: &str, column: &str, row_id: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on row '{}': {}", column, raw, row_id, e);
        Uuid::default()
    })
}

fn parse_time(raw: &str, column: &str, row_id: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            warn!("Corrupt {} '{}' on row '{}': {}", column, raw, row_id, e);
            DateTime::default()
        })
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: parse_id(&row.id, "id", &row.id),
            role: Role::parse(&row.role),
            created_at: parse_time(&row.created_at, "created_at", &row.id),
            updated_at: parse_time(&row.updated_at, "updated_at", &row.id),
            user_name: row.user_name,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            year_graduated: row.year_graduated,
            major: row.major,
            company: row.company,
            title: row.title,
            linkedin_link: row.linkedin_link,
            approved: row.approved,
        }
    }
}

impl From<MajorRow> for Major {
    fn from(row: MajorRow) -> Self {
        Major {
            id: parse_id(&row.id, "id", &row.id),
            name: row.name,
            department: row.department,
        }
    }
}

impl From<OpportunityRow> for Opportunity {
    fn from(row: OpportunityRow) -> Self {
        Opportunity {
            id: parse_id(&row.id, "id", &row.id),
            approved_by: row
                .approved_by
                .as_deref()
                .map(|raw| parse_id(raw, "approved_by", &row.id)),
            created_at: parse_time(&row.created_at, "created_at", &row.id),
            updated_at: parse_time(&row.updated_at, "updated_at", &row.id),
            title: row.title,
            posted_by: row.posted_by,
            kind: row.kind,
            description: row.description,
            needs_approval: row.needs_approval,
            approved: row.approved,
            is_paid: row.is_paid,
            amount: row.amount,
        }
    }
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: parse_id(&row.id, "id", &row.id),
            sender: Participant {
                id: parse_id(&row.sender, "sender", &row.id),
                user_name: row.sender_name,
            },
            recipient: Participant {
                id: parse_id(&row.recipient, "recipient", &row.id),
                user_name: row.recipient_name,
            },
            created_at: parse_time(&row.created_at, "created_at", &row.id),
            content: row.content,
            read: row.read,
        }
    }
}
