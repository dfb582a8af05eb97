//! Request checks that run before anything touches the store. Each checker
//! collects every violated rule and returns them together.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use uuid::Uuid;

use alumni_types::api::{
    MajorRequest, OpportunityRequest, SendMessageRequest, SignupRequest, UpdateUserRequest,
};

use crate::error::ApiError;

pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse().map_err(|_| ApiError::InvalidId)
}

/// Unwrap an optional `Json` extraction, reporting a malformed body as a
/// validation failure instead of axum's plain-text rejection.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::Validation(vec![rejection.body_text()]))
}

fn required(value: Option<String>, rule: &str, errors: &mut Vec<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => {
            errors.push(rule.to_string());
            String::new()
        }
    }
}

fn finish<T>(value: T, errors: Vec<String>) -> Result<T, ApiError> {
    if errors.is_empty() { Ok(value) } else { Err(ApiError::Validation(errors)) }
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub year_graduated: i32,
    pub major: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub linkedin_link: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Signup {
    pub profile: Profile,
    pub password: String,
}

struct ProfileFields {
    user_name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    year_graduated: Option<i32>,
    major: Option<String>,
    company: Option<String>,
    title: Option<String>,
    linkedin_link: Option<String>,
}

fn check_profile(fields: ProfileFields, errors: &mut Vec<String>) -> Profile {
    let user_name = required(fields.user_name, "Username is required", errors);
    let email = required(fields.email, "Email is required", errors);
    let first_name = required(fields.first_name, "First name is required", errors);
    let last_name = required(fields.last_name, "Last name is required", errors);
    let year_graduated = match fields.year_graduated {
        Some(year) if year != 0 => year,
        _ => {
            errors.push("Graduation year is required".to_string());
            0
        }
    };
    Profile {
        user_name,
        first_name,
        last_name,
        email,
        year_graduated,
        major: fields.major,
        company: fields.company,
        title: fields.title,
        linkedin_link: fields.linkedin_link,
    }
}

pub fn signup(req: SignupRequest) -> Result<Signup, ApiError> {
    let mut errors = Vec::new();
    let profile = check_profile(
        ProfileFields {
            user_name: req.user_name,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            year_graduated: req.year_graduated,
            major: req.major,
            company: req.company,
            title: req.title,
            linkedin_link: req.linkedin_link,
        },
        &mut errors,
    );
    let password = required(req.password, "Password is required", &mut errors);
    finish(Signup { profile, password }, errors)
}

pub fn profile(req: UpdateUserRequest) -> Result<Profile, ApiError> {
    let mut errors = Vec::new();
    let profile = check_profile(
        ProfileFields {
            user_name: req.user_name,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            year_graduated: req.year_graduated,
            major: req.major,
            company: req.company,
            title: req.title,
            linkedin_link: req.linkedin_link,
        },
        &mut errors,
    );
    finish(profile, errors)
}

#[derive(Debug, Clone)]
pub struct OpportunityInput {
    pub title: String,
    pub posted_by: String,
    pub kind: Option<String>,
    pub description: String,
    pub needs_approval: bool,
    pub is_paid: bool,
    pub amount: Option<String>,
}

pub fn opportunity(req: OpportunityRequest) -> Result<OpportunityInput, ApiError> {
    let mut errors = Vec::new();
    let title = required(req.title, "Title is required", &mut errors);
    let posted_by = required(req.posted_by, "Posted by is required", &mut errors);
    let description = required(req.description, "Description is required", &mut errors);
    let needs_approval = req.needs_approval.unwrap_or_else(|| {
        errors.push("needs_approval must be boolean".to_string());
        false
    });
    finish(
        OpportunityInput {
            title,
            posted_by,
            kind: req.kind,
            description,
            needs_approval,
            is_paid: req.is_paid.unwrap_or(false),
            amount: req.amount,
        },
        errors,
    )
}

pub fn major(req: MajorRequest) -> Result<(String, String), ApiError> {
    let mut errors = Vec::new();
    let name = required(req.name, "Name is required", &mut errors);
    let department = required(req.department, "Department is required", &mut errors);
    finish((name, department), errors)
}

#[derive(Debug, Clone)]
pub struct Outgoing {
    pub recipient: Uuid,
    pub content: String,
}

/// Only the shape is checked; the recipient need not exist.
pub fn message(req: SendMessageRequest) -> Result<Outgoing, ApiError> {
    let mut errors = Vec::new();
    let recipient = required(req.recipient, "Recipient is required", &mut errors);
    let content = required(req.content, "Content is required", &mut errors);
    finish((), errors)?;
    Ok(Outgoing {
        recipient: parse_id(&recipient)?,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violations(err: ApiError) -> Vec<String> {
        match err {
            ApiError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn signup_reports_every_missing_field() {
        let errors = violations(signup(SignupRequest::default()).unwrap_err());
        assert_eq!(
            errors,
            vec![
                "Username is required",
                "Email is required",
                "First name is required",
                "Last name is required",
                "Graduation year is required",
                "Password is required",
            ]
        );
    }

    #[test]
    fn signup_accepts_a_complete_body() {
        let ok = signup(SignupRequest {
            user_name: Some("alice".into()),
            first_name: Some("A".into()),
            last_name: Some("B".into()),
            email: Some("a@x.com".into()),
            password: Some("pw".into()),
            year_graduated: Some(2020),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ok.profile.email, "a@x.com");
        assert_eq!(ok.profile.year_graduated, 2020);
        assert!(ok.profile.major.is_none());
    }

    #[test]
    fn empty_strings_and_zero_year_count_as_missing() {
        let errors = violations(
            profile(UpdateUserRequest {
                user_name: Some(String::new()),
                first_name: Some("A".into()),
                last_name: Some("B".into()),
                email: Some("a@x.com".into()),
                year_graduated: Some(0),
                ..Default::default()
            })
            .unwrap_err(),
        );
        assert_eq!(errors, vec!["Username is required", "Graduation year is required"]);
    }

    #[test]
    fn opportunity_needs_an_explicit_approval_flag() {
        let errors = violations(
            opportunity(OpportunityRequest {
                title: Some("Intern".into()),
                posted_by: Some("Acme".into()),
                description: Some("Summer".into()),
                ..Default::default()
            })
            .unwrap_err(),
        );
        assert_eq!(errors, vec!["needs_approval must be boolean"]);
    }

    #[test]
    fn message_recipient_must_be_an_id() {
        let err = message(SendMessageRequest {
            recipient: Some("not-an-id".into()),
            content: Some("hi".into()),
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidId));

        let errors = violations(message(SendMessageRequest::default()).unwrap_err());
        assert_eq!(errors, vec!["Recipient is required", "Content is required"]);
    }

    #[test]
    fn major_needs_name_and_department() {
        let errors = violations(major(MajorRequest::default()).unwrap_err());
        assert_eq!(errors, vec!["Name is required", "Department is required"]);
    }
}
