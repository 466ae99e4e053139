// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const MAX_NAME_LEN: usize = 150;
const MIN_PASSWORD_LEN: usize = 8;

/// A single field-level validation failure, rendered next to the input.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

pub fn validate_signup(input: &SignupInput) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let username = input.username.trim();
    if username.is_empty() {
        errors.push(FieldError::new("username", "Username is required"));
    } else if username.chars().count() > MAX_NAME_LEN {
        errors.push(FieldError::new(
            "username",
            format!("Username must be at most {} characters", MAX_NAME_LEN),
        ));
    } else if !username
        .chars()
        .all(|ch| ch.is_alphanumeric() || matches!(ch, '@' | '.' | '+' | '-' | '_'))
    {
        errors.push(FieldError::new(
            "username",
            "Username may contain letters, digits and @ . + - _ only",
        ));
    }

    if !looks_like_email(input.email.trim()) {
        errors.push(FieldError::new("email", "Enter a valid email address"));
    }

    if input.password1.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password1",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    if input.password1 != input.password2 {
        errors.push(FieldError::new("password2", "Passwords do not match"));
    }

    errors
}

/// Profile form fields. The account's username and email are not among
/// them; a posted `email` key is simply ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub date_birth: String,
    #[serde(default)]
    pub csrf_token: String,
}

pub fn validate_profile(input: &ProfileInput) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if input.first_name.chars().count() > MAX_NAME_LEN {
        errors.push(FieldError::new(
            "first_name",
            format!("First name must be at most {} characters", MAX_NAME_LEN),
        ));
    }
    if input.last_name.chars().count() > MAX_NAME_LEN {
        errors.push(FieldError::new(
            "last_name",
            format!("Last name must be at most {} characters", MAX_NAME_LEN),
        ));
    }
    let date_birth = input.date_birth.trim();
    if !date_birth.is_empty() && NaiveDate::parse_from_str(date_birth, "%Y-%m-%d").is_err() {
        errors.push(FieldError::new(
            "date_birth",
            "Enter a date in YYYY-MM-DD format",
        ));
    }

    errors
}

fn looks_like_email(value: &str) -> bool {
    // Deliverability is the mail server's problem; reject only the clearly
    // malformed shapes.
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_signup() -> SignupInput {
        SignupInput {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password1: "correct horse".to_string(),
            password2: "correct horse".to_string(),
        }
    }

    #[test]
    fn valid_signup_passes() {
        assert!(validate_signup(&valid_signup()).is_empty());
    }

    #[test]
    fn signup_requires_matching_passwords() {
        let mut input = valid_signup();
        input.password2 = "different horse".to_string();
        let errors = validate_signup(&input);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "password2");
    }

    #[test]
    fn signup_rejects_short_password() {
        let mut input = valid_signup();
        input.password1 = "short".to_string();
        input.password2 = "short".to_string();
        assert!(validate_signup(&input)
            .iter()
            .any(|err| err.field == "password1"));
    }

    #[test]
    fn signup_rejects_odd_username_characters() {
        let mut input = valid_signup();
        input.username = "alice smith".to_string();
        assert!(validate_signup(&input)
            .iter()
            .any(|err| err.field == "username"));
    }

    #[test]
    fn profile_accepts_blank_birth_date() {
        let input = ProfileInput {
            first_name: "Alice".to_string(),
            last_name: String::new(),
            photo: String::new(),
            date_birth: String::new(),
            csrf_token: String::new(),
        };
        assert!(validate_profile(&input).is_empty());
    }

    #[test]
    fn profile_rejects_malformed_birth_date() {
        let input = ProfileInput {
            first_name: String::new(),
            last_name: String::new(),
            photo: String::new(),
            date_birth: "01/04/1990".to_string(),
            csrf_token: String::new(),
        };
        assert!(validate_profile(&input)
            .iter()
            .any(|err| err.field == "date_birth"));
    }

    #[test]
    fn email_shapes() {
        assert!(looks_like_email("a@b.com"));
        assert!(!looks_like_email("plainaddress"));
        assert!(!looks_like_email("@b.com"));
        assert!(!looks_like_email("a@nodot"));
    }
}
