use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, FieldError};

/// User entity - an account that can author posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub const USERNAME_MAX_LEN: usize = 150;
    pub const PASSWORD_MIN_LEN: usize = 8;
}

/// A user about to be inserted; the store assigns `id` and `date_joined`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub is_staff: bool,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            is_staff: false,
        }
    }

    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }
}

/// Signup input, checked before the password is hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

impl NewAccount {
    pub fn new(username: &str, password: String, password_confirm: String) -> Self {
        Self {
            username: username.trim().to_string(),
            password,
            password_confirm,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();

        if let Err(e) = validate_username(&self.username) {
            errors.push(e);
        }
        if self.password.chars().count() < User::PASSWORD_MIN_LEN {
            errors.push(FieldError::new(
                "password",
                format!(
                    "This password is too short. It must contain at least {} characters.",
                    User::PASSWORD_MIN_LEN
                ),
            ));
        }
        if self.password != self.password_confirm {
            errors.push(FieldError::new(
                "password_confirm",
                "The two password fields didn't match.",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(errors))
        }
    }
}

fn validate_username(username: &str) -> Result<(), FieldError> {
    if username.is_empty() {
        return Err(FieldError::new("username", "This field is required."));
    }
    let len = username.chars().count();
    if len > User::USERNAME_MAX_LEN {
        return Err(FieldError::new(
            "username",
            format!(
                "Ensure this value has at most {} characters (it has {len}).",
                User::USERNAME_MAX_LEN
            ),
        ));
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !username.chars().all(allowed) {
        return Err(FieldError::new(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(username: &str, password: &str, confirm: &str) -> NewAccount {
        NewAccount::new(username, password.to_string(), confirm.to_string())
    }

    #[test]
    fn test_valid_account() {
        assert!(account("leo.tolstoy", "war-and-peace", "war-and-peace")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_username_is_trimmed() {
        assert_eq!(account("  anna  ", "x", "x").username, "anna");
    }

    #[test]
    fn test_invalid_account_collects_every_error() {
        let err = account("bad name!", "short", "other").validate().unwrap_err();
        let DomainError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![Some("username"), Some("password"), Some("password_confirm")]
        );
    }

    #[test]
    fn test_staff_builder() {
        let user = NewUser::new("admin", "hash").staff();
        assert!(user.is_staff);
        assert!(!NewUser::new("reader", "hash").is_staff);
    }
}
