//! Client-side form validation
//!
//! These checks run before any network call and carry the exact messages
//! the product's forms show, so callers can surface them directly.

use crate::types::{LoginRequest, PasswordChange, RegisterRequest, UpdateProfileRequest};
use thiserror::Error;

/// Minimum password length accepted at sign-up and password change
pub const MIN_PASSWORD_LEN: usize = 6;

/// A form field rejected before a request was made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Please enter your full name")]
    NameRequired,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Name is required")]
    ProfileNameRequired,
    #[error("Current password is required")]
    CurrentPasswordRequired,
    #[error("New password is required")]
    NewPasswordRequired,
    #[error("New password must be at least 6 characters long")]
    NewPasswordTooShort,
    #[error("New password must be different from current password")]
    NewPasswordSameAsCurrent,
    #[error("New passwords do not match")]
    NewPasswordMismatch,
}

/// True when `email` contains a plausible address: non-whitespace runs
/// around an `@`, with a dot inside the part after it
pub fn is_email_valid(email: &str) -> bool {
    email.split_whitespace().any(has_email_shape)
}

fn has_email_shape(token: &str) -> bool {
    token.match_indices('@').any(|(at, _)| {
        if at == 0 {
            return false;
        }
        let domain = &token[at + 1..];
        domain
            .char_indices()
            .any(|(dot, c)| c == '.' && dot > 0 && dot + 1 < domain.len())
    })
}

/// Checks applied before registering, in the order the sign-up form runs them
pub fn validate_registration(request: &RegisterRequest) -> Result<(), ValidationError> {
    if !is_email_valid(&request.email) {
        return Err(ValidationError::InvalidEmail);
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if request.name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    Ok(())
}

/// Checks applied before signing in
pub fn validate_login(request: &LoginRequest) -> Result<(), ValidationError> {
    if !is_email_valid(&request.email) {
        return Err(ValidationError::InvalidEmail);
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Confirmation check for forms that ask for the password twice
pub fn validate_password_confirmation(
    password: &str,
    confirmation: &str,
) -> Result<(), ValidationError> {
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Check applied before a profile update
pub fn validate_profile_update(request: &UpdateProfileRequest) -> Result<(), ValidationError> {
    if request.name.trim().is_empty() {
        return Err(ValidationError::ProfileNameRequired);
    }
    Ok(())
}

/// Checks applied before a password change, in the order the form runs them
pub fn validate_password_change(change: &PasswordChange) -> Result<(), ValidationError> {
    if change.current_password.is_empty() {
        return Err(ValidationError::CurrentPasswordRequired);
    }
    if change.new_password.is_empty() {
        return Err(ValidationError::NewPasswordRequired);
    }
    if change.new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::NewPasswordTooShort);
    }
    if change.new_password == change.current_password {
        return Err(ValidationError::NewPasswordSameAsCurrent);
    }
    if change.new_password != change.confirm_password {
        return Err(ValidationError::NewPasswordMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_email_valid("a@b.com"));
        assert!(is_email_valid("user.name@sub.domain.co"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_email_valid("not-an-email"));
        assert!(!is_email_valid(""));
        assert!(!is_email_valid("@b.com"));
        assert!(!is_email_valid("a@b"));
        assert!(!is_email_valid("a@b."));
        assert!(!is_email_valid("a@.com"));
        assert!(!is_email_valid("a @b.com"));
    }

    #[test]
    fn accepts_address_embedded_in_text() {
        // Same substring semantics as the sign-up form's check.
        assert!(is_email_valid("reach me at a@b.com please"));
        assert!(is_email_valid("@a@b.c"));
    }

    #[test]
    fn registration_checks_run_in_form_order() {
        let request = RegisterRequest {
            name: String::new(),
            email: "bad".into(),
            password: "x".into(),
        };
        // Email is checked first even though every field is invalid.
        assert_eq!(
            validate_registration(&request),
            Err(ValidationError::InvalidEmail)
        );

        let request = RegisterRequest {
            name: String::new(),
            email: "a@b.com".into(),
            password: "short".into(),
        };
        assert_eq!(
            validate_registration(&request),
            Err(ValidationError::PasswordTooShort)
        );

        let request = RegisterRequest {
            name: String::new(),
            email: "a@b.com".into(),
            password: "secret123".into(),
        };
        assert_eq!(
            validate_registration(&request),
            Err(ValidationError::NameRequired)
        );
    }

    #[test]
    fn registration_accepts_valid_input() {
        let request = RegisterRequest {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            password: "secret123".into(),
        };
        assert_eq!(validate_registration(&request), Ok(()));
    }

    #[test]
    fn login_requires_email_and_password_length() {
        let request = LoginRequest {
            email: "nope".into(),
            password: "secret123".into(),
        };
        assert_eq!(validate_login(&request), Err(ValidationError::InvalidEmail));

        let request = LoginRequest {
            email: "a@b.com".into(),
            password: "12345".into(),
        };
        assert_eq!(
            validate_login(&request),
            Err(ValidationError::PasswordTooShort)
        );
    }

    #[test]
    fn confirmation_must_match() {
        assert_eq!(validate_password_confirmation("abcdef", "abcdef"), Ok(()));
        assert_eq!(
            validate_password_confirmation("abcdef", "abcdeg"),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn profile_name_must_not_be_blank() {
        let request = UpdateProfileRequest {
            name: "   ".into(),
            bio: None,
        };
        assert_eq!(
            validate_profile_update(&request),
            Err(ValidationError::ProfileNameRequired)
        );
    }

    #[test]
    fn password_change_rules_run_in_form_order() {
        let change = |current: &str, new: &str, confirm: &str| PasswordChange {
            current_password: current.into(),
            new_password: new.into(),
            confirm_password: confirm.into(),
        };

        assert_eq!(
            validate_password_change(&change("", "newpass1", "newpass1")),
            Err(ValidationError::CurrentPasswordRequired)
        );
        assert_eq!(
            validate_password_change(&change("old", "", "")),
            Err(ValidationError::NewPasswordRequired)
        );
        assert_eq!(
            validate_password_change(&change("old", "new", "new")),
            Err(ValidationError::NewPasswordTooShort)
        );
        assert_eq!(
            validate_password_change(&change("oldpass1", "oldpass1", "oldpass1")),
            Err(ValidationError::NewPasswordSameAsCurrent)
        );
        assert_eq!(
            validate_password_change(&change("oldpass1", "newpass1", "different")),
            Err(ValidationError::NewPasswordMismatch)
        );
        assert_eq!(
            validate_password_change(&change("oldpass1", "newpass1", "newpass1")),
            Ok(())
        );
    }
}
