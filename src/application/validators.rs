use validator::ValidateEmail;

use crate::app_error::{AppError, AppResult};

/// Email and password after validation, ready for the auth use cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

/// Checks a register/login payload before it reaches the use cases.
///
/// The email is trimmed but otherwise kept as given: lookups are
/// case-sensitive. The password is taken verbatim.
pub fn validate_credentials(email: &str, password: &str) -> AppResult<Credentials> {
    let mut problems = Vec::new();
    if !is_valid_email(email) {
        problems.push("email must be a valid email address");
    }
    if password.is_empty() {
        problems.push("password should not be empty");
    }
    if !problems.is_empty() {
        return Err(AppError::InvalidInput(problems.join("; ")));
    }

    Ok(Credentials {
        email: email.trim().to_string(),
        password: password.to_string(),
    })
}
