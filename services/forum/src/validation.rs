//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{ForumError, ForumResult};

const MAX_COMMENT_LENGTH: usize = 2000;

/// Validate username
pub fn validate_username(username: &str) -> ForumResult<()> {
    if username.is_empty() {
        return Err(invalid("Username is required"));
    }

    if username.len() < 3 {
        return Err(invalid("Username must be at least 3 characters long"));
    }

    if username.len() > 32 {
        return Err(invalid("Username must be at most 32 characters long"));
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err(invalid(
            "Username can only contain letters, numbers, and underscores",
        ));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> ForumResult<()> {
    if email.is_empty() {
        return Err(invalid("Email is required"));
    }

    if email.len() > 254 {
        return Err(invalid("Email must be at most 254 characters long"));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(invalid("Invalid email format"));
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> ForumResult<()> {
    if password.is_empty() {
        return Err(invalid("Password is required"));
    }

    if password.chars().count() < 8 {
        return Err(invalid("Password must be at least 8 characters long"));
    }

    if password.chars().count() > 128 {
        return Err(invalid("Password must be at most 128 characters long"));
    }

    Ok(())
}

/// Validate comment content
pub fn validate_comment(content: &str) -> ForumResult<()> {
    if content.trim().is_empty() {
        return Err(invalid("Comment content is required"));
    }

    if content.chars().count() > MAX_COMMENT_LENGTH {
        return Err(invalid("Comment must be at most 2000 characters long"));
    }

    Ok(())
}

fn invalid(message: &str) -> ForumError {
    ForumError::Validation(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("joon").is_ok());
        assert!(validate_username("sagyn_google42").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("jo").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("joon; drop").is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("joon@x.com").is_ok());
        assert!(validate_email("gigi.example+forum@example.co").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("joon").is_err());
        assert!(validate_email("joon@x").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("P@$$wOrd1").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"p".repeat(129)).is_err());
    }

    #[test]
    fn test_comment_rules() {
        assert!(validate_comment("Amazing movie!").is_ok());
        assert!(validate_comment("   ").is_err());
        assert!(validate_comment(&"x".repeat(2001)).is_err());
    }

    #[test]
    fn test_failures_are_validation_errors() {
        assert!(matches!(
            validate_email("nope"),
            Err(ForumError::Validation(_))
        ));
    }
}
