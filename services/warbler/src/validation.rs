//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::models::MAX_MESSAGE_LENGTH;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if username.len() > 32 {
        return Err("Username must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("Failed to compile username regex")
    });

    if !regex.is_match(username) {
        return Err(
            "Username can only contain letters, numbers, dots, dashes and underscores".to_string(),
        );
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 6 {
        return Err("Password must be at least 6 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate message text
pub fn validate_message_text(text: &str) -> Result<(), String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("Message text is required".to_string());
    }

    if text.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(format!(
            "Message must be at most {} characters long",
            MAX_MESSAGE_LENGTH
        ));
    }

    Ok(())
}

/// Validate an optional image URL; blank means "use the default"
pub fn validate_optional_url(url: &str) -> Result<(), String> {
    let url = url.trim();
    if url.is_empty() {
        return Ok(());
    }

    if url.len() > 2048 {
        return Err("URL must be at most 2048 characters long".to_string());
    }

    if !(url.starts_with("http://") || url.starts_with("https://") || url.starts_with('/')) {
        return Err("URL must start with http://, https:// or /".to_string());
    }

    // header images end up inside a CSS url('...')
    if url
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '(' | ')' | '\\' | '<' | '>'))
    {
        return Err("URL contains characters that are not allowed".to_string());
    }

    Ok(())
}

/// Validate an optional free-text field against a character limit
pub fn validate_max_length(label: &str, value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!("{} must be at most {} characters long", label, max));
    }

    Ok(())
}
