//! HTML form payloads and their validation rules

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::models::{NewUser, ProfileUpdate, UpdateUser, User};
use crate::validation::{
    validate_email, validate_max_length, validate_message_text, validate_optional_url,
    validate_password, validate_username,
};

const MAX_BIO_LENGTH: usize = 500;
const MAX_LOCATION_LENGTH: usize = 100;

/// Validation errors keyed by form field name
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    fn check(&mut self, field: &'static str, result: Result<(), String>) {
        if let Err(message) = result {
            self.0.entry(field).or_insert(message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

fn required(label: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        Err(format!("{} is required", label))
    } else {
        Ok(())
    }
}

/// Signup form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub image_url: String,
}

impl SignupForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        errors.check("username", validate_username(self.username.trim()));
        errors.check("email", validate_email(self.email.trim()));
        errors.check("password", validate_password(&self.password));
        errors.check("image_url", validate_optional_url(&self.image_url));
        errors
    }

    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            image_url: Some(self.image_url.trim().to_string()),
        }
    }
}

/// Login form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        errors.check("username", required("Username", self.username.trim()));
        errors.check("password", validate_password(&self.password));
        errors
    }
}

/// New message form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageForm {
    pub text: String,
}

impl MessageForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        errors.check("text", validate_message_text(&self.text));
        errors
    }
}

/// Account edit form; the current password confirms the change
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EditProfileForm {
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: String,
    pub password: String,
}

impl EditProfileForm {
    /// Prefill from the stored user, leaving the password blank
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            image_url: user.image_url.clone(),
            header_image_url: user.header_image_url.clone(),
            bio: user.bio.clone().unwrap_or_default(),
            password: String::new(),
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        errors.check("username", validate_username(self.username.trim()));
        errors.check("email", validate_email(self.email.trim()));
        errors.check("image_url", validate_optional_url(&self.image_url));
        errors.check(
            "header_image_url",
            validate_optional_url(&self.header_image_url),
        );
        errors.check("bio", validate_max_length("Bio", &self.bio, MAX_BIO_LENGTH));
        errors.check("password", required("Password", &self.password));
        errors
    }

    pub fn to_update(&self) -> UpdateUser {
        UpdateUser {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            image_url: Some(self.image_url.clone()),
            header_image_url: Some(self.header_image_url.clone()),
            bio: Some(self.bio.clone()),
        }
    }
}

/// Profile details form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub location: String,
    pub bio: String,
    #[serde(alias = "header_image")]
    pub header_image_url: String,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            location: user.location.clone().unwrap_or_default(),
            bio: user.bio.clone().unwrap_or_default(),
            header_image_url: user.header_image_url.clone(),
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        errors.check(
            "location",
            validate_max_length("Location", &self.location, MAX_LOCATION_LENGTH),
        );
        errors.check("bio", validate_max_length("Bio", &self.bio, MAX_BIO_LENGTH));
        errors.check(
            "header_image_url",
            validate_optional_url(&self.header_image_url),
        );
        errors
    }

    pub fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            location: Some(self.location.clone()),
            bio: Some(self.bio.clone()),
            header_image_url: Some(self.header_image_url.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_form_collects_field_errors() {
        let form = SignupForm {
            username: "ab".to_string(),
            email: "nope".to_string(),
            password: "123".to_string(),
            image_url: String::new(),
        };

        let errors = form.validate();
        assert_eq!(
            errors.get("username"),
            Some("Username must be at least 3 characters long")
        );
        assert_eq!(errors.get("email"), Some("Invalid email format"));
        assert!(errors.get("password").is_some());
        assert_eq!(errors.get("image_url"), None);
    }

    #[test]
    fn test_signup_form_trims_identity_fields() {
        let form = SignupForm {
            username: " testuser ".to_string(),
            email: " test@test.com".to_string(),
            password: "password".to_string(),
            image_url: String::new(),
        };

        assert!(form.validate().is_empty());
        let new_user = form.to_new_user();
        assert_eq!(new_user.username, "testuser");
        assert_eq!(new_user.email, "test@test.com");
    }

    #[test]
    fn test_message_form_requires_text() {
        assert!(!MessageForm::default().validate().is_empty());
        let form = MessageForm {
            text: "Hello".to_string(),
        };
        assert!(form.validate().is_empty());
    }

    #[test]
    fn test_edit_profile_form_requires_password() {
        let mut form = EditProfileForm {
            username: "testuser".to_string(),
            email: "test@test.com".to_string(),
            ..Default::default()
        };
        assert_eq!(form.validate().get("password"), Some("Password is required"));

        form.password = "whatever".to_string();
        assert!(form.validate().is_empty());
    }

    #[test]
    fn test_profile_form_accepts_header_image_alias() {
        let form: ProfileForm = serde_json::from_str(
            r#"{"location": "Lagos", "bio": "hi", "header_image": "/static/h.png"}"#,
        )
        .unwrap();

        assert_eq!(form.header_image_url, "/static/h.png");
        assert!(form.validate().is_empty());
    }
}
