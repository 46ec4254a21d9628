//! Input validation for request payloads. Plain functions returning the
//! client-facing message; handlers wrap failures in `ApiError`.

use chrono::{Datelike, Utc};
use std::collections::HashMap;

const SPECIAL_CHARS: &str = "!@#$%^&*";

/// Standard pattern: `local@domain.tld`, no whitespace, exactly one `@`,
/// a dot somewhere in the domain.
pub fn validate_email(email: &str) -> Result<(), String> {
    let err = || "Invalid email format".to_string();

    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(err());
    }
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(err()),
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(err());
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return Err(err());
    }
    Ok(())
}

fn has_uppercase_and_special(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| SPECIAL_CHARS.contains(c))
}

/// Registration policy: 8-16 chars, at least one uppercase and one special
pub fn validate_registration_password(password: &str) -> Result<(), String> {
    if !(8..=16).contains(&password.len()) || !has_uppercase_and_special(password) {
        return Err("Password must be 8-16 chars, include 1 uppercase and 1 special character".to_string());
    }
    Ok(())
}

/// Change/reset policy: 6-50 chars, at least one uppercase and one special
pub fn validate_new_password(password: &str) -> Result<(), String> {
    if !(6..=50).contains(&password.len()) {
        return Err("New password must be between 6 and 50 characters".to_string());
    }
    if !has_uppercase_and_special(password) {
        return Err("New password must include at least 1 uppercase letter and 1 special character".to_string());
    }
    Ok(())
}

pub fn validate_registration_name(name: &str) -> Result<(), String> {
    if !(2..=100).contains(&name.chars().count()) {
        return Err("Name must be between 2 and 100 characters".to_string());
    }
    Ok(())
}

pub fn validate_profile_name(name: &str) -> Result<(), String> {
    if !(20..=60).contains(&name.chars().count()) {
        return Err("Name must be between 20 and 60 characters".to_string());
    }
    Ok(())
}

pub fn validate_address(address: Option<&str>) -> Result<(), String> {
    if let Some(address) = address {
        if address.chars().count() > 400 {
            return Err("Address must be maximum 400 characters".to_string());
        }
    }
    Ok(())
}

/// Store profile payload, owner self-service flow. Collects all field errors
/// instead of stopping at the first.
pub struct StoreProfileInput<'a> {
    pub store_name: &'a str,
    pub owner_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub address: &'a str,
    pub description: Option<&'a str>,
    pub established_year: Option<i32>,
    pub website: Option<&'a str>,
}

pub fn validate_store_profile(input: &StoreProfileInput<'_>) -> Result<(), HashMap<String, String>> {
    let mut errors = HashMap::new();

    if !(1..=100).contains(&input.store_name.chars().count()) {
        errors.insert("storeName".into(), "Store name must be between 1 and 100 characters".into());
    }
    if !(1..=100).contains(&input.owner_name.chars().count()) {
        errors.insert("ownerName".into(), "Owner name must be between 1 and 100 characters".into());
    }
    if let Err(msg) = validate_email(input.email) {
        errors.insert("email".into(), msg);
    }
    if !(5..=20).contains(&input.phone.chars().count()) {
        errors.insert("phone".into(), "Phone number must be between 5 and 20 characters".into());
    }
    if !(5..=500).contains(&input.address.chars().count()) {
        errors.insert("address".into(), "Address must be between 5 and 500 characters".into());
    }
    if let Some(description) = input.description {
        if description.chars().count() > 1000 {
            errors.insert("description".into(), "Description must not exceed 1000 characters".into());
        }
    }
    if let Some(year) = input.established_year {
        let current_year = Utc::now().year();
        if year < 1900 || year > current_year {
            errors.insert(
                "establishedYear".into(),
                "Please provide a valid establishment year between 1900 and current year".into(),
            );
        }
    }
    if let Some(website) = input.website {
        if !website.is_empty() && !website.contains('.') {
            errors.insert("website".into(), "Please provide a valid website URL".into());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_input() -> StoreProfileInput<'static> {
        StoreProfileInput {
            store_name: "Corner Books",
            owner_name: "Jane Holloway",
            email: "shop@cornerbooks.example",
            phone: "555-0101",
            address: "12 Market Street, Springfield",
            description: None,
            established_year: Some(1998),
            website: Some("cornerbooks.example"),
        }
    }

    #[test]
    fn accepts_reasonable_emails() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.domain.org").is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        for bad in ["", "plain", "no@dot", "two@@at.com", "spa ce@x.com", "@x.com", "a@", "a@.com"] {
            assert!(validate_email(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn registration_password_policy() {
        assert!(validate_registration_password("Passw0rd!").is_ok());
        assert!(validate_registration_password("short").is_err());
        assert!(validate_registration_password("alllowercase!").is_err());
        assert!(validate_registration_password("NoSpecialChars1").is_err());
        assert!(validate_registration_password("Way!TooLongOfAPassword").is_err());
    }

    #[test]
    fn new_password_policy() {
        assert!(validate_new_password("Abc!12").is_ok());
        assert!(validate_new_password("Abc!1").is_err());
        assert!(validate_new_password("abcdef!").is_err());
    }

    #[test]
    fn store_profile_accepts_valid_input() {
        assert!(validate_store_profile(&profile_input()).is_ok());
    }

    #[test]
    fn store_profile_collects_field_errors() {
        let mut input = profile_input();
        input.phone = "123";
        input.established_year = Some(1456);
        input.website = Some("nodots");
        let errors = validate_store_profile(&input).unwrap_err();
        assert!(errors.contains_key("phone"));
        assert!(errors.contains_key("establishedYear"));
        assert!(errors.contains_key("website"));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn blank_website_and_year_are_allowed() {
        let mut input = profile_input();
        input.website = Some("");
        input.established_year = None;
        assert!(validate_store_profile(&input).is_ok());
    }
}
