use regex::Regex;
use url::Url;

use crate::errors::{AuthError, AuthResult, ValidationErrors};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Field checks for account-area input
///
/// Each check records its failure against `field` in the supplied tree and
/// returns the cleaned value.
pub struct ValidationService;

impl ValidationService {
    pub fn required_text(
        errors: &mut ValidationErrors,
        field: &str,
        value: &str,
        max: usize,
    ) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            errors.add_field(field, "is required");
        } else if trimmed.chars().count() > max {
            errors.add_field(field, format!("must be at most {} characters", max));
        }
        trimmed.to_string()
    }

    /// Empty strings collapse to `None`
    pub fn optional_text(
        errors: &mut ValidationErrors,
        field: &str,
        value: Option<&str>,
        max: usize,
    ) -> Option<String> {
        let trimmed = value.map(str::trim).filter(|v| !v.is_empty())?;
        if trimmed.chars().count() > max {
            errors.add_field(field, format!("must be at most {} characters", max));
        }
        Some(trimmed.to_string())
    }

    pub fn phone(errors: &mut ValidationErrors, field: &str, value: Option<&str>) -> Option<String> {
        let phone = Self::optional_text(errors, field, value, 32)?;
        if !pattern_matches(r"^\+?[0-9][0-9 ().\-]{6,}$", &phone) {
            errors.add_field(field, "is not a valid phone number");
        }
        Some(phone)
    }

    pub fn website(
        errors: &mut ValidationErrors,
        field: &str,
        value: Option<&str>,
    ) -> Option<String> {
        let website = Self::optional_text(errors, field, value, 500)?;
        match Url::parse(&website) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => errors.add_field(field, "must be an http(s) URL"),
        }
        Some(website)
    }

    pub fn zip(errors: &mut ValidationErrors, field: &str, value: &str) -> String {
        let zip = Self::required_text(errors, field, value, 10);
        if !zip.is_empty() && !pattern_matches(r"^[0-9]{5}(-[0-9]{4})?$", &zip) {
            errors.add_field(field, "must be a 5 or 9 digit ZIP code");
        }
        zip
    }

    pub fn non_negative(errors: &mut ValidationErrors, field: &str, value: Option<f64>) -> Option<f64> {
        let number = value?;
        if !number.is_finite() || number < 0.0 {
            errors.add_field(field, "must not be negative");
        }
        Some(number)
    }

    pub fn email(email: &str) -> AuthResult<String> {
        let trimmed = email.trim().to_lowercase();
        if !pattern_matches(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$", &trimmed) {
            return Err(AuthError::InvalidEmail(email.to_string()));
        }
        Ok(trimmed)
    }

    pub fn password(password: &str) -> AuthResult<()> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(format!(
                "must be at least {} characters long",
                MIN_PASSWORD_LEN
            )));
        }
        if password.trim().is_empty() {
            return Err(AuthError::WeakPassword("must not be blank".to_string()));
        }
        Ok(())
    }
}

fn pattern_matches(pattern: &str, value: &str) -> bool {
    Regex::new(pattern)
        .map(|regex| regex.is_match(value))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        let mut errors = ValidationErrors::default();
        assert_eq!(
            ValidationService::required_text(&mut errors, "name", "  Oak Farm ", 50),
            "Oak Farm"
        );
        ValidationService::required_text(&mut errors, "city", "   ", 50);
        assert_eq!(errors.field_messages("city"), vec!["is required".to_string()]);
        assert!(errors.field("name").is_none());
    }

    #[test]
    fn test_phone_and_zip() {
        let mut errors = ValidationErrors::default();
        ValidationService::phone(&mut errors, "phone", Some("+1 (555) 010-2000"));
        ValidationService::zip(&mut errors, "zip", "97301-1234");
        assert!(errors.is_empty());

        ValidationService::phone(&mut errors, "phone", Some("call me"));
        ValidationService::zip(&mut errors, "zip", "9730");
        assert_eq!(errors.flatten().len(), 2);
    }

    #[test]
    fn test_website_requires_http() {
        let mut errors = ValidationErrors::default();
        ValidationService::website(&mut errors, "website", Some("ftp://farm.example"));
        assert_eq!(
            errors.field_messages("website"),
            vec!["must be an http(s) URL".to_string()]
        );
        assert_eq!(
            ValidationService::website(&mut ValidationErrors::default(), "website", Some("")),
            None
        );
    }

    #[test]
    fn test_email() {
        assert_eq!(
            ValidationService::email(" Grower@Example.COM ").unwrap(),
            "grower@example.com"
        );
        assert!(ValidationService::email("grower@localhost").is_err());
        assert!(ValidationService::email("no-at-sign.example").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(ValidationService::password("short").is_err());
        assert!(ValidationService::password("        ").is_err());
        assert!(ValidationService::password("long enough").is_ok());
    }
}
