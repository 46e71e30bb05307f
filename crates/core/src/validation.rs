//! Input validation shared by the catalog and profile endpoints.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidateEmail;

use crate::error::CoreError;

pub const MAX_SLUG_LEN: usize = 120;
pub const MAX_NAME_LEN: usize = 200;
pub const MIN_PASSWORD_LEN: usize = 8;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"));

/// Validate a URL slug: lowercase alphanumerics separated by single hyphens.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.len() > MAX_SLUG_LEN {
        return Err(CoreError::Validation(format!(
            "Slug must be at most {MAX_SLUG_LEN} characters"
        )));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(format!(
            "Invalid slug '{slug}'. Use lowercase letters, digits and single hyphens"
        )));
    }
    Ok(())
}

/// Derive a slug from a human title. Non-alphanumeric runs become a single
/// hyphen; the result is truncated to [`MAX_SLUG_LEN`].
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// Require a non-blank display name within [`MAX_NAME_LEN`].
pub fn validate_name(field: &str, value: &str) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Trim and lowercase an email, then check its shape.
pub fn normalize_email(email: &str) -> Result<String, CoreError> {
    let normalized = email.trim().to_lowercase();
    if normalized.validate_email() {
        Ok(normalized)
    } else {
        Err(CoreError::Validation(format!("Invalid email address '{}'", email.trim())))
    }
}

/// Enforce the minimum password length.
pub fn validate_password_strength(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

/// Image dimensions must be positive.
pub fn validate_dimensions(width: i32, height: i32) -> Result<(), CoreError> {
    if width <= 0 || height <= 0 {
        return Err(CoreError::Validation(format!(
            "Dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_rules() {
        assert!(validate_slug("nature").is_ok());
        assert!(validate_slug("dark-mode-4k").is_ok());
        assert!(validate_slug("Nature").is_err());
        assert!(validate_slug("-lead").is_err());
        assert!(validate_slug("double--hyphen").is_err());
        assert!(validate_slug("").is_err());
        assert!(validate_slug(&"a".repeat(MAX_SLUG_LEN + 1)).is_err());
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Misty Forest  @ Dawn!"), "misty-forest-dawn");
        assert_eq!(slugify("  --Neon City--  "), "neon-city");
        assert_eq!(slugify("4K Ocean"), "4k-ocean");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn slugify_output_is_a_valid_slug() {
        let slug = slugify(&"Long title ".repeat(40));
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(validate_slug(&slug).is_ok());
    }

    #[test]
    fn names_must_not_be_blank() {
        assert!(validate_name("name", "Nature").is_ok());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(
            normalize_email("  Jane.Doe@Example.COM ").unwrap(),
            "jane.doe@example.com"
        );
        assert!(normalize_email("not-an-email").is_err());
    }

    #[test]
    fn password_minimum() {
        assert!(validate_password_strength("short").is_err());
        assert!(validate_password_strength("eight888").is_ok());
    }

    #[test]
    fn dimensions_positive() {
        assert!(validate_dimensions(1920, 1080).is_ok());
        assert!(validate_dimensions(0, 1080).is_err());
        assert!(validate_dimensions(1920, -1).is_err());
    }
}
