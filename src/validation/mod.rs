use bigdecimal::BigDecimal;
use std::fmt;

pub const PARTY_NAME_MIN_LEN: usize = 2;
pub const PARTY_NAME_MAX_LEN: usize = 120;
pub const EMAIL_MAX_LEN: usize = 254;
pub const DESCRIPTION_MAX_LEN: usize = 500;
pub const COMMENT_MAX_LEN: usize = 2000;
pub const RATING_MIN: i32 = 1;
pub const RATING_MAX: i32 = 5;
pub const ALLOWED_ROLES: &[&str] = &["supplier", "vendor"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_enum(field: &'static str, value: &str, allowed: &[&str]) -> ValidationResult {
    if allowed.iter().all(|candidate| value != *candidate) {
        return Err(ValidationError::new(
            field,
            format!("must be one of: {}", allowed.join(", ")),
        ));
    }

    Ok(())
}

pub fn validate_positive_amount(amount: &BigDecimal) -> ValidationResult {
    if amount <= &BigDecimal::from(0) {
        return Err(ValidationError::new("amount", "must be greater than zero"));
    }

    Ok(())
}

pub fn validate_rating(rating: i32) -> ValidationResult {
    if !(RATING_MIN..=RATING_MAX).contains(&rating) {
        return Err(ValidationError::new(
            "rating",
            format!("must be an integer between {} and {}", RATING_MIN, RATING_MAX),
        ));
    }

    Ok(())
}

pub fn validate_party_name(name: &str) -> ValidationResult {
    validate_required("name", name)?;

    if name.len() < PARTY_NAME_MIN_LEN {
        return Err(ValidationError::new(
            "name",
            format!("must be at least {} characters long", PARTY_NAME_MIN_LEN),
        ));
    }

    validate_max_len("name", name, PARTY_NAME_MAX_LEN)
}

pub fn validate_email(email: &str) -> ValidationResult {
    validate_required("email", email)?;
    validate_max_len("email", email, EMAIL_MAX_LEN)?;

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::new("email", "must be a valid email address"));
    }

    Ok(())
}

pub fn validate_roles(roles: &[String]) -> ValidationResult {
    if roles.is_empty() {
        return Err(ValidationError::new("roles", "must not be empty"));
    }

    for role in roles {
        validate_enum("roles", role, ALLOWED_ROLES)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn validates_required_field() {
        assert!(validate_required("field", "value").is_ok());
        assert!(validate_required("field", "   ").is_err());
    }

    #[test]
    fn validates_max_len() {
        assert!(validate_max_len("field", "abc", 3).is_ok());
        assert!(validate_max_len("field", "abcd", 3).is_err());
    }

    #[test]
    fn validates_enum_values() {
        assert!(validate_enum("roles", "supplier", ALLOWED_ROLES).is_ok());
        assert!(validate_enum("roles", "vendor", ALLOWED_ROLES).is_ok());
        assert!(validate_enum("roles", "admin", ALLOWED_ROLES).is_err());
    }

    #[test]
    fn sanitizes_string() {
        assert_eq!(sanitize_string("  hello\tworld  "), "hello world");
        assert_eq!(sanitize_string("single"), "single");
        assert_eq!(sanitize_string(" \n "), "");
        assert_eq!(sanitize_string("ab\u{0000}cd\u{0007}"), "abcd");
    }

    #[test]
    fn validates_positive_amount() {
        let positive = BigDecimal::from_str("1.23").expect("valid decimal");
        let zero = BigDecimal::from(0);
        let negative = BigDecimal::from(-1);

        assert!(validate_positive_amount(&positive).is_ok());
        assert!(validate_positive_amount(&zero).is_err());
        assert!(validate_positive_amount(&negative).is_err());
    }

    #[test]
    fn validates_rating_bounds() {
        for rating in RATING_MIN..=RATING_MAX {
            assert!(validate_rating(rating).is_ok());
        }
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(-3).is_err());
    }

    #[test]
    fn validates_party_name() {
        assert!(validate_party_name("Acme Corp").is_ok());
        assert!(validate_party_name("A").is_err());
        assert!(validate_party_name("").is_err());
        assert!(validate_party_name(&"x".repeat(PARTY_NAME_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn validates_email() {
        assert!(validate_email("ops@acme.example").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@acme.example").is_err());
        assert!(validate_email("ops@").is_err());
        assert!(validate_email("ops@nodot").is_err());
        assert!(validate_email("ops@.example").is_err());
    }

    #[test]
    fn validates_roles() {
        assert!(validate_roles(&["supplier".to_string()]).is_ok());
        assert!(validate_roles(&["supplier".to_string(), "vendor".to_string()]).is_ok());
        assert!(validate_roles(&[]).is_err());
        assert!(validate_roles(&["broker".to_string()]).is_err());
    }
}
