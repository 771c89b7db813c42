use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::{dto::RegistrationRequest, repo_types::NewRegistration};

/// One rejected field, reported back to the client under `details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: &'static str,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_name(name: &str) -> Option<FieldViolation> {
    name.trim().is_empty().then_some(FieldViolation {
        field: "name",
        message: "name is required",
    })
}

fn check_email(email: &str) -> Option<FieldViolation> {
    if email.trim().is_empty() {
        return Some(FieldViolation {
            field: "email",
            message: "email is required",
        });
    }
    (!is_valid_email(email)).then_some(FieldViolation {
        field: "email",
        message: "email must be a valid email address",
    })
}

/// Check a create/update payload and turn it into store input.
///
/// Every violation is collected; the payload is only accepted when the list is
/// empty. Values are kept as submitted, except that a blank phone becomes `None`.
pub fn validate(req: RegistrationRequest) -> Result<NewRegistration, Vec<FieldViolation>> {
    let RegistrationRequest {
        name,
        email,
        phone,
        date_of_birth,
    } = req;

    let violations: Vec<FieldViolation> = [check_name(&name), check_email(&email)]
        .into_iter()
        .flatten()
        .collect();
    if !violations.is_empty() {
        return Err(violations);
    }

    let phone = phone.filter(|p| !p.trim().is_empty());

    Ok(NewRegistration {
        name,
        email,
        phone,
        date_of_birth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str) -> RegistrationRequest {
        RegistrationRequest {
            name: name.into(),
            email: email.into(),
            phone: None,
            date_of_birth: None,
        }
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("ada@x.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("ada@x"));
        assert!(!is_valid_email("ada lovelace@x.com"));
        assert!(!is_valid_email("ada@@x.com"));
    }

    #[test]
    fn keeps_values_as_submitted() {
        let new = validate(request("  Ada ", "ada@x.com")).expect("valid");
        assert_eq!(new.name, "  Ada ");
        assert_eq!(new.email, "ada@x.com");
        assert!(new.phone.is_none());
    }

    #[test]
    fn email_with_surrounding_whitespace_is_malformed() {
        let violations = validate(request("Ada", " ada@x.com ")).unwrap_err();
        assert_eq!(violations[0].message, "email must be a valid email address");
    }

    #[test]
    fn blank_name_is_rejected() {
        let violations = validate(request("   ", "ada@x.com")).unwrap_err();
        assert_eq!(
            violations,
            vec![FieldViolation {
                field: "name",
                message: "name is required",
            }]
        );
    }

    #[test]
    fn collects_every_violation() {
        let violations = validate(request("", "not-an-email")).unwrap_err();
        let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, ["name", "email"]);
        assert_eq!(violations[1].message, "email must be a valid email address");
    }

    #[test]
    fn missing_email_reports_required() {
        let violations = validate(request("Ada", "")).unwrap_err();
        assert_eq!(violations[0].message, "email is required");
    }

    #[test]
    fn blank_phone_becomes_none_and_phone_is_not_format_checked() {
        let mut req = request("Ada", "ada@x.com");
        req.phone = Some("  ".into());
        assert!(validate(req).unwrap().phone.is_none());

        let mut req = request("Ada", "ada@x.com");
        req.phone = Some(" call me maybe".into());
        assert_eq!(validate(req).unwrap().phone.as_deref(), Some(" call me maybe"));
    }
}
