//! The contact request accepted by the relay.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::validation::schema::{validate, Constraint, FieldRule, Schema};
use crate::validation::ValidationError;

pub const NAME_MAX_CHARS: usize = 128;
pub const PHONE_DIGITS: usize = 11;

/// Rules for `email`, `name` and `phone`.
pub fn submission_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::new(vec![
            FieldRule::new("email", vec![Constraint::Email]),
            FieldRule::new(
                "name",
                vec![Constraint::MinChars(1), Constraint::MaxChars(NAME_MAX_CHARS)],
            ),
            FieldRule::new(
                "phone",
                vec![
                    Constraint::ExactChars(PHONE_DIGITS),
                    Constraint::Pattern {
                        // ASCII only; `\d` would also admit other Unicode digits.
                        regex: Regex::new(r"^[0-9]+$").expect("Invalid phone regex"),
                        description: "digits only",
                    },
                ],
            ),
        ])
    })
}

/// A validated contact request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    name: String,
    email: String,
    phone: String,
}

impl SubmissionRequest {
    /// Validate an untyped body and build the request from it.
    pub fn parse(body: &Map<String, Value>) -> Result<Self, ValidationError> {
        validate(submission_schema(), body).map_err(ValidationError::new)?;

        let field = |name: &str| {
            body.get(name)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_default()
        };

        Ok(Self {
            name: field("name"),
            email: field("email"),
            phone: field("phone"),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::IssueCode;
    use serde_json::json;

    fn parse(value: Value) -> Result<SubmissionRequest, ValidationError> {
        SubmissionRequest::parse(value.as_object().unwrap())
    }

    fn codes(err: &ValidationError) -> Vec<(&str, IssueCode)> {
        err.issues().iter().map(|i| (i.field.as_str(), i.code)).collect()
    }

    #[test]
    fn test_valid_submission() {
        let req = parse(json!({
            "name": "Ann",
            "email": "ann@example.com",
            "phone": "12345678901"
        }))
        .unwrap();

        assert_eq!(req.name(), "Ann");
        assert_eq!(req.email(), "ann@example.com");
        assert_eq!(req.phone(), "12345678901");
    }

    #[test]
    fn test_name_bounds() {
        let at_limit = "я".repeat(NAME_MAX_CHARS);
        assert!(parse(json!({ "name": at_limit, "email": "a@b.cd", "phone": "12345678901" })).is_ok());

        let err = parse(json!({ "name": "", "email": "a@b.cd", "phone": "12345678901" })).unwrap_err();
        assert_eq!(codes(&err), vec![("name", IssueCode::TooShort)]);

        // 100 characters, 200 UTF-16 units.
        let emoji = "😀".repeat(100);
        let err = parse(json!({ "name": emoji, "email": "a@b.cd", "phone": "12345678901" })).unwrap_err();
        assert_eq!(codes(&err), vec![("name", IssueCode::TooLong)]);

        let too_long = "x".repeat(NAME_MAX_CHARS + 1);
        let err = parse(json!({ "name": too_long, "email": "a@b.cd", "phone": "12345678901" })).unwrap_err();
        assert_eq!(codes(&err), vec![("name", IssueCode::TooLong)]);
    }

    #[test]
    fn test_phone_rules() {
        for (phone, expected) in [
            ("1234567890", vec![("phone", IssueCode::InvalidLength)]),
            ("123456789012", vec![("phone", IssueCode::InvalidLength)]),
            ("1234567890a", vec![("phone", IssueCode::InvalidFormat)]),
            ("+1234567890", vec![("phone", IssueCode::InvalidFormat)]),
            ("１２３４５６７８９０１", vec![("phone", IssueCode::InvalidFormat)]),
            ("12-34", vec![("phone", IssueCode::InvalidLength), ("phone", IssueCode::InvalidFormat)]),
        ] {
            let err = parse(json!({ "name": "Ann", "email": "a@b.cd", "phone": phone })).unwrap_err();
            assert_eq!(codes(&err), expected, "phone {phone:?}");
        }
    }

    #[test]
    fn test_every_failing_field_is_reported() {
        let err = parse(json!({ "email": "nope", "phone": 12345678901u64 })).unwrap_err();
        assert_eq!(
            codes(&err),
            vec![
                ("email", IssueCode::InvalidEmail),
                ("name", IssueCode::Required),
                ("phone", IssueCode::InvalidType),
            ]
        );
    }
}
