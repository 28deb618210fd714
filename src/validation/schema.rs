//! Declarative field rules and the generic evaluator.
//!
//! A schema is plain data: each field name maps to a list of constraints.
//! Every field in a schema must be present and hold a string; the listed
//! constraints are then checked against that string.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Machine-readable reason a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    Required,
    InvalidType,
    TooShort,
    TooLong,
    InvalidLength,
    InvalidFormat,
    InvalidEmail,
    MalformedBody,
}

/// One failed check on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub code: IssueCode,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }
}

/// A check applied to a string field.
///
/// Lengths count UTF-16 code units, so a character outside the Basic
/// Multilingual Plane counts as two.
#[derive(Debug, Clone)]
pub enum Constraint {
    MinChars(usize),
    MaxChars(usize),
    ExactChars(usize),
    Pattern { regex: Regex, description: &'static str },
    Email,
}

impl Constraint {
    fn check(&self, field: &str, value: &str) -> Option<FieldIssue> {
        let chars = value.encode_utf16().count();
        match self {
            Constraint::MinChars(min) if chars < *min => Some(FieldIssue::new(
                field,
                IssueCode::TooShort,
                format!("must contain at least {min} character(s)"),
            )),
            Constraint::MaxChars(max) if chars > *max => Some(FieldIssue::new(
                field,
                IssueCode::TooLong,
                format!("must contain at most {max} character(s)"),
            )),
            Constraint::ExactChars(len) if chars != *len => Some(FieldIssue::new(
                field,
                IssueCode::InvalidLength,
                format!("must contain exactly {len} character(s)"),
            )),
            Constraint::Pattern { regex, description } if !regex.is_match(value) => Some(
                FieldIssue::new(field, IssueCode::InvalidFormat, format!("must be {description}")),
            ),
            Constraint::Email if !is_email(value) => Some(FieldIssue::new(
                field,
                IssueCode::InvalidEmail,
                "must be a valid email address",
            )),
            _ => None,
        }
    }
}

/// Constraints for a single named field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: &'static str,
    pub constraints: Vec<Constraint>,
}

impl FieldRule {
    pub fn new(field: &'static str, constraints: Vec<Constraint>) -> Self {
        Self { field, constraints }
    }
}

/// An ordered set of field rules.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

impl Schema {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }
}

/// Check every rule of `schema` against `body`.
///
/// All fields are evaluated; the error lists every issue found. Fields not
/// named by the schema are ignored.
pub fn validate(schema: &Schema, body: &Map<String, Value>) -> Result<(), Vec<FieldIssue>> {
    let mut issues = Vec::new();

    for rule in schema.rules() {
        match body.get(rule.field) {
            None | Some(Value::Null) => {
                issues.push(FieldIssue::new(rule.field, IssueCode::Required, "is required"));
            }
            Some(Value::String(value)) => {
                issues.extend(rule.constraints.iter().filter_map(|c| c.check(rule.field, value)));
            }
            Some(other) => {
                issues.push(FieldIssue::new(
                    rule.field,
                    IssueCode::InvalidType,
                    format!("expected string, received {}", json_type(other)),
                ));
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Email address syntax check.
///
/// Local part of letters, digits and `_ ' + - .`, not starting with a dot
/// and not ending in `.` or `'`; domain of dot-separated labels with an
/// alphabetic TLD of two or more letters; no consecutive dots anywhere.
/// Letters are ASCII only.
pub fn is_email(value: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_'+.-]*[A-Za-z0-9_+-]@([A-Za-z0-9][A-Za-z0-9-]*\.)+[A-Za-z]{2,}$")
            .expect("Invalid email regex")
    });

    !value.starts_with('.') && !value.contains("..") && re.is_match(value)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
