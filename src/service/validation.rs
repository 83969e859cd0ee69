//! Declarative request validation. Every failed rule is reported, not only the first.

use crate::error::{AppError, Violation};
use crate::models::Seniority;
use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const AADHAR_LENGTH: usize = 12;

static RE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());
static RE_ISO_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Shape a text value must match. Each variant owns one regex, compiled on first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Digits,
    IsoDate,
}

impl Pattern {
    fn regex(self) -> &'static Regex {
        match self {
            Pattern::Digits => &*RE_DIGITS,
            Pattern::IsoDate => &*RE_ISO_DATE,
        }
    }

    pub fn is_match(self, s: &str) -> bool {
        self.regex().is_match(s)
    }

    fn describe(self) -> &'static str {
        match self {
            Pattern::Digits => "must contain only digits",
            Pattern::IsoDate => "must match YYYY-MM-DD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// `YYYY-MM-DD`, and a real calendar day.
    Date,
    Integer,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
    pub non_blank: bool,
    pub exact_length: Option<usize>,
    pub pattern: Option<Pattern>,
    pub allowed: Option<&'static [&'static str]>,
}

impl FieldRule {
    const fn of(kind: FieldKind) -> Self {
        FieldRule {
            kind,
            required: true,
            nullable: false,
            non_blank: false,
            exact_length: None,
            pattern: None,
            allowed: None,
        }
    }

    pub const fn text() -> Self {
        Self::of(FieldKind::Text)
    }

    pub const fn date() -> Self {
        Self::of(FieldKind::Date)
    }

    pub const fn integer() -> Self {
        Self::of(FieldKind::Integer)
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self.nullable = true;
        self
    }

    pub const fn non_blank(mut self) -> Self {
        self.non_blank = true;
        self
    }

    pub const fn exact_length(mut self, n: usize) -> Self {
        self.exact_length = Some(n);
        self
    }

    pub const fn pattern(mut self, p: Pattern) -> Self {
        self.pattern = Some(p);
        self
    }

    pub const fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.allowed = Some(values);
        self
    }
}

pub type RuleSet = &'static [(&'static str, FieldRule)];

const AADHAR_RULE: FieldRule = FieldRule::text()
    .exact_length(AADHAR_LENGTH)
    .pattern(Pattern::Digits);

pub const STUDENT_RULES: RuleSet = &[
    ("name", FieldRule::text().non_blank()),
    ("dateOfBirth", FieldRule::date()),
    ("aadharNumber", AADHAR_RULE),
    ("proctorId", FieldRule::integer().optional()),
];

pub const PROFESSOR_RULES: RuleSet = &[
    ("name", FieldRule::text().non_blank()),
    ("seniority", FieldRule::text().one_of(Seniority::NAMES)),
    ("aadharNumber", AADHAR_RULE),
];

pub const MEMBERSHIP_RULES: RuleSet = &[
    ("issueDate", FieldRule::date()),
    ("expiryDate", FieldRule::date()),
];

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create payload: required fields must be present and non-null.
    pub fn validate(body: &Map<String, Value>, rules: RuleSet) -> Result<(), AppError> {
        let mut violations = Vec::new();
        for (field, rule) in rules {
            match body.get(*field) {
                None | Some(Value::Null) if rule.required => {
                    violations.push(Violation::new(field, "is required"));
                }
                Some(v) => check_field(field, v, rule, &mut violations),
                None => {}
            }
        }
        finish(violations)
    }

    /// Validate only the fields present in body (for PATCH). Unknown keys are left to the patch type.
    pub fn validate_partial(body: &Map<String, Value>, rules: RuleSet) -> Result<(), AppError> {
        let mut violations = Vec::new();
        for (field, v) in body {
            if let Some((name, rule)) = rules.iter().find(|(name, _)| *name == field.as_str()) {
                if v.is_null() && !rule.nullable {
                    violations.push(Violation::new(name, "must not be null"));
                    continue;
                }
                check_field(name, v, rule, &mut violations);
            }
        }
        finish(violations)
    }

    /// `expiryDate` must not precede `issueDate`.
    pub fn validate_membership_window(issue: NaiveDate, expiry: NaiveDate) -> Result<(), AppError> {
        if expiry < issue {
            return Err(AppError::Validation(vec![Violation::new(
                "expiryDate",
                "must not be before issueDate",
            )]));
        }
        Ok(())
    }
}

/// Request bodies must be JSON objects.
pub fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

fn finish(violations: Vec<Violation>) -> Result<(), AppError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(violations))
    }
}

fn check_field(field: &str, v: &Value, rule: &FieldRule, out: &mut Vec<Violation>) {
    if v.is_null() {
        return;
    }
    match rule.kind {
        FieldKind::Integer => {
            if v.as_i64().and_then(|n| i32::try_from(n).ok()).is_none() {
                out.push(Violation::new(field, "must be an integer"));
            }
        }
        FieldKind::Date => match v.as_str() {
            Some(s) => check_date(field, s, out),
            None => out.push(Violation::new(field, "must be a date string (YYYY-MM-DD)")),
        },
        FieldKind::Text => match v.as_str() {
            Some(s) => check_text(field, s, rule, out),
            None => out.push(Violation::new(field, "must be a string")),
        },
    }
}

fn check_date(field: &str, s: &str, out: &mut Vec<Violation>) {
    if !Pattern::IsoDate.is_match(s) {
        out.push(Violation::new(field, Pattern::IsoDate.describe()));
    } else if NaiveDate::parse_from_str(s, DATE_FORMAT).is_err() {
        out.push(Violation::new(field, "is not a valid calendar date"));
    }
}

fn check_text(field: &str, s: &str, rule: &FieldRule, out: &mut Vec<Violation>) {
    if rule.non_blank && s.trim().is_empty() {
        out.push(Violation::new(field, "must not be empty"));
        return;
    }
    if let Some(n) = rule.exact_length {
        if s.chars().count() != n {
            out.push(Violation::new(field, format!("must be exactly {} characters", n)));
            return;
        }
    }
    if let Some(pattern) = rule.pattern {
        if !pattern.is_match(s) {
            out.push(Violation::new(field, pattern.describe()));
            return;
        }
    }
    if let Some(allowed) = rule.allowed {
        if !allowed.contains(&s) {
            out.push(Violation::new(field, format!("must be one of: {}", allowed.join(", "))));
        }
    }
}
