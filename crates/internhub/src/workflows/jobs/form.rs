use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{10,15}$").expect("valid phone pattern"));

/// Field answers keyed by form field name.
pub type FormAnswers = BTreeMap<String, String>;

/// Input type of a custom application-form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Email,
    #[serde(alias = "tel")]
    Phone,
    Number,
    Url,
    #[serde(alias = "dropdown")]
    Select,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

fn default_kind() -> FieldKind {
    FieldKind::Text
}

impl FormField {
    fn display_name(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

/// Custom form a hiring team attaches to a posting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationForm {
    #[serde(default)]
    pub fields: Vec<FormField>,
}

impl ApplicationForm {
    /// Check `answers` against the schema, collecting every failing field.
    pub fn validate(&self, answers: &FormAnswers) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        for field in &self.fields {
            let value = answers
                .get(&field.name)
                .map(|value| value.trim())
                .unwrap_or_default();

            if value.is_empty() {
                if field.required {
                    errors.push(FieldError::new(field, FieldProblem::Missing));
                }
                continue;
            }

            if let Some(problem) = check_value(field, value) {
                errors.push(FieldError::new(field, problem));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

fn check_value(field: &FormField, value: &str) -> Option<FieldProblem> {
    match field.kind {
        FieldKind::Text | FieldKind::Textarea => None,
        FieldKind::Email => (!EMAIL_PATTERN.is_match(value)).then_some(FieldProblem::InvalidEmail),
        FieldKind::Phone => {
            let compact: String = value
                .chars()
                .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
                .collect();
            (!PHONE_PATTERN.is_match(&compact)).then_some(FieldProblem::InvalidPhone)
        }
        FieldKind::Number => value
            .parse::<f64>()
            .map_err(|_| FieldProblem::InvalidNumber)
            .err(),
        FieldKind::Url => {
            let lower = value.to_ascii_lowercase();
            (!(lower.starts_with("http://") || lower.starts_with("https://")))
                .then_some(FieldProblem::InvalidUrl)
        }
        FieldKind::Select => (!field.options.is_empty()
            && !field.options.iter().any(|option| option == value))
        .then_some(FieldProblem::UnknownOption),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    InvalidEmail,
    InvalidPhone,
    InvalidNumber,
    InvalidUrl,
    UnknownOption,
}

impl FieldProblem {
    const fn describe(self) -> &'static str {
        match self {
            FieldProblem::Missing => "is required",
            FieldProblem::InvalidEmail => "must be a valid email address",
            FieldProblem::InvalidPhone => "must be a valid phone number",
            FieldProblem::InvalidNumber => "must be a number",
            FieldProblem::InvalidUrl => "must be an http(s) link",
            FieldProblem::UnknownOption => "must be one of the listed options",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub label: String,
    pub problem: FieldProblem,
}

impl FieldError {
    fn new(field: &FormField, problem: FieldProblem) -> Self {
        Self {
            field: field.name.clone(),
            label: field.display_name().to_string(),
            problem,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label, self.problem.describe())
    }
}

/// Every field that failed client-side validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_errors(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|error| error.field.as_str())
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
