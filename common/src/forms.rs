// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Form schemas for the website's submission forms.
//!
//! Each form declares its fields once as a static table of
//! [`ValidationRule`]s. [`validate_form`] runs the table either fail-fast
//! (stop at the first bad field) or collecting every violation.

use crate::sanitize::SanitizedValue;
use crate::upload::{validate_file_upload, UploadSummary, UploadedFile};
use crate::validator::{limits, FieldKind, ValidationError, ValidationRule};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

/// Positions accepted on the job application form.
pub const JOB_POSITIONS: &[&str] = &["developer", "designer", "analyst", "success", "other"];

/// Services accepted on the consultation request form.
pub const SERVICE_TYPES: &[&str] = &[
    "data-analytics",
    "business-intelligence",
    "cloud-infrastructure",
    "workflow-automation",
    "custom",
    "consultation",
];

/// How many violations to gather before giving up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Stop at the first invalid field.
    #[default]
    FailFast,
    /// Check every field and report all violations.
    CollectAll,
}

/// A submission form with a static field table.
pub trait FormSchema {
    /// Stable identifier used in logs and metrics.
    const NAME: &'static str;
    /// Human-readable form title.
    const TITLE: &'static str;
    /// Fields whose values make up the notification subject.
    const SUBJECT_FIELDS: &'static [&'static str];
    const RULES: &'static [ValidationRule];
    /// Payload key of the file metadata, if the form takes an upload.
    const ATTACHMENT_FIELD: Option<&'static str> = None;

    /// Raw value of a field by payload key.
    fn raw_field(&self, field: &str) -> Option<&str>;

    fn attachment(&self) -> Option<&UploadedFile> {
        None
    }
}

/// One field that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedField {
    pub rule: &'static ValidationRule,
    pub value: SanitizedValue,
}

/// A form whose every field passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm {
    form: &'static str,
    title: &'static str,
    subject_fields: &'static [&'static str],
    fields: Vec<ValidatedField>,
    attachment: Option<UploadSummary>,
}

impl ValidatedForm {
    pub fn form(&self) -> &'static str {
        self.form
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    /// Sanitized value of a field by payload key.
    pub fn get(&self, field: &str) -> Option<&SanitizedValue> {
        self.fields
            .iter()
            .find(|f| f.rule.field == field)
            .map(|f| &f.value)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[ValidatedField] {
        &self.fields
    }

    pub fn attachment(&self) -> Option<&UploadSummary> {
        self.attachment.as_ref()
    }

    /// "New Job Application: developer - Ada Lovelace"
    pub fn subject(&self) -> String {
        let parts: Vec<&str> = self
            .subject_fields
            .iter()
            .filter_map(|field| self.get(field))
            .filter(|value| !value.is_empty())
            .map(SanitizedValue::as_str)
            .collect();

        if parts.is_empty() {
            format!("New {}", self.title)
        } else {
            format!("New {}: {}", self.title, parts.join(" - "))
        }
    }
}

/// Violations found while validating a form. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormErrors(Vec<ValidationError>);

impl FormErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn first(&self) -> &ValidationError {
        &self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<ValidationError> {
        self.0
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}

/// Validate every field of `form` against its rule table.
pub fn validate_form<F: FormSchema>(
    form: &F,
    mode: ValidationMode,
) -> Result<ValidatedForm, FormErrors> {
    let mut fields = Vec::with_capacity(F::RULES.len());
    let mut errors = Vec::new();

    for rule in F::RULES {
        match rule.apply(form.raw_field(rule.field)) {
            Ok(value) => fields.push(ValidatedField { rule, value }),
            Err(err) => {
                debug!(form = F::NAME, field = rule.field, error = %err, "Field rejected");
                errors.push(err);
                if mode == ValidationMode::FailFast {
                    return Err(FormErrors(errors));
                }
            }
        }
    }

    let attachment = match form.attachment().map(validate_file_upload).transpose() {
        Ok(summary) => summary,
        Err(err) => {
            debug!(form = F::NAME, error = %err, "Attachment rejected");
            errors.push(err);
            None
        }
    };

    if !errors.is_empty() {
        return Err(FormErrors(errors));
    }

    Ok(ValidatedForm {
        form: F::NAME,
        title: F::TITLE,
        subject_fields: F::SUBJECT_FIELDS,
        fields,
        attachment,
    })
}

/// Read a form out of a raw JSON payload.
///
/// Every rule field must be a string or absent, and the attachment must
/// be file metadata. A value of the wrong type is reported against its
/// field like any other violation instead of failing the whole payload.
pub fn decode_form<F>(data: Value, mode: ValidationMode) -> Result<F, FormErrors>
where
    F: FormSchema + DeserializeOwned,
{
    let Value::Object(map) = data else {
        return Err(FormErrors(vec![ValidationError::Malformed {
            field: "Request data".to_string(),
            expected: "must be an object",
        }]));
    };

    let mut errors = Vec::new();
    for rule in F::RULES {
        if !is_text_or_absent(&map, rule.field) {
            debug!(form = F::NAME, field = rule.field, "Field is not text");
            errors.push(ValidationError::Malformed {
                field: rule.label.to_string(),
                expected: "must be text",
            });
            if mode == ValidationMode::FailFast {
                return Err(FormErrors(errors));
            }
        }
    }

    if let Some(key) = F::ATTACHMENT_FIELD {
        let readable = match map.get(key) {
            None | Some(Value::Null) => true,
            Some(value) => UploadedFile::deserialize(value).is_ok(),
        };
        if !readable {
            debug!(form = F::NAME, field = key, "Attachment is not file metadata");
            errors.push(ValidationError::Malformed {
                field: "File".to_string(),
                expected: "must have a name, contentType and size",
            });
        }
    }

    if !errors.is_empty() {
        return Err(FormErrors(errors));
    }

    serde_json::from_value(Value::Object(map)).map_err(|err| {
        debug!(form = F::NAME, error = %err, "Payload unreadable");
        FormErrors(vec![ValidationError::Malformed {
            field: "Request data".to_string(),
            expected: "could not be read",
        }])
    })
}

fn is_text_or_absent(map: &Map<String, Value>, key: &str) -> bool {
    matches!(map.get(key), None | Some(Value::Null) | Some(Value::String(_)))
}

/// Payload of the job application form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobApplicationInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub experience: Option<String>,
    pub linkedin: Option<String>,
    pub portfolio: Option<String>,
    pub cover_letter: Option<String>,
    pub resume: Option<UploadedFile>,
}

const JOB_APPLICATION_RULES: &[ValidationRule] = &[
    ValidationRule {
        field: "fullName",
        label: "Full name",
        kind: FieldKind::Text,
        max_len: limits::NAME,
        required: true,
    },
    ValidationRule {
        field: "email",
        label: "Email",
        kind: FieldKind::Email,
        max_len: limits::EMAIL,
        required: true,
    },
    ValidationRule {
        field: "phone",
        label: "Phone number",
        kind: FieldKind::Phone,
        max_len: limits::PHONE,
        required: false,
    },
    ValidationRule {
        field: "position",
        label: "Position",
        kind: FieldKind::Enumerated(JOB_POSITIONS),
        max_len: limits::POSITION,
        required: true,
    },
    ValidationRule {
        field: "experience",
        label: "Experience",
        kind: FieldKind::Text,
        max_len: limits::EXPERIENCE,
        required: false,
    },
    ValidationRule {
        field: "linkedin",
        label: "LinkedIn URL",
        kind: FieldKind::Url,
        max_len: limits::URL,
        required: false,
    },
    ValidationRule {
        field: "portfolio",
        label: "Portfolio URL",
        kind: FieldKind::Url,
        max_len: limits::URL,
        required: false,
    },
    ValidationRule {
        field: "coverLetter",
        label: "Cover letter",
        kind: FieldKind::Text,
        max_len: limits::COVER_LETTER,
        required: true,
    },
];

impl FormSchema for JobApplicationInput {
    const NAME: &'static str = "job_application";
    const TITLE: &'static str = "Job Application";
    const SUBJECT_FIELDS: &'static [&'static str] = &["position", "fullName"];
    const RULES: &'static [ValidationRule] = JOB_APPLICATION_RULES;
    const ATTACHMENT_FIELD: Option<&'static str> = Some("resume");

    fn raw_field(&self, field: &str) -> Option<&str> {
        match field {
            "fullName" => self.full_name.as_deref(),
            "email" => self.email.as_deref(),
            "phone" => self.phone.as_deref(),
            "position" => self.position.as_deref(),
            "experience" => self.experience.as_deref(),
            "linkedin" => self.linkedin.as_deref(),
            "portfolio" => self.portfolio.as_deref(),
            "coverLetter" => self.cover_letter.as_deref(),
            _ => None,
        }
    }

    fn attachment(&self) -> Option<&UploadedFile> {
        self.resume.as_ref()
    }
}

/// Payload of the consultation request form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsultationRequestInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub message: Option<String>,
}

const CONSULTATION_RULES: &[ValidationRule] = &[
    ValidationRule {
        field: "name",
        label: "Name",
        kind: FieldKind::Text,
        max_len: limits::NAME,
        required: true,
    },
    ValidationRule {
        field: "email",
        label: "Email",
        kind: FieldKind::Email,
        max_len: limits::EMAIL,
        required: true,
    },
    ValidationRule {
        field: "company",
        label: "Company",
        kind: FieldKind::Text,
        max_len: limits::COMPANY,
        required: true,
    },
    ValidationRule {
        field: "phone",
        label: "Phone number",
        kind: FieldKind::Phone,
        max_len: limits::PHONE,
        required: false,
    },
    ValidationRule {
        field: "service",
        label: "Service",
        kind: FieldKind::Enumerated(SERVICE_TYPES),
        max_len: limits::POSITION,
        required: true,
    },
    ValidationRule {
        field: "message",
        label: "Message",
        kind: FieldKind::Text,
        max_len: limits::MESSAGE,
        required: true,
    },
];

impl FormSchema for ConsultationRequestInput {
    const NAME: &'static str = "consultation_request";
    const TITLE: &'static str = "Consultation Request";
    const SUBJECT_FIELDS: &'static [&'static str] = &["service", "company"];
    const RULES: &'static [ValidationRule] = CONSULTATION_RULES;

    fn raw_field(&self, field: &str) -> Option<&str> {
        match field {
            "name" => self.name.as_deref(),
            "email" => self.email.as_deref(),
            "company" => self.company.as_deref(),
            "phone" => self.phone.as_deref(),
            "service" => self.service.as_deref(),
            "message" => self.message.as_deref(),
            _ => None,
        }
    }
}
