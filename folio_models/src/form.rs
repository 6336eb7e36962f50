//! Read model of the contact form as rendered by a front-end.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::validation::{ContactField, FieldError};

/// Input ids of the contact form. These differ from the schema fields only
/// in `email`, which is submitted as `mail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Name,
    Email,
    Subject,
    Message,
    Company,
    Phone,
}

impl FormField {
    pub fn id(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Subject => "subject",
            Self::Message => "message",
            Self::Company => "company",
            Self::Phone => "phone",
        }
    }
}

impl From<ContactField> for FormField {
    fn from(value: ContactField) -> Self {
        match value {
            ContactField::Mail => Self::Email,
            ContactField::Name => Self::Name,
            ContactField::Subject => Self::Subject,
            ContactField::Message => Self::Message,
            ContactField::Company => Self::Company,
            ContactField::Phone => Self::Phone,
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unknown form field")]
pub struct UnknownFormField;

impl FromStr for FormField {
    type Err = UnknownFormField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "subject" => Ok(Self::Subject),
            "message" => Ok(Self::Message),
            "company" => Ok(Self::Company),
            "phone" => Ok(Self::Phone),
            _ => Err(UnknownFormField),
        }
    }
}

/// Raw values of the contact form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub company: String,
    pub phone: String,
}

impl ContactForm {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Subject => &self.subject,
            FormField::Message => &self.message,
            FormField::Company => &self.company,
            FormField::Phone => &self.phone,
        }
    }

    pub fn set(&mut self, field: FormField, value: String) {
        *match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Subject => &mut self.subject,
            FormField::Message => &mut self.message,
            FormField::Company => &mut self.company,
            FormField::Phone => &mut self.phone,
        } = value;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Builds the untyped request object in the format of the contact API.
    pub fn to_raw(&self) -> Value {
        json!({
            "name": self.name,
            "mail": self.email,
            "subject": self.subject,
            "message": self.message,
            "company": self.company,
            "phone": self.phone,
        })
    }
}

/// The first validation message of each form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn from_errors(errors: &[FieldError]) -> Self {
        Self(errors.iter().fold(BTreeMap::new(), |mut acc, error| {
            acc.entry(error.field.into())
                .or_insert_with(|| error.message.clone());
            acc
        }))
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

/// Lifecycle of a single submission attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl SubmissionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Everything a front-end needs to render the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFormView {
    pub form: ContactForm,
    pub field_errors: FieldErrors,
    pub submission: SubmissionState,
}

impl ContactFormView {
    pub fn is_loading(&self) -> bool {
        self.submission.is_loading()
    }

    pub fn is_success(&self) -> bool {
        self.submission.is_success()
    }

    pub fn error(&self) -> Option<&str> {
        self.submission.error()
    }
}
