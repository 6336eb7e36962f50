//! Declarative validation of untyped contact form input.

use std::{collections::BTreeMap, fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::contact::{
    ContactCompany, ContactMail, ContactMessageContent, ContactName, ContactPhone, ContactRequest,
    ContactSubject, COMPANY_REGEX, MAIL_REGEX, NAME_REGEX, PHONE_REGEX,
};

/// The fields of a contact request, in schema declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Mail,
    Name,
    Subject,
    Message,
    Company,
    Phone,
}

impl ContactField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mail => "mail",
            Self::Name => "name",
            Self::Subject => "subject",
            Self::Message => "message",
            Self::Company => "company",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: ContactField,
    pub message: String,
}

impl FieldError {
    pub fn new(field: ContactField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// All constraint violations found in a contact request, ordered by field
/// and, within a field, by rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("The contact request is invalid ({} violations)", .errors.len())]
pub struct ContactValidationError {
    pub errors: Vec<FieldError>,
}

impl ContactValidationError {
    /// Groups the messages by field, as reported in the `errors` object of
    /// the contact API.
    pub fn messages_by_field(&self) -> BTreeMap<ContactField, Vec<String>> {
        self.errors
            .iter()
            .fold(BTreeMap::new(), |mut acc, FieldError { field, message }| {
                acc.entry(*field)
                    .or_insert_with(Vec::new)
                    .push(message.clone());
                acc
            })
    }
}

/// Validates untyped input against the contact schema.
///
/// Missing or extra fields are allowed in the input. Every violation is
/// collected, not just the first one. Empty strings and `null` in optional
/// fields count as absent. Input that is not a JSON object is treated as an
/// object without fields.
pub fn validate(raw: &Value) -> Result<ContactRequest, ContactValidationError> {
    let empty = Map::new();
    let object = raw.as_object().unwrap_or(&empty);

    let mut errors = Vec::new();
    let [mail, name, subject, message, company, phone] =
        SCHEMA.each_ref().map(|schema| schema.check(object, &mut errors));

    let mail = construct(ContactField::Mail, mail, ContactMail::try_new, &mut errors);
    let name = construct(ContactField::Name, name, ContactName::try_new, &mut errors);
    let subject = construct(ContactField::Subject, subject, ContactSubject::try_new, &mut errors);
    let message = construct(
        ContactField::Message,
        message,
        ContactMessageContent::try_new,
        &mut errors,
    );
    let company = construct(ContactField::Company, company, ContactCompany::try_new, &mut errors);
    let phone = construct(ContactField::Phone, phone, ContactPhone::try_new, &mut errors);

    match (mail, name, subject, message) {
        (Some(mail), Some(name), Some(subject), Some(message)) if errors.is_empty() => {
            Ok(ContactRequest {
                mail,
                name,
                subject,
                message,
                company,
                phone,
            })
        }
        _ => Err(ContactValidationError { errors }),
    }
}

fn construct<T, E: fmt::Display>(
    field: ContactField,
    value: Option<&str>,
    new: impl FnOnce(String) -> Result<T, E>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    new(value?.to_owned())
        .map_err(|err| errors.push(FieldError::new(field, err.to_string())))
        .ok()
}

struct FieldSchema {
    field: ContactField,
    presence: Presence,
    invalid_type: &'static str,
    rules: &'static [Rule],
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required { missing: &'static str },
    Optional,
}

enum Rule {
    MinChars(usize, &'static str),
    MaxChars(usize, &'static str),
    Pattern(&'static LazyLock<Regex>, &'static str),
}

impl Rule {
    fn check(&self, value: &str) -> Result<(), &'static str> {
        let (ok, message) = match *self {
            Self::MinChars(min, message) => (value.chars().count() >= min, message),
            Self::MaxChars(max, message) => (value.chars().count() <= max, message),
            Self::Pattern(regex, message) => (regex.is_match(value), message),
        };
        ok.then_some(()).ok_or(message)
    }
}

impl FieldSchema {
    /// Returns the value of the field if it is present and satisfies every
    /// rule, otherwise records the violations.
    fn check<'a>(
        &self,
        object: &'a Map<String, Value>,
        errors: &mut Vec<FieldError>,
    ) -> Option<&'a str> {
        let value = match object.get(self.field.as_str()) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() && self.presence == Presence::Optional => None,
            Some(Value::String(s)) => Some(s.as_str()),
            Some(_) => {
                errors.push(FieldError::new(self.field, self.invalid_type));
                return None;
            }
        };

        let Some(value) = value else {
            if let Presence::Required { missing } = self.presence {
                errors.push(FieldError::new(self.field, missing));
            }
            return None;
        };

        let before = errors.len();
        errors.extend(
            self.rules
                .iter()
                .filter_map(|rule| rule.check(value).err())
                .map(|message| FieldError::new(self.field, message)),
        );

        (errors.len() == before).then_some(value)
    }
}

static SCHEMA: [FieldSchema; 6] = [
    FieldSchema {
        field: ContactField::Mail,
        presence: Presence::Required {
            missing: "E-Mail-Adresse ist erforderlich",
        },
        invalid_type: "E-Mail-Adresse muss ein Text sein",
        rules: &[
            Rule::MinChars(ContactMail::MIN_CHARS, "E-Mail-Adresse ist erforderlich"),
            Rule::Pattern(&MAIL_REGEX, "Ungültige E-Mail-Adresse"),
            Rule::MaxChars(ContactMail::MAX_CHARS, "E-Mail-Adresse ist zu lang"),
        ],
    },
    FieldSchema {
        field: ContactField::Name,
        presence: Presence::Required {
            missing: "Name ist erforderlich",
        },
        invalid_type: "Name muss ein Text sein",
        rules: &[
            Rule::MinChars(ContactName::MIN_CHARS, "Name muss mindestens 2 Zeichen lang sein"),
            Rule::MaxChars(ContactName::MAX_CHARS, "Name ist zu lang"),
            Rule::Pattern(&NAME_REGEX, "Name enthält ungültige Zeichen"),
        ],
    },
    FieldSchema {
        field: ContactField::Subject,
        presence: Presence::Required {
            missing: "Betreff ist erforderlich",
        },
        invalid_type: "Betreff muss ein Text sein",
        rules: &[
            Rule::MinChars(
                ContactSubject::MIN_CHARS,
                "Betreff muss mindestens 3 Zeichen lang sein",
            ),
            Rule::MaxChars(ContactSubject::MAX_CHARS, "Betreff ist zu lang"),
        ],
    },
    FieldSchema {
        field: ContactField::Message,
        presence: Presence::Required {
            missing: "Nachricht ist erforderlich",
        },
        invalid_type: "Nachricht muss ein Text sein",
        rules: &[
            Rule::MinChars(
                ContactMessageContent::MIN_CHARS,
                "Nachricht muss mindestens 10 Zeichen lang sein",
            ),
            Rule::MaxChars(ContactMessageContent::MAX_CHARS, "Nachricht ist zu lang"),
        ],
    },
    FieldSchema {
        field: ContactField::Company,
        presence: Presence::Optional,
        invalid_type: "Firmenname muss ein Text sein",
        rules: &[
            Rule::MaxChars(ContactCompany::MAX_CHARS, "Firmenname ist zu lang"),
            Rule::Pattern(&COMPANY_REGEX, "Firmenname enthält ungültige Zeichen"),
        ],
    },
    FieldSchema {
        field: ContactField::Phone,
        presence: Presence::Optional,
        invalid_type: "Telefonnummer muss ein Text sein",
        rules: &[Rule::Pattern(&PHONE_REGEX, "Ungültige Telefonnummer")],
    },
];
