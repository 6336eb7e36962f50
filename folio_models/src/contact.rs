use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::macros::nutype_string;

/// A contact request that passed validation.
///
/// Every field is a validated newtype, so a value of this type always
/// satisfies the constraints of the contact schema. Absent optional fields
/// are `None`, never empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRequest {
    pub mail: ContactMail,
    pub name: ContactName,
    pub subject: ContactSubject,
    pub message: ContactMessageContent,
    pub company: Option<ContactCompany>,
    pub phone: Option<ContactPhone>,
}

nutype_string!(ContactMail(validate(
    len_char_min = 1,
    len_char_max = 254,
    regex = MAIL_REGEX
)));

nutype_string!(ContactName(validate(
    len_char_min = 2,
    len_char_max = 100,
    regex = NAME_REGEX
)));

nutype_string!(ContactSubject(validate(len_char_min = 3, len_char_max = 200)));

nutype_string!(ContactMessageContent(validate(
    len_char_min = 10,
    len_char_max = 5000
)));

nutype_string!(ContactCompany(validate(len_char_max = 100, regex = COMPANY_REGEX)));

nutype_string!(ContactPhone(validate(regex = PHONE_REGEX)));

impl ContactMail {
    pub const MIN_CHARS: usize = 1;
    pub const MAX_CHARS: usize = 254;
}

impl ContactName {
    pub const MIN_CHARS: usize = 2;
    pub const MAX_CHARS: usize = 100;
}

impl ContactSubject {
    pub const MIN_CHARS: usize = 3;
    pub const MAX_CHARS: usize = 200;
}

impl ContactMessageContent {
    pub const MIN_CHARS: usize = 10;
    pub const MAX_CHARS: usize = 5000;
}

impl ContactCompany {
    pub const MAX_CHARS: usize = 100;
}

/// At least two characters before the `@`, a dot in the domain part and a
/// top level domain of at least two characters.
pub static MAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]{2,}@[^\s@]+\.[^\s@]{2,}$").unwrap());

pub static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZäöüÄÖÜß\s\-']+$").unwrap());

pub static COMPANY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZäöüÄÖÜß0-9\s\-&.,()]+$").unwrap());

pub static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+]?[0-9\s\-().]{7,20}$").unwrap());

/// The JSON payload sent to the contact API.
///
/// Produced by [`ContactRequest::sanitize`]. Sanitizing may shorten a value
/// below the minimum length of its field, which is why this is not a
/// [`ContactRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizedContactRequest {
    pub mail: String,
    pub name: String,
    pub subject: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ContactRequest {
    /// Strips markup delimiters and surrounding whitespace from every field.
    pub fn sanitize(&self) -> SanitizedContactRequest {
        SanitizedContactRequest {
            mail: sanitize_str(&self.mail),
            name: sanitize_str(&self.name),
            subject: sanitize_str(&self.subject),
            message: sanitize_str(&self.message),
            company: sanitize_optional(self.company.as_deref().map(String::as_str)),
            phone: sanitize_optional(self.phone.as_deref().map(String::as_str)),
        }
    }
}

impl SanitizedContactRequest {
    /// Applies the sanitizer again. A no-op for values produced by
    /// [`ContactRequest::sanitize`].
    pub fn sanitize(self) -> Self {
        Self {
            mail: sanitize_str(&self.mail),
            name: sanitize_str(&self.name),
            subject: sanitize_str(&self.subject),
            message: sanitize_str(&self.message),
            company: sanitize_optional(self.company.as_deref()),
            phone: sanitize_optional(self.phone.as_deref()),
        }
    }

    pub fn has_company(&self) -> bool {
        self.company.is_some()
    }

    pub fn has_phone(&self) -> bool {
        self.phone.is_some()
    }
}

/// Removes `<` and `>` and trims surrounding whitespace.
///
/// The characters are removed before trimming so that whitespace exposed by
/// the removal is trimmed as well, which keeps the function idempotent.
pub fn sanitize_str(value: &str) -> String {
    value.replace(['<', '>'], "").trim().to_owned()
}

fn sanitize_optional(value: Option<&str>) -> Option<String> {
    value.map(sanitize_str).filter(|x| !x.is_empty())
}
