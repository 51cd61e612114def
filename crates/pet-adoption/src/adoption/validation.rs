use serde::{Deserialize, Serialize};

use super::domain::{ApplicationStatus, NewApplication, NewPet, NewShelter};

/// Raw shelter attributes as submitted by a form or an import row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShelterSubmission {
    pub name: Option<String>,
    pub city: Option<String>,
    pub rank: Option<NumericInput>,
    pub foster_program: Option<bool>,
}

/// Raw pet attributes for a pet listed under an existing shelter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PetSubmission {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub age: Option<NumericInput>,
    pub adoptable: Option<bool>,
}

/// Permitted application fields. Anything else in the payload is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub name: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub description: Option<String>,
}

/// Numeric form input, which arrives either as a JSON number or as text.
///
/// Any other JSON value (decimals, booleans, arrays) lands in `Other` and
/// validates as not a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Integer(i64),
    Text(String),
    Other(serde_json::Value),
}

impl From<i64> for NumericInput {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    Blank,
    NotANumber,
    Negative,
}

/// A single failed rule on a single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn message(&self) -> String {
        let attribute = humanize(self.field);
        match self.kind {
            FieldErrorKind::Blank => format!("{attribute} can't be blank"),
            FieldErrorKind::NotANumber => format!("{attribute} is not a number"),
            FieldErrorKind::Negative => {
                format!("{attribute} must be greater than or equal to 0")
            }
        }
    }
}

/// Every rule violated by a submission, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default, thiserror::Error)]
#[error("validation failed: {}", join_messages(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(FieldError::message).collect()
    }

    pub fn contains(&self, field: &str, kind: FieldErrorKind) -> bool {
        self.errors
            .iter()
            .any(|error| error.field == field && error.kind == kind)
    }

    fn push(&mut self, field: &'static str, kind: FieldErrorKind) {
        self.errors.push(FieldError { field, kind });
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::message)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn validate_shelter(submission: ShelterSubmission) -> Result<NewShelter, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = required(&mut errors, "name", submission.name);
    let city = required(&mut errors, "city", submission.city);
    let rank = match parse_number(submission.rank.as_ref()) {
        Ok(rank) => i32::try_from(rank).ok().or_else(|| {
            errors.push("rank", FieldErrorKind::NotANumber);
            None
        }),
        Err(kind) => {
            errors.push("rank", kind);
            None
        }
    };

    errors.into_result(|| NewShelter {
        name: name.unwrap_or_default(),
        city: city.unwrap_or_default(),
        rank: rank.unwrap_or_default(),
        foster_program: submission.foster_program.unwrap_or(false),
    })
}

pub fn validate_pet(submission: PetSubmission) -> Result<NewPet, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = required(&mut errors, "name", submission.name);
    let age = match parse_number(submission.age.as_ref()) {
        Ok(age) if age < 0 => {
            errors.push("age", FieldErrorKind::Negative);
            None
        }
        Ok(age) => u32::try_from(age).ok().or_else(|| {
            errors.push("age", FieldErrorKind::NotANumber);
            None
        }),
        Err(kind) => {
            errors.push("age", kind);
            None
        }
    };
    let breed = submission
        .breed
        .map(|breed| breed.trim().to_string())
        .filter(|breed| !breed.is_empty());

    errors.into_result(|| NewPet {
        name: name.unwrap_or_default(),
        breed,
        age: age.unwrap_or_default(),
        adoptable: submission.adoptable.unwrap_or(true),
    })
}

/// New applications always start out in progress, whatever the caller sent.
pub fn validate_application(
    submission: ApplicationSubmission,
) -> Result<NewApplication, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = required(&mut errors, "name", submission.name);
    let street_address = required(&mut errors, "street_address", submission.street_address);
    let city = required(&mut errors, "city", submission.city);
    let state = required(&mut errors, "state", submission.state);
    let zip_code = required(&mut errors, "zip_code", submission.zip_code);
    let description = required(&mut errors, "description", submission.description);

    errors.into_result(|| NewApplication {
        name: name.unwrap_or_default(),
        street_address: street_address.unwrap_or_default(),
        city: city.unwrap_or_default(),
        state: state.unwrap_or_default(),
        zip_code: zip_code.unwrap_or_default(),
        description: description.unwrap_or_default(),
        status: ApplicationStatus::InProgress,
    })
}

fn required(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<String>,
) -> Option<String> {
    let trimmed = value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    if trimmed.is_none() {
        errors.push(field, FieldErrorKind::Blank);
    }
    trimmed
}

fn parse_number(value: Option<&NumericInput>) -> Result<i64, FieldErrorKind> {
    match value {
        None => Err(FieldErrorKind::Blank),
        Some(NumericInput::Integer(number)) => Ok(*number),
        Some(NumericInput::Other(_)) => Err(FieldErrorKind::NotANumber),
        Some(NumericInput::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(FieldErrorKind::Blank);
            }
            trimmed
                .parse::<i64>()
                .map_err(|_| FieldErrorKind::NotANumber)
        }
    }
}

fn humanize(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
