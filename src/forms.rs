//! Intake validation for the public questionnaire and the admin login form.
//!
//! Each form is a plain struct with a pure `validate` that returns either the cleaned value or a
//! map of field name to message, ready to be handed to the template.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidateEmail;

use crate::data::model::{Gender, NewRespondent};

pub type FieldErrors = BTreeMap<&'static str, String>;

const REQUIRED: &str = "This field is required.";

/// HTML5-style address check, plus no leading, trailing or doubled dots in the local part.
fn is_valid_email(email: &str) -> bool {
    let Some((local, _domain)) = email.rsplit_once('@') else {
        return false;
    };
    email.validate_email()
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
}

fn check_length(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.chars().count();
    if len < min || len > max {
        let message = if min == 0 {
            format!("Field cannot be longer than {max} characters.")
        } else {
            format!("Field must be between {min} and {max} characters long.")
        };
        errors.insert(field, message);
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct RespondentForm {
    pub name: String,
    pub email: String,
    pub age: String,
    pub gender: String,
}

impl RespondentForm {
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let field = |key: &str| fields.get(key).cloned().unwrap_or_default();
        Self {
            name: field("name"),
            email: field("email"),
            age: field("age"),
            gender: field("gender"),
        }
    }

    pub fn validate(&self) -> Result<NewRespondent, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.insert("name", REQUIRED.to_string());
        } else {
            check_length(&mut errors, "name", name, 0, 200);
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.insert("email", REQUIRED.to_string());
        } else if !is_valid_email(email) {
            errors.insert("email", "Invalid email address.".to_string());
        } else {
            check_length(&mut errors, "email", email, 0, 200);
        }

        let age = match self.age.trim() {
            "" => None,
            raw => match raw.parse::<i64>() {
                Ok(age) if (0..=120).contains(&age) => Some(age),
                Ok(_) => {
                    errors.insert("age", "Number must be between 0 and 120.".to_string());
                    None
                }
                Err(_) => {
                    errors.insert("age", "Not a valid integer value.".to_string());
                    None
                }
            },
        };

        let gender = match self.gender.trim() {
            "" => None,
            raw => {
                let gender = Gender::parse(raw);
                if gender.is_none() {
                    errors.insert("gender", "Not a valid choice.".to_string());
                }
                gender
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewRespondent {
            name: name.to_string(),
            email: email.to_string(),
            age,
            gender,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AnswerError {
    #[error("Please answer all questions.")]
    Unanswered { question: usize },
    #[error("Invalid answer detected.")]
    OutOfRange { question: usize },
}

/// Reads `q0`..`q{count-1}` in order. The first missing, non-numeric or out-of-range answer
/// rejects the whole questionnaire.
pub fn parse_answers(
    fields: &HashMap<String, String>,
    count: usize,
) -> Result<Vec<u8>, AnswerError> {
    (0..count)
        .map(|question| -> Result<u8, AnswerError> {
            let value = fields
                .get(&format!("q{question}"))
                .and_then(|raw| raw.trim().parse::<i64>().ok())
                .ok_or(AnswerError::Unanswered { question })?;
            match u8::try_from(value) {
                Ok(answer @ 0..=3) => Ok(answer),
                _ => Err(AnswerError::OutOfRange { question }),
            }
        })
        .collect()
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.username.trim().is_empty() {
            errors.insert("username", REQUIRED.to_string());
        } else {
            check_length(&mut errors, "username", &self.username, 3, 100);
        }

        if self.password.trim().is_empty() {
            errors.insert("password", REQUIRED.to_string());
        } else if self.password.chars().count() < 8 {
            errors.insert(
                "password",
                "Password must contain at least 8 characters.".to_string(),
            );
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
