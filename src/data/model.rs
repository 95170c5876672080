use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Respondent {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Response {
    pub id: i64,
    pub respondent_id: Option<i64>,
    pub submitted_at: NaiveDateTime,
    pub answers: Json<Vec<u8>>,
    pub score: i64,
    pub interpretation: String,
    pub flagged_suicidal_thoughts: bool,
}

/// One dashboard row: a response joined with whatever is known about its respondent.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct ResponseWithRespondent {
    pub id: i64,
    pub submitted_at: NaiveDateTime,
    pub score: i64,
    pub interpretation: String,
    pub flagged_suicidal_thoughts: bool,
    pub respondent_id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == value)
    }
}

/// Respondent details that passed intake validation and are ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRespondent {
    pub name: String,
    pub email: String,
    pub age: Option<i64>,
    pub gender: Option<Gender>,
}
