use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::json;
use tracing::error;

use crate::users::{messages, repo::StoreError};

/// Field-level validation failures, kept in the order the fields were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<(&'static str, Vec<&'static str>)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &'static str, message: &'static str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &'static str, message: &'static str) {
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some((_, messages)) => messages.push(message),
            None => self.fields.push((field, vec![message])),
        }
    }

    pub fn extend(&mut self, field: &'static str, messages: Vec<&'static str>) {
        for message in messages {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[&'static str]> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_slice())
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(f, _)| *f)
    }

    /// First message, suffixed with how many more follow.
    pub fn summary(&self) -> String {
        let mut all = self.fields.iter().flat_map(|(_, m)| m.iter());
        let Some(first) = all.next() else {
            return String::new();
        };
        match all.count() {
            0 => (*first).to_string(),
            1 => format!("{first} (y 1 error más)"),
            n => format!("{first} (y {n} errores más)"),
        }
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, messages) in &self.fields {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed: {}", ValidationErrors::summary(.0))]
    Validation(ValidationErrors),

    #[error("user not found")]
    NotFound,

    /// Uniqueness violated at write time; rendered like a validation failure.
    #[error("conflict: {}", ValidationErrors::summary(.0))]
    Conflict(ValidationErrors),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn duplicate_email() -> Self {
        Self::Conflict(ValidationErrors::single("email", messages::EMAIL_UNIQUE))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => Self::duplicate_email(),
            StoreError::Database(e) => Self::Internal(anyhow::Error::new(e).context("user store")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(errors) | Self::Conflict(errors) => json!({
                "message": errors.summary(),
                "errors": errors,
            }),
            Self::NotFound => json!({ "message": messages::USER_NOT_FOUND }),
            Self::Internal(e) => {
                error!(error = ?e, "internal error");
                json!({ "message": messages::INTERNAL_ERROR })
            }
        };
        (status, Json(body)).into_response()
    }
}
