use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub const HERO_NOT_FOUND: &str = "Hero not found";

pub type StoreResult<T> = Result<T, StoreError>;
pub type ServiceResult<T> = Result<T, ServiceError>;
pub type AppResult<T> = Result<T, AppError>;

/// Failures raised by a [`HeroRepository`](crate::repository::HeroRepository).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// The row was removed between the caller's read and this write.
    #[error("hero {0} no longer exists")]
    Missing(i64),
}

/// Domain-level failures of the hero service. Carries no transport knowledge.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("hero {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Missing(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

/// One entry of a 422 response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(loc: &[&str], msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc: loc.iter().map(|part| (*part).to_string()).collect(),
            msg: msg.into(),
            kind: kind.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize)]
struct ErrorBody<T> {
    detail: T,
}

impl AppError {
    pub fn validation(error: FieldError) -> Self {
        Self::Validation(vec![error])
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(_) => Self::not_found(HERO_NOT_FOUND),
            ServiceError::Store(err) => Self::Store(err),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        let kind = match &rejection {
            JsonRejection::JsonDataError(_) if missing_field(&message).is_some() => "missing",
            JsonRejection::JsonDataError(_) => "value_error",
            JsonRejection::JsonSyntaxError(_) => "json_invalid",
            JsonRejection::MissingJsonContentType(_) => "content_type",
            _ => "body_error",
        };

        let mut loc = vec!["body"];
        if let Some(field) = missing_field(&message) {
            loc.push(field);
        }

        Self::validation(FieldError::new(&loc, message.as_str(), kind))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(FieldError::new(
            &["query"],
            rejection.body_text(),
            "query_invalid",
        ))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(FieldError::new(
            &["path", "hero_id"],
            rejection.body_text(),
            "int_parsing",
        ))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation(errors) => {
                (status, Json(ErrorBody { detail: errors })).into_response()
            }
            Self::NotFound(message) => {
                (status, Json(ErrorBody { detail: message })).into_response()
            }
            Self::Store(err) => {
                error!(error = %err, "storage failure while handling request");
                (
                    status,
                    Json(ErrorBody {
                        detail: "Internal Server Error",
                    }),
                )
                    .into_response()
            }
        }
    }
}

/// Pulls `name` out of serde's "missing field `name`" message.
fn missing_field(message: &str) -> Option<&str> {
    let rest = &message[message.find("missing field `")? + "missing field `".len()..];
    rest.split('`').next().filter(|field| !field.is_empty())
}
