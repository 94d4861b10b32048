//! API error type
//!
//! Handlers return [`ApiError`]; it renders as
//! `{statusCode, statusMessage, data?}`. Anything that is not already a
//! client error becomes a 500 with no detail, and the cause is logged.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bulletproof_auth::{PasswordError, SessionError};
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Field name → messages
pub type FieldIssues = BTreeMap<String, Vec<String>>;

/// Key for issues that belong to the whole body rather than one field
pub const SCHEMA_FIELD: &str = "_schema";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String, issues: FieldIssues },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Validation failure on a single field
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut issues = FieldIssues::new();
        issues.insert(field.to_string(), vec![message.into()]);
        Self::Validation {
            message: "Validation Error".to_string(),
            issues,
        }
    }

    /// The request body could not be read as the expected JSON
    pub fn invalid_body(detail: impl Into<String>) -> Self {
        Self::field(SCHEMA_FIELD, detail)
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized("Unauthorized".to_string())
    }

    pub fn forbidden() -> Self {
        Self::Forbidden("Forbidden".to_string())
    }

    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }

    pub fn from_validation(errors: &validator::ValidationErrors) -> Self {
        let mut issues = FieldIssues::new();
        collect_issues(&mut issues, "", errors);
        Self::Validation {
            message: "Validation Error".to_string(),
            issues,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn to_body(&self) -> ErrorResponse {
        let status = self.status();
        match self {
            ApiError::Validation { message, issues } => ErrorResponse {
                status_code: status.as_u16(),
                status_message: message.clone(),
                data: serde_json::to_value(issues).ok(),
            },
            ApiError::Internal(_) => ErrorResponse {
                status_code: status.as_u16(),
                status_message: "Internal Server Error".to_string(),
                data: None,
            },
            other => ErrorResponse {
                status_code: status.as_u16(),
                status_message: other.to_string(),
                data: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref cause) = self {
            error!("Internal error: {:#}", cause);
        }
        (self.status(), Json(self.to_body())).into_response()
    }
}

impl From<DbErr> for ApiError {
    fn from(e: DbErr) -> Self {
        Self::Internal(anyhow::Error::new(e).context("Database error"))
    }
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        Self::Internal(anyhow::Error::new(e))
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        Self::Internal(anyhow::Error::new(e))
    }
}

fn collect_issues(out: &mut FieldIssues, prefix: &str, errors: &validator::ValidationErrors) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let key = if &**field == "__all__" {
            SCHEMA_FIELD.to_string()
        } else {
            join_path(prefix, &camel_case(field))
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for e in field_errors {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| default_message(&e.code).to_string());
                    out.entry(key.clone()).or_default().push(message);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_issues(out, &key, nested),
            ValidationErrorsKind::List(items) => {
                for (idx, nested) in items {
                    collect_issues(out, &format!("{key}[{idx}]"), nested);
                }
            }
        }
    }
}

fn default_message(code: &str) -> &str {
    match code {
        "required" => "Required",
        "email" => "Invalid email",
        "length" => "Invalid length",
        "range" => "Out of range",
        "url" => "Invalid URL",
        other => other,
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

/// Request bodies are camelCase on the wire; validator reports Rust names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
