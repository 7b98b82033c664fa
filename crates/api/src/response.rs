//! Response envelope and error rendering.
//!
//! Every response has the shape `{ok, message, data|item|items, error?}`.
//! `message` is the localized text for a message key; `error` carries the raw
//! debug string and is only present outside production.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use daftar_db::RepoError;
use daftar_shared::{AppError, JwtError};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{context::RequestContext, i18n::t};

/// Result type for handlers.
pub type ApiResult<T> = Result<Reply<T>, ApiError>;

/// Envelope field holding the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Aggregates and paginated results.
    Data,
    /// A single record.
    Item,
    /// A list of records.
    Items,
}

impl Slot {
    const fn field(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Item => "item",
            Self::Items => "items",
        }
    }
}

/// Successful response.
#[derive(Debug)]
pub struct Reply<T> {
    status: StatusCode,
    key: &'static str,
    slot: Slot,
    value: Option<T>,
}

impl<T> Reply<T> {
    /// 200 with a single record.
    pub const fn item(key: &'static str, value: T) -> Self {
        Self::new(StatusCode::OK, key, Slot::Item, Some(value))
    }

    /// 201 with the created record.
    pub const fn created(value: T) -> Self {
        Self::created_with("created", value)
    }

    /// 201 with a custom message key.
    pub const fn created_with(key: &'static str, value: T) -> Self {
        Self::new(StatusCode::CREATED, key, Slot::Item, Some(value))
    }

    /// 200 with a list of records.
    pub const fn items(key: &'static str, value: T) -> Self {
        Self::new(StatusCode::OK, key, Slot::Items, Some(value))
    }

    /// 200 with an aggregate payload.
    pub const fn data(key: &'static str, value: T) -> Self {
        Self::new(StatusCode::OK, key, Slot::Data, Some(value))
    }

    const fn new(status: StatusCode, key: &'static str, slot: Slot, value: Option<T>) -> Self {
        Self {
            status,
            key,
            slot,
            value,
        }
    }
}

impl Reply<()> {
    /// 200 with only a message.
    pub const fn message(key: &'static str) -> Self {
        Self::new(StatusCode::OK, key, Slot::Data, None)
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        let ctx = RequestContext::current();
        let mut body = Map::new();
        body.insert("ok".into(), Value::Bool(true));
        body.insert("message".into(), Value::String(t(self.key, ctx.lang).to_string()));

        if let Some(value) = self.value {
            match serde_json::to_value(value) {
                Ok(value) => {
                    body.insert(self.slot.field().into(), value);
                }
                Err(e) => {
                    return ApiError::internal(format!("failed to serialize response: {e}"))
                        .into_response();
                }
            }
        }

        (self.status, Json(Value::Object(body))).into_response()
    }
}

/// Error response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    key: &'static str,
    debug: String,
}

impl ApiError {
    /// Creates an error with an explicit status and message key.
    pub fn new(status: StatusCode, key: &'static str, debug: impl Into<String>) -> Self {
        Self {
            status,
            key,
            debug: debug.into(),
        }
    }

    /// 400 for a body, query or path that failed to parse.
    pub fn invalid_payload(debug: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalidPayload", debug)
    }

    /// 401 from the authentication guard.
    pub fn unauthorized(debug: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", debug)
    }

    /// 500 for unexpected failures.
    pub fn internal(debug: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internalError", debug)
    }

    /// HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Message key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.message_key(), err.to_string())
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        AppError::from(err).into()
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        if matches!(err, JwtError::Expired) {
            Self::new(StatusCode::UNAUTHORIZED, "tokenExpired", err.to_string())
        } else {
            Self::unauthorized(err.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_payload(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid_payload(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::invalid_payload(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, key = self.key, error = %self.debug, "Request failed");
        } else {
            tracing::debug!(status = %self.status, key = self.key, error = %self.debug, "Request rejected");
        }

        let ctx = RequestContext::current();
        let mut body = Map::new();
        body.insert("ok".into(), Value::Bool(false));
        body.insert("message".into(), Value::String(t(self.key, ctx.lang).to_string()));
        if ctx.expose_errors {
            body.insert("error".into(), Value::String(self.debug));
        }

        (self.status, Json(Value::Object(body))).into_response()
    }
}

/// JSON body extractor rejecting with the envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Body<T>(pub T);

/// Query string extractor rejecting with the envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Params<T>(pub T);

/// Path extractor rejecting with the envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Id<T>(pub T);
