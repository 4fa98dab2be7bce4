use actix_web::error::{InternalError, JsonPayloadError, PathError};
use actix_web::{HttpRequest, HttpResponse};
use log::error;
use serde::Serialize;

use crate::store::StoreError;

/// Body of every failed request. The HTTP status carries the failure kind.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub message: String,
    pub id: i32,
}

pub fn created(message: &str, id: i32) -> HttpResponse {
    HttpResponse::Created().json(CreatedResponse {
        success: true,
        message: message.to_string(),
        id,
    })
}

pub fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::new(message))
}

pub fn not_found(message: impl Into<String>) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(message))
}

pub fn unauthorized(message: impl Into<String>) -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse::new(message))
}

/// Logs the underlying error and answers with a generic 500.
pub fn server_error(context: &str, err: &dyn std::fmt::Display, message: &str) -> HttpResponse {
    error!("{}: {}", context, err);
    HttpResponse::InternalServerError().json(ErrorResponse::new(message))
}

/// Maps a failed write to a response. `not_found_message` is used when the
/// row (or the student it references) is missing.
pub fn store_error(
    err: StoreError,
    context: &str,
    not_found_message: &str,
    failure_message: &str,
) -> HttpResponse {
    match err {
        StoreError::NotFound => not_found(not_found_message),
        StoreError::Conflict(constraint) => HttpResponse::Conflict().json(ErrorResponse::new(
            format!("A record with the same unique value already exists ({})", constraint),
        )),
        StoreError::Database(e) => server_error(context, &e, failure_message),
    }
}

/// Rejects blank required text fields with a 400 naming the first one.
pub fn require_fields(fields: &[(&'static str, &str)]) -> Result<(), HttpResponse> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(bad_request(format!("Missing required field: {}", name))),
        None => Ok(()),
    }
}

/// Oversized bodies stay 413 and non-JSON content types stay 415; anything
/// else wrong with the body is a 400.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid request body: {}", err);
    let response = match &err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            HttpResponse::PayloadTooLarge().json(ErrorResponse::new(message))
        }
        JsonPayloadError::ContentType => {
            HttpResponse::UnsupportedMediaType().json(ErrorResponse::new(message))
        }
        _ => bad_request(message),
    };
    InternalError::from_response(err, response).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    let response = bad_request(format!("Invalid path parameter: {}", err));
    InternalError::from_response(err, response).into()
}
