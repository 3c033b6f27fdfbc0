//! Domain error to HTTP response mapping
//!
//! Response bodies name the class of failure only. Internal errors are
//! logged here and reach the client as a generic 500.

use actix_web::{error::InternalError, error::JsonPayloadError, Error, HttpRequest, HttpResponse};
use validator::ValidationErrors;

use crate::middleware::security::method_not_allowed_response;

use ag_core::errors::{AuthError, DomainError};
use ag_shared::errors::{error_codes, ErrorResponse};

/// Convert a domain error into the matching HTTP response
pub fn handle_domain_error(error: &DomainError) -> HttpResponse {
    match error {
        DomainError::Auth(AuthError::Unauthorized) | DomainError::Token(_) => {
            HttpResponse::Unauthorized().json(ErrorResponse::new(
                error_codes::UNAUTHORIZED,
                "Unauthorized",
            ))
        }
        DomainError::Auth(AuthError::Forbidden) => HttpResponse::Forbidden().json(
            ErrorResponse::new(error_codes::FORBIDDEN, "Forbidden"),
        ),
        DomainError::Auth(AuthError::PolicyViolation) | DomainError::Validation { .. } => {
            bad_request()
        }
        DomainError::NotFound { resource } => {
            log::debug!("Not found: {}", resource);
            HttpResponse::NotFound().json(ErrorResponse::new(error_codes::NOT_FOUND, "Not Found"))
        }
        DomainError::Conflict { resource } => {
            log::debug!("Conflict: {}", resource);
            HttpResponse::Conflict().json(ErrorResponse::new(error_codes::CONFLICT, "Conflict"))
        }
        DomainError::Internal { message } => {
            log::error!("Internal error: {}", message);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                error_codes::INTERNAL_ERROR,
                "Server Error",
            ))
        }
    }
}

/// 400 with the generic body
pub fn bad_request() -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::new(error_codes::BAD_REQUEST, "Bad Request"))
}

/// 400 for a body that parsed but failed field validation
pub fn handle_validation_errors(errors: &ValidationErrors) -> HttpResponse {
    let fields: Vec<&str> = errors.field_errors().keys().copied().collect();
    log::debug!("Request validation failed for fields {:?}", fields);
    HttpResponse::BadRequest().json(
        ErrorResponse::new(error_codes::BAD_REQUEST, "Bad Request").add_detail("fields", fields),
    )
}

/// `JsonConfig` error handler: malformed, mistyped or oversized bodies become 400
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> Error {
    log::debug!("Rejected JSON body: {}", error);
    InternalError::from_response(error, bad_request()).into()
}

/// 405 for a known path reached with a method it does not serve
pub async fn method_not_allowed() -> HttpResponse {
    method_not_allowed_response()
}

/// 404 for paths that match no resource
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(error_codes::NOT_FOUND, "Not Found"))
}
