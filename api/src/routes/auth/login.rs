use actix_web::{web, HttpResponse};
use validator::Validate;

use ag_core::domain::entities::token::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use ag_core::repositories::{SessionRepository, UserRepository};

use crate::app::AppState;
use crate::dto::auth::{LoginRequest, TokenResponse};
use crate::handlers::error::{handle_domain_error, handle_validation_errors};

/// Handler for POST /login
///
/// Checks the credentials and opens a new session. Sessions opened earlier
/// stay valid.
///
/// # Request Body
///
/// ```json
/// {
///     "username": "user2",
///     "password": "Password12!"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// Sets `X-ACCESS-TOKEN` and `X-REFRESH-TOKEN` cookies.
/// ```json
/// {
///     "message": "Logged in",
///     "access_expires_in": 900,
///     "refresh_expires_in": 604800
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Malformed body
/// - 401 Unauthorized: Unknown user or wrong password
pub async fn login<U, S>(
    state: web::Data<AppState<U, S>>,
    request: web::Json<LoginRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_validation_errors(&errors);
    }

    match state
        .auth_service
        .login(&request.username, &request.password)
        .await
    {
        Ok(pair) => HttpResponse::Ok()
            .cookie(state.cookies.token_cookie(
                ACCESS_TOKEN_COOKIE,
                pair.access_token,
                pair.access_expires_in,
            ))
            .cookie(state.cookies.token_cookie(
                REFRESH_TOKEN_COOKIE,
                pair.refresh_token,
                pair.refresh_expires_in,
            ))
            .json(TokenResponse {
                message: "Logged in".to_string(),
                access_expires_in: pair.access_expires_in,
                refresh_expires_in: Some(pair.refresh_expires_in),
            }),
        Err(error) => handle_domain_error(&error),
    }
}
