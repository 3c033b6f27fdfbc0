use actix_web::{web, HttpResponse};

use ag_core::domain::entities::token::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use ag_core::repositories::{SessionRepository, UserRepository};

use crate::app::AppState;
use crate::dto::auth::TokenResponse;
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::RefreshCookie;

/// Handler for GET /token
///
/// Issues a new access token for a live session. When the session is close
/// to its end the refresh token is rotated too, and the replacement is set
/// as the refresh cookie.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "message": "Token refreshed",
///     "access_expires_in": 900,
///     "refresh_expires_in": 604800
/// }
/// ```
/// `refresh_expires_in` is present only when the refresh token was rotated.
///
/// ## Errors
/// - 401 Unauthorized: Missing or invalid refresh token, or no live session
pub async fn refresh<U, S>(
    state: web::Data<AppState<U, S>>,
    refresh: RefreshCookie,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    let outcome = match state.auth_service.refresh(&refresh.0).await {
        Ok(outcome) => outcome,
        Err(error) => return handle_domain_error(&error),
    };

    let mut response = HttpResponse::Ok();
    response.cookie(state.cookies.token_cookie(
        ACCESS_TOKEN_COOKIE,
        outcome.access_token,
        outcome.access_expires_in,
    ));

    let refresh_expires_in = match outcome.refresh_token {
        Some(rotated) => {
            response.cookie(state.cookies.token_cookie(
                REFRESH_TOKEN_COOKIE,
                rotated,
                outcome.refresh_expires_in,
            ));
            Some(outcome.refresh_expires_in)
        }
        None => None,
    };

    response.json(TokenResponse {
        message: "Token refreshed".to_string(),
        access_expires_in: outcome.access_expires_in,
        refresh_expires_in,
    })
}
