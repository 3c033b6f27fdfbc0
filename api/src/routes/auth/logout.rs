use actix_web::{web, HttpResponse};

use ag_core::repositories::{SessionRepository, UserRepository};

use crate::app::AppState;
use crate::dto::auth::MessageResponse;
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::RefreshCookie;

use super::clear_token_cookies;

/// Handler for DELETE /logout
///
/// Ends the session of the presented refresh token and clears both cookies.
///
/// ## Errors
/// - 401 Unauthorized: Missing, invalid or already ended session
pub async fn logout<U, S>(
    state: web::Data<AppState<U, S>>,
    refresh: RefreshCookie,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    if let Err(error) = state.auth_service.verify_refresh(&refresh.0).await {
        return handle_domain_error(&error);
    }

    match state.auth_service.logout(&refresh.0).await {
        Ok(()) => {
            let mut response = HttpResponse::Ok();
            clear_token_cookies(&mut response, &state.cookies);
            response.json(MessageResponse::new("Logged out"))
        }
        Err(error) => handle_domain_error(&error),
    }
}

/// Handler for DELETE /logout/other-sessions
///
/// Ends every other session of the caller. The presented session and its
/// cookies stay as they are.
pub async fn logout_other_sessions<U, S>(
    state: web::Data<AppState<U, S>>,
    refresh: RefreshCookie,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    let verification = match state.auth_service.verify_refresh(&refresh.0).await {
        Ok(verification) => verification,
        Err(error) => return handle_domain_error(&error),
    };

    match state
        .auth_service
        .logout_others(&refresh.0, &verification.claims.username)
        .await
    {
        Ok(revoked) => {
            log::debug!("Ended {} other sessions", revoked);
            HttpResponse::Ok().json(MessageResponse::new("Logged out from other sessions"))
        }
        Err(error) => handle_domain_error(&error),
    }
}
