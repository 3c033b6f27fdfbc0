use actix_web::{web, HttpResponse};
use validator::Validate;

use ag_core::repositories::{SessionRepository, UserRepository};

use crate::app::AppState;
use crate::dto::auth::{ChangePasswordRequest, MessageResponse};
use crate::handlers::error::{handle_domain_error, handle_validation_errors};
use crate::middleware::auth::RefreshCookie;

use super::clear_token_cookies;

/// Handler for PUT /password
///
/// Changes the caller's own password. All of the caller's sessions end,
/// including this one, so both cookies are cleared.
///
/// # Request Body
///
/// ```json
/// {
///     "currentPassword": "Password12!",
///     "newPassword": "newPW129!!"
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Malformed body or new password rejected by the policy
/// - 401 Unauthorized: No live session, or wrong current password
pub async fn change_password<U, S>(
    state: web::Data<AppState<U, S>>,
    refresh: RefreshCookie,
    request: web::Json<ChangePasswordRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_validation_errors(&errors);
    }

    let verification = match state.auth_service.verify_refresh(&refresh.0).await {
        Ok(verification) => verification,
        Err(error) => return handle_domain_error(&error),
    };

    match state
        .auth_service
        .change_password(
            &verification.claims.username,
            &request.current_password,
            &request.new_password,
        )
        .await
    {
        Ok(()) => {
            let mut response = HttpResponse::Ok();
            clear_token_cookies(&mut response, &state.cookies);
            response.json(MessageResponse::new("Password changed"))
        }
        Err(error) => handle_domain_error(&error),
    }
}
