//! Administrator route handlers
//!
//! All three endpoints sit behind `JwtAuth`. The admin check itself is made
//! by the service from the access token claims.

use actix_web::{web, HttpResponse};
use validator::Validate;

use ag_core::repositories::{SessionRepository, UserRepository};

use crate::app::AppState;
use crate::dto::auth::{CreateUserRequest, MessageResponse, ResetPasswordRequest, UserResponse};
use crate::handlers::error::{handle_domain_error, handle_validation_errors};
use crate::middleware::auth::AuthContext;

/// Handler for POST /admin/user
///
/// # Request Body
///
/// ```json
/// {
///     "username": "newuser1",
///     "password": "Password12!",
///     "membersince": "2021-03-10T00:50:43.000Z",
///     "admin": false
/// }
/// ```
/// `membersince` defaults to now and `admin` to false.
///
/// ## Errors
/// - 400 Bad Request: Malformed body, or username/password rejected by the policy
/// - 401 Unauthorized: Missing or invalid access token
/// - 403 Forbidden: Caller is not an administrator
/// - 409 Conflict: Username taken
pub async fn create_user<U, S>(
    state: web::Data<AppState<U, S>>,
    auth: AuthContext,
    request: web::Json<CreateUserRequest>,
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
        .create_user(&auth.claims(), request.into_inner().into())
        .await
    {
        Ok(user) => HttpResponse::Created().json(UserResponse::from(user)),
        Err(error) => handle_domain_error(&error),
    }
}

/// Handler for DELETE /admin/user/{username}
///
/// Removes the account and every session it holds.
pub async fn delete_user<U, S>(
    state: web::Data<AppState<U, S>>,
    auth: AuthContext,
    path: web::Path<String>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    let username = path.into_inner();

    match state.auth_service.delete_user(&auth.claims(), &username).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new("User deleted")),
        Err(error) => handle_domain_error(&error),
    }
}

/// Handler for PUT /admin/user/{username}/password
///
/// Sets a new password and ends every session of the account.
pub async fn reset_password<U, S>(
    state: web::Data<AppState<U, S>>,
    auth: AuthContext,
    path: web::Path<String>,
    request: web::Json<ResetPasswordRequest>,
) -> HttpResponse
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    if let Err(errors) = request.validate() {
        return handle_validation_errors(&errors);
    }

    let username = path.into_inner();

    match state
        .auth_service
        .reset_password(&auth.claims(), &username, &request.new_password)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new("Password reset")),
        Err(error) => handle_domain_error(&error),
    }
}
