//! Application state and factory
//!
//! This module holds the state shared by all handlers and builds the
//! Actix-web application around it.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    guard,
    middleware::Logger,
    web, App, Resource, Route,
};

use ag_core::repositories::{SessionRepository, UserRepository};
use ag_core::services::auth::AuthService;

use crate::cookies::CookieSettings;
use crate::handlers::error::{json_error_handler, method_not_allowed, not_found};
use crate::middleware::{auth::JwtAuth, security::SecurityMiddleware};
use crate::routes::{admin, alive, auth};

/// Application state that holds shared services
pub struct AppState<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub auth_service: Arc<AuthService<U, S>>,
    pub cookies: CookieSettings,
}

impl<U, S> AppState<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(auth_service: Arc<AuthService<U, S>>, cookies: CookieSettings) -> Self {
        Self {
            auth_service,
            cookies,
        }
    }
}

/// Largest accepted JSON body when the caller does not choose one
pub const DEFAULT_JSON_LIMIT: usize = 16 * 1024;

/// Create and configure the application with all dependencies
pub fn create_app<U, S>(
    app_state: web::Data<AppState<U, S>>,
    json_limit: usize,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    let codec = web::Data::from(app_state.auth_service.token_codec());
    let strict_transport = app_state.cookies.is_secure();
    let json_config = web::JsonConfig::default()
        .limit(json_limit)
        .error_handler(json_error_handler);

    App::new()
        .app_data(app_state)
        .app_data(codec)
        .app_data(json_config)
        // Registration order is inside-out: the logger sees every response,
        // including the guard's 405s
        .wrap(SecurityMiddleware::new(strict_transport))
        .wrap(Logger::default())
        .service(resource("/login").route(web::post().to(auth::login::login::<U, S>)))
        .service(
            resource("/logout/other-sessions")
                .route(web::delete().to(auth::logout::logout_other_sessions::<U, S>)),
        )
        .service(resource("/logout").route(web::delete().to(auth::logout::logout::<U, S>)))
        .service(resource("/token").route(web::get().to(auth::refresh::refresh::<U, S>)))
        .service(
            resource("/password")
                .route(web::put().to(auth::password::change_password::<U, S>)),
        )
        .service(
            web::scope("/admin")
                .service(
                    resource("/user").route(
                        web::post()
                            .to(admin::create_user::<U, S>)
                            .wrap(JwtAuth::new()),
                    ),
                )
                .service(
                    resource("/user/{username}/password").route(
                        web::put()
                            .to(admin::reset_password::<U, S>)
                            .wrap(JwtAuth::new()),
                    ),
                )
                .service(
                    resource("/user/{username}").route(
                        web::delete()
                            .to(admin::delete_user::<U, S>)
                            .wrap(JwtAuth::new()),
                    ),
                ),
        )
        .service(
            web::scope("/alive")
                .service(resource("").route(get_or_head().to(alive::alive)))
                .service(resource("/ready").route(get_or_head().to(alive::ready::<U, S>))),
        )
        .default_service(web::route().to(not_found))
}

/// Resource that answers 405 for any method without a route
fn resource(path: &str) -> Resource {
    web::resource(path).default_service(web::to(method_not_allowed))
}

fn get_or_head() -> Route {
    web::route().guard(guard::Any(guard::Get()).or(guard::Head()))
}
