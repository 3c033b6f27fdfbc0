//! Cookie-based JWT authentication for protected endpoints.
//!
//! `JwtAuth` reads the access token cookie, verifies it with the `TokenCodec`
//! registered as app data and injects an `AuthContext` into the request.
//! Handlers that work with the refresh token instead take a `RefreshCookie`
//! extractor; the session store check for that token happens in the service.

use actix_web::{
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    web, Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};

use ag_core::domain::entities::token::{
    TokenClaims, TokenType, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};
use ag_core::services::token::TokenCodec;
use ag_shared::errors::{error_codes, ErrorResponse};

/// Caller identity injected into requests by `JwtAuth`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Username the access token was issued to
    pub username: String,
    /// Administrator flag carried by the token
    pub is_admin: bool,
}

impl AuthContext {
    /// Creates a new authentication context from verified access claims
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }

    /// Access claims to hand back to the service layer
    pub fn claims(&self) -> TokenClaims {
        TokenClaims::access(&self.username, self.is_admin)
    }
}

/// 401 with the standard JSON body
fn unauthorized_response() -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse::new(
        error_codes::UNAUTHORIZED,
        "Unauthorized",
    ))
}

fn reject<B>(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
    req.into_response(unauthorized_response()).map_into_right_body()
}

fn unauthorized_error() -> Error {
    InternalError::from_response("Unauthorized", unauthorized_response()).into()
}

/// JWT authentication middleware factory
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtAuth;

impl JwtAuth {
    /// Creates a new JWT authentication middleware
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let token = match req.cookie(ACCESS_TOKEN_COOKIE) {
                Some(cookie) => cookie.value().to_string(),
                None => {
                    log::debug!("Missing access token cookie for {}", req.path());
                    return Ok(reject(req));
                }
            };

            let codec = match req.app_data::<web::Data<TokenCodec>>() {
                Some(codec) => codec.clone(),
                None => {
                    log::error!("TokenCodec is not registered as app data");
                    return Ok(reject(req));
                }
            };

            let claims = match codec.verify(&token, TokenType::Access) {
                Ok(claims) => claims,
                Err(e) => {
                    log::debug!("Access token rejected: {}", e);
                    return Ok(reject(req));
                }
            };

            req.extensions_mut().insert(AuthContext::from_claims(claims));

            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(unauthorized_error);

        ready(result)
    }
}

/// Raw refresh token taken from its cookie
///
/// Only presence is checked here. Handlers pass the value to the service,
/// which verifies both the signature and the session.
pub struct RefreshCookie(pub String);

impl FromRequest for RefreshCookie {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = req
            .cookie(REFRESH_TOKEN_COOKIE)
            .map(|cookie| RefreshCookie(cookie.value().to_string()))
            .filter(|token| !token.0.is_empty())
            .ok_or_else(unauthorized_error);

        ready(result)
    }
}
