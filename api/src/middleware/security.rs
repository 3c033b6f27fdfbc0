//! Security middleware applied to every request.
//!
//! - Rejects methods other than GET, POST, PUT, DELETE and HEAD with 405,
//!   whatever the path
//! - Adds response headers that keep browsers from sniffing, framing or
//!   caching responses that may carry credentials

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::{
        header::{self, HeaderValue},
        Method,
    },
    Error, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};

use ag_shared::errors::{error_codes, ErrorResponse};

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::HEAD,
];

/// Security middleware factory
pub struct SecurityMiddleware {
    /// Whether to add HSTS; only meaningful behind HTTPS
    strict_transport: bool,
}

impl SecurityMiddleware {
    pub fn new(strict_transport: bool) -> Self {
        Self { strict_transport }
    }
}

impl Default for SecurityMiddleware {
    fn default() -> Self {
        Self::new(false)
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SecurityMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SecurityMiddlewareService {
            service: Rc::new(service),
            strict_transport: self.strict_transport,
        }))
    }
}

/// Security middleware service implementation
pub struct SecurityMiddlewareService<S> {
    service: Rc<S>,
    strict_transport: bool,
}

impl<S, B> Service<ServiceRequest> for SecurityMiddlewareService<S>
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
        let strict_transport = self.strict_transport;

        Box::pin(async move {
            let mut response = if is_allowed_method(req.method()) {
                service.call(req).await?.map_into_left_body()
            } else {
                log::debug!("Method {} rejected for {}", req.method(), req.path());
                req.into_response(method_not_allowed_response())
                    .map_into_right_body()
            };

            add_security_response_headers(&mut response, strict_transport);

            Ok(response)
        })
    }
}

fn is_allowed_method(method: &Method) -> bool {
    ALLOWED_METHODS.contains(method)
}

/// 405 body shared by the guard and by resources without a matching route
pub fn method_not_allowed_response() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(ErrorResponse::new(
        error_codes::METHOD_NOT_ALLOWED,
        "Method Not Allowed",
    ))
}

fn add_security_response_headers<B>(response: &mut ServiceResponse<B>, strict_transport: bool) {
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none';"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );
    // Responses may set token cookies
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    if strict_transport {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }
}
