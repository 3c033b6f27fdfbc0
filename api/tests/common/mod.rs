//! Shared fixtures for the HTTP tests
//!
//! Every test gets its own in-memory store seeded with `user2` and `admin`,
//! and a fixed clock it can move forward.

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{
    cookie::Cookie,
    dev::ServiceResponse,
    test::TestRequest,
    web,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use ag_api::{cookies::CookieSettings, AppState};
use ag_core::domain::entities::token::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use ag_core::domain::entities::user::User;
use ag_core::repositories::InMemoryStore;
use ag_core::services::auth::{AuthService, AuthServiceConfig, PasswordHasher, Pbkdf2Hasher};
use ag_core::services::clock::FixedClock;
use ag_core::services::token::{TokenCodec, TokenCodecConfig};
use ag_shared::config::PasswordHashConfig;

pub const USER: &str = "user2";
pub const USER_PASSWORD: &str = "Password12!";
pub const ADMIN: &str = "admin";
pub const ADMIN_PASSWORD: &str = "Rootpw12!!";

pub type TestState = AppState<InMemoryStore, InMemoryStore>;

pub struct TestContext {
    pub state: web::Data<TestState>,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<FixedClock>,
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 3, 10, 0, 50, 43).unwrap()
}

pub async fn context() -> TestContext {
    let hasher = Arc::new(Pbkdf2Hasher::new(&PasswordHashConfig {
        pepper: "api-test-pepper".to_string(),
        iterations: 10,
    }));

    let seeded = |username: &str, password: &str, is_admin: bool| {
        let mut user = User::new(username, String::new(), start_time(), is_admin);
        user.password_hash = hasher.hash(&user.username, &user.member_since_iso(), password);
        user
    };
    let store = Arc::new(
        InMemoryStore::with_users([
            seeded(USER, USER_PASSWORD, false),
            seeded(ADMIN, ADMIN_PASSWORD, true),
        ])
        .await,
    );

    let clock = Arc::new(FixedClock::new(start_time()));
    let codec = Arc::new(TokenCodec::new(
        TokenCodecConfig {
            access_secret: "api-test-access".to_string(),
            refresh_secret: "api-test-refresh".to_string(),
            access_token_expiry_seconds: 15 * 60,
            refresh_token_expiry_seconds: 7 * 24 * 60 * 60,
        },
        clock.clone(),
    ));

    let auth_service = Arc::new(AuthService::new(
        store.clone(),
        store.clone(),
        codec,
        hasher,
        clock.clone(),
        AuthServiceConfig::default(),
    ));

    TestContext {
        state: web::Data::new(AppState::new(auth_service, CookieSettings::default())),
        store,
        clock,
    }
}

pub fn login_request(username: &str, password: &str) -> TestRequest {
    TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": username, "password": password }))
}

/// Cookie `name` as set by the response
pub fn response_cookie<B>(resp: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.into_owned())
}

/// Names of the cookies set by the response, in order
pub fn cookie_names<B>(resp: &ServiceResponse<B>) -> Vec<String> {
    resp.response()
        .cookies()
        .map(|cookie| cookie.name().to_string())
        .collect()
}

/// Access and refresh token values taken from a login response
pub fn tokens<B>(resp: &ServiceResponse<B>) -> (String, String) {
    let access = response_cookie(resp, ACCESS_TOKEN_COOKIE)
        .expect("access cookie set")
        .value()
        .to_string();
    let refresh = response_cookie(resp, REFRESH_TOKEN_COOKIE)
        .expect("refresh cookie set")
        .value()
        .to_string();
    (access, refresh)
}

pub fn access_cookie(token: &str) -> Cookie<'static> {
    Cookie::new(ACCESS_TOKEN_COOKIE, token.to_string())
}

pub fn refresh_cookie(token: &str) -> Cookie<'static> {
    Cookie::new(REFRESH_TOKEN_COOKIE, token.to_string())
}
