//! Integration tests for login, token refresh, logout and password change

mod common;

use actix_web::{
    cookie::{time::Duration as CookieDuration, SameSite},
    http::{header, Method, StatusCode},
    test,
};
use chrono::Duration;
use serde_json::json;

use ag_api::app::{create_app, DEFAULT_JSON_LIMIT};
use ag_core::domain::entities::token::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};

use common::*;

#[actix_web::test]
async fn test_login_sets_both_cookies() {
    let ctx = context().await;
    let app = test::init_service(create_app(ctx.state.clone(), DEFAULT_JSON_LIMIT)).await;

    let resp = test::call_service(&app, login_request(USER, USER_PASSWORD).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        cookie_names(&resp),
        vec![ACCESS_TOKEN_COOKIE.to_string(), REFRESH_TOKEN_COOKIE.to_string()]
    );

    let access = response_cookie(&resp, ACCESS_TOKEN_COOKIE).unwrap();
    assert_eq!(access.http_only(), Some(true));
    assert_eq!(access.same_site(), Some(SameSite::Strict));
    assert_eq!(access.path(), Some("/"));
    assert_eq!(access.max_age(), Some(CookieDuration::seconds(15 * 60)));

    let refresh = response_cookie(&resp, REFRESH_TOKEN_COOKIE).unwrap();
    assert_eq!(refresh.max_age(), Some(CookieDuration::seconds(7 * 24 * 60 * 60)));
    assert_eq!(
        resp.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["access_expires_in"], 900);
    assert_eq!(ctx.store.sessions_for(USER).await.len(), 1);
}

#[actix_web::test]
async fn test_login_rejects_bad_credentials() {
    let ctx = context().await;
    let app = test::init_service(create_app(ctx.state.clone(), DEFAULT_JSON_LIMIT)).await;

    let resp = test::call_service(&app, login_request(USER, "Password12?").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(cookie_names(&resp).is_empty());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "UNAUTHORIZED");

    let resp = test::call_service(&app, login_request("nouser1", USER_PASSWORD).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(ctx.store.session_count().await, 0);
}

#[actix_web::test]
async fn test_login_rejects_malformed_bodies() {
    let ctx = context().await;
    let app = test::init_service(create_app(ctx.state.clone(), DEFAULT_JSON_LIMIT)).await;

    let bodies = [
        json!({ "username": USER }),
        json!({ "username": USER, "password": USER_PASSWORD, "remember": true }),
        json!({ "username": USER, "password": 12 }),
        json!({ "username": "", "password": USER_PASSWORD }),
    ];
    for body in bodies {
        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {}", body);
    }

    let req = test::TestRequest::post()
        .uri("/login")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post().uri("/login").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_refresh_without_rotation() {
    let ctx = context().await;
    let app = test::init_service(create_app(ctx.state.clone(), DEFAULT_JSON_LIMIT)).await;

    let resp = test::call_service(&app, login_request(USER, USER_PASSWORD).to_request()).await;
    let (_, refresh) = tokens(&resp);

    ctx.clock.advance(Duration::hours(1));
    let req = test::TestRequest::get()
        .uri("/token")
        .cookie(refresh_cookie(&refresh))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(cookie_names(&resp), vec![ACCESS_TOKEN_COOKIE.to_string()]);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body.get("refresh_expires_in").is_none());
}

#[actix_web::test]
async fn test_refresh_rotates_near_session_end() {
    let ctx = context().await;
    let app = test::init_service(create_app(ctx.state.clone(), DEFAULT_JSON_LIMIT)).await;

    let resp = test::call_service(&app, login_request(USER, USER_PASSWORD).to_request()).await;
    let (_, old_refresh) = tokens(&resp);

    ctx.clock.advance(Duration::days(7) - Duration::minutes(10));
    let req = test::TestRequest::get()
        .uri("/token")
        .cookie(refresh_cookie(&old_refresh))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        cookie_names(&resp),
        vec![ACCESS_TOKEN_COOKIE.to_string(), REFRESH_TOKEN_COOKIE.to_string()]
    );
    let new_refresh = response_cookie(&resp, REFRESH_TOKEN_COOKIE)
        .unwrap()
        .value()
        .to_string();
    assert_ne!(new_refresh, old_refresh);

    // The rotated-out token is dead
    let req = test::TestRequest::get()
        .uri("/token")
        .cookie(refresh_cookie(&old_refresh))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/token")
        .cookie(refresh_cookie(&new_refresh))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_refresh_rejects_missing_and_wrong_tokens() {
    let ctx = context().await;
    let app = test::init_service(create_app(ctx.state.clone(), DEFAULT_JSON_LIMIT)).await;

    let req = test::TestRequest::get().uri("/token").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(&app, login_request(USER, USER_PASSWORD).to_request()).await;
    let (access, _) = tokens(&resp);

    // An access token in the refresh cookie
    let req = test::TestRequest::get()
        .uri("/token")
        .cookie(refresh_cookie(&access))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_logout_clears_cookies_and_session() {
    let ctx = context().await;
    let app = test::init_service(create_app(ctx.state.clone(), DEFAULT_JSON_LIMIT)).await;

    let resp = test::call_service(&app, login_request(USER, USER_PASSWORD).to_request()).await;
    let (_, refresh) = tokens(&resp);

    let req = test::TestRequest::delete()
        .uri("/logout")
        .cookie(refresh_cookie(&refresh))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
        let cookie = response_cookie(&resp, name).unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
    }
    assert!(ctx.store.sessions_for(USER).await.is_empty());

    let req = test::TestRequest::get()
        .uri("/token")
        .cookie(refresh_cookie(&refresh))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::delete()
        .uri("/logout")
        .cookie(refresh_cookie(&refresh))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_logout_other_sessions_keeps_current() {
    let ctx = context().await;
    let app = test::init_service(create_app(ctx.state.clone(), DEFAULT_JSON_LIMIT)).await;

    let mut refresh_tokens = Vec::new();
    for _ in 0..3 {
        let resp =
            test::call_service(&app, login_request(USER, USER_PASSWORD).to_request()).await;
        refresh_tokens.push(tokens(&resp).1);
    }
    let resp = test::call_service(&app, login_request(ADMIN, ADMIN_PASSWORD).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let current = &refresh_tokens[1];
    let req = test::TestRequest::delete()
        .uri("/logout/other-sessions")
        .cookie(refresh_cookie(current))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(cookie_names(&resp).is_empty());

    let remaining = ctx.store.sessions_for(USER).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(&remaining[0].token, current);
    assert_eq!(ctx.store.sessions_for(ADMIN).await.len(), 1);
}

#[actix_web::test]
async fn test_change_password_revokes_every_session() {
    let ctx = context().await;
    let app = test::init_service(create_app(ctx.state.clone(), DEFAULT_JSON_LIMIT)).await;

    let resp = test::call_service(&app, login_request(USER, USER_PASSWORD).to_request()).await;
    let (_, first) = tokens(&resp);
    let resp = test::call_service(&app, login_request(USER, USER_PASSWORD).to_request()).await;
    let (_, second) = tokens(&resp);

    let req = test::TestRequest::put()
        .uri("/password")
        .cookie(refresh_cookie(&first))
        .set_json(json!({ "currentPassword": USER_PASSWORD, "newPassword": "newPW129!!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        response_cookie(&resp, REFRESH_TOKEN_COOKIE).unwrap().max_age(),
        Some(CookieDuration::ZERO)
    );
    assert!(ctx.store.sessions_for(USER).await.is_empty());

    for token in [&first, &second] {
        let req = test::TestRequest::get()
            .uri("/token")
            .cookie(refresh_cookie(token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    let resp = test::call_service(&app, login_request(USER, USER_PASSWORD).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = test::call_service(&app, login_request(USER, "newPW129!!").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_change_password_failures() {
    let ctx = context().await;
    let app = test::init_service(create_app(ctx.state.clone(), DEFAULT_JSON_LIMIT)).await;

    let resp = test::call_service(&app, login_request(USER, USER_PASSWORD).to_request()).await;
    let (_, refresh) = tokens(&resp);

    let cases = [
        // policy: ascending run
        (
            json!({ "currentPassword": USER_PASSWORD, "newPassword": "newPW123!!" }),
            StatusCode::BAD_REQUEST,
        ),
        // policy: username fragment
        (
            json!({ "currentPassword": USER_PASSWORD, "newPassword": "serPW111!!" }),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({ "currentPassword": USER_PASSWORD, "newPassword": "!pW1" }),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({ "current_password": USER_PASSWORD, "new_password": "newPW129!!" }),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({ "currentPassword": "Password12?", "newPassword": "newPW129!!" }),
            StatusCode::UNAUTHORIZED,
        ),
    ];
    for (body, expected) in cases {
        let req = test::TestRequest::put()
            .uri("/password")
            .cookie(refresh_cookie(&refresh))
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "body {}", body);
    }

    // Nothing above changed the password or ended the session
    assert_eq!(ctx.store.sessions_for(USER).await.len(), 1);

    let req = test::TestRequest::put()
        .uri("/password")
        .set_json(json!({ "currentPassword": USER_PASSWORD, "newPassword": "newPW129!!" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_method_not_allowed() {
    let ctx = context().await;
    let app = test::init_service(create_app(ctx.state.clone(), DEFAULT_JSON_LIMIT)).await;

    let cases = [
        (Method::GET, "/login"),
        (Method::PUT, "/logout"),
        (Method::POST, "/token"),
        (Method::PATCH, "/password"),
        (Method::OPTIONS, "/login"),
        (Method::TRACE, "/"),
        (Method::from_bytes(b"SEARCH").unwrap(), "/alive"),
    ];
    for (method, path) in cases {
        let req = test::TestRequest::default()
            .method(method.clone())
            .uri(path)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, path);
    }
}

#[actix_web::test]
async fn test_unknown_path_is_not_found() {
    let ctx = context().await;
    let app = test::init_service(create_app(ctx.state.clone(), DEFAULT_JSON_LIMIT)).await;

    let req = test::TestRequest::get().uri("/nowhere").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NOT_FOUND");
}

#[actix_web::test]
async fn test_head_on_token_never_rotates() {
    let ctx = context().await;
    let app = test::init_service(create_app(ctx.state.clone(), DEFAULT_JSON_LIMIT)).await;

    let resp = test::call_service(&app, login_request(USER, USER_PASSWORD).to_request()).await;
    let (_, refresh) = tokens(&resp);

    ctx.clock.advance(Duration::days(7) - Duration::minutes(10));
    let req = test::TestRequest::default()
        .method(Method::HEAD)
        .uri("/token")
        .cookie(refresh_cookie(&refresh))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(cookie_names(&resp).is_empty());

    let sessions = ctx.store.sessions_for(USER).await;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].token, refresh);
}

#[actix_web::test]
async fn test_rejected_methods_carry_security_headers() {
    let ctx = context().await;
    let app = test::init_service(create_app(ctx.state.clone(), DEFAULT_JSON_LIMIT)).await;

    for method in [Method::TRACE, Method::from_bytes(b"SEARCH").unwrap()] {
        let req = test::TestRequest::default()
            .method(method.clone())
            .uri("/login")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{}", method);

        let headers = resp.headers();
        assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
        assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
    }
}
