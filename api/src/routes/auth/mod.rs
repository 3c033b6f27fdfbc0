//! Authentication route handlers
//!
//! Every endpoint except login works from the refresh token cookie. The
//! service checks that token against the session store before acting on it.

pub mod login;
pub mod logout;
pub mod password;
pub mod refresh;

use actix_web::HttpResponseBuilder;

use ag_core::domain::entities::token::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};

use crate::cookies::CookieSettings;

/// Tell the client to drop both token cookies
pub(crate) fn clear_token_cookies(builder: &mut HttpResponseBuilder, cookies: &CookieSettings) {
    builder
        .cookie(cookies.removal_cookie(ACCESS_TOKEN_COOKIE))
        .cookie(cookies.removal_cookie(REFRESH_TOKEN_COOKIE));
}
