//! Token cookies
//!
//! Both tokens travel as cookies scoped to `/`. Max-Age follows the token
//! lifetime so the browser drops a cookie once its token is useless.

use actix_web::cookie::{time::Duration, Cookie, SameSite};

use ag_shared::config::SessionConfig;

/// Attributes applied to every token cookie
#[derive(Debug, Clone)]
pub struct CookieSettings {
    secure: bool,
    http_only: bool,
    same_site: SameSite,
}

impl CookieSettings {
    pub fn new(config: &SessionConfig) -> Self {
        let same_site = match config.same_site.to_ascii_lowercase().as_str() {
            "lax" => SameSite::Lax,
            "none" => SameSite::None,
            _ => SameSite::Strict,
        };

        Self {
            secure: config.cookie_secure,
            http_only: config.http_only,
            same_site,
        }
    }

    /// Secure cookies imply the service is reached over HTTPS
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Cookie carrying `value` for `max_age_seconds`
    pub fn token_cookie(&self, name: &'static str, value: String, max_age_seconds: i64) -> Cookie<'static> {
        Cookie::build(name, value)
            .path("/")
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(Duration::seconds(max_age_seconds))
            .finish()
    }

    /// Cookie instructing the client to forget `name`
    pub fn removal_cookie(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = Cookie::build(name, "")
            .path("/")
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site)
            .finish();
        cookie.make_removal();
        cookie
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}
