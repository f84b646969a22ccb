//! One-shot flash messages carried in a signed cookie
//!
//! A message set on one response is shown by the next page render and then
//! cleared. The cookie value is `base64url(message).base64url(hmac)`, keyed by
//! the configured session secret; tampered or foreign cookies are ignored.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::core::constants::{FLASH_COOKIE_MAX_AGE_SECS, FLASH_COOKIE_NAME};
use crate::utils::crypto::{sign_value, verify_value};

/// Attach a flash message to the outgoing cookie jar
pub fn set_flash(jar: CookieJar, secret: &str, message: &str) -> CookieJar {
    let cookie = Cookie::build((FLASH_COOKIE_NAME, sign_value(message, secret.as_bytes())))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(FLASH_COOKIE_MAX_AGE_SECS));
    jar.add(cookie)
}

/// Read and clear the pending flash message, if any
pub fn take_flash(jar: CookieJar, secret: &str) -> (CookieJar, Option<String>) {
    let Some(cookie) = jar.get(FLASH_COOKIE_NAME) else {
        return (jar, None);
    };

    let message = verify_value(cookie.value(), secret.as_bytes());
    if message.is_none() {
        tracing::debug!("Discarding flash cookie with invalid signature");
    }
    let jar = jar.remove(Cookie::build(FLASH_COOKIE_NAME).path("/"));
    (jar, message)
}
