//! Reading and writing the encrypted session cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::Token,
    user::{User, UserID, get_user_by_id},
};

pub(crate) const COOKIE_TOKEN: &str = "session";

/// How long a session lasts after the last authenticated request.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::minutes(60);

/// Add a session cookie for `user_id` to the cookie jar, indicating that a user is logged in.
///
/// The session expires `duration` from now.
///
/// # Errors
///
/// Returns [Error::CookieError] if the token could not be serialized.
pub fn set_session_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc() + duration;
    let token = Token {
        user_id,
        expires_at,
    };
    let token_string =
        serde_json::to_string(&token).map_err(|error| Error::CookieError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_TOKEN, token_string))
            .path("/")
            .expires(expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Set the session cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Decode the session token from `jar`.
///
/// # Errors
///
/// Returns [Error::AuthenticationRequired] if the cookie is missing, cannot be
/// decoded or has expired.
pub fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::AuthenticationRequired)?;

    let token: Token = serde_json::from_str(cookie.value_trimmed()).map_err(|error| {
        tracing::debug!("Could not decode session token: {error}");
        Error::AuthenticationRequired
    })?;

    if token.is_expired_at(OffsetDateTime::now_utc()) {
        return Err(Error::AuthenticationRequired);
    }

    Ok(token)
}

/// The user bound to the session in `jar`, if any.
///
/// Returns `None` when there is no valid token, when the user no longer
/// exists or when the user table cannot be read.
pub fn current_user(jar: &PrivateCookieJar, connection: &Connection) -> Option<User> {
    let token = get_token_from_cookies(jar).ok()?;

    match get_user_by_id(token.user_id, connection) {
        Ok(user) => Some(user),
        Err(Error::NotFound) => {
            tracing::info!("Session refers to user {} who no longer exists", token.user_id);
            None
        }
        Err(error) => {
            tracing::error!("Could not look up the session user: {error}");
            None
        }
    }
}
