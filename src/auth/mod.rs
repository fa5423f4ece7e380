//! Session handling: the encrypted session cookie and the middleware that
//! guards the pages that need a logged in user.

mod cookie;
mod middleware;
mod token;

pub use cookie::{
    DEFAULT_SESSION_DURATION, current_user, invalidate_session_cookie, set_session_cookie,
};
pub use middleware::auth_guard;
pub(crate) use token::Token;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;

#[cfg(test)]
pub(crate) use middleware::AuthState;
