//! Log-out route handler that invalidates the session cookie and redirects users.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    alert::{Alert, set_flash},
    auth::invalidate_session_cookie,
    endpoints,
};

/// Invalidate the session cookie and redirect the client to the log-in page.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_session_cookie(jar);
    let jar = set_flash(jar, &Alert::info("You have been logged out."));

    (jar, Redirect::to(endpoints::LOG_IN)).into_response()
}
