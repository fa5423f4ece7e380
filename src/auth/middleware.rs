//! Authentication middleware that resolves the session user, slides the session
//! expiry forward and redirects anonymous requests to the log-in page.

use axum::{
    extract::{FromRef, Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use time::Duration;

use crate::{
    AppState, Database,
    alert::{Alert, set_flash},
    auth::{current_user, invalidate_session_cookie, set_session_cookie},
    endpoints,
};

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long the session stays valid after this request.
    pub session_duration: Duration,
    /// Where to look up the session user.
    pub database: Database,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session_duration: state.session_duration,
            database: state.database.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Middleware function that checks for a valid session.
///
/// If the session resolves to a user, the [User](crate::User) is placed into the request
/// extensions, the request is executed normally and the session expiry is
/// extended. Otherwise the session cookie is cleared and the client is
/// redirected to the log-in page with a notice, without running the handler.
///
/// **Note**: Route handlers can use the function argument `Extension(user): Extension<User>` to receive the user.
pub async fn auth_guard(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    // The connection is dropped before the handler runs.
    let user = match state.database.connect() {
        Ok(connection) => current_user(&jar, &connection),
        Err(error) => {
            tracing::error!("Could not open database to check session: {error}");
            None
        }
    };

    let Some(user) = user else {
        let jar = invalidate_session_cookie(jar);
        let jar = set_flash(jar, &Alert::warning("Please log in to view this page."));
        return (jar, Redirect::to(endpoints::LOG_IN)).into_response();
    };

    let user_id = user.id;
    request.extensions_mut().insert(user);
    let response = next.run(request).await;

    let jar = match set_session_cookie(jar.clone(), user_id, state.session_duration) {
        Ok(updated_jar) => updated_jar,
        Err(error) => {
            tracing::error!("Error extending session: {error}. Rolling back cookie jar.");
            jar
        }
    };

    let (mut parts, body) = response.into_parts();
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{
        Extension, Router,
        extract::State,
        middleware,
        response::Html,
        routing::{get, post},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use axum_test::TestServer;
    use tempfile::TempDir;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error, User,
        auth::{AuthState, COOKIE_TOKEN, DEFAULT_SESSION_DURATION, auth_guard, set_session_cookie},
        endpoints,
        test_utils::get_initialized_test_database,
        user::register_user,
    };

    async fn test_handler(Extension(user): Extension<User>) -> Html<String> {
        Html(format!("<h1>Hello, {}!</h1>", user.username))
    }

    async fn stub_log_in_route(
        State(state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        let connection = state.database.connect()?;
        let user = crate::user::get_user_by_username("alice", &connection)?;

        set_session_cookie(jar, user.id, state.session_duration)
    }

    const TEST_LOG_IN_ROUTE: &str = "/stub_log_in";
    const TEST_PROTECTED_ROUTE: &str = "/protected";

    fn get_test_server(session_duration: Duration) -> (TempDir, TestServer) {
        let (dir, database) = get_initialized_test_database();
        register_user("alice", "pw123", 4, &database.connect().unwrap()).unwrap();
        let state = AuthState {
            cookie_key: Key::generate(),
            session_duration,
            database,
        };

        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .route(TEST_LOG_IN_ROUTE, post(stub_log_in_route))
            .with_state(state);

        (
            dir,
            TestServer::try_new(app).expect("Could not create test server."),
        )
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(2),
            "got date time {:?}, want {:?}",
            left,
            right
        );
    }

    #[tokio::test]
    async fn get_protected_route_with_valid_cookie() {
        let (_dir, server) = get_test_server(DEFAULT_SESSION_DURATION);
        let response = server.post(TEST_LOG_IN_ROUTE).await;

        response.assert_status_ok();
        let token_cookie = response.cookie(COOKIE_TOKEN);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_ok();
        response.assert_text("<h1>Hello, alice!</h1>");
    }

    #[tokio::test]
    async fn auth_guard_extends_session() {
        let (_dir, server) = get_test_server(Duration::seconds(5));
        let response = server.post(TEST_LOG_IN_ROUTE).await;

        response.assert_status_ok();
        let log_in_time = OffsetDateTime::now_utc();
        let token_cookie = response.cookie(COOKIE_TOKEN);
        assert_date_time_close(
            token_cookie.expires_datetime().unwrap(),
            log_in_time + Duration::seconds(5),
        );

        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(token_cookie)
            .await;

        let refreshed_cookie = response.cookie(COOKIE_TOKEN);
        assert_date_time_close(
            refreshed_cookie.expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + Duration::seconds(5),
        );
        assert_eq!(refreshed_cookie.secure(), Some(true));
        assert_eq!(refreshed_cookie.http_only(), Some(true));
        assert_eq!(refreshed_cookie.same_site(), Some(SameSite::Strict));
    }

    #[tokio::test]
    async fn get_protected_route_with_no_cookie_redirects_to_log_in() {
        let (_dir, server) = get_test_server(DEFAULT_SESSION_DURATION);

        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN);
        assert_eq!(response.cookie(COOKIE_TOKEN).max_age(), Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn get_protected_route_with_invalid_cookie_redirects_to_log_in() {
        let (_dir, server) = get_test_server(DEFAULT_SESSION_DURATION);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(Cookie::build((COOKIE_TOKEN, "FOOBAR")).build())
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN);
    }

    #[tokio::test]
    async fn get_protected_route_with_expired_session_redirects_to_log_in() {
        let (_dir, server) = get_test_server(Duration::seconds(1));
        let token_cookie = server.post(TEST_LOG_IN_ROUTE).await.cookie(COOKIE_TOKEN);

        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN);
    }
}
