//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The auth module handles the lower level session cookie logic.

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Database, Error,
    alert::{Alert, set_flash, take_flash},
    auth::{invalidate_session_cookie, set_session_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, base, log_in_register, password_input, username_input,
    },
    user::authenticate,
};

const SUCCESS_MESSAGE: &str = "Login successful!";

fn log_in_form(username: &str) -> Markup {
    html! {
        form method="post" action=(endpoints::LOG_IN) class="form"
        {
            (username_input(username))

            (password_input("current-password"))

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                "Log in"
            }

            p class="form-footer"
            {
                "Don't have an account? "
                a href=(endpoints::REGISTER) class=(LINK_STYLE) { "Register here" }
            }
        }
    }
}

fn log_in_view(username: &str, alerts: &[Alert]) -> Markup {
    let content = log_in_register("Log in to your account", alerts, &log_in_form(username));
    base("Log In", &content)
}

/// Display the log-in page.
pub async fn get_log_in_page(jar: PrivateCookieJar) -> Response {
    let (jar, flash) = take_flash(jar);
    let alerts: Vec<Alert> = flash.into_iter().collect();

    (jar, log_in_view("", &alerts)).into_response()
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long the new session lasts without activity.
    pub session_duration: Duration,
    /// Where to look up the user's credentials.
    pub database: Database,
    /// The bcrypt cost of new password hashes, spent on unknown usernames too.
    pub password_hash_cost: u32,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session_duration: state.session_duration,
            database: state.database.clone(),
            password_hash_cost: state.password_hash_cost,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The data submitted by the log-in form.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogInForm {
    pub username: String,
    pub password: String,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, any previous session is replaced, the
/// session cookie is set and the client is redirected to the dashboard.
/// Otherwise, the form is returned with an error message explaining the problem.
/// Unknown usernames and wrong passwords get the same message.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(form): Form<LogInForm>,
) -> Response {
    let result = state
        .database
        .connect()
        .and_then(|connection| {
            authenticate(
                &form.username,
                &form.password,
                state.password_hash_cost,
                &connection,
            )
        });

    let (status_code, message) = match result {
        Ok(user) => {
            let jar = invalidate_session_cookie(jar);
            let jar = match set_session_cookie(jar, user.id, state.session_duration) {
                Ok(jar) => jar,
                Err(error) => return error.into_response(),
            };
            let jar = set_flash(jar, &Alert::success(SUCCESS_MESSAGE));

            tracing::info!("User {} logged in", user.id);
            return (jar, Redirect::to(endpoints::ROOT)).into_response();
        }
        Err(Error::InvalidCredentials) => {
            tracing::info!("Failed log-in attempt");
            (
                StatusCode::UNAUTHORIZED,
                Error::InvalidCredentials.to_string(),
            )
        }
        Err(Error::StorageUnavailable(reason)) => {
            tracing::error!("Could not check credentials: {reason}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Could not log in, please try again later.".to_owned(),
            )
        }
        Err(error) => return error.into_response(),
    };

    (
        status_code,
        log_in_view(form.username.trim(), &[Alert::error(message)]),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::get};
    use axum_extra::extract::cookie::Key;
    use axum_test::TestServer;
    use scraper::Html;

    use crate::{
        auth::{COOKIE_TOKEN, DEFAULT_SESSION_DURATION},
        endpoints,
        test_utils::{
            TEST_PASSWORD_HASH_COST, assert_alert, assert_form_action, assert_form_input,
            assert_form_submit_button_with_text, assert_valid_html, get_initialized_test_database,
            must_get_form,
        },
        user::register_user,
    };

    use super::{LogInForm, LoginState, get_log_in_page, post_log_in};

    fn get_test_server() -> (tempfile::TempDir, TestServer) {
        let (dir, database) = get_initialized_test_database();
        register_user(
            "alice",
            "pw123",
            TEST_PASSWORD_HASH_COST,
            &database.connect().unwrap(),
        )
        .unwrap();
        let state = LoginState {
            cookie_key: Key::generate(),
            session_duration: DEFAULT_SESSION_DURATION,
            database,
            password_hash_cost: TEST_PASSWORD_HASH_COST,
        };
        let app = Router::new()
            .route(endpoints::LOG_IN, get(get_log_in_page).post(post_log_in))
            .with_state(state);

        let server = TestServer::try_new(app).expect("Could not create test server.");

        (dir, server)
    }

    fn form(username: &str, password: &str) -> LogInForm {
        LogInForm {
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }

    #[tokio::test]
    async fn log_in_page_has_form() {
        let (_dir, server) = get_test_server();

        let response = server.get(endpoints::LOG_IN).await;

        response.assert_status_ok();
        let html = Html::parse_document(&response.text());
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_action(&form, endpoints::LOG_IN);
        assert_form_input(&form, "username", "text");
        assert_form_input(&form, "password", "password");
        assert_form_submit_button_with_text(&form, "Log in");
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let (_dir, server) = get_test_server();

        let response = server
            .post(endpoints::LOG_IN)
            .form(&form("alice", "pw123"))
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::ROOT);
        let session_cookie = response.cookie(COOKIE_TOKEN);
        assert_ne!(session_cookie.max_age(), Some(time::Duration::ZERO));
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let (_dir, server) = get_test_server();

        let response = server
            .post(endpoints::LOG_IN)
            .form(&form("alice", "wrong"))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let html = Html::parse_document(&response.text());
        assert_alert(&html, "error", "Incorrect username or password.");
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_user_with_same_message() {
        let (_dir, server) = get_test_server();

        let response = server
            .post(endpoints::LOG_IN)
            .form(&form("mallory", "pw123"))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let html = Html::parse_document(&response.text());
        assert_alert(&html, "error", "Incorrect username or password.");
    }
}
