//! The registration page and the handler for creating a new account.

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Database, Error,
    alert::{Alert, set_flash, take_flash},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, base, log_in_register, password_input, username_input,
    },
    user,
};

const SUCCESS_MESSAGE: &str = "Registration successful! Please log in.";

fn register_form(username: &str) -> Markup {
    html! {
        form method="post" action=(endpoints::REGISTER) class="form"
        {
            (username_input(username))

            (password_input("new-password"))

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                "Create account"
            }

            p class="form-footer"
            {
                "Already have an account? "
                a href=(endpoints::LOG_IN) class=(LINK_STYLE) { "Log in here" }
            }
        }
    }
}

fn register_view(username: &str, alerts: &[Alert]) -> Markup {
    let content = log_in_register("Create an account", alerts, &register_form(username));
    base("Register", &content)
}

/// Display the registration page.
pub async fn get_register_page(jar: PrivateCookieJar) -> Response {
    let (jar, flash) = take_flash(jar);
    let alerts: Vec<Alert> = flash.into_iter().collect();

    (jar, register_view("", &alerts)).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// Where to store the new user.
    pub database: Database,
    /// The bcrypt cost for hashing the new password.
    pub password_hash_cost: u32,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            database: state.database.clone(),
            password_hash_cost: state.password_hash_cost,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The data submitted by the registration form.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
}

/// Handler for registration requests via the POST method.
///
/// On success the user is created and the client is redirected to the log-in
/// page. Otherwise the form is shown again with a notice explaining the problem.
pub async fn post_register(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let result = state.database.connect().and_then(|connection| {
        user::register_user(
            &form.username,
            &form.password,
            state.password_hash_cost,
            &connection,
        )
    });

    let error = match result {
        Ok(user_id) => {
            tracing::info!("Registered new user {user_id}");
            let jar = set_flash(jar, &Alert::success(SUCCESS_MESSAGE));
            return (jar, Redirect::to(endpoints::LOG_IN)).into_response();
        }
        Err(error) => error,
    };

    let (status_code, message) = match error {
        Error::Validation(_) | Error::DuplicateUser(_) => {
            (StatusCode::BAD_REQUEST, error.to_string())
        }
        Error::StorageUnavailable(reason) => {
            tracing::error!("Could not register user: {reason}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Could not create your account, please try again later.".to_owned(),
            )
        }
        error => return error.into_response(),
    };

    (
        status_code,
        register_view(form.username.trim(), &[Alert::error(message)]),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        http::StatusCode,
        routing::{get, post},
    };
    use axum_extra::extract::cookie::Key;
    use axum_test::TestServer;
    use scraper::Html;

    use crate::{
        endpoints,
        test_utils::{
            TEST_PASSWORD_HASH_COST, assert_alert, assert_form_action, assert_form_input,
            assert_form_input_with_value, assert_form_submit_button_with_text, assert_valid_html,
            get_initialized_test_database, must_get_form,
        },
        user::{authenticate, count_users},
    };

    use super::{RegisterForm, RegistrationState, get_register_page, post_register};

    fn get_test_server() -> (tempfile::TempDir, RegistrationState, TestServer) {
        let (dir, database) = get_initialized_test_database();
        let state = RegistrationState {
            cookie_key: Key::generate(),
            database,
            password_hash_cost: TEST_PASSWORD_HASH_COST,
        };
        let app = Router::new()
            .route(endpoints::REGISTER, get(get_register_page))
            .route(endpoints::REGISTER, post(post_register))
            .with_state(state.clone());

        let server = TestServer::try_new(app).expect("Could not create test server.");

        (dir, state, server)
    }

    fn form(username: &str, password: &str) -> RegisterForm {
        RegisterForm {
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }

    #[tokio::test]
    async fn register_page_has_form() {
        let (_dir, _state, server) = get_test_server();

        let response = server.get(endpoints::REGISTER).await;

        response.assert_status_ok();
        let html = Html::parse_document(&response.text());
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_action(&form, endpoints::REGISTER);
        assert_form_input(&form, "username", "text");
        assert_form_input(&form, "password", "password");
        assert_form_submit_button_with_text(&form, "Create account");
    }

    #[tokio::test]
    async fn create_user_succeeds() {
        let (_dir, state, server) = get_test_server();

        let response = server
            .post(endpoints::REGISTER)
            .form(&form("alice", "pw123"))
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN);
        let connection = state.database.connect().unwrap();
        assert!(
            authenticate("alice", "pw123", TEST_PASSWORD_HASH_COST, &connection).is_ok()
        );
    }

    #[tokio::test]
    async fn create_user_fails_with_existing_user() {
        let (_dir, state, server) = get_test_server();
        server
            .post(endpoints::REGISTER)
            .form(&form("alice", "pw123"))
            .await
            .assert_status_see_other();

        let response = server
            .post(endpoints::REGISTER)
            .form(&form("alice", "different"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let html = Html::parse_document(&response.text());
        assert_alert(&html, "error", "User alice is already registered.");
        assert_form_input_with_value(&must_get_form(&html), "username", "text", "alice");
        assert_eq!(count_users(&state.database.connect().unwrap()), Ok(1));
    }

    #[tokio::test]
    async fn create_user_fails_when_fields_are_empty() {
        let (_dir, state, server) = get_test_server();

        let response = server
            .post(endpoints::REGISTER)
            .form(&form("  ", "pw123"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_alert(
            &Html::parse_document(&response.text()),
            "error",
            "Username is required.",
        );

        let response = server.post(endpoints::REGISTER).form(&form("bob", "")).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_alert(
            &Html::parse_document(&response.text()),
            "error",
            "Password is required.",
        );

        assert_eq!(count_users(&state.database.connect().unwrap()), Ok(0));
    }
}
