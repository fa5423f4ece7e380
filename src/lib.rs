//! Budget Book is a web app for tracking personal income and expenses.
//!
//! This library provides the routes, storage and aggregation queries for the
//! app. Pages are rendered on the server and returned as HTML.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::response::{IntoResponse, Redirect, Response};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod dashboard;
mod db;
mod endpoints;
mod error_page;
mod html;
mod log_in;
mod log_out;
mod logging;
mod navigation;
mod password;
mod register_user;
mod report;
mod routing;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::{Database, initialize as initialize_db};
pub use logging::logging_middleware;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use user::{User, UserID, Username, count_users};

use crate::error_page::ErrorPage;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate_signal) => {
                terminate_signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// Problems with user input that are reported back to the user as a form notice.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The username was empty or only whitespace.
    #[error("Username is required.")]
    MissingUsername,

    /// The password was empty.
    #[error("Password is required.")]
    MissingPassword,

    /// One or more of the date, amount, type or category fields was empty.
    #[error("All required fields must be filled.")]
    MissingRequiredFields,

    /// The amount could not be parsed as a finite number.
    #[error("Invalid amount entered.")]
    InvalidAmount,

    /// The amount was zero or negative.
    #[error("Amount must be greater than zero.")]
    NonPositiveAmount,

    /// The amount rounds to less than one cent.
    #[error("Amount must be at least 0.01.")]
    AmountTooSmall,

    /// The date was not a valid calendar date in the format YYYY-MM-DD with a
    /// year between 0000 and 9999.
    #[error("Invalid date entered, use the format YYYY-MM-DD.")]
    InvalidDate,

    /// The transaction type was not exactly "Income" or "Expense".
    #[error("Transaction type must be either Income or Expense.")]
    InvalidTransactionType,
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user submitted a form with missing or malformed fields.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A user with the username already exists.
    #[error("User {0} is already registered.")]
    DuplicateUser(String),

    /// The username does not exist or the password does not match.
    ///
    /// Both cases share this variant so that callers cannot tell whether an
    /// account exists.
    #[error("Incorrect username or password.")]
    InvalidCredentials,

    /// The database file could not be opened or the schema has not been
    /// applied yet.
    ///
    /// Read paths should substitute empty results, write paths should tell
    /// the user that their change was not saved.
    #[error("storage is unavailable: {0}")]
    StorageUnavailable(String),

    /// A protected page was requested without a valid session.
    #[error("Please log in to view this page.")]
    AuthenticationRequired,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The session token could not be written to or read from a cookie.
    #[error("session cookie error: {0}")]
    CookieError(String),

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            rusqlite::Error::SqliteFailure(_, Some(ref message))
                if message.starts_with("no such table") =>
            {
                Error::StorageUnavailable(message.to_owned())
            }
            rusqlite::Error::SqliteFailure(sql_error, ref message)
                if matches!(
                    sql_error.code,
                    ErrorCode::CannotOpen
                        | ErrorCode::NotADatabase
                        | ErrorCode::DatabaseBusy
                        | ErrorCode::DatabaseLocked
                ) =>
            {
                Error::StorageUnavailable(
                    message
                        .clone()
                        .unwrap_or_else(|| sql_error.to_string()),
                )
            }
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => ErrorPage::not_found().into_response(),
            Error::AuthenticationRequired => Redirect::to(endpoints::LOG_IN).into_response(),
            Error::InvalidTimezoneError(timezone) => ErrorPage::internal(
                "Invalid Timezone Settings",
                format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            )
            .into_response(),
            Error::StorageUnavailable(reason) => {
                tracing::error!("storage is unavailable: {reason}");
                ErrorPage::storage_unavailable().into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                ErrorPage::default().into_response()
            }
        }
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;

    use crate::{Error, ValidationError, endpoints};

    #[test]
    fn missing_table_is_storage_unavailable() {
        let connection = Connection::open_in_memory().unwrap();

        let error: Error = connection
            .prepare("SELECT id FROM transactions")
            .unwrap_err()
            .into();

        assert!(
            matches!(error, Error::StorageUnavailable(ref message) if message.contains("transactions")),
            "got {error:?}, want StorageUnavailable"
        );
    }

    #[test]
    fn no_rows_is_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn validation_error_displays_user_message() {
        let error = Error::from(ValidationError::NonPositiveAmount);

        assert_eq!(error.to_string(), "Amount must be greater than zero.");
    }

    #[test]
    fn authentication_required_redirects_to_log_in() {
        let response = Error::AuthenticationRequired.into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), endpoints::LOG_IN);
    }

    #[test]
    fn storage_unavailable_is_service_unavailable() {
        let response = Error::StorageUnavailable("gone".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
