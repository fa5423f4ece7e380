//! Code for creating the user table, registering users and checking their credentials.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error, PasswordHash, ValidatedPassword, ValidationError, password::waste_verification_time,
};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A non-empty username with surrounding whitespace removed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Trim `raw_username` and check that something is left.
    ///
    /// # Errors
    ///
    /// Returns [ValidationError::MissingUsername] if the username is empty or only whitespace.
    pub fn new(raw_username: &str) -> Result<Self, ValidationError> {
        let username = raw_username.trim();

        if username.is_empty() {
            Err(ValidationError::MissingUsername)
        } else {
            Ok(Self(username.to_owned()))
        }
    }

    /// Create a username without any validation.
    ///
    /// The caller should ensure that `raw_username` is trimmed and not empty.
    pub fn new_unchecked(raw_username: &str) -> Self {
        Self(raw_username.to_owned())
    }

    /// The username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name the user logs in with.
    pub username: Username,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let raw_username: String = row.get(1)?;
    let raw_password_hash: String = row.get(2)?;

    Ok(User {
        id: UserID::new(raw_id),
        username: Username::new_unchecked(&raw_username),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

/// Insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateUser] if the username is already taken,
/// - [Error::StorageUnavailable] if the user table does not exist,
/// - or [Error::SqlError] if some other SQL error occurred.
pub fn create_user(
    username: Username,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection
        .execute(
            "INSERT INTO users (username, password) VALUES (?1, ?2)",
            (username.as_str(), password_hash.to_string()),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateUser(username.to_string()),
            error => error.into(),
        })?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        username,
        password_hash,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user ([Error::NotFound]).
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, username, password FROM users WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with the name `username`.
///
/// # Errors
///
/// This function will return an error if:
/// - `username` does not belong to a registered user ([Error::NotFound]).
/// - there was an error trying to access the store.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, username, password FROM users WHERE username = :username")?
        .query_row(&[(":username", &username)], map_user_row)
        .map_err(|error| error.into())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM users;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Validate the credentials, hash the password with `cost` and store the new user.
///
/// # Errors
///
/// Returns a:
/// - [Error::Validation] if the username or password is empty,
/// - [Error::DuplicateUser] if the username is already taken,
/// - [Error::HashingError] if the password could not be hashed,
/// - or a storage error if the user could not be saved.
pub fn register_user(
    raw_username: &str,
    raw_password: &str,
    cost: u32,
    connection: &Connection,
) -> Result<UserID, Error> {
    let username = Username::new(raw_username)?;
    let password = ValidatedPassword::new(raw_password)?;
    let password_hash = PasswordHash::new(password, cost)?;

    create_user(username, password_hash, connection).map(|user| user.id)
}

/// Check `raw_password` against the stored hash for `raw_username`.
///
/// An unknown username still costs one bcrypt round at `cost`, which should be
/// the cost new passwords are hashed with.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] both when the username is unknown and when the
/// password does not match, or a storage error if the user table could not be read.
pub fn authenticate(
    raw_username: &str,
    raw_password: &str,
    cost: u32,
    connection: &Connection,
) -> Result<User, Error> {
    let user = match get_user_by_username(raw_username.trim(), connection) {
        Ok(user) => user,
        Err(Error::NotFound) => {
            waste_verification_time(raw_password, cost);
            return Err(Error::InvalidCredentials);
        }
        Err(error) => return Err(error),
    };

    match user.password_hash.verify(raw_password) {
        Ok(true) => Ok(user),
        Ok(false) => Err(Error::InvalidCredentials),
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            Err(Error::HashingError(error.to_string()))
        }
    }
}
