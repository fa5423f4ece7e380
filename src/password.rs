//! Types for checking and hashing passwords.
//!
//! [ValidatedPassword] wraps a non-empty password string and [PasswordHash]
//! turns a [ValidatedPassword] into a salted bcrypt hash.

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use serde::{Deserialize, Serialize};

use crate::{Error, ValidationError};

/// A password that has been validated, but not yet hashed.
///
/// This struct can be used to construct a [PasswordHash].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Create and validate a new password from a string.
    ///
    /// Any non-empty string is accepted. Whitespace is kept as-is since it is
    /// part of what the user typed.
    ///
    /// # Errors
    ///
    /// Returns [ValidationError::MissingPassword] if the password is empty.
    pub fn new(raw_password_string: &str) -> Result<Self, ValidationError> {
        if raw_password_string.is_empty() {
            Err(ValidationError::MissingPassword)
        } else {
            Ok(Self(raw_password_string.to_string()))
        }
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", str::repeat("*", 8))
    }
}

/// A salted and hashed password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default encryption cost for hashing passwords.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Create a hashed password from a validated password with the specified `cost`.
    ///
    /// `cost` increases the rounds of hashing and therefore the time needed to verify a password.
    /// Pass in [PasswordHash::DEFAULT_COST] to use the recommended cost.
    ///
    /// # Errors
    ///
    /// This function will return an error if the password could not be hashed.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        match hash(&password.0, cost) {
            Ok(password_hash) => Ok(Self(password_hash)),
            Err(e) => Err(Error::HashingError(e.to_string())),
        }
    }

    /// Wrap a hash that was read back from the database.
    ///
    /// The caller should ensure that `raw_password_hash` is a valid password hash.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_string())
    }

    /// Check that `raw_password` matches the stored password.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }
}

/// Spend as long as checking a password against a hash with `cost` would take.
///
/// Used when there is no stored hash, so that an unknown username takes as
/// long to reject as a wrong password.
pub fn waste_verification_time(raw_password: &str, cost: u32) {
    if let Err(error) = hash(raw_password, cost) {
        tracing::warn!("Could not hash password for timing: {error}");
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
