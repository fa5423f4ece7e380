//! Opening database connections and creating the application schema.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{Error, transaction::create_transaction_table, user::create_user_table};

/// The location of the SQLite database.
///
/// Each request opens its own connection with [Database::connect] and the
/// connection is closed when it is dropped at the end of the request.
#[derive(Debug, Clone)]
pub struct Database {
    path: Arc<PathBuf>,
}

impl Database {
    /// Create a handle to the database file at `path`.
    ///
    /// The file is not opened until [Database::connect] is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
        }
    }

    /// The path to the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a new connection to the database with foreign keys enforced.
    ///
    /// # Errors
    ///
    /// Returns an [Error::StorageUnavailable] if the file cannot be opened.
    pub fn connect(&self) -> Result<Connection, Error> {
        let connection = Connection::open(self.path.as_path())?;
        connection.pragma_update(None, "foreign_keys", "ON")?;

        Ok(connection)
    }
}

/// Create the tables for the domain models if they do not already exist.
///
/// Safe to call on every start up.
///
/// # Errors
/// Returns an error if the database cannot be opened or the schema cannot be
/// applied. Nothing is created unless every table is created.
pub fn initialize(database: &Database) -> Result<(), Error> {
    let parent = database
        .path()
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty());

    if let Some(parent) = parent {
        std::fs::create_dir_all(parent).map_err(|error| {
            Error::StorageUnavailable(format!(
                "could not create directory {}: {error}",
                parent.display()
            ))
        })?;
    }

    let mut connection = database.connect()?;
    let transaction = Transaction::new(&mut connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Replace the result of a read with an empty value if the store is unavailable.
///
/// The schema may not have been applied yet, e.g. on the very first run, and
/// pages should still render in that case.
pub fn or_empty<T: Default>(result: Result<T, Error>) -> Result<T, Error> {
    match result {
        Err(Error::StorageUnavailable(reason)) => {
            tracing::warn!("Substituting an empty result, storage is unavailable: {reason}");
            Ok(T::default())
        }
        other => other,
    }
}
