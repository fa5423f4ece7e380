//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, UserID, ValidationError, db::or_empty};

/// The categories offered in the add transaction form.
///
/// Any non-empty category is accepted, these are only suggestions.
pub const CATEGORIES: [&str; 11] = [
    "Food & Dining",
    "Groceries",
    "Utilities",
    "Rent/Mortgage",
    "Transport",
    "Healthcare",
    "Savings",
    "Gifts",
    "Salary",
    "Investment",
    "Other",
];

/// The ID of a row in the transactions table.
pub type TransactionId = i64;

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only the exact spellings "Income" and "Expense" are accepted.
impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Income" => Ok(TransactionType::Income),
            "Expense" => Ok(TransactionType::Expense),
            _ => Err(ValidationError::InvalidTransactionType),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An income or expense recorded by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserID,
    pub date: Date,
    /// Always greater than zero, the direction is given by `transaction_type`.
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub category: String,
    pub description: String,
}

/// A transaction that has passed validation and is ready to be stored.
///
/// Build one with [TransactionForm::parse](crate::transaction::TransactionForm::parse).
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: Date,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub category: String,
    pub description: String,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transactions table.
///
/// # Errors
/// Returns an error if the table could not be created.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                date TEXT NOT NULL,
                amount REAL NOT NULL,
                type TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT ''
                )",
        (),
    )?;

    // Every read filters on the user and most order by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date)",
        (),
    )?;

    Ok(())
}

/// Store `transaction` for the user `user_id` and return its ID.
///
/// # Errors
/// This function will return a:
/// - [Error::StorageUnavailable] if the table does not exist or the database is locked,
/// - [Error::NotFound] if `user_id` does not refer to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<TransactionId, Error> {
    connection
        .prepare(
            "INSERT INTO transactions (user_id, date, amount, type, category, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id",
        )?
        .query_row(
            (
                user_id.as_i64(),
                transaction.date,
                transaction.amount,
                transaction.transaction_type,
                &transaction.category,
                &transaction.description,
            ),
            |row| row.get(0),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })
}

/// The `limit` most recent transactions of `user_id`, newest first.
///
/// Transactions on the same date are ordered by most recently added.
/// Returns an empty list if the transactions table does not exist yet.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn get_recent_transactions(
    user_id: UserID,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let query = || -> Result<Vec<Transaction>, Error> {
        connection
            .prepare(
                "SELECT id, user_id, date, amount, type, category, description
                 FROM transactions
                 WHERE user_id = ?1
                 ORDER BY date DESC, id DESC
                 LIMIT ?2",
            )?
            .query_map((user_id.as_i64(), limit), map_transaction_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect()
    };

    or_empty(query())
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        date: row.get(2)?,
        amount: row.get(3)?,
        transaction_type: row.get(4)?,
        category: row.get(5)?,
        description: row.get(6)?,
    })
}
