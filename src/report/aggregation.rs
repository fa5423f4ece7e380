//! Queries that sum a user's transactions.
//!
//! All sums are computed by SQLite. If the transactions table does not exist
//! yet, each query returns zeros or an empty list instead of an error.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use time::{Date, Month};

use crate::{Error, UserID, db::or_empty, transaction::TransactionType};

/// The overall income, expenses and balance of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    /// Always `income - expense`.
    pub balance: f64,
}

/// A calendar month, displayed and stored as "YYYY-MM".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: Month,
}

impl MonthKey {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }
}

impl From<Date> for MonthKey {
    fn from(date: Date) -> Self {
        Self::new(date.year(), date.month())
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, u8::from(self.month))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month \"{0}\", expected YYYY-MM")]
pub struct ParseMonthKeyError(String);

impl FromStr for MonthKey {
    type Err = ParseMonthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParseMonthKeyError(s.to_owned());

        let (year, month) = s.split_once('-').ok_or_else(error)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(error());
        }

        let year: i32 = year.parse().map_err(|_| error())?;
        let month: u8 = month.parse().map_err(|_| error())?;
        let month = Month::try_from(month).map_err(|_| error())?;

        Ok(Self::new(year, month))
    }
}

impl ToSql for MonthKey {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for MonthKey {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// The income and expenses of a user in one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub month: MonthKey,
    pub income: f64,
    pub expense: f64,
}

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySpending {
    pub category: String,
    pub total_spent: f64,
}

/// Sum all of the income and expenses of `user_id`.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn get_totals(user_id: UserID, connection: &Connection) -> Result<Totals, Error> {
    let query = || -> Result<Totals, Error> {
        let (income, expense): (f64, f64) = connection
            .prepare(
                "SELECT
                    COALESCE(SUM(CASE WHEN type = ?2 THEN amount END), 0.0),
                    COALESCE(SUM(CASE WHEN type = ?3 THEN amount END), 0.0)
                 FROM transactions
                 WHERE user_id = ?1",
            )?
            .query_row(
                (
                    user_id.as_i64(),
                    TransactionType::Income,
                    TransactionType::Expense,
                ),
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

        Ok(Totals {
            income,
            expense,
            balance: income - expense,
        })
    };

    or_empty(query())
}

/// Sum the income and expenses of `user_id` for each month that has at least
/// one transaction, most recent month first.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn get_monthly_breakdown(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<MonthlySummary>, Error> {
    let query = || -> Result<Vec<MonthlySummary>, Error> {
        connection
            .prepare(
                "SELECT
                    strftime('%Y-%m', date) AS month,
                    COALESCE(SUM(CASE WHEN type = ?2 THEN amount END), 0.0),
                    COALESCE(SUM(CASE WHEN type = ?3 THEN amount END), 0.0)
                 FROM transactions
                 WHERE user_id = ?1
                 GROUP BY month
                 ORDER BY month DESC",
            )?
            .query_map(
                (
                    user_id.as_i64(),
                    TransactionType::Income,
                    TransactionType::Expense,
                ),
                |row| {
                    Ok(MonthlySummary {
                        month: row.get(0)?,
                        income: row.get(1)?,
                        expense: row.get(2)?,
                    })
                },
            )?
            .map(|maybe_summary| maybe_summary.map_err(Error::from))
            .collect()
    };

    or_empty(query())
}

/// The categories `user_id` spent the most on in `month`, largest first.
///
/// Categories with equal totals are ordered by name. At most `limit` categories are returned.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn get_top_categories(
    user_id: UserID,
    month: MonthKey,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<CategorySpending>, Error> {
    let query = || -> Result<Vec<CategorySpending>, Error> {
        connection
            .prepare(
                "SELECT category, SUM(amount) AS total_spent
                 FROM transactions
                 WHERE user_id = ?1 AND type = ?2 AND strftime('%Y-%m', date) = ?3
                 GROUP BY category
                 ORDER BY total_spent DESC, category ASC
                 LIMIT ?4",
            )?
            .query_map(
                (user_id.as_i64(), TransactionType::Expense, month, limit),
                |row| {
                    Ok(CategorySpending {
                        category: row.get(0)?,
                        total_spent: row.get(1)?,
                    })
                },
            )?
            .map(|maybe_spending| maybe_spending.map_err(Error::from))
            .collect()
    };

    or_empty(query())
}
