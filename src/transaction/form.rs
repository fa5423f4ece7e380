//! Parsing the add transaction form into a [NewTransaction].

use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{ValidationError, transaction::NewTransaction};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The smallest amount that can be recorded.
const MINIMUM_AMOUNT: f64 = 0.01;

/// The raw fields of the add transaction form.
///
/// Every field is kept as text so that the form can be shown again exactly as
/// the user filled it in when validation fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionForm {
    pub date: String,
    pub amount: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub category: String,
    pub description: String,
}

impl TransactionForm {
    /// Check the fields and convert them into a [NewTransaction].
    ///
    /// Fields are checked in this order, and the first problem found is returned:
    /// 1. the date, amount, type and category are all filled in,
    /// 2. the amount is a finite number,
    /// 3. the amount is greater than zero,
    /// 4. the amount is at least one cent once rounded to cents,
    /// 5. the date is a real calendar date written as YYYY-MM-DD with a year
    ///    between 0000 and 9999,
    /// 6. the type is exactly "Income" or "Expense".
    ///
    /// The stored amount is rounded to cents.
    /// Surrounding whitespace is ignored in all fields. The description is optional.
    pub fn parse(&self) -> Result<NewTransaction, ValidationError> {
        let date = self.date.trim();
        let amount = self.amount.trim();
        let transaction_type = self.transaction_type.trim();
        let category = self.category.trim();

        if [date, amount, transaction_type, category]
            .iter()
            .any(|field| field.is_empty())
        {
            return Err(ValidationError::MissingRequiredFields);
        }

        let amount: f64 = amount
            .parse()
            .ok()
            .filter(|amount: &f64| amount.is_finite())
            .ok_or(ValidationError::InvalidAmount)?;

        if amount <= 0.0 {
            return Err(ValidationError::NonPositiveAmount);
        }

        let amount = round_to_cents(amount).ok_or(ValidationError::InvalidAmount)?;
        if amount < MINIMUM_AMOUNT {
            return Err(ValidationError::AmountTooSmall);
        }

        // SQLite date functions only understand four digit years.
        let date = Date::parse(date, DATE_FORMAT)
            .ok()
            .filter(|date| (0..=9999).contains(&date.year()))
            .ok_or(ValidationError::InvalidDate)?;
        let transaction_type = transaction_type.parse()?;

        Ok(NewTransaction {
            date,
            amount,
            transaction_type,
            category: category.to_owned(),
            description: self.description.trim().to_owned(),
        })
    }
}

fn round_to_cents(amount: f64) -> Option<f64> {
    let rounded = (amount * 100.0).round() / 100.0;

    rounded.is_finite().then_some(rounded)
}
