//! Recording income and expenses, and listing a user's recent transactions.

mod core;
mod create_page;
mod form;

pub use core::{
    CATEGORIES, NewTransaction, Transaction, TransactionType, create_transaction,
    create_transaction_table, get_recent_transactions,
};
pub use create_page::{get_add_transaction_page, post_add_transaction};
pub use form::TransactionForm;

#[cfg(test)]
pub(crate) use core::test_utils;
