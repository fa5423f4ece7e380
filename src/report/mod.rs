//! Totals and per-month summaries of a user's transactions.

mod aggregation;
mod page;

pub use aggregation::{
    CategorySpending, MonthKey, MonthlySummary, Totals, get_monthly_breakdown, get_top_categories,
    get_totals,
};
pub use page::get_report_page;
