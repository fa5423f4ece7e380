//! The dashboard: the user's totals and most recent transactions.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};

use crate::{
    Error, User,
    alert::{Alert, alerts_view, take_flash},
    app_state::LedgerState,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE, base, currency,
    },
    navigation::NavBar,
    report::{Totals, get_totals},
    transaction::{Transaction, get_recent_transactions},
};

/// How many transactions are listed on the dashboard.
const RECENT_TRANSACTION_LIMIT: u32 = 10;

fn totals_view(totals: &Totals) -> Markup {
    html! {
        section id="totals" class="cards"
        {
            div class="card total-income"
            {
                h3 { "Income" }
                p { (currency(totals.income)) }
            }

            div class="card total-expense"
            {
                h3 { "Expenses" }
                p { (currency(totals.expense)) }
            }

            div class="card total-balance"
            {
                h3 { "Balance" }
                p { (currency(totals.balance)) }
            }
        }
    }
}

fn recent_transactions_view(transactions: &[Transaction]) -> Markup {
    html! {
        section id="recent-transactions"
        {
            h2 { "Recent Transactions" }

            @if transactions.is_empty() {
                p class="empty"
                {
                    "No transactions yet. "
                    a href=(endpoints::ADD_TRANSACTION) class=(LINK_STYLE) { "Add your first one." }
                }
            } @else {
                table class=(TABLE_STYLE)
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        }
                    }

                    tbody
                    {
                        @for transaction in transactions {
                            tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
                            {
                                td class=(TABLE_CELL_STYLE) { (transaction.date) }
                                td class=(TABLE_CELL_STYLE) { (transaction.transaction_type) }
                                td class=(TABLE_CELL_STYLE) { (transaction.category) }
                                td class=(TABLE_CELL_STYLE) { (transaction.description) }
                                td class=(TABLE_CELL_STYLE) { (currency(transaction.amount)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn dashboard_view(
    username: &str,
    alerts: &[Alert],
    totals: &Totals,
    transactions: &[Transaction],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::ROOT, username).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            (alerts_view(alerts))

            h1 { "Dashboard" }

            (totals_view(totals))

            a href=(endpoints::ADD_TRANSACTION) class=(BUTTON_PRIMARY_STYLE) { "Add Transaction" }

            (recent_transactions_view(transactions))
        }
    };

    base("Dashboard", &content)
}

/// Display the user's totals and their ten most recent transactions.
pub async fn get_dashboard_page(
    State(state): State<LedgerState>,
    Extension(user): Extension<User>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let (totals, transactions) = {
        let connection = state.database.connect()?;
        (
            get_totals(user.id, &connection)?,
            get_recent_transactions(user.id, RECENT_TRANSACTION_LIMIT, &connection)?,
        )
    };

    let (jar, flash) = take_flash(jar);
    let alerts: Vec<Alert> = flash.into_iter().collect();

    let page = dashboard_view(user.username.as_str(), &alerts, &totals, &transactions);

    Ok((jar, page).into_response())
}
