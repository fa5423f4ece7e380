//! The report page: a monthly breakdown and this month's top spending categories.

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
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE,
        base, currency,
    },
    navigation::NavBar,
    report::{
        CategorySpending, MonthKey, MonthlySummary, get_monthly_breakdown, get_top_categories,
    },
    timezone::local_today,
};

const TOP_CATEGORY_LIMIT: u32 = 5;

fn monthly_breakdown_view(breakdown: &[MonthlySummary]) -> Markup {
    html! {
        section id="monthly-breakdown"
        {
            h2 { "Monthly Breakdown" }

            @if breakdown.is_empty() {
                p class="empty" { "No transactions yet." }
            } @else {
                table class=(TABLE_STYLE)
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Month" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Income" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Expenses" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Net" }
                        }
                    }

                    tbody
                    {
                        @for summary in breakdown {
                            tr class=(TABLE_ROW_STYLE) data-month=(summary.month)
                            {
                                td class=(TABLE_CELL_STYLE) { (summary.month) }
                                td class={ (TABLE_CELL_STYLE) " income" } { (currency(summary.income)) }
                                td class={ (TABLE_CELL_STYLE) " expense" } { (currency(summary.expense)) }
                                td class={ (TABLE_CELL_STYLE) " net" }
                                {
                                    (currency(summary.income - summary.expense))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn top_categories_view(month: MonthKey, top_categories: &[CategorySpending]) -> Markup {
    html! {
        section id="top-categories"
        {
            h2 { "Top Spending Categories for " (month) }

            @if top_categories.is_empty() {
                p class="empty" { "No expenses this month." }
            } @else {
                ol
                {
                    @for spending in top_categories {
                        li class="category" data-category=(spending.category)
                        {
                            span class="category-name" { (spending.category) }
                            " "
                            (currency(spending.total_spent))
                        }
                    }
                }
            }
        }
    }
}

fn report_view(
    username: &str,
    alerts: &[Alert],
    month: MonthKey,
    breakdown: &[MonthlySummary],
    top_categories: &[CategorySpending],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORT, username).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            (alerts_view(alerts))

            h1 { "Report" }

            (monthly_breakdown_view(breakdown))

            (top_categories_view(month, top_categories))
        }
    };

    base("Report", &content)
}

/// Display the monthly breakdown and this month's top five spending categories.
///
/// "This month" is the current month in the server's configured timezone.
pub async fn get_report_page(
    State(state): State<LedgerState>,
    Extension(user): Extension<User>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let month = MonthKey::from(local_today(&state.local_timezone)?);

    let (breakdown, top_categories) = {
        let connection = state.database.connect()?;
        (
            get_monthly_breakdown(user.id, &connection)?,
            get_top_categories(user.id, month, TOP_CATEGORY_LIMIT, &connection)?,
        )
    };

    let (jar, flash) = take_flash(jar);
    let alerts: Vec<Alert> = flash.into_iter().collect();

    let page = report_view(
        user.username.as_str(),
        &alerts,
        month,
        &breakdown,
        &top_categories,
    );

    Ok((jar, page).into_response())
}
