//! The page for adding a new transaction and the handler for the submitted form.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use time::Date;

use crate::{
    Error, User,
    alert::{Alert, alerts_view, set_flash, take_flash},
    app_state::LedgerState,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    timezone::local_today,
    transaction::{CATEGORIES, TransactionForm, TransactionType, create_transaction},
};

const SUCCESS_MESSAGE: &str = "Transaction added successfully!";
const STORAGE_UNAVAILABLE_MESSAGE: &str =
    "The transaction could not be saved because the database is unavailable. Please try again later.";

fn type_option(form: &TransactionForm, transaction_type: TransactionType) -> Markup {
    let value = transaction_type.as_str();

    html!(
        option value=(value) selected[form.transaction_type == value] { (value) }
    )
}

fn add_transaction_view(username: &str, form: &TransactionForm, alerts: &[Alert]) -> Markup {
    let nav_bar = NavBar::new(endpoints::ADD_TRANSACTION, username).into_html();
    let is_custom_category =
        !form.category.is_empty() && !CATEGORIES.contains(&form.category.as_str());

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            (alerts_view(alerts))

            form method="post" action=(endpoints::ADD_TRANSACTION) class="form"
            {
                h2 { "New Transaction" }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        name="date"
                        id="date"
                        type="date"
                        required
                        value=(form.date)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    input
                        name="amount"
                        id="amount"
                        type="number"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        required
                        autofocus
                        value=(form.amount)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="type" class=(FORM_LABEL_STYLE) { "Type" }

                    select name="type" id="type" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        (type_option(form, TransactionType::Expense))
                        (type_option(form, TransactionType::Income))
                    }
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                    select name="category" id="category" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" selected[form.category.is_empty()] { "Select a category" }

                        @if is_custom_category {
                            option value=(form.category) selected { (form.category) }
                        }

                        @for category in CATEGORIES {
                            option value=(category) selected[form.category == category] { (category) }
                        }
                    }
                }

                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description (optional)" }

                    input
                        name="description"
                        id="description"
                        type="text"
                        value=(form.description)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
                {
                    "Add Transaction"
                }
            }
        }
    };

    base("Add Transaction", &content)
}

fn empty_form(today: Date) -> TransactionForm {
    TransactionForm {
        date: today.to_string(),
        transaction_type: TransactionType::Expense.to_string(),
        ..Default::default()
    }
}

/// Display the form for adding a transaction, with the date set to today.
pub async fn get_add_transaction_page(
    State(state): State<LedgerState>,
    Extension(user): Extension<User>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let (jar, flash) = take_flash(jar);
    let alerts: Vec<Alert> = flash.into_iter().collect();

    let page = add_transaction_view(user.username.as_str(), &empty_form(today), &alerts);

    Ok((jar, page).into_response())
}

/// Handler for the add transaction form.
///
/// On success the transaction is stored, and the client is redirected to the
/// dashboard with a notice. Invalid input shows the form again with the
/// submitted values and a notice describing the first problem found.
pub async fn post_add_transaction(
    State(state): State<LedgerState>,
    Extension(user): Extension<User>,
    jar: PrivateCookieJar,
    Form(form): Form<TransactionForm>,
) -> Response {
    let new_transaction = match form.parse() {
        Ok(new_transaction) => new_transaction,
        Err(error) => {
            tracing::debug!("Rejected transaction from user {}: {error}", user.id);
            return (
                StatusCode::BAD_REQUEST,
                add_transaction_view(
                    user.username.as_str(),
                    &form,
                    &[Alert::error(error.to_string())],
                ),
            )
                .into_response();
        }
    };

    let result = state
        .database
        .connect()
        .and_then(|connection| create_transaction(user.id, &new_transaction, &connection));

    match result {
        Ok(transaction_id) => {
            tracing::info!(
                "User {} added {} transaction {transaction_id}",
                user.id,
                new_transaction.transaction_type
            );
            let jar = set_flash(jar, &Alert::success(SUCCESS_MESSAGE));
            (jar, Redirect::to(endpoints::ROOT)).into_response()
        }
        Err(Error::StorageUnavailable(reason)) => {
            tracing::error!("Could not save transaction for user {}: {reason}", user.id);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                add_transaction_view(
                    user.username.as_str(),
                    &form,
                    &[Alert::error(STORAGE_UNAVAILABLE_MESSAGE)],
                ),
            )
                .into_response()
        }
        Err(error) => error.into_response(),
    }
}
