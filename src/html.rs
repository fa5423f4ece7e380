use maud::{DOCTYPE, Markup, html};

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};

use crate::{alert::Alert, alert::alerts_view, endpoints};

// Link styles
pub const LINK_STYLE: &str = "link";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "button button-primary";

// Form styles
pub const FORM_CONTAINER_STYLE: &str = "form-container";
pub const FORM_LABEL_STYLE: &str = "form-label";
pub const FORM_TEXT_INPUT_STYLE: &str = "form-input";

// Table styles
pub const TABLE_STYLE: &str = "table";
pub const TABLE_HEADER_STYLE: &str = "table-header";
pub const TABLE_ROW_STYLE: &str = "table-row";
pub const TABLE_CELL_STYLE: &str = "table-cell";

// Page container
pub const PAGE_CONTAINER_STYLE: &str = "page";

pub fn base(title: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Budget Book" }
                link href={ (endpoints::STATIC) "/main.css" } rel="stylesheet";
            }

            body
            {
                (content)
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html!(
        section class="error-page"
        {
            h1 class="error-code" { (header) }

            p class="error-description" { (description) }

            p class="error-fix" { (fix) }

            a href=(endpoints::ROOT) class=(BUTTON_PRIMARY_STYLE)
            {
                "Back to Homepage"
            }
        }
    );

    base(title, &content)
}

/// The card layout shared by the log-in and registration pages.
pub fn log_in_register(form_title: &str, alerts: &[Alert], form: &Markup) -> Markup {
    html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            a href=(endpoints::ROOT) class="brand" { "Budget Book" }

            div class="card"
            {
                h1 { (form_title) }

                (alerts_view(alerts))

                (form)
            }
        }
    }
}

pub fn username_input(username: &str) -> Markup {
    html! {
        div
        {
            label for="username" class=(FORM_LABEL_STYLE) { "Username" }

            input
                type="text"
                name="username"
                id="username"
                class=(FORM_TEXT_INPUT_STYLE)
                autocomplete="username"
                required
                autofocus
                value=(username);
        }
    }
}

/// The password is never echoed back to the client.
pub fn password_input(autocomplete: &str) -> Markup {
    html! {
        div
        {
            label for="password" class=(FORM_LABEL_STYLE) { "Password" }

            input
                type="password"
                name="password"
                id="password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                autocomplete=(autocomplete)
                required;
        }
    }
}

/// Format `number` as dollars and cents with thousands separators, e.g. "-$1,234.50".
pub fn format_currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("$")
            .ok()
            .map(|fmt| fmt.precision(Precision::Decimals(2)))
    });

    static NEGATIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-$")
            .ok()
            .map(|fmt| fmt.precision(Precision::Decimals(2)))
    });

    let (Some(positive_fmt), Some(negative_fmt)) = (positive_fmt, negative_fmt) else {
        return plain_currency(number);
    };

    let cents = (number * 100.0).round() / 100.0;

    // numfmt switches to scientific notation outside this range.
    if !(cents == 0.0 || (0.01..1e12).contains(&cents.abs())) {
        return plain_currency(number);
    }

    let mut formatted_string = if cents < 0.0 {
        negative_fmt.fmt_string(cents.abs())
    } else if cents > 0.0 {
        positive_fmt.fmt_string(cents)
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        "$0.00".to_owned()
    };

    let is_plain_decimal = formatted_string
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '$' | '-' | ',' | '.'));
    if !is_plain_decimal {
        return plain_currency(number);
    }

    // numfmt omits the last trailing zero, so we must add it ourselves
    // For example, "12.30" is rendered as "12.3" so we append "0".
    match formatted_string.rfind('.') {
        Some(point) if formatted_string.len() - point == 2 => formatted_string.push('0'),
        Some(_) => {}
        None => formatted_string.push_str(".00"),
    }

    formatted_string
}

/// Dollars and cents with thousands separators, without going through numfmt.
fn plain_currency(number: f64) -> String {
    let digits = format!("{:.2}", number.abs());
    let is_zero = digits.chars().all(|c| c == '0' || c == '.');
    let sign = if number < 0.0 && !is_zero { "-" } else { "" };
    let Some((whole, cents)) = digits.split_once('.') else {
        // Infinity and NaN have no decimal point.
        return format!("{sign}${digits}");
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{cents}")
}

/// A formatted amount that also carries the exact value in `data-amount`.
pub fn currency(amount: f64) -> Markup {
    html!(
        span class="amount" data-amount=(format!("{amount:.2}")) { (format_currency(amount)) }
    )
}
