//! Alert messages for telling the user what happened.
//!
//! An [Alert] can be rendered inline on a page, or carried across a redirect
//! as a one-shot flash notice stored in a private cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

const COOKIE_FLASH: &str = "flash";

/// Alert message types for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertType {
    Success,
    Error,
    Warning,
    Info,
}

impl AlertType {
    fn class(self) -> &'static str {
        match self {
            AlertType::Success => "alert alert-success",
            AlertType::Error => "alert alert-error",
            AlertType::Warning => "alert alert-warning",
            AlertType::Info => "alert alert-info",
        }
    }
}

/// A message for the user and how it should be styled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_type: AlertType,
    pub message: String,
}

impl Alert {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            alert_type: AlertType::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            alert_type: AlertType::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            alert_type: AlertType::Warning,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            alert_type: AlertType::Info,
            message: message.into(),
        }
    }

    pub fn into_html(&self) -> Markup {
        html! {
            div class=(self.alert_type.class()) role="alert"
            {
                (self.message)
            }
        }
    }
}

/// Render zero or more alerts, e.g. a flash notice followed by a form error.
pub fn alerts_view<'a>(alerts: impl IntoIterator<Item = &'a Alert>) -> Markup {
    html! {
        @for alert in alerts {
            (alert.into_html())
        }
    }
}

/// Store `alert` in `jar` so that it is shown on the next rendered page.
pub fn set_flash(jar: PrivateCookieJar, alert: &Alert) -> PrivateCookieJar {
    let value = match serde_json::to_string(alert) {
        Ok(value) => value,
        Err(error) => {
            tracing::error!("Could not serialize flash notice: {error}");
            return jar;
        }
    };

    jar.add(
        Cookie::build((COOKIE_FLASH, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Remove the flash notice from `jar`, returning it if there was one.
///
/// The returned jar clears the cookie on the client, so each notice is shown once.
pub fn take_flash(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<Alert>) {
    let Some(cookie) = jar.get(COOKIE_FLASH) else {
        return (jar, None);
    };

    let alert = serde_json::from_str(cookie.value_trimmed())
        .inspect_err(|error| tracing::debug!("Discarding undecodable flash notice: {error}"))
        .ok();

    let jar = jar.add(
        Cookie::build((COOKIE_FLASH, ""))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    );

    (jar, alert)
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use time::Duration;

    use super::{Alert, AlertType, COOKIE_FLASH, set_flash, take_flash};

    #[test]
    fn flash_round_trips_once() {
        let jar = PrivateCookieJar::new(Key::generate());
        let jar = set_flash(jar, &Alert::success("Saved!"));

        let (jar, alert) = take_flash(jar);

        assert_eq!(alert, Some(Alert::success("Saved!")));
        let cleared = jar.get(COOKIE_FLASH).unwrap();
        assert_eq!(cleared.max_age(), Some(Duration::ZERO));
    }

    #[test]
    fn take_flash_without_cookie_is_none() {
        let jar = PrivateCookieJar::new(Key::generate());

        let (_, alert) = take_flash(jar);

        assert_eq!(alert, None);
    }

    #[test]
    fn malformed_flash_is_ignored() {
        let jar = PrivateCookieJar::new(Key::generate()).add(Cookie::new(COOKIE_FLASH, "{"));

        let (_, alert) = take_flash(jar);

        assert_eq!(alert, None);
    }

    #[test]
    fn alert_renders_message_with_type_class() {
        let markup = Alert::warning("Please log in to view this page.").into_html();
        let html = markup.into_string();

        assert!(html.contains("alert-warning"));
        assert!(html.contains("Please log in to view this page."));
        assert_eq!(Alert::info("x").alert_type, AlertType::Info);
    }
}
