//! Full page responses for requests that cannot be served normally.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

/// An error page with the status code it is served with.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub description: String,
    pub fix: String,
}

impl ErrorPage {
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            description: "Something's missing.".to_owned(),
            fix: "Sorry, we can't find that page. Head back to the dashboard to see your ledger."
                .to_owned(),
        }
    }

    /// Shown when the database cannot be opened or has no schema yet.
    pub fn storage_unavailable() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            description: "The database is unavailable.".to_owned(),
            fix: "Try again later or check the server logs".to_owned(),
        }
    }

    pub fn internal(description: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            description: description.into(),
            fix: fix.into(),
        }
    }

    fn title(&self) -> &'static str {
        match self.status {
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::SERVICE_UNAVAILABLE => "Service Unavailable",
            _ => "Internal Server Error",
        }
    }
}

impl Default for ErrorPage {
    fn default() -> Self {
        Self::internal(
            "Sorry, something went wrong.",
            "Try again later or check the server logs",
        )
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        let page = error_view(
            self.title(),
            self.status.as_str(),
            &self.description,
            &self.fix,
        );

        (self.status, page).into_response()
    }
}

/// Handler for requests that do not match any route.
pub async fn get_404_not_found() -> Response {
    ErrorPage::not_found().into_response()
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::{ErrorPage, get_404_not_found};

    #[tokio::test]
    async fn not_found_page_shows_status() {
        let response = get_404_not_found().await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("404"), "got {text}");
    }

    #[test]
    fn storage_unavailable_is_503() {
        let response = ErrorPage::storage_unavailable().into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn default_is_500() {
        assert_eq!(
            ErrorPage::default().status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
