use axum::{body::Body, response::Response};
use scraper::{Html, Selector};

pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    let body = response.into_body();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Could not get response body");
    let text = String::from_utf8_lossy(&body).to_string();

    Html::parse_document(&text)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

/// Assert that the page shows an alert of `kind` ("success", "error", "warning" or "info")
/// with the text `want_message`.
#[track_caller]
pub(crate) fn assert_alert(html: &Html, kind: &str, want_message: &str) {
    let selector = Selector::parse(&format!(".alert-{kind}")).unwrap();
    let messages: Vec<String> = html
        .select(&selector)
        .map(|alert| alert.text().collect::<String>().trim().to_owned())
        .collect();

    assert!(
        messages.iter().any(|message| message == want_message),
        "want {kind} alert with message {want_message:?}, got {messages:?}"
    );
}
