#![allow(missing_docs)]

pub(crate) mod db;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use db::{
    TEST_PASSWORD_HASH_COST, get_initialized_test_database, get_test_app_state, get_test_database,
};
pub(crate) use form::{
    assert_form_action, assert_form_input, assert_form_input_with_value,
    assert_form_submit_button_with_text, must_get_form,
};
pub(crate) use html::{assert_alert, assert_valid_html, parse_html_document};
pub(crate) use http::assert_redirect;
