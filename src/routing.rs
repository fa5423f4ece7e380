//! Application router configuration with protected and unprotected route definitions.

use axum::{Router, middleware, routing::get};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::auth_guard,
    dashboard::get_dashboard_page,
    endpoints,
    error_page::get_404_not_found,
    log_in::{get_log_in_page, post_log_in},
    log_out::get_log_out,
    register_user::{get_register_page, post_register},
    report::get_report_page,
    transaction::{get_add_transaction_page, post_add_transaction},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN, get(get_log_in_page).post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::REGISTER,
            get(get_register_page).post(post_register),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_dashboard_page))
        .route(
            endpoints::ADD_TRANSACTION,
            get(get_add_transaction_page).post(post_add_transaction),
        )
        .route(endpoints::REPORT, get(get_report_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}
