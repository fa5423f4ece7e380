//! The paths the app serves.

pub const ROOT: &str = "/";
pub const REGISTER: &str = "/register";
pub const LOG_IN: &str = "/login";
pub const LOG_OUT: &str = "/logout";
pub const ADD_TRANSACTION: &str = "/add";
pub const REPORT: &str = "/report";
pub const STATIC: &str = "/static";
