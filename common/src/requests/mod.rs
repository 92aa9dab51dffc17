//! Payloads accepted from the outside world and the rules that turn them into
//! typed values.

pub mod admin;
pub mod custom_request;
pub mod machine_filter;
