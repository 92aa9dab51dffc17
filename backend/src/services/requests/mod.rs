//! The quote request lifecycle.
//!
//! - `intake`: validates a submitted form, stores the request together with
//!   its first status log row, then notifies the sales inbox.
//! - `status`: operator edits, appending a log row whenever the status value
//!   actually changes.

pub mod intake;
pub mod status;

/// Comment recorded on log rows the system writes on its own.
pub const AUTO_STATUS_COMMENT: &str = "Status updated automatically.";
