//! The singleton business copy shown on every public page.
//!
//! Settings live in one database row. [`state::SettingsState`] keeps the
//! process-wide copy that page handlers read; only the admin settings
//! endpoint writes it back.

pub mod state;

pub use state::SettingsState;
