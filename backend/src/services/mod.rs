pub mod admin;
pub mod assets;
pub mod error;
pub mod hosts;
pub mod media;
pub mod notification;
pub mod pages;
pub mod requests;

pub use error::ServiceError;
