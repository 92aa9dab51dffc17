//! # Public Pages
//!
//! Server-rendered HTML for buyers browsing the catalogue and sending quote
//! requests. Handlers gather what a page shows from the store and the shared
//! site settings, hand it to an askama template and wrap the result.
//!
//! ## Registered Routes:
//! - `GET /`: landing page with featured machines and the quick request form.
//! - `POST /landing/request/`: quick request form; always redirects back to `/`.
//! - `GET /catalogue/`: filtered, paginated listing.
//! - `GET /catalogue/{slug}/`: machine detail.
//! - `GET|POST /custom-request/`: full request form.
//! - `GET /request/thanks/`: confirmation after a request.

mod catalogue;
mod custom_request;
mod detail;
pub mod flash;
mod landing;
pub mod pagination;
mod thanks;
pub mod views;

use crate::services::ServiceError;
use actix_web::http::{header, StatusCode};
use actix_web::web::{get, post, resource, ServiceConfig};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use askama::Template;
use flash::Flash;
use log::error;

pub fn configure_routes(cfg: &mut ServiceConfig) {
    cfg.service(resource("/").route(get().to(landing::process)))
        .service(resource("/landing/request/").route(post().to(landing::request)))
        .service(resource("/catalogue/").route(get().to(catalogue::process)))
        .service(resource("/catalogue/{slug}/").route(get().to(detail::process)))
        .service(
            resource("/custom-request/")
                .route(get().to(custom_request::form))
                .route(post().to(custom_request::process)),
        )
        .service(resource("/request/thanks/").route(get().to(thanks::process)));
}

/// Renders `page` and clears any flash messages it displayed.
fn render(req: &HttpRequest, status: StatusCode, page: &impl Template) -> Result<HttpResponse, ServiceError> {
    let body = page.render()?;
    let mut response = HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body);
    flash::consume(req, &mut response);
    Ok(response)
}

/// `302` to `location`, queueing `flashes` for the page it lands on.
fn redirect(location: &str, flashes: &[Flash]) -> HttpResponse {
    let mut builder = HttpResponse::Found();
    builder.insert_header((header::LOCATION, location));
    if !flashes.is_empty() {
        flash::set(&mut builder, flashes);
    }
    builder.finish()
}

/// Turns a page result into a response; failures get a plain text body.
fn respond(result: Result<HttpResponse, ServiceError>) -> HttpResponse {
    match result {
        Ok(response) => response,
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                error!("Page failed: {}", e);
            }
            HttpResponse::build(status)
                .content_type("text/plain; charset=utf-8")
                .body(status.canonical_reason().unwrap_or("Error"))
        }
    }
}
