//! # Admin API
//!
//! JSON endpoints the operations team uses to maintain the site content and
//! work incoming quote requests. Everything lives under `/api/admin` and
//! requires `Authorization: Bearer <PORTAL_ADMIN_TOKEN>`; without a configured
//! token the whole scope answers `503`.
//!
//! ## Sub-modules:
//! - `resources`: generic list/create/update/delete over simple content tables.
//! - `settings`: the site settings singleton.
//! - `machines`: catalogue machines and their files.
//! - `requests`: quote requests and their status trail.
//! - `uploads`: standalone image uploads referenced by content rows.

mod machines;
mod requests;
mod resources;
mod settings;
mod uploads;

use crate::services::ServiceError;
use crate::AppState;
use actix_web::body::{BoxBody, EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::middleware::{from_fn, Next};
use actix_web::web::{scope, ServiceConfig};
use actix_web::{web, Error, ResponseError};
use common::model::catalogue::{Category, Industry};
use common::model::content::{Faq, Partner, ServiceOffering, Testimonial};
use common::model::settings::{HeroMetric, ValueProposition};

const API_PATH: &str = "/api/admin";

pub fn configure_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        scope(API_PATH)
            .wrap(from_fn(require_token))
            .configure(settings::configure_routes)
            .configure(resources::routes::<HeroMetric>("/settings/metrics"))
            .configure(resources::routes::<ValueProposition>("/settings/value-propositions"))
            .configure(resources::routes::<Category>("/categories"))
            .configure(resources::routes::<Industry>("/industries"))
            .configure(resources::routes::<Testimonial>("/testimonials"))
            .configure(resources::routes::<Partner>("/partners"))
            .configure(resources::routes::<Faq>("/faqs"))
            .configure(resources::routes::<ServiceOffering>("/services"))
            .configure(machines::configure_routes)
            .configure(requests::configure_routes)
            .configure(uploads::configure_routes),
    );
}

/// The token presented in an `Authorization: Bearer` header.
fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

async fn require_token<B: MessageBody + 'static>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B, BoxBody>>, Error> {
    let expected = req
        .app_data::<web::Data<AppState>>()
        .and_then(|state| state.config.admin_token().map(str::to_owned));
    let rejection = match expected {
        None => Some(ServiceError::AdminDisabled),
        Some(expected) if bearer_token(&req) != Some(expected.as_str()) => {
            Some(ServiceError::Unauthorized)
        }
        Some(_) => None,
    };
    match rejection {
        Some(err) => Ok(req.into_response(err.error_response()).map_into_right_body()),
        None => Ok(next.call(req).await?.map_into_left_body()),
    }
}
