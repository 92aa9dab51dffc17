//! Rejects requests addressed to a host the site does not serve.

use crate::AppState;
use actix_web::body::{BoxBody, EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpResponse};
use log::warn;

/// `from_fn` middleware checking the `Host` header against the allow list.
pub async fn allowed_hosts<B: MessageBody + 'static>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B, BoxBody>>, Error> {
    let allowed = match req.app_data::<web::Data<AppState>>() {
        Some(state) => state.config.host_allowed(req.connection_info().host()),
        None => true,
    };
    if allowed {
        return Ok(next.call(req).await?.map_into_left_body());
    }

    warn!("Rejected request for host {}", req.connection_info().host());
    let response = HttpResponse::BadRequest()
        .content_type("text/plain; charset=utf-8")
        .body("Bad Request (400)");
    Ok(req.into_response(response).map_into_right_body())
}
