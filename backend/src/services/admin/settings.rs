use crate::services::ServiceError;
use crate::AppState;
use actix_web::web::{self, get, put, resource, ServiceConfig};
use actix_web::HttpResponse;
use common::model::settings::SiteSettings;
use log::info;

pub fn configure_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        resource("/settings")
            .route(get().to(fetch))
            .route(put().to(replace)),
    );
}

/// `GET /api/admin/settings`
async fn fetch(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.settings.snapshot().await)
}

/// `PUT /api/admin/settings`
///
/// Fields left out of the body take their stock values. The stored row and
/// the copy the pages render from are replaced together.
async fn replace(
    state: web::Data<AppState>,
    body: web::Json<SiteSettings>,
) -> Result<HttpResponse, ServiceError> {
    let next = body.into_inner();
    next.validate()?;
    let saved = state.settings.replace(&state.store, next).await?;
    info!("Site settings updated");
    Ok(HttpResponse::Ok().json(saved))
}
