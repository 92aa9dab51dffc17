//! Images for content rows that carry a single picture: the hero background,
//! partner logos and testimonial avatars.
//!
//! `POST /api/admin/uploads/{area}` stores the multipart `file` part and
//! returns its media path; the caller then puts that path on the row.

use crate::services::media::read_form;
use crate::services::ServiceError;
use crate::AppState;
use actix_multipart::Multipart;
use actix_web::web::{self, post, resource, ServiceConfig};
use actix_web::HttpResponse;
use common::forms::FieldErrors;
use serde_json::json;

pub fn configure_routes(cfg: &mut ServiceConfig) {
    cfg.service(resource("/uploads/{area}").route(post().to(process)));
}

/// Storage directory for each upload area.
fn directory(area: &str) -> Option<&'static str> {
    match area {
        "hero" => Some("hero"),
        "partners" => Some("partners/logos"),
        "testimonials" => Some("testimonials"),
        _ => None,
    }
}

async fn process(
    state: web::Data<AppState>,
    area: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, ServiceError> {
    let dir = directory(&area)
        .ok_or_else(|| ServiceError::BadRequest(format!("unknown upload area '{}'", area)))?;
    let mut parts = read_form(payload, &state.config.media_root).await?;
    let Some(file) = parts.take_file("file") else {
        let mut errors = FieldErrors::new();
        errors.add("file", "No file was submitted.");
        return Err(errors.into());
    };
    let path = file.persist(&state.config.media_root, dir)?;
    Ok(HttpResponse::Created().json(json!({ "path": path })))
}

#[cfg(test)]
mod tests {
    use super::directory;

    #[test]
    fn only_known_areas_have_a_directory() {
        assert_eq!(directory("partners"), Some("partners/logos"));
        assert_eq!(directory("../etc"), None);
    }
}
