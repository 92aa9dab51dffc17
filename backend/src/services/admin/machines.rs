//! Machine maintenance, including the files attached to a machine.
//!
//! Uploads are multipart forms carrying the file in a `file` part. Deleting
//! a file reference leaves the stored file in place: uploads are named by
//! content and may be shared between rows.

use crate::services::media::{read_form, UploadedFile};
use crate::services::ServiceError;
use crate::store::catalogue::{
    add_machine_document, add_machine_image, delete_machine, delete_machine_document,
    delete_machine_image, get_machine, insert_machine, list_machines, machine_documents,
    machine_images, set_machine_file, update_machine, MachineFile,
};
use crate::store::{all_ids, row_exists, StoreError};
use crate::AppState;
use actix_multipart::Multipart;
use actix_web::web::{self, delete, get, post, put, resource, ServiceConfig};
use actix_web::HttpResponse;
use common::forms::{Cleaner, FieldErrors, INVALID_CHOICE};
use common::model::catalogue::{Machine, MachineDocument, MachineImage};
use common::requests::admin::MachinePayload;
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

const HERO_DIR: &str = "machines/hero";
const BROCHURE_DIR: &str = "machines/brochures";
const GALLERY_DIR: &str = "machines/gallery";
const DOCUMENT_DIR: &str = "machines/documents";

pub fn configure_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        resource("/machines")
            .route(get().to(list))
            .route(post().to(create)),
    )
    .service(
        resource("/machines/{id}")
            .route(get().to(fetch))
            .route(put().to(update))
            .route(delete().to(remove)),
    )
    .service(
        resource("/machines/{id}/hero-image")
            .route(put().to(upload_hero_image))
            .route(delete().to(clear_hero_image)),
    )
    .service(
        resource("/machines/{id}/brochure")
            .route(put().to(upload_brochure))
            .route(delete().to(clear_brochure)),
    )
    .service(resource("/machines/{id}/images").route(post().to(add_image)))
    .service(resource("/machines/{id}/images/{image_id}").route(delete().to(remove_image)))
    .service(resource("/machines/{id}/documents").route(post().to(add_document)))
    .service(
        resource("/machines/{id}/documents/{document_id}").route(delete().to(remove_document)),
    );
}

#[derive(Serialize)]
struct MachineDetail {
    #[serde(flatten)]
    machine: Machine,
    images: Vec<MachineImage>,
    documents: Vec<MachineDocument>,
}

/// Category and industry ids must name stored rows.
fn check_links(conn: &Connection, payload: &MachinePayload) -> Result<(), ServiceError> {
    let mut errors = FieldErrors::new();
    if !row_exists(conn, "categories", payload.category_id)? {
        errors.add("category_id", INVALID_CHOICE);
    }
    let industries = all_ids(conn, "industries")?;
    for id in payload.industry_ids.iter().filter(|id| !industries.contains(id)) {
        errors.add(
            "industry_ids",
            format!("Select a valid choice. {} is not one of the available choices.", id),
        );
    }
    errors.into_result(()).map_err(ServiceError::from)
}

/// `GET /api/admin/machines`
async fn list(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    let machines = state.store.read(list_machines)?;
    Ok(HttpResponse::Ok().json(machines))
}

/// `GET /api/admin/machines/{id}` with the gallery and documents.
async fn fetch(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse, ServiceError> {
    let id = id.into_inner();
    let detail = state.store.read(|conn| {
        Ok::<_, StoreError>(MachineDetail {
            machine: get_machine(conn, id)?,
            images: machine_images(conn, id)?,
            documents: machine_documents(conn, id)?,
        })
    })?;
    Ok(HttpResponse::Ok().json(detail))
}

/// `POST /api/admin/machines`
async fn create(
    state: web::Data<AppState>,
    body: web::Json<MachinePayload>,
) -> Result<HttpResponse, ServiceError> {
    let payload = body.into_inner();
    payload.validate()?;
    let machine = state.store.write(|tx| {
        check_links(tx, &payload)?;
        Ok::<_, ServiceError>(insert_machine(tx, &payload)?)
    })?;
    info!("Machine {} created as {}", machine.name, machine.slug);
    Ok(HttpResponse::Created().json(machine))
}

/// `PUT /api/admin/machines/{id}`
async fn update(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<MachinePayload>,
) -> Result<HttpResponse, ServiceError> {
    let id = id.into_inner();
    let payload = body.into_inner();
    payload.validate()?;
    let machine = state.store.write(|tx| {
        check_links(tx, &payload)?;
        Ok::<_, ServiceError>(update_machine(tx, id, &payload)?)
    })?;
    Ok(HttpResponse::Ok().json(machine))
}

/// `DELETE /api/admin/machines/{id}`
async fn remove(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse, ServiceError> {
    let id = id.into_inner();
    state.store.write(|tx| delete_machine(tx, id))?;
    info!("Machine {} deleted", id);
    Ok(HttpResponse::NoContent().finish())
}

/// Reads an upload form and returns its text fields and required `file` part.
async fn upload_parts(
    state: &AppState,
    payload: Multipart,
) -> Result<(HashMap<String, String>, UploadedFile), ServiceError> {
    let mut parts = read_form(payload, &state.config.media_root).await?;
    match parts.take_file("file") {
        Some(file) => Ok((parts.fields, file)),
        None => {
            let mut errors = FieldErrors::new();
            errors.add("file", "No file was submitted.");
            Err(errors.into())
        }
    }
}

async fn set_file(
    state: &AppState,
    id: i64,
    file: MachineFile,
    path: Option<&str>,
) -> Result<HttpResponse, ServiceError> {
    state.store.write(|tx| set_machine_file(tx, id, file, path))?;
    let machine = state.store.read(|conn| get_machine(conn, id))?;
    Ok(HttpResponse::Ok().json(machine))
}

async fn upload_file(
    state: &AppState,
    id: i64,
    file: MachineFile,
    dir: &str,
    payload: Multipart,
) -> Result<HttpResponse, ServiceError> {
    // Unknown machines should not leave files behind.
    state.store.read(|conn| get_machine(conn, id))?;
    let (_, upload) = upload_parts(state, payload).await?;
    let path = upload.persist(&state.config.media_root, dir)?;
    set_file(state, id, file, Some(&path)).await
}

/// `PUT /api/admin/machines/{id}/hero-image`
async fn upload_hero_image(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    payload: Multipart,
) -> Result<HttpResponse, ServiceError> {
    upload_file(&state, id.into_inner(), MachineFile::HeroImage, HERO_DIR, payload).await
}

/// `DELETE /api/admin/machines/{id}/hero-image`
async fn clear_hero_image(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    set_file(&state, id.into_inner(), MachineFile::HeroImage, None).await
}

/// `PUT /api/admin/machines/{id}/brochure`
async fn upload_brochure(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    payload: Multipart,
) -> Result<HttpResponse, ServiceError> {
    upload_file(&state, id.into_inner(), MachineFile::Brochure, BROCHURE_DIR, payload).await
}

/// `DELETE /api/admin/machines/{id}/brochure`
async fn clear_brochure(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    set_file(&state, id.into_inner(), MachineFile::Brochure, None).await
}

/// `POST /api/admin/machines/{id}/images`
///
/// Form fields: `file`, `caption`, `is_primary`, `display_order`.
async fn add_image(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    payload: Multipart,
) -> Result<HttpResponse, ServiceError> {
    let id = id.into_inner();
    state.store.read(|conn| get_machine(conn, id))?;
    let (fields, upload) = upload_parts(&state, payload).await?;

    let mut cleaner = Cleaner::new(&fields);
    let caption = cleaner.text("caption", false, 150);
    let is_primary = cleaner.flag("is_primary");
    let display_order = match fields.get("display_order").map(|v| v.trim()) {
        None | Some("") => 0,
        Some(raw) => raw.parse::<u32>().unwrap_or_else(|_| {
            cleaner.error("display_order", "Enter a whole number.");
            0
        }),
    };
    cleaner.finish(())?;

    let path = upload.persist(&state.config.media_root, GALLERY_DIR)?;
    let image = state.store.write(|tx| {
        add_machine_image(tx, id, &path, &caption, is_primary, display_order)
    })?;
    Ok(HttpResponse::Created().json(image))
}

/// `DELETE /api/admin/machines/{id}/images/{image_id}`
async fn remove_image(
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, ServiceError> {
    let (id, image_id) = path.into_inner();
    state.store.write(|tx| delete_machine_image(tx, id, image_id))?;
    Ok(HttpResponse::NoContent().finish())
}

/// `POST /api/admin/machines/{id}/documents`
///
/// Form fields: `file`, `label`.
async fn add_document(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    payload: Multipart,
) -> Result<HttpResponse, ServiceError> {
    let id = id.into_inner();
    state.store.read(|conn| get_machine(conn, id))?;
    let (fields, upload) = upload_parts(&state, payload).await?;

    let mut cleaner = Cleaner::new(&fields);
    let label = cleaner.text("label", true, 120);
    cleaner.finish(())?;

    let path = upload.persist(&state.config.media_root, DOCUMENT_DIR)?;
    let document = state
        .store
        .write(|tx| add_machine_document(tx, id, &label, &path))?;
    Ok(HttpResponse::Created().json(document))
}

/// `DELETE /api/admin/machines/{id}/documents/{document_id}`
async fn remove_document(
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, ServiceError> {
    let (id, document_id) = path.into_inner();
    state
        .store
        .write(|tx| delete_machine_document(tx, id, document_id))?;
    Ok(HttpResponse::NoContent().finish())
}
