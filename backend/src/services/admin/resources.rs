//! Field-for-field CRUD shared by the simple content tables.
//!
//! `routes::<R>("/faqs")` mounts:
//! - `GET /faqs`, `POST /faqs`
//! - `GET /faqs/{id}`, `PUT /faqs/{id}`, `DELETE /faqs/{id}`

use crate::services::ServiceError;
use crate::store::Resource;
use crate::AppState;
use actix_web::web::{self, delete, get, post, put, resource, ServiceConfig};
use actix_web::HttpResponse;
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn routes<R>(path: &'static str) -> impl FnOnce(&mut ServiceConfig)
where
    R: Resource + Serialize + DeserializeOwned + 'static,
{
    move |cfg| {
        cfg.service(
            resource(path)
                .route(get().to(list::<R>))
                .route(post().to(create::<R>)),
        )
        .service(
            resource(format!("{}/{{id}}", path))
                .route(get().to(fetch::<R>))
                .route(put().to(update::<R>))
                .route(delete().to(remove::<R>)),
        );
    }
}

/// Runs the checks that need the database and fails with their errors.
fn check<R: Resource>(row: &R, conn: &rusqlite::Connection) -> Result<(), ServiceError> {
    let errors = row.check_references(conn)?;
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(errors))
    }
}

async fn list<R>(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError>
where
    R: Resource + Serialize,
{
    let rows = state.store.read(R::list)?;
    Ok(HttpResponse::Ok().json(rows))
}

async fn fetch<R>(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse, ServiceError>
where
    R: Resource + Serialize,
{
    let id = id.into_inner();
    let row = state.store.read(|conn| R::get(conn, id))?;
    Ok(HttpResponse::Ok().json(row))
}

async fn create<R>(state: web::Data<AppState>, body: web::Json<R>) -> Result<HttpResponse, ServiceError>
where
    R: Resource + Serialize,
{
    let mut row = body.into_inner();
    row.prepare()?;
    let saved = state.store.write(|tx| {
        check(&row, tx)?;
        let id = row.insert(tx)?;
        Ok::<_, ServiceError>(R::get(tx, id)?)
    })?;
    info!("Admin created a row in {}", R::TABLE);
    Ok(HttpResponse::Created().json(saved))
}

async fn update<R>(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<R>,
) -> Result<HttpResponse, ServiceError>
where
    R: Resource + Serialize,
{
    let id = id.into_inner();
    let mut row = body.into_inner();
    row.prepare()?;
    let saved = state.store.write(|tx| {
        check(&row, tx)?;
        row.update(tx, id)?;
        Ok::<_, ServiceError>(R::get(tx, id)?)
    })?;
    Ok(HttpResponse::Ok().json(saved))
}

async fn remove<R: Resource>(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let id = id.into_inner();
    state.store.write(|tx| R::delete(tx, id))?;
    info!("Admin deleted row {} from {}", id, R::TABLE);
    Ok(HttpResponse::NoContent().finish())
}
