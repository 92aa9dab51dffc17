use crate::services::requests::status;
use crate::services::ServiceError;
use crate::store::requests::{delete_request, get_request, list_requests, status_logs};
use crate::store::StoreError;
use crate::AppState;
use actix_web::web::{self, delete, get, patch, resource, ServiceConfig};
use actix_web::HttpResponse;
use common::model::custom_request::{CustomRequest, RequestStatus, RequestStatusLog};
use common::requests::admin::RequestUpdate;
use log::info;
use serde::{Deserialize, Serialize};

pub fn configure_routes(cfg: &mut ServiceConfig) {
    cfg.service(resource("/requests").route(get().to(list)))
        .service(
            resource("/requests/{id}")
                .route(get().to(fetch))
                .route(patch().to(update))
                .route(delete().to(remove)),
        );
}

#[derive(Deserialize)]
struct ListQuery {
    status: Option<RequestStatus>,
}

#[derive(Serialize)]
struct RequestDetail {
    #[serde(flatten)]
    request: CustomRequest,
    /// Newest first.
    status_logs: Vec<RequestStatusLog>,
}

#[derive(Serialize)]
struct UpdateResult {
    request: CustomRequest,
    logged: Option<RequestStatusLog>,
}

/// `GET /api/admin/requests[?status=new]`, newest first.
async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let requests = state.store.read(|conn| list_requests(conn, query.status))?;
    Ok(HttpResponse::Ok().json(requests))
}

/// `GET /api/admin/requests/{id}`
async fn fetch(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse, ServiceError> {
    let id = id.into_inner();
    let detail = state.store.read(|conn| {
        Ok::<_, StoreError>(RequestDetail {
            request: get_request(conn, id)?,
            status_logs: status_logs(conn, id)?,
        })
    })?;
    Ok(HttpResponse::Ok().json(detail))
}

/// `PATCH /api/admin/requests/{id}`
///
/// Body: any of `status`, `internal_notes` and `comment`. The response says
/// which log row, if any, the change appended.
async fn update(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<RequestUpdate>,
) -> Result<HttpResponse, ServiceError> {
    let updated = status::apply(&state.store, id.into_inner(), &body)?;
    Ok(HttpResponse::Ok().json(UpdateResult {
        request: updated.request,
        logged: updated.logged,
    }))
}

/// `DELETE /api/admin/requests/{id}` removes the request and its trail.
async fn remove(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse, ServiceError> {
    let id = id.into_inner();
    state.store.write(|tx| delete_request(tx, id))?;
    info!("Request {} deleted", id);
    Ok(HttpResponse::NoContent().finish())
}
