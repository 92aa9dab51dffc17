use super::flash::{self, Flash};
use super::views::{FormState, Layout, RequestForm};
use super::{redirect, render, respond};
use crate::services::media::read_submission;
use crate::services::requests::intake;
use crate::services::ServiceError;
use crate::store::Resource;
use crate::AppState;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use askama::Template;
use common::forms::FieldErrors;
use common::model::catalogue::Industry;
use std::collections::HashMap;

const FORM_ACTION: &str = "/custom-request/";

#[derive(Template)]
#[template(path = "custom_request.html")]
struct RequestPage {
    layout: Layout,
    form: RequestForm,
}

async fn request_page(
    req: &HttpRequest,
    state: &AppState,
    status: StatusCode,
    form_state: FormState,
) -> Result<HttpResponse, ServiceError> {
    let settings = state.settings.snapshot().await;
    let industries = state.store.read(Industry::list)?;
    let page = RequestPage {
        layout: Layout::new(settings, flash::pending(req)),
        form: RequestForm::new(FORM_ACTION, form_state, &industries),
    };
    render(req, status, &page)
}

/// `GET /custom-request/`, optionally pre-filled with `?machine_type=`.
pub async fn form(
    req: HttpRequest,
    query: web::Query<HashMap<String, String>>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let initial = query
        .get("machine_type")
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| HashMap::from([("machine_type".to_string(), v.to_string())]))
        .unwrap_or_default();
    let form_state = FormState::new(initial, FieldErrors::new());
    respond(request_page(&req, &state, StatusCode::OK, form_state).await)
}

/// `POST /custom-request/`
///
/// Redirects to the thank-you page once stored, whatever happened to the
/// notification email. Invalid input re-renders the form with its errors.
pub async fn process(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> HttpResponse {
    let mut parts = match read_submission(&req, payload, &state.config.media_root).await {
        Ok(parts) => parts,
        Err(e) => return respond(Err(e)),
    };
    let attachment = parts.take_file("attachment");
    let result = intake::submit(
        &state.store,
        &state.notifier,
        &state.config.media_root,
        &parts.fields,
        attachment,
    )
    .await;

    match result {
        Ok(_) => redirect("/request/thanks/", &[Flash::RequestThanks]),
        Err(ServiceError::Validation(errors)) => respond(
            request_page(
                &req,
                &state,
                StatusCode::BAD_REQUEST,
                FormState::new(parts.fields, errors),
            )
            .await,
        ),
        Err(e) => respond(Err(e)),
    }
}
