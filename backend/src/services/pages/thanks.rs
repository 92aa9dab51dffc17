use super::flash;
use super::views::Layout;
use super::{render, respond};
use crate::AppState;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use askama::Template;

#[derive(Template)]
#[template(path = "request_thanks.html")]
struct ThanksPage {
    layout: Layout,
}

/// `GET /request/thanks/`
pub async fn process(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let page = ThanksPage {
        layout: Layout::new(state.settings.snapshot().await, flash::pending(&req)),
    };
    respond(render(&req, StatusCode::OK, &page))
}
