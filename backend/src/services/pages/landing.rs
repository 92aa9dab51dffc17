use super::flash::{self, Flash};
use super::views::{Layout, MachineCard, RequestForm};
use super::{redirect, render, respond};
use crate::services::media::read_submission;
use crate::services::requests::intake;
use crate::services::ServiceError;
use crate::store::catalogue::featured_machines;
use crate::store::{Resource, StoreError};
use crate::AppState;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use askama::Template;
use common::model::catalogue::{Category, Industry};
use common::model::content::{Faq, Partner, ServiceOffering, Testimonial};
use common::model::settings::{HeroMetric, ValueProposition};

const FEATURED_LIMIT: usize = 6;
const TESTIMONIAL_LIMIT: usize = 6;
const FORM_ACTION: &str = "/landing/request/";

#[derive(Template)]
#[template(path = "landing.html")]
struct LandingPage {
    layout: Layout,
    metrics: Vec<HeroMetric>,
    value_props: Vec<ValueProposition>,
    industries: Vec<Industry>,
    services: Vec<ServiceOffering>,
    featured: Vec<MachineCard>,
    testimonials: Vec<Testimonial>,
    partners: Vec<Partner>,
    faqs: Vec<Faq>,
    form: RequestForm,
}

/// `GET /`
pub async fn process(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    respond(landing(&req, &state).await)
}

async fn landing(req: &HttpRequest, state: &AppState) -> Result<HttpResponse, ServiceError> {
    let settings = state.settings.snapshot().await;
    let page = state.store.read(|conn| {
        let categories = Category::list(conn)?;
        let industries = Industry::list(conn)?;
        let featured = featured_machines(conn, FEATURED_LIMIT)?;
        let mut testimonials = Testimonial::list(conn)?;
        testimonials.truncate(TESTIMONIAL_LIMIT);
        Ok::<_, StoreError>(LandingPage {
            layout: Layout::new(settings, flash::pending(req)),
            metrics: HeroMetric::list(conn)?,
            value_props: ValueProposition::list(conn)?,
            services: ServiceOffering::list(conn)?,
            featured: MachineCard::list(&featured, &categories),
            testimonials,
            partners: Partner::list(conn)?,
            faqs: Faq::list(conn)?,
            form: RequestForm::blank(FORM_ACTION, &industries),
            industries,
        })
    })?;
    render(req, StatusCode::OK, &page)
}

/// `POST /landing/request/`
///
/// The quick form has no page of its own: both outcomes go back to the
/// landing page with a flash message.
pub async fn request(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> HttpResponse {
    let result = async {
        let mut parts = read_submission(&req, payload, &state.config.media_root).await?;
        let attachment = parts.take_file("attachment");
        intake::submit(
            &state.store,
            &state.notifier,
            &state.config.media_root,
            &parts.fields,
            attachment,
        )
        .await
    }
    .await;

    match result {
        Ok(_) => redirect("/", &[Flash::RequestThanks, Flash::ShortlistComing]),
        Err(ServiceError::Validation(_)) => redirect("/", &[Flash::FormInvalid]),
        Err(e) => respond(Err(e)),
    }
}
