use super::flash;
use super::views::{category_names, media_url, Layout, MachineCard, RequestForm};
use super::{render, respond};
use crate::services::ServiceError;
use crate::store::catalogue::{
    get_machine_by_slug, industries_of, machine_documents, machine_images, related_machines,
};
use crate::store::{Resource, StoreError};
use crate::AppState;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use askama::Template;
use common::model::catalogue::{Category, Industry, Machine};

const RELATED_LIMIT: usize = 4;

struct GalleryImage {
    url: String,
    caption: String,
}

struct DocumentLink {
    label: String,
    url: String,
}

#[derive(Template)]
#[template(path = "machine_detail.html")]
struct DetailPage {
    layout: Layout,
    machine: Machine,
    card: MachineCard,
    brochure: String,
    images: Vec<GalleryImage>,
    documents: Vec<DocumentLink>,
    industries: Vec<Industry>,
    related: Vec<MachineCard>,
    form: RequestForm,
}

/// `GET /catalogue/{slug}/`
pub async fn process(
    req: HttpRequest,
    slug: web::Path<String>,
    state: web::Data<AppState>,
) -> HttpResponse {
    respond(detail(&req, &slug, &state).await)
}

async fn detail(req: &HttpRequest, slug: &str, state: &AppState) -> Result<HttpResponse, ServiceError> {
    let settings = state.settings.snapshot().await;
    let page = state.store.read(|conn| {
        let machine = get_machine_by_slug(conn, slug)?;
        let categories = Category::list(conn)?;
        let names = category_names(&categories);
        let related = related_machines(conn, &machine, RELATED_LIMIT)?;
        let images = machine_images(conn, machine.id)?
            .into_iter()
            .map(|image| GalleryImage {
                url: media_url(&image.image),
                caption: image.caption,
            })
            .collect();
        let documents = machine_documents(conn, machine.id)?
            .into_iter()
            .map(|document| DocumentLink {
                label: document.label,
                url: media_url(&document.document),
            })
            .collect();
        let form = RequestForm::with_initial(
            "/custom-request/",
            &[("machine_type", machine.name.as_str())],
            &Industry::list(conn)?,
        );

        Ok::<_, StoreError>(DetailPage {
            layout: Layout::new(settings, flash::pending(req)),
            card: MachineCard::new(&machine, &names),
            brochure: machine.brochure.as_deref().map(media_url).unwrap_or_default(),
            images,
            documents,
            industries: industries_of(conn, machine.id)?,
            related: related.iter().map(|m| MachineCard::new(m, &names)).collect(),
            form,
            machine,
        })
    })?;
    render(req, StatusCode::OK, &page)
}
