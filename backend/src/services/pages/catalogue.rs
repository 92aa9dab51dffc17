use super::flash;
use super::pagination::{querystring_without_page, Page, PAGE_SIZE};
use super::views::{FilterForm, FormState, Layout, MachineCard};
use super::{render, respond};
use crate::services::ServiceError;
use crate::store::catalogue::filter_machines;
use crate::store::{Resource, StoreError};
use crate::AppState;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use askama::Template;
use common::forms::FieldErrors;
use common::model::catalogue::{Category, Industry};
use common::requests::machine_filter::MachineFilter;
use std::collections::{HashMap, HashSet};

#[derive(Template)]
#[template(path = "catalogue.html")]
struct CataloguePage {
    layout: Layout,
    filter: FilterForm,
    machines: Vec<MachineCard>,
    page: Page,
    querystring: String,
}

struct PageLink {
    number: usize,
    url: String,
    current: bool,
}

impl CataloguePage {
    fn link(&self, number: usize) -> String {
        if self.querystring.is_empty() {
            format!("?page={}", number)
        } else {
            format!("?{}&page={}", self.querystring, number)
        }
    }

    fn previous_link(&self) -> String {
        self.link(self.page.previous_number())
    }

    fn next_link(&self) -> String {
        self.link(self.page.next_number())
    }

    fn page_links(&self) -> Vec<PageLink> {
        self.page
            .numbers()
            .into_iter()
            .map(|number| PageLink {
                number,
                url: self.link(number),
                current: number == self.page.number,
            })
            .collect()
    }
}

/// `GET /catalogue/`
///
/// An invalid filter shows the whole catalogue next to the field errors.
pub async fn process(
    req: HttpRequest,
    query: web::Query<HashMap<String, String>>,
    state: web::Data<AppState>,
) -> HttpResponse {
    respond(catalogue(&req, &query, &state).await)
}

async fn catalogue(
    req: &HttpRequest,
    query: &HashMap<String, String>,
    state: &AppState,
) -> Result<HttpResponse, ServiceError> {
    let settings = state.settings.snapshot().await;
    let (categories, industries, machines, errors) = state.store.read(|conn| {
        let categories = Category::list(conn)?;
        let industries = Industry::list(conn)?;
        let category_ids: HashSet<i64> = categories.iter().map(|c| c.id).collect();
        let industry_ids: HashSet<i64> = industries.iter().map(|i| i.id).collect();

        let (filter, errors) = match MachineFilter::clean(
            query,
            |id| category_ids.contains(&id),
            |id| industry_ids.contains(&id),
        ) {
            Ok(filter) => (filter, FieldErrors::new()),
            Err(errors) => (MachineFilter::default(), errors),
        };
        let machines = filter_machines(conn, &filter)?;
        Ok::<_, StoreError>((categories, industries, machines, errors))
    })?;

    let page = Page::resolve(
        query.get("page").map(String::as_str),
        machines.len(),
        PAGE_SIZE,
    )
    .ok_or(StoreError::NotFound)?;

    let view = CataloguePage {
        layout: Layout::new(settings, flash::pending(req)),
        machines: MachineCard::list(page.slice(&machines), &categories),
        filter: FilterForm::new(
            FormState::new(query.clone(), errors),
            &categories,
            &industries,
        ),
        querystring: querystring_without_page(query),
        page,
    };
    render(req, StatusCode::OK, &view)
}
