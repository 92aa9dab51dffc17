//! Stylesheets and scripts compiled into the binary.

use actix_web::web::{get, resource, ServiceConfig};
use actix_web::{http::header, web, HttpResponse};
use include_dir::{include_dir, Dir};
use mime_guess::from_path;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static");

pub fn configure_routes(cfg: &mut ServiceConfig) {
    cfg.service(resource("/static/{path:.*}").route(get().to(serve_embedded)));
}

/// `GET /static/{path}`
async fn serve_embedded(path: web::Path<String>) -> HttpResponse {
    let file_path = path.trim_start_matches('/');
    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .insert_header((header::CACHE_CONTROL, "public, max-age=3600"))
                .body(file.contents().to_vec())
        }
        None => HttpResponse::NotFound().body("Not Found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn serves_embedded_files_with_their_type() {
        let app = test::init_service(App::new().configure(configure_routes)).await;

        let req = test::TestRequest::get().uri("/static/css/site.css").to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());
        let content_type = res.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/css"));

        let req = test::TestRequest::get().uri("/static/nope.js").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 404);
    }
}
