use std::io;
use std::sync::Arc;

use ntex::http::header;
use ntex::util::Bytes;
use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use spdlog::{error, info};

use crate::config::Config;
use crate::controller::Session;
use crate::dispatch::{load_page, submit_page, PageResponse, PageStatus};
use crate::form::parse_create_form;
use crate::query_string::QueryString;
use crate::store::StoreBackend;
use crate::view::templates::Templates;

struct AppState {
    config: Config,
    templates: Templates,
    backend: StoreBackend,
}

impl AppState {
    /// Every request is a fresh page load with its own store snapshot
    fn open_session(&self) -> Session {
        Session::new(self.backend.open(), self.config.defaults.categories.clone(), self.config.defaults.render_mode)
    }
}

fn to_http(response: io::Result<PageResponse>) -> web::HttpResponse {
    match response {
        Ok(PageResponse::Page { status, body }) => {
            let mut builder = match status {
                PageStatus::Ok => web::HttpResponse::Ok(),
                PageStatus::NotFound => web::HttpResponse::NotFound(),
            };
            builder.content_type("text/html; charset=utf-8").body(body)
        }
        Ok(PageResponse::Redirect(location)) => web::HttpResponse::SeeOther()
            .header("Location", location)
            .content_type("text/html; charset=utf-8")
            .finish(),
        Ok(PageResponse::MethodNotAllowed) => web::HttpResponse::MethodNotAllowed().finish(),
        Err(e) => {
            error!("Error rendering page: {}", e);
            web::HttpResponse::InternalServerError()
                .body(format!("Error rendering page: {}", e))
        }
    }
}

async fn serve_page(req: &HttpRequest, state: &AppState) -> web::HttpResponse {
    let mut session = state.open_session();
    let query = QueryString::from_opt(req.uri().query());
    let res = load_page(&mut session, &state.templates, &state.config.site.title, req.path(), &query).await;
    to_http(res)
}

#[web::get("/")]
async fn index(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    serve_page(&req, &state).await
}

#[web::get("/{page}")]
async fn page(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    serve_page(&req, &state).await
}

#[web::post("/{page}")]
async fn submit(req: HttpRequest, body: Bytes, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let content_type = req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let form = parse_create_form(content_type, body.to_vec()).await;

    let mut session = state.open_session();
    let res = submit_page(&mut session, &state.templates, &state.config.site.title, req.path(), form).await;
    to_http(res)
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> Result<NamedFile, web::Error> {
    if path.contains("../") {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let file_path = state.config.paths.public_dir.join(path.into_inner());
    Ok(NamedFile::open(file_path)?)
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let templates = Templates::load(config.paths.template_dir.as_deref())?;
    let backend = StoreBackend::from_config(&config)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    info!("Serving public files from {}", config.paths.public_dir.display());

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let max_upload_bytes = config.server.max_upload_bytes();
    let app_state = Arc::new(AppState {
        config,
        templates,
        backend,
    });

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .state(web::types::PayloadConfig::new(max_upload_bytes))
            .service(index)
            .service(public_files)
            .service(page)
            .service(submit)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}
