use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::Path;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod chart_image;
pub mod collector;
pub mod config;
pub mod error;
pub mod graphql;
pub mod history;
pub mod models;
pub mod page;
pub mod presenter;

use config::SiteConfig;
use error::RenderError;
use presenter::{Dashboard, PageState};

#[derive(Clone)]
struct AppState {
    site: SiteConfig,
}

/// Read and render the history file served from the site directory.
pub async fn local_dashboard(path: &Path, window: usize) -> Result<Dashboard, RenderError> {
    let body = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RenderError::Fetch(format!("{}: {}", path.display(), e)))?;
    let history = presenter::parse_payload(&body)?;
    presenter::render_with_window(history, window)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let result = local_dashboard(&state.site.data_file(), state.site.chart_window).await;
    let page = PageState::Loading.settle(result);
    Html(page::render_page(&page))
}

async fn data_json(State(state): State<AppState>) -> Result<Response, StatusCode> {
    let path = state.site.data_file();
    let file = File::open(&path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            StatusCode::NOT_FOUND
        } else {
            tracing::error!("failed to open {}: {}", path.display(), e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    })?;

    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn chart_png(State(state): State<AppState>) -> Result<Response, StatusCode> {
    let dashboard = local_dashboard(&state.site.data_file(), state.site.chart_window)
        .await
        .map_err(|e| {
            tracing::warn!("no chart to draw: {}", e);
            StatusCode::NOT_FOUND
        })?;

    let png = chart_image::render_chart_png(&dashboard.chart).map_err(|e| {
        tracing::error!("failed to draw chart: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

async fn health_check() -> &'static str {
    "ok"
}

pub fn router(site: SiteConfig) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/index.html", get(index))
        .route("/data.json", get(data_json))
        .route("/chart.png", get(chart_png))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { site })
}

pub async fn run(site: SiteConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], site.port));
    tracing::info!("serving {} on {}", site.site_dir.display(), addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(site)).await?;

    Ok(())
}
