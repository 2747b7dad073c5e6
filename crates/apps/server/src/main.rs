use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path as AxumPath, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod avs;
mod scenes;

use avs::{AvsError, ImageStore};
use scenes::SceneCatalog;

#[derive(Clone)]
struct AppState {
    catalog: Arc<SceneCatalog>,
    images: Arc<ImageStore>,
    assets: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let addr: SocketAddr = env::var("AVS_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:9200".to_string())
        .parse()?;
    let assets = env::var("AVS_ASSETS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("assets"));

    let mut catalog = SceneCatalog::builtin();
    catalog.load_dir(&assets).await;
    info!("serving scenes: {:?}", catalog.names());

    let state = AppState {
        catalog: Arc::new(catalog),
        images: Arc::new(ImageStore::default()),
        assets,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/avs", post(post_avs))
        .route("/scenes", get(get_scenes))
        .route("/scenes/:name", get(get_scene_file))
        .route("/images/:name", get(get_image))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("visualization server listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_scenes(State(state): State<AppState>) -> Response {
    Json(json!({ "scenes": state.catalog.names() })).into_response()
}

/// Protocol errors are answered with status 200 and an `error` payload.
async fn post_avs(State(state): State<AppState>, body: String) -> Response {
    let out = match serde_json::from_str(&body) {
        Ok(value) => avs::respond(&state.catalog, &state.images, value),
        Err(err) => AvsError::Malformed(err.to_string()).to_payload(),
    };
    Json(out).into_response()
}

async fn get_image(State(state): State<AppState>, AxumPath(name): AxumPath<String>) -> Response {
    if let Some(svg) = state.images.get(&name) {
        return with_content_type(Body::from(svg), "image/svg+xml");
    }
    serve_asset(&state.assets, "images", &name).await
}

/// Pre-rendered scene files for file-load mode (`scene_01.json`, ...).
async fn get_scene_file(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
) -> Response {
    serve_asset(&state.assets, "files", &name).await
}

async fn serve_asset(root: &Path, dir: &str, name: &str) -> Response {
    if name.contains("..") || name.contains('/') {
        return (StatusCode::BAD_REQUEST, "bad asset name").into_response();
    }
    serve_file(&root.join(dir).join(name), content_type_for(name)).await
}

fn content_type_for(name: &str) -> &'static str {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

fn with_content_type(body: Body, content_type: &str) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    (StatusCode::OK, headers, body).into_response()
}

async fn serve_file(path: &Path, content_type: &str) -> Response {
    match tokio::fs::read(path).await {
        Ok(data) => with_content_type(Body::from(data), content_type),
        Err(err) => {
            warn!("file read failed: {path:?} -> {err}");
            (StatusCode::NOT_FOUND, "not found").into_response()
        }
    }
}
