// ABOUTME: Dashboard JSON API over the engine gateway and the site lifecycle

pub mod error;

pub use error::ApiError;

use crate::config::DevboxConfig;
use crate::containers::{build_summaries, ContainerSummary};
use crate::docker::{DockerClient, EngineExecRunner, UnixTransport};
use crate::sites::{site_records, SiteManager, SiteRecord};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::services::ServeDir;
use tracing::info;

/// Per-request context. Only the environment-file path is shared between
/// requests; the configuration itself is reread on every call so edits take
/// effect without a restart.
#[derive(Clone)]
pub struct AppContext {
    pub env_file: PathBuf,
}

impl AppContext {
    fn config(&self) -> DevboxConfig {
        DevboxConfig::load(&self.env_file)
    }

    fn site_manager(&self, config: DevboxConfig) -> SiteManager<EngineExecRunner<UnixTransport>> {
        let client = DockerClient::new(UnixTransport::new(config.docker_socket()));
        SiteManager::new(config, EngineExecRunner::new(client))
    }
}

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/api/containers", get(list_containers))
        .route("/api/sites", get(list_sites))
        .route("/api/sites", post(create_site))
        .route("/api/sites/{name}", delete(delete_site))
        .route("/api/config", get(get_config))
        .fallback_service(ServeDir::new("public"))
        .with_state(ctx)
}

pub async fn serve(ctx: AppContext, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("dashboard listening on http://localhost:{port}");
    axum::serve(listener, router(ctx)).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateSiteRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SiteLifecycleResponse {
    pub ok: bool,
    pub name: String,
}

async fn list_containers(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<ContainerSummary>>, ApiError> {
    let config = ctx.config();
    let client = DockerClient::new(UnixTransport::new(config.docker_socket()));
    let records = client
        .list_containers(&config.compose_project())
        .await
        .map_err(ApiError::upstream)?;
    Ok(Json(build_summaries(records)))
}

async fn list_sites(State(ctx): State<AppContext>) -> Result<Json<Vec<SiteRecord>>, ApiError> {
    let config = ctx.config();
    let records = site_records(&config).map_err(ApiError::internal)?;
    Ok(Json(records))
}

async fn get_config(State(ctx): State<AppContext>) -> Json<BTreeMap<String, String>> {
    Json(ctx.config().masked())
}

async fn create_site(
    State(ctx): State<AppContext>,
    Json(request): Json<CreateSiteRequest>,
) -> Result<(StatusCode, Json<SiteLifecycleResponse>), ApiError> {
    let manager = ctx.site_manager(ctx.config());
    manager.create_site(&request.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(SiteLifecycleResponse {
            ok: true,
            name: request.name,
        }),
    ))
}

async fn delete_site(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
) -> Result<Json<SiteLifecycleResponse>, ApiError> {
    let manager = ctx.site_manager(ctx.config());
    manager.delete_site(&name).await?;
    Ok(Json(SiteLifecycleResponse { ok: true, name }))
}
