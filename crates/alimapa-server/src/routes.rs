//! Route handlers for the map API.

use std::sync::Arc;

use alimapa_core::model::{Agent, House, School, SchoolPatch};
use alimapa_core::{FilterState, filter_houses, filter_schools};
use alimapa_store::{MemStore, StoreError};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, RawQuery, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::info;

use crate::ApiError;

/// Shared handler state: the store behind a single writer lock.
///
/// One lock is the whole concurrency story. A patch holds the write guard
/// for its full read-merge-write, so concurrent partial updates cannot lose
/// fields to each other.
pub struct AppState {
    pub store: RwLock<MemStore>,
}

impl AppState {
    pub fn new(store: MemStore) -> Arc<Self> {
        Arc::new(Self {
            store: RwLock::new(store),
        })
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/schools", get(list_schools))
        .route("/api/schools/{id}", patch(update_school))
        .route("/api/houses", get(list_houses))
        .route("/api/agents", get(list_agents))
        .with_state(state)
}

/// Bind `addr` and serve the API until the process ends.
pub async fn serve(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "API listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Filter parameters share the viewer URL's tolerant parsing: missing,
/// unrecognized, or duplicated values mean "all", never a rejected request.
fn viewer_filters(query: Option<&str>) -> FilterState {
    FilterState::from_query(query.unwrap_or_default())
}

async fn list_schools(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Json<Vec<School>> {
    let filter = viewer_filters(query.as_deref()).school;
    let schools = state.store.read().await.schools();
    Json(filter_schools(schools, filter))
}

async fn list_houses(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Json<Vec<House>> {
    let filter = viewer_filters(query.as_deref()).house;
    let houses = state.store.read().await.houses();
    Json(filter_houses(houses, filter))
}

async fn list_agents(State(state): State<Arc<AppState>>) -> Json<Vec<Agent>> {
    Json(state.store.read().await.agents())
}

async fn update_school(
    State(state): State<Arc<AppState>>,
    path: Result<Path<u32>, PathRejection>,
    body: Result<Json<SchoolPatch>, JsonRejection>,
) -> Result<Json<School>, ApiError> {
    // A non-numeric id is an id that matches nothing.
    let Path(id) = path.map_err(|_| ApiError::NotFound("School"))?;
    let Json(patch) = body.map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;
    let updated = state
        .store
        .write()
        .await
        .update_school(id, patch)
        .map_err(|err| match err {
            StoreError::NotFound(_) => ApiError::NotFound("School"),
            other => ApiError::Internal(other.to_string()),
        })?;
    Ok(Json(updated))
}
