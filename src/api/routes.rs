use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json, response::Result,
};
use serde::{Deserialize, Serialize};

use crate::api::SharedState;
use crate::fetch::FetchError;
use crate::model::{AddOutcome, Asset, WatchlistRecord};
use crate::watchlist::WatchlistError;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveResponse {
    pub removed: usize,
}

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    pub view: String,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub assets: Vec<Asset>,
    /// True when the listing is the last good snapshot after a failed fetch.
    pub stale: bool,
}

type ApiResult<T> = Result<T, (StatusCode, String)>;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

pub async fn get_watchlist(State(state): State<SharedState>) -> Json<WatchlistRecord> {
    Json(state.watchlist.lock().record().clone())
}

pub async fn add_asset(
    State(state): State<SharedState>,
    Json(asset): Json<Asset>,
) -> ApiResult<(StatusCode, Json<WatchlistRecord>)> {
    let symbol = asset.symbol.clone();
    let mut watchlist = state.watchlist.lock();

    match watchlist.add(asset) {
        Ok(AddOutcome::Added) => Ok((StatusCode::CREATED, Json(watchlist.record().clone()))),
        Ok(AddOutcome::Duplicate) => Err((
            StatusCode::CONFLICT,
            format!("The asset {} is already on your watchlist.", symbol),
        )),
        Err(err) => Err(watchlist_error(err)),
    }
}

pub async fn remove_asset(
    Path(symbol): Path<String>,
    State(state): State<SharedState>,
) -> ApiResult<Json<RemoveResponse>> {
    let removed = state
        .watchlist
        .lock()
        .remove(&symbol)
        .map_err(watchlist_error)?;
    Ok(Json(RemoveResponse { removed }))
}

pub async fn set_view(
    State(state): State<SharedState>,
    Json(req): Json<ViewRequest>,
) -> ApiResult<Json<WatchlistRecord>> {
    let mut watchlist = state.watchlist.lock();
    watchlist.set_view(&req.view).map_err(watchlist_error)?;
    Ok(Json(watchlist.record().clone()))
}

pub async fn search(
    Path(name): Path<String>,
    State(state): State<SharedState>,
) -> ApiResult<Json<Asset>> {
    match state.client.fetch_asset(&name).await {
        Ok(Some(asset)) => Ok(Json(asset)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            "Crypto name not found or invalid.".to_string(),
        )),
        Err(FetchError::EmptyQuery) => Err((
            StatusCode::BAD_REQUEST,
            "Please enter a valid crypto name.".to_string(),
        )),
        Err(err) => {
            tracing::error!("Failed to look up {}: {}", name, err);
            Err((
                StatusCode::BAD_GATEWAY,
                "Error fetching data. Please check the cryptocurrency name and try again.".to_string(),
            ))
        }
    }
}

pub async fn get_dashboard(
    Query(params): Query<DashboardQuery>,
    State(state): State<SharedState>,
) -> ApiResult<Json<DashboardResponse>> {
    let limit = params.limit.unwrap_or(state.dashboard_limit).clamp(1, 100);
    let token = state.dashboard.begin();

    match state.client.fetch_top_assets(limit).await {
        Ok(assets) => {
            if !state.dashboard.complete(token, &assets) {
                tracing::debug!("dashboard response superseded, not cached");
            }
            Ok(Json(DashboardResponse {
                assets,
                stale: false,
            }))
        }
        Err(err) => {
            tracing::error!("Failed to fetch dashboard assets: {}", err);
            match state.dashboard.last(limit as usize) {
                Some(assets) => Ok(Json(DashboardResponse {
                    assets,
                    stale: true,
                })),
                None => Err((
                    StatusCode::BAD_GATEWAY,
                    "Error fetching dashboard assets!".to_string(),
                )),
            }
        }
    }
}

fn watchlist_error(err: WatchlistError) -> (StatusCode, String) {
    match err {
        WatchlistError::EmptySymbol => (StatusCode::BAD_REQUEST, err.to_string()),
        WatchlistError::Store(store_err) => {
            tracing::error!("Failed to persist watchlist: {}", store_err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}
