pub mod routes;

use axum::{
    routing::{delete, get, put},
    Router,
};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::fetch::CoinCapClient;
use crate::model::Asset;
use crate::request::{RequestToken, RequestTracker};
use crate::store::KeyValueStore;
use crate::watchlist::Watchlist;

pub type DynWatchlist = Watchlist<Box<dyn KeyValueStore>>;

/// Everything the handlers share. The watchlist lock is only ever taken for
/// synchronous work, never across an `.await`.
pub struct AppState {
    pub watchlist: Mutex<DynWatchlist>,
    pub client: CoinCapClient,
    pub dashboard: DashboardCache,
    pub dashboard_limit: u32,
}

impl AppState {
    pub fn new(watchlist: DynWatchlist, client: CoinCapClient, dashboard_limit: u32) -> Self {
        Self {
            watchlist: Mutex::new(watchlist),
            client,
            dashboard: DashboardCache::default(),
            dashboard_limit,
        }
    }
}

pub type SharedState = Arc<AppState>;

/// Last good dashboard listing. A fetch only replaces it while its token is
/// still the newest one issued.
#[derive(Default)]
pub struct DashboardCache {
    tracker: RequestTracker,
    snapshot: RwLock<Option<Vec<Asset>>>,
}

impl DashboardCache {
    pub fn begin(&self) -> RequestToken {
        self.tracker.issue()
    }

    /// Returns false when a newer request superseded `token`.
    pub fn complete(&self, token: RequestToken, assets: &[Asset]) -> bool {
        let mut snapshot = self.snapshot.write();
        if !self.tracker.is_current(token) {
            return false;
        }
        *snapshot = Some(assets.to_vec());
        true
    }

    pub fn last(&self, limit: usize) -> Option<Vec<Asset>> {
        self.snapshot
            .read()
            .as_ref()
            .map(|assets| assets.iter().take(limit).cloned().collect())
    }
}

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/watchlist", get(routes::get_watchlist).post(routes::add_asset))
        .route("/watchlist/{symbol}", delete(routes::remove_asset))
        .route("/view", put(routes::set_view))
        .route("/search/{name}", get(routes::search))
        .route("/dashboard", get(routes::get_dashboard))
        .with_state(state)
        .layer(CorsLayer::permissive()) // browser front end is served from another origin
}

pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    tracing::info!("Server running on http://localhost:{}", port);
    axum::serve(listener, app).await?;

    Ok(())
}
