//! One-shot command workflows used by the CLI. Each one fetches before it
//! touches the watchlist, so a failed request leaves the stored record as it was.

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::fetch::{CoinCapClient, FetchError};
use crate::model::{AddOutcome, Asset, VIEW_DASHBOARD, VIEW_SEARCH, VIEW_WATCHLIST};
use crate::store::KeyValueStore;
use crate::watchlist::Watchlist;

/// Looks up `name`, mapping a miss and an empty query to user-facing errors.
pub async fn lookup(client: &CoinCapClient, name: &str) -> Result<Asset> {
    match client.fetch_asset(name).await {
        Ok(Some(asset)) => Ok(asset),
        Ok(None) => bail!("Crypto name not found or invalid."),
        Err(FetchError::EmptyQuery) => bail!("Please enter a valid crypto name."),
        Err(e) => Err(anyhow::Error::new(e)
            .context("Error fetching data. Please check the cryptocurrency name and try again.")),
    }
}

/// Looks up `name`. With `add` the result goes onto the watchlist and the
/// watchlist view is recorded, otherwise the search view.
pub async fn search<S: KeyValueStore>(
    client: &CoinCapClient,
    watchlist: &mut Watchlist<S>,
    name: &str,
    add: bool,
) -> Result<(Asset, Option<AddOutcome>)> {
    let asset = lookup(client, name).await?;
    if add {
        let outcome = add_asset(watchlist, asset.clone())?;
        watchlist.set_view(VIEW_WATCHLIST)?;
        Ok((asset, Some(outcome)))
    } else {
        watchlist.set_view(VIEW_SEARCH)?;
        Ok((asset, None))
    }
}

pub fn add_asset<S: KeyValueStore>(watchlist: &mut Watchlist<S>, asset: Asset) -> Result<AddOutcome> {
    let outcome = watchlist.add(asset).context("failed to save watchlist")?;
    Ok(outcome)
}

/// Fetches the top `limit` assets, then records the dashboard view.
pub async fn dashboard<S: KeyValueStore>(
    client: &CoinCapClient,
    watchlist: &mut Watchlist<S>,
    limit: u32,
) -> Result<Vec<Asset>> {
    let assets = client
        .fetch_top_assets(limit)
        .await
        .context("Error fetching dashboard assets!")?;
    watchlist.set_view(VIEW_DASHBOARD)?;
    debug!(count = assets.len(), "dashboard loaded");
    Ok(assets)
}
