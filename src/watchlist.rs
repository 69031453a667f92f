use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{AddOutcome, Asset, WatchlistRecord, DEFAULT_VIEW};
use crate::store::{KeyValueStore, RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("asset symbol must not be empty")]
    EmptySymbol,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Turns a stored payload into a valid record. Never fails: anything that
/// cannot be read as a record collapses to [`WatchlistRecord::default`].
///
/// Hard failures (not JSON, not an object, `view` or `assets` present with
/// the wrong type) reject the whole payload. A missing, null or empty field
/// only defaults that field.
pub fn decode_record(raw: &str) -> WatchlistRecord {
    if raw.is_empty() {
        return WatchlistRecord::default();
    }

    let root: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("stored watchlist is not valid JSON, using defaults: {}", e);
            return WatchlistRecord::default();
        }
    };
    let Some(obj) = root.as_object() else {
        warn!("stored watchlist is not an object, using defaults");
        return WatchlistRecord::default();
    };

    let view = match obj.get("view") {
        None | Some(Value::Null) => DEFAULT_VIEW.to_string(),
        Some(Value::String(s)) if s.is_empty() => DEFAULT_VIEW.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            warn!("stored view has unexpected type ({}), using defaults", other);
            return WatchlistRecord::default();
        }
    };

    let assets = match obj.get("assets") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => decode_assets(items),
        Some(_) => {
            warn!("stored assets is not an array, using defaults");
            return WatchlistRecord::default();
        }
    };

    WatchlistRecord { view, assets }
}

fn decode_assets(items: &[Value]) -> Vec<Asset> {
    let mut assets: Vec<Asset> = Vec::with_capacity(items.len());
    for item in items {
        let asset = match serde_json::from_value::<Asset>(item.clone()) {
            Ok(a) if !a.symbol.is_empty() => a,
            Ok(_) => {
                warn!("dropping stored asset with empty symbol");
                continue;
            }
            Err(e) => {
                warn!("dropping malformed stored asset: {}", e);
                continue;
            }
        };
        if assets.iter().any(|a| a.same_symbol(&asset.symbol)) {
            warn!("dropping duplicate stored asset {}", asset.symbol);
            continue;
        }
        assets.push(asset);
    }
    assets
}

/// The user's watchlist, persisted through a [`RecordStore`] after every
/// mutation.
#[derive(Debug)]
pub struct Watchlist<S> {
    store: RecordStore<S>,
    record: WatchlistRecord,
}

impl<S: KeyValueStore> Watchlist<S> {
    /// Loads the stored record, substituting defaults for anything missing or
    /// corrupt. Defaults are not written back until the next mutation.
    pub fn load_or_default(store: S) -> Self {
        let store = RecordStore::new(store);
        let record = match store.load() {
            Ok(Some(raw)) => decode_record(&raw),
            Ok(None) => WatchlistRecord::default(),
            Err(e) => {
                warn!("could not read stored watchlist, using defaults: {}", e);
                WatchlistRecord::default()
            }
        };
        debug!(view = %record.view, assets = record.assets.len(), "watchlist loaded");
        Self { store, record }
    }

    /// Prepends `asset` unless an entry with the same symbol (ignoring case)
    /// already exists. Only an actual insert is persisted.
    pub fn add(&mut self, asset: Asset) -> Result<AddOutcome, WatchlistError> {
        if asset.symbol.is_empty() {
            return Err(WatchlistError::EmptySymbol);
        }
        if self.contains(&asset.symbol) {
            debug!(symbol = %asset.symbol, "asset already on watchlist");
            return Ok(AddOutcome::Duplicate);
        }

        let symbol = asset.symbol.clone();
        let mut next = self.record.clone();
        next.assets.insert(0, asset);
        self.commit(next)?;
        debug!(symbol = %symbol, "asset added to watchlist");
        Ok(AddOutcome::Added)
    }

    /// Removes every entry matching `symbol` (ignoring case) and persists,
    /// even when nothing matched.
    pub fn remove(&mut self, symbol: &str) -> Result<usize, WatchlistError> {
        let mut next = self.record.clone();
        next.assets.retain(|a| !a.same_symbol(symbol));
        let removed = self.record.assets.len() - next.assets.len();
        self.commit(next)?;
        debug!(symbol, removed, "watchlist remove");
        Ok(removed)
    }

    pub fn list(&self) -> &[Asset] {
        &self.record.assets
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.record.assets.iter().any(|a| a.same_symbol(symbol))
    }

    pub fn view(&self) -> &str {
        &self.record.view
    }

    /// Records the last active view. Returns whether anything was written.
    pub fn set_view(&mut self, view: &str) -> Result<bool, WatchlistError> {
        let view = if view.is_empty() { DEFAULT_VIEW } else { view };
        if self.record.view == view {
            return Ok(false);
        }
        let next = WatchlistRecord {
            view: view.to_string(),
            assets: self.record.assets.clone(),
        };
        self.commit(next)?;
        Ok(true)
    }

    /// Persists `next` and only then makes it the in-memory record, so a
    /// failed write leaves the model matching the store.
    fn commit(&mut self, next: WatchlistRecord) -> Result<(), WatchlistError> {
        self.store.save(&next)?;
        self.record = next;
        Ok(())
    }

    pub fn record(&self) -> &WatchlistRecord {
        &self.record
    }

    pub fn store(&self) -> &S {
        self.store.inner()
    }
}
