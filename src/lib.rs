pub mod api;
pub mod commands;
pub mod config;
pub mod export;
pub mod fetch;
pub mod model;
pub mod request;
pub mod store;
pub mod telemetry;
pub mod watchlist;

pub use config::AppConfig;
pub use export::{generate_filename, save_to_csv};
pub use fetch::{parse_asset_object, CoinCapClient, FetchError};
pub use model::{AddOutcome, Asset, WatchlistRecord};
pub use store::{FileStore, KeyValueStore, MemoryStore, RecordStore, StoreError, STORAGE_KEY};
pub use watchlist::{decode_record, Watchlist, WatchlistError};
