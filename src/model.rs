use serde::{Deserialize, Serialize};

pub const VIEW_WATCHLIST: &str = "watchlist";
pub const DEFAULT_VIEW: &str = VIEW_WATCHLIST;
pub const VIEW_SEARCH: &str = "search";
pub const VIEW_DASHBOARD: &str = "dashboard";

const ICON_BASE_URL: &str = "https://assets.coincap.io/assets/icons";

/// One cryptocurrency quote snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub name: String,
    pub symbol: String,
    pub price_usd: f64,
    pub change_percent_24_hr: f64,
    pub market_cap_usd: f64,
}

impl Asset {
    /// Case-insensitive symbol identity used for watchlist uniqueness.
    pub fn same_symbol(&self, symbol: &str) -> bool {
        self.symbol.to_uppercase() == symbol.to_uppercase()
    }

    pub fn format_price(&self) -> String {
        format!("${:.2}", self.price_usd)
    }

    pub fn format_change(&self) -> String {
        if self.change_percent_24_hr > 0.0 {
            format!("+{:.2}% (24Hr)", self.change_percent_24_hr)
        } else {
            format!("{:.2}% (24Hr)", self.change_percent_24_hr)
        }
    }

    /// Market cap in billions, e.g. `$1200.00 B`.
    pub fn format_market_cap(&self) -> String {
        format!("${:.2} B", self.market_cap_usd / 1_000_000_000.0)
    }

    pub fn icon_url(&self) -> String {
        format!("{}/{}@2x.png", ICON_BASE_URL, self.symbol.to_lowercase())
    }
}

/// The persisted aggregate: last active view plus the watchlist, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistRecord {
    pub view: String,
    pub assets: Vec<Asset>,
}

impl Default for WatchlistRecord {
    fn default() -> Self {
        Self {
            view: DEFAULT_VIEW.to_string(),
            assets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddOutcome {
    Added,
    Duplicate,
}
