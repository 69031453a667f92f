use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::model::Asset;

const MAX_LIMIT: u32 = 2000;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("please enter a valid crypto name")]
    EmptyQuery,
    #[error("invalid api key header: {0}")]
    InvalidApiKey(String),
    #[error("invalid api url: {0}")]
    InvalidUrl(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Client for the CoinCap asset endpoints.
#[derive(Debug, Clone)]
pub struct CoinCapClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoinCapClient {
    pub fn new(config: &AppConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {}", key.trim()))
                .map_err(|e| FetchError::InvalidApiKey(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("crypto-watchlist/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Looks up one asset by name. A miss is `Ok(None)`, not an error.
    pub async fn fetch_asset(&self, name: &str) -> Result<Option<Asset>, FetchError> {
        let id = name.trim().to_lowercase();
        if id.is_empty() {
            return Err(FetchError::EmptyQuery);
        }

        let url = self.asset_url(&id)?;
        debug!(%url, "fetching asset");
        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(%id, "asset not found");
            return Ok(None);
        }
        let body: Value = response.error_for_status()?.json().await?;

        Ok(body.get("data").and_then(parse_asset_object))
    }

    /// `{base}/assets/{id}` with `id` percent-encoded as a single path segment.
    fn asset_url(&self, id: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(&format!("{}/assets", self.base_url))
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.clone()))?
            .push(id);
        Ok(url)
    }

    /// Top `limit` assets by market cap, in API order.
    pub async fn fetch_top_assets(&self, limit: u32) -> Result<Vec<Asset>, FetchError> {
        let limit = limit.clamp(1, MAX_LIMIT);
        let url = format!("{}/assets", self.base_url);
        debug!(%url, limit, "fetching top assets");

        let body: Value = self
            .http
            .get(&url)
            .query(&[("limit", limit)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let list = body
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| FetchError::Parse("asset listing missing data array".to_string()))?;

        let mut assets = Vec::with_capacity(list.len());
        for item in list {
            match parse_asset_object(item) {
                Some(asset) => assets.push(asset),
                None => warn!("skipping unparseable asset in listing"),
            }
        }
        Ok(assets)
    }
}

/// Maps one CoinCap asset object to an [`Asset`].
///
/// CoinCap encodes numbers as strings; plain JSON numbers are accepted too.
/// `priceUsd` is required, the 24h change and market cap fall back to zero
/// because the API reports them as null for illiquid assets.
pub fn parse_asset_object(v: &Value) -> Option<Asset> {
    let obj = v.as_object()?;
    let name = non_empty_str(obj, "name")?;
    let symbol = non_empty_str(obj, "symbol")?;
    let price_usd = parse_number(obj, "priceUsd")?;

    Some(Asset {
        name,
        symbol,
        price_usd,
        change_percent_24_hr: parse_number(obj, "changePercent24Hr").unwrap_or(0.0),
        market_cap_usd: parse_number(obj, "marketCapUsd").unwrap_or(0.0),
    })
}

fn non_empty_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_number(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    let val = obj.get(key)?;
    let n = match val {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}
