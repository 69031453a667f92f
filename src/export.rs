use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::Writer;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;

use crate::model::Asset;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    position: usize,
    name: &'a str,
    symbol: &'a str,
    price_usd: f64,
    change_percent_24h: f64,
    market_cap_usd: f64,
    exported_at: DateTime<Utc>,
}

/// Writes the watchlist, newest first, as CSV with a header row.
pub fn save_to_csv<P: AsRef<Path>>(assets: &[Asset], file_path: P) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(file_path)?;

    let mut wtr = Writer::from_writer(file);
    let exported_at = Utc::now();

    if assets.is_empty() {
        wtr.write_record([
            "position",
            "name",
            "symbol",
            "price_usd",
            "change_percent_24h",
            "market_cap_usd",
            "exported_at",
        ])?;
    }

    for (i, asset) in assets.iter().enumerate() {
        wtr.serialize(ExportRow {
            position: i + 1,
            name: &asset.name,
            symbol: &asset.symbol,
            price_usd: asset.price_usd,
            change_percent_24h: asset.change_percent_24_hr,
            market_cap_usd: asset.market_cap_usd,
            exported_at,
        })?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn generate_filename() -> String {
    let now = Utc::now();
    format!("watchlist_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let assets = vec![
            Asset {
                name: "Ethereum".into(),
                symbol: "ETH".into(),
                price_usd: 3000.5,
                change_percent_24_hr: -0.5,
                market_cap_usd: 3.6e11,
            },
            Asset {
                name: "Bitcoin".into(),
                symbol: "BTC".into(),
                price_usd: 65000.0,
                change_percent_24_hr: 1.5,
                market_cap_usd: 1.2e12,
            },
        ];

        save_to_csv(&assets, &path).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(&headers[0], "position");
        assert_eq!(&headers[2], "symbol");

        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[0][2], "ETH");
        assert_eq!(&rows[1][2], "BTC");
    }

    #[test]
    fn empty_watchlist_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        save_to_csv(&[], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("position,name,symbol"));
    }

    #[test]
    fn filename_has_timestamp() {
        let name = generate_filename();
        assert!(name.starts_with("watchlist_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "watchlist_20240101_120000.csv".len());
    }
}
