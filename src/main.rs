use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crypto_watchlist::api::{self, AppState};
use crypto_watchlist::commands;
use crypto_watchlist::model::VIEW_WATCHLIST;
use crypto_watchlist::{
    generate_filename, save_to_csv, telemetry, AddOutcome, AppConfig, Asset, CoinCapClient,
    FileStore, KeyValueStore, Watchlist,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the watchlist store
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// CoinCap REST base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the saved watchlist
    List,
    /// Look up one asset by name
    Search {
        name: String,
        /// Add the result to the watchlist
        #[arg(long, default_value_t = false)]
        add: bool,
    },
    /// Look up an asset by name and add it to the watchlist
    Add { name: String },
    /// Remove an asset from the watchlist by symbol
    Remove { symbol: String },
    /// Show the top assets by market cap
    Dashboard {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Write the watchlist to a CSV file
    Export {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Serve the watchlist over a local JSON API
    Serve {
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(url) = cli.api_url {
        config = config.with_base_url(url);
    }
    let store = FileStore::new(&config.data_dir);

    match cli.command {
        Command::Serve { port } => {
            let store: Box<dyn KeyValueStore> = Box::new(store);
            let watchlist = Watchlist::load_or_default(store);
            let client = CoinCapClient::new(&config)?;
            api::start_server(AppState::new(watchlist, client, config.dashboard_limit), port).await
        }
        command => run(command, &config, Watchlist::load_or_default(store)).await,
    }
}

async fn run<S: KeyValueStore>(
    command: Command,
    config: &AppConfig,
    mut watchlist: Watchlist<S>,
) -> Result<()> {
    match command {
        Command::List => {
            watchlist.set_view(VIEW_WATCHLIST)?;
            print_watchlist(watchlist.list());
        }
        Command::Search { name, add } => {
            let client = CoinCapClient::new(config)?;
            match commands::search(&client, &mut watchlist, &name, add).await? {
                (asset, Some(outcome)) => {
                    print_add_outcome(&asset, outcome);
                    print_watchlist(watchlist.list());
                }
                (asset, None) => print_card(&asset),
            }
        }
        Command::Add { name } => {
            let client = CoinCapClient::new(config)?;
            let asset = commands::lookup(&client, &name).await?;
            let outcome = commands::add_asset(&mut watchlist, asset.clone())?;
            print_add_outcome(&asset, outcome);
        }
        Command::Remove { symbol } => {
            let removed = watchlist
                .remove(&symbol)
                .context("failed to save watchlist")?;
            if removed == 0 {
                println!("{} is not on your watchlist.", symbol.to_uppercase());
            } else {
                println!("Removed {} from your watchlist.", symbol.to_uppercase());
            }
        }
        Command::Dashboard { limit } => {
            let client = CoinCapClient::new(config)?;
            let limit = limit.unwrap_or(config.dashboard_limit);
            let assets = commands::dashboard(&client, &mut watchlist, limit).await?;
            print_assets(&assets);
        }
        Command::Export { output } => {
            let path = output.unwrap_or_else(|| PathBuf::from(generate_filename()));
            save_to_csv(watchlist.list(), &path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Watchlist saved to: {}", path.display());
        }
        Command::Serve { port } => bail!("serve (port {port}) is not a one-shot command"),
    }

    Ok(())
}

fn print_add_outcome(asset: &Asset, outcome: AddOutcome) {
    match outcome {
        AddOutcome::Added => println!("Added {} to your watchlist.", asset.symbol),
        AddOutcome::Duplicate => {
            println!("The asset {} is already on your watchlist.", asset.symbol)
        }
    }
}

fn print_watchlist(assets: &[Asset]) {
    if assets.is_empty() {
        println!("Your watchlist is empty. Add some crypto!");
        return;
    }
    print_assets(assets);
}

fn print_assets(assets: &[Asset]) {
    println!("{:<4} {:<18} {:<8} {:>14} {:>16} {:>14}", "#", "Name", "Symbol", "Price(USD)", "24h", "MktCap");
    println!("{}", "-".repeat(79));
    for (i, a) in assets.iter().enumerate() {
        println!(
            "{:<4} {:<18} {:<8} {:>14} {:>16} {:>14}",
            i + 1,
            a.name,
            a.symbol,
            a.format_price(),
            a.format_change(),
            a.format_market_cap(),
        );
    }
}

fn print_card(asset: &Asset) {
    println!("{} ({})", asset.name, asset.symbol);
    println!("  Price       {}", asset.format_price());
    println!("  24h Change  {}", asset.format_change());
    println!("  Market Cap  {}", asset.format_market_cap());
}
