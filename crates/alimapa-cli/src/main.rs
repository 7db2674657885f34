//! Command-line entry point: seed, serve, geocode, and inspect the datasets.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use alimapa_core::urlstate::FilterState;
use alimapa_core::{HouseFilter, SchoolFilter};
use alimapa_geo::GeocodeClient;
use alimapa_server::AppState;
use alimapa_store::{MemStore, StoreError, load_houses_file, load_schools_file};

#[derive(Parser)]
#[command(name = "alimapa", version, about = "School and rental map backend for Alicante")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the in-memory store from the datasets and serve the JSON API
    Serve {
        /// Listen address
        #[arg(long, env = "ALIMAPA_ADDR", default_value = "127.0.0.1:4000")]
        addr: String,
        /// School dataset (JSON array of seed records)
        #[arg(long, env = "ALIMAPA_SCHOOLS", default_value = "data/schools.json")]
        schools: PathBuf,
        /// Houses dataset: {"houses": [...], "agents": [...]}
        #[arg(long, env = "ALIMAPA_HOUSES", default_value = "data/houses.json")]
        houses: PathBuf,
    },
    /// Fill in missing school coordinates via a Nominatim-compatible geocoder
    Geocode {
        /// School dataset to read
        #[arg(long, default_value = "data/schools.json")]
        schools: PathBuf,
        /// Where to write the updated dataset (defaults to the input file)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Geocoder base URL
        #[arg(long, default_value = "https://nominatim.openstreetmap.org")]
        base_url: String,
        /// City suffix appended to every query
        #[arg(long, default_value = "Alicante, Spain")]
        city: String,
        /// Pause between lookups, in milliseconds
        #[arg(long, default_value_t = 1100)]
        delay_ms: u64,
    },
    /// Print the stats-panel counts for both datasets
    Stats {
        #[arg(long, default_value = "data/schools.json")]
        schools: PathBuf,
        #[arg(long, default_value = "data/houses.json")]
        houses: PathBuf,
    },
    /// Print a shareable viewer link for a filter combination
    Link {
        /// Viewer URL, without a query string
        #[arg(long, default_value = "http://127.0.0.1:4000/")]
        base: String,
        /// all | visited | withoutQuota
        #[arg(long, default_value = "all")]
        school_filter: String,
        /// all | visited | notAvailable
        #[arg(long, default_value = "all")]
        house_filter: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { addr, schools, houses } => serve(&addr, &schools, &houses).await,
        Commands::Geocode { schools, out, base_url, city, delay_ms } => {
            geocode(&schools, out.as_deref(), base_url, city, delay_ms).await
        }
        Commands::Stats { schools, houses } => stats(&schools, &houses),
        Commands::Link { base, school_filter, house_filter } => {
            let state = FilterState::new(
                SchoolFilter::from_param(Some(&school_filter)),
                HouseFilter::from_param(Some(&house_filter)),
            );
            println!("{}", share_link(&base, &state));
            Ok(())
        }
    }
}

async fn serve(addr: &str, schools: &Path, houses: &Path) -> anyhow::Result<()> {
    let store = seed_store(schools, houses)?;
    info!(
        schools = store.school_count(),
        houses = store.house_count(),
        agents = store.agent_count(),
        "store seeded"
    );
    alimapa_server::serve(addr, AppState::new(store)).await
}

/// Build the store from the dataset files. A missing file leaves that family
/// empty; a file that exists but cannot be read or parsed is fatal.
fn seed_store(schools: &Path, houses: &Path) -> anyhow::Result<MemStore> {
    let mut store = MemStore::new();
    match load_schools_file(schools) {
        Ok(seeds) => store.seed_schools(seeds),
        Err(StoreError::DatasetNotFound(path)) => {
            warn!(path = %path.display(), "school dataset missing, starting empty");
        }
        Err(err) => return Err(err).context("reading school dataset"),
    }
    match load_houses_file(houses) {
        Ok(file) => {
            store.seed_agents(file.agents);
            store.seed_houses(file.houses);
        }
        Err(StoreError::DatasetNotFound(path)) => {
            warn!(path = %path.display(), "houses dataset missing, starting empty");
        }
        Err(err) => return Err(err).context("reading houses dataset"),
    }
    Ok(store)
}

async fn geocode(
    schools: &Path,
    out: Option<&Path>,
    base_url: String,
    city: String,
    delay_ms: u64,
) -> anyhow::Result<()> {
    let mut seeds = load_schools_file(schools).context("reading school dataset")?;
    let client = GeocodeClient::new(base_url, city, Duration::from_millis(delay_ms))?;
    let summary = client.fill_missing(&mut seeds).await;

    let out = out.unwrap_or(schools);
    let json = serde_json::to_string_pretty(&seeds)?;
    fs::write(out, json).with_context(|| format!("writing {}", out.display()))?;

    println!(
        "geocoded {}, pinned {} to city center, {} already placed; wrote {}",
        summary.resolved,
        summary.placeholder,
        summary.skipped,
        out.display()
    );
    Ok(())
}

fn stats(schools: &Path, houses: &Path) -> anyhow::Result<()> {
    let seeds = load_schools_file(schools).context("reading school dataset")?;
    let visited = seeds.iter().filter(|s| s.is_visited).count();
    let with_quota = seeds.iter().filter(|s| s.has_quota).count();
    println!(
        "schools: {} total, {visited} visited, {with_quota} with quota",
        seeds.len()
    );

    let file = load_houses_file(houses).context("reading houses dataset")?;
    let mut store = MemStore::new();
    store.seed_agents(file.agents);
    store.seed_houses(file.houses);
    let all = store.houses();
    let visited = all.iter().filter(|h| HouseFilter::Visited.matches(h)).count();
    let withdrawn = all
        .iter()
        .filter(|h| HouseFilter::NotAvailable.matches(h))
        .count();
    println!(
        "houses:  {} total, {visited} visited, {withdrawn} not available",
        all.len()
    );
    println!("agents:  {}", store.agent_count());
    Ok(())
}

/// The canonical link for a filter pair; default filters leave no trace in
/// the query.
fn share_link(base: &str, state: &FilterState) -> String {
    let query = state.to_query();
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_link_omits_default_filters() {
        assert_eq!(
            share_link("http://localhost:4000/", &FilterState::default()),
            "http://localhost:4000/"
        );
    }

    #[test]
    fn share_link_encodes_active_filters() {
        let state = FilterState::new(SchoolFilter::WithoutQuota, HouseFilter::NotAvailable);
        assert_eq!(
            share_link("http://localhost:4000/", &state),
            "http://localhost:4000/?schoolFilter=withoutQuota&houseFilter=notAvailable"
        );
    }
}
