use anyhow::{Context, Result};
use covidscraper::{
    cache::PageCache,
    db::Store,
    export,
    extract::{county, reports},
    fetch::{
        self, npr,
        usda::{self, Dataset},
    },
    merge,
    report::{
        html::{ChartData, Report},
        terminal,
    },
};
use dialoguer::Input;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const CACHE_FILE: &str = "covid_cache.json";
const DB_FILE: &str = "covid_usdaers.sqlite";
const COUNTY_CSV: &str = "covid_data/us-counties.csv";
const SOCIO_DIR: &str = "socioeconomic_data";
const REPORT_FILE: &str = "covid_report.html";

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) open the page cache ──────────────────────────────────────
    let mut cache = match PageCache::open(CACHE_FILE) {
        Ok(cache) => cache,
        Err(err) => {
            warn!(%err, "cache unavailable; starting empty");
            PageCache::empty(CACHE_FILE)
        }
    };
    info!(entries = cache.len(), "cache ready");

    // ─── 3) scrape the two source pages ──────────────────────────────
    let client = fetch::client()?;
    let state_counts = npr::state_counts(&client, &mut cache)
        .await
        .context("scraping the state case table")?;
    let datasets = usda::dataset_index(&client, &mut cache)
        .await
        .context("scraping the dataset index")?;
    info!(
        states = state_counts.len(),
        datasets = datasets.len(),
        "scrape complete"
    );

    // ─── 4) spreadsheets → merged socioeconomic records ──────────────
    let socio_dir = Path::new(SOCIO_DIR);
    let state_socio = merge::merge(&reports::state_sources(socio_dir)?);
    let michigan_socio = merge::merge(&reports::michigan_sources(socio_dir)?);
    info!(
        states = state_socio.len(),
        michigan_counties = michigan_socio.len(),
        "socioeconomic data merged"
    );

    // ─── 5) county snapshot ──────────────────────────────────────────
    let county_rows = county::read_county_rows(Path::new(COUNTY_CSV))
        .context("reading the county snapshot")?;
    let county_summary = county::state_county_summary(&county_rows);

    // ─── 6) derived JSON exports ─────────────────────────────────────
    export::write_json(Path::new("USDA_ERS_Data.json"), &state_socio)?;
    export::write_json(Path::new("MI_USDA_ERS_Data.json"), &michigan_socio)?;
    export::write_json(Path::new("US_Covid.json"), &state_counts)?;
    export::write_json(Path::new("County_Covid.json"), &county_summary)?;

    // ─── 7) rebuild the database ─────────────────────────────────────
    let mut store = Store::open(Path::new(DB_FILE))?;
    store.reset_schema()?;
    store.insert_county_rows(&county_rows)?;
    store.insert_state_counts(&state_counts)?;
    store.insert_state_socio(&state_socio)?;
    store.insert_michigan_socio(&michigan_socio)?;
    info!("database rebuilt");

    // ─── 8) interactive loop ─────────────────────────────────────────
    menu_loop(&store, &datasets).await
}

async fn menu_loop(store: &Store, datasets: &[Dataset]) -> Result<()> {
    loop {
        let choice: String = Input::new()
            .with_prompt(
                "\nEnter 'nation', a state (including 'District of Columbia'), \
                 'datasets', or 'exit'",
            )
            .interact_text()?;
        match choice.trim() {
            "exit" => {
                info!("exit");
                return Ok(());
            }
            "nation" => show_nation(store)?,
            "datasets" => dataset_menu(datasets)?,
            "state" => {
                let name: String = Input::new().with_prompt("Enter a state name").interact_text()?;
                show_state(store, name.trim()).await?;
            }
            "back" | "next" => {
                println!("Nothing to page here; enter 'nation', a state, 'datasets', or 'exit'.");
            }
            other => show_state(store, other).await?,
        }
    }
}

fn show_nation(store: &Store) -> Result<()> {
    let national = store.national().context("querying national numbers")?;
    if national.is_empty() {
        println!("No national rows available.");
        return Ok(());
    }

    let mut rows = Vec::with_capacity(national.len());
    let mut chart = ChartData {
        labels: Vec::new(),
        cases: Vec::new(),
        deaths: Vec::new(),
    };
    for state in &national {
        rows.push(vec![
            state.name.clone(),
            state.cases.to_string(),
            state.deaths.to_string(),
            state.population.to_string(),
            state.median_income.to_string(),
            state.unemployment_rate.to_string(),
            state.poverty_rate.to_string(),
            state.college_rate.to_string(),
            state.hs_only_rate.to_string(),
        ]);
        chart.labels.push(state.name.clone());
        chart.cases.push(state.cases);
        chart.deaths.push(state.deaths);
    }

    Report {
        title: "National 2020 COVID-19 Numbers".to_string(),
        columns: vec![
            "State",
            "Cases",
            "Deaths",
            "Population",
            "Median Income",
            "Unemployment Rate",
            "Poverty Rate",
            "College Completion Rate",
            "Completed High School Only Rate",
        ],
        rows,
        chart,
    }
    .show(Path::new(REPORT_FILE))
}

async fn show_state(store: &Store, input: &str) -> Result<()> {
    let state = title_case(input);
    let counties = store
        .counties_for_state(&state)
        .with_context(|| format!("querying counties for {state}"))?;
    if counties.is_empty() {
        println!("No county rows for '{state}'. Enter 'nation', a state, 'datasets', or 'exit'.");
        return Ok(());
    }

    match store.national()?.into_iter().find(|s| s.name == state) {
        Some(profile) => terminal::print_state_profile(&profile).await,
        None => warn!(%state, "no socioeconomic profile for state"),
    }

    let mut rows = Vec::with_capacity(counties.len());
    let mut chart = ChartData {
        labels: Vec::new(),
        cases: Vec::new(),
        deaths: Vec::new(),
    };
    for county in &counties {
        rows.push(vec![
            county.county.clone(),
            county.cases.to_string(),
            county.deaths.to_string(),
        ]);
        chart.labels.push(county.county.clone());
        chart.cases.push(county.cases);
        chart.deaths.push(county.deaths);
    }

    Report {
        title: format!("{state} 2020 COVID-19 Numbers"),
        columns: vec!["County", "Cases", "Deaths"],
        rows,
        chart,
    }
    .show(Path::new(REPORT_FILE))
}

fn dataset_menu(datasets: &[Dataset]) -> Result<()> {
    if datasets.is_empty() {
        println!("No datasets were scraped.");
        return Ok(());
    }

    println!("\nHere are the datasets available for analysis:");
    for (i, dataset) in datasets.iter().enumerate() {
        println!("[{}] {}", i + 1, dataset.name);
    }

    loop {
        let choice: String = Input::new()
            .with_prompt("Choose a number to launch the dataset page, or 'back'")
            .interact_text()?;
        let choice = choice.trim();
        if choice == "back" {
            return Ok(());
        }
        match choice.parse::<usize>() {
            Ok(n) if (1..=datasets.len()).contains(&n) => {
                let dataset = &datasets[n - 1];
                info!(name = %dataset.name, "launching dataset page");
                open::that(&dataset.url)
                    .with_context(|| format!("opening {}", dataset.url))?;
            }
            _ => println!(
                "Enter a number between 1 and {}, or 'back'.",
                datasets.len()
            ),
        }
    }
}

/// Normalize user input to the capitalization the data uses
/// ("district of columbia" → "District of Columbia").
fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && lower == "of" {
                lower
            } else {
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => lower,
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::title_case;

    #[test]
    fn title_case_matches_data_capitalization() {
        assert_eq!(title_case("michigan"), "Michigan");
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("district of columbia"), "District of Columbia");
        assert_eq!(title_case("NEW MEXICO"), "New Mexico");
    }
}
