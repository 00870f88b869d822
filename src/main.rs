mod chat;
mod cli;
mod config;
mod datasources;
mod error;
mod logic;
mod models;
mod server;
mod store;

use anyhow::{bail, Context};
use chrono::{Datelike, Local};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use datasources::{
    ForecastProvider, GoogleGeocodingClient, OpenWeatherMapClient, ReverseGeocoder,
};
use logic::report::{render_advice, title_case};
use logic::{evaluate, ConversationEngine, RuleTable};
use models::{Coordinates, StageType};
use std::sync::Arc;
use store::InMemorySessionStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let command = cli.command.unwrap_or(Commands::Serve { bind: None });

    if let Commands::Init = command {
        Config::setup_interactive().context("Interactive setup failed")?;
        return Ok(());
    }

    let config = Config::load(cli.config).context(
        "Failed to load configuration (copy config/config.yaml.example to config/config.yaml)",
    )?;

    match command {
        Commands::Serve { bind } => {
            let engine = build_engine(&config)?;
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            server::serve(
                &bind,
                config.server.max_body_bytes,
                &config.sessions,
                Arc::new(engine),
            )
            .await?;
        }
        Commands::Chat { sender } => {
            let engine = build_engine(&config)?;
            chat::run(&engine, &sender).await?;
        }
        Commands::Evaluate {
            crop,
            stage,
            city,
            month,
        } => run_evaluate(&config, &crop, &stage, &city, month).await?,
        Commands::Check => run_check(&config).await?,
        // Handled before the config is loaded
        Commands::Init => {}
    }

    Ok(())
}

fn load_rules(config: &Config) -> anyhow::Result<RuleTable> {
    RuleTable::load(&config.crops.data_file).with_context(|| {
        format!(
            "Cannot start without crop rules from {}",
            config.crops.data_file.display()
        )
    })
}

fn build_engine(config: &Config) -> anyhow::Result<ConversationEngine> {
    let rules = load_rules(config)?;
    let geocoder = GoogleGeocodingClient::new(config.geocoding.clone())?;
    let forecasts = OpenWeatherMapClient::new(config.openweathermap.clone())?;

    Ok(ConversationEngine::new(
        Arc::new(rules),
        Arc::new(InMemorySessionStore::new()),
        Arc::new(geocoder),
        Arc::new(forecasts),
    ))
}

async fn run_evaluate(
    config: &Config,
    crop: &str,
    stage: &str,
    city: &str,
    month: Option<u32>,
) -> anyhow::Result<()> {
    let Some(stage) = StageType::from_token(stage) else {
        bail!("Unknown stage '{}': use sowing, harvesting, s or h", stage);
    };
    let crop = crop.trim().to_lowercase();
    let rules = load_rules(config)?;
    let rule = rules.lookup(&crop, stage)?;

    let client = OpenWeatherMapClient::new(config.openweathermap.clone())?;
    let forecast = client
        .fetch_forecast(city)
        .await
        .with_context(|| format!("Unable to fetch weather for {}", city))?;

    let month = month.unwrap_or_else(|| Local::now().month());
    let verdict = evaluate(rule, &forecast, month);

    println!("📍 {}", title_case(city));
    println!(
        "{}",
        render_advice(&crop, stage, rule, &forecast, &verdict, month)
    );
    Ok(())
}

async fn run_check(config: &Config) -> anyhow::Result<()> {
    println!("Configuration: OK");

    let rules = load_rules(config)?;
    println!(
        "Crop rules: OK ({} crops: {})",
        rules.len(),
        rules.crops().join(", ")
    );

    // Sample point near Kanpur, India
    let coords = Coordinates::new(26.4499, 80.3319).context("invalid sample coordinates")?;

    let geocoder = GoogleGeocodingClient::new(config.geocoding.clone())?;
    let city = match geocoder.reverse_geocode(coords).await {
        Ok(place) => {
            println!("Geocoding: OK ({}, {})", place.city, place.state);
            place.city
        }
        Err(e) => {
            println!("Geocoding: FAILED ({})", e);
            "Kanpur".to_string()
        }
    };

    let forecasts = OpenWeatherMapClient::new(config.openweathermap.clone())?;
    match forecasts.fetch_forecast(&city).await {
        Ok(forecast) => println!(
            "OpenWeatherMap: OK ({}: {:.1}°C, {:.1} mm, {})",
            city, forecast.temperature, forecast.rainfall, forecast.description
        ),
        Err(e) => println!("OpenWeatherMap: FAILED ({})", e),
    }

    Ok(())
}
