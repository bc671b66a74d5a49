//! dryspot
//!
//! Finds the spot near a place most likely to stay dry.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use application::ports::ResultPresenterPort;
use application::services::{
    HealthService, SearchCoordinator, SearchError, SearchRequest, SiteSearchService,
};
use clap::Parser;
use domain::search::generate_candidates;
use domain::value_objects::{Coordinate, SearchRadius};
use infrastructure::{AppConfig, ForecastAdapter, GeocodingAdapter, init_logging};
use presentation_cli::{Cli, Commands, JsonPresenter, TextPresenter, maps_link};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.validate()?;
    init_logging(&config.logging.clone().with_verbosity(cli.verbose))?;
    debug!(?config, "Configuration");

    match cli.command {
        Commands::Search {
            place,
            radius,
            json,
            top,
            labels,
        } => {
            let presenter: Arc<dyn ResultPresenterPort> = if json {
                Arc::new(JsonPresenter::pretty())
            } else {
                Arc::new(TextPresenter::with_top(top))
            };
            search(&config, presenter, &place, radius, labels || config.forecast.resolve_labels)
                .await
        },
        Commands::Candidates {
            lat,
            lon,
            radius,
            json,
        } => candidates(&config, lat, lon, radius, json),
        Commands::Health { json } => health(&config, json).await,
    }
}

fn radius_or_default(config: &AppConfig, radius: Option<f64>) -> anyhow::Result<SearchRadius> {
    match radius {
        Some(km) => Ok(SearchRadius::new(km)?),
        None => Ok(config.default_radius()?),
    }
}

fn adapters(config: &AppConfig) -> anyhow::Result<(Arc<GeocodingAdapter>, Arc<ForecastAdapter>)> {
    let geocoder =
        GeocodingAdapter::new(&config.nominatim_config())?.with_retry(config.retry.clone());
    let forecast = ForecastAdapter::new(config.weather_config())?.with_retry(config.retry.clone());
    Ok((Arc::new(geocoder), Arc::new(forecast)))
}

async fn search(
    config: &AppConfig,
    presenter: Arc<dyn ResultPresenterPort>,
    place: &str,
    radius: Option<f64>,
    labels: bool,
) -> anyhow::Result<ExitCode> {
    let radius_km = radius.unwrap_or(config.search.default_radius_km);
    let request = match SearchRequest::parse(place, radius_km) {
        Ok(request) => request.with_labels(labels),
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(ExitCode::FAILURE);
        },
    };

    let (geocoder, forecast) = adapters(config)?;
    let service = SiteSearchService::new(geocoder, forecast).with_config(config.site_search_config());
    let coordinator = SearchCoordinator::new(Arc::new(service), Arc::clone(&presenter));

    let outcome = tokio::select! {
        outcome = coordinator.run(request.clone()) => outcome,
        _ = tokio::signal::ctrl_c() => {
            coordinator.cancel_current();
            Err(SearchError::Cancelled)
        },
    };

    match outcome {
        Ok(published) => {
            println!("{}", published.rendered);
            let report = &published.report;
            if !report.failures.is_empty() {
                eprintln!(
                    "note: {} of {} candidates had no usable forecast:",
                    report.failures.len(),
                    report.failures.len() + report.ranked.len()
                );
                for failure in &report.failures {
                    eprintln!("  {failure}");
                }
            }
            info!(generation = published.generation, "Search finished");
            Ok(ExitCode::SUCCESS)
        },
        Err(SearchError::NoSiteFound { failures, .. }) => {
            println!(
                "{}",
                presenter.render(None, request.place.as_str(), request.radius)?
            );
            for failure in &failures {
                eprintln!("  {failure}");
            }
            Ok(ExitCode::FAILURE)
        },
        Err(e) => {
            eprintln!("error: {e}");
            Ok(ExitCode::FAILURE)
        },
    }
}

fn candidates(
    config: &AppConfig,
    lat: f64,
    lon: f64,
    radius: Option<f64>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let origin = Coordinate::new(lat, lon)?;
    let radius = radius_or_default(config, radius)?;
    let points = generate_candidates(origin, radius)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
    } else {
        println!("Candidates within {radius} of {origin}:");
        for (index, point) in points.iter().enumerate() {
            println!("  {index}. {point}  {}", maps_link(&point.coordinate));
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn health(config: &AppConfig, json: bool) -> anyhow::Result<ExitCode> {
    let (geocoder, forecast) = adapters(config)?;
    let report = HealthService::new(geocoder, forecast)
        .with_config(config.health.clone())
        .check_all()
        .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (name, status) in &report.services {
            let state = if status.healthy { "ok" } else { "unavailable" };
            let timing = status
                .response_time_ms
                .map(|ms| format!(" ({ms} ms)"))
                .unwrap_or_default();
            let error = status
                .error
                .as_deref()
                .map(|e| format!(": {e}"))
                .unwrap_or_default();
            println!("{name}: {state}{timing}{error}");
        }
    }

    Ok(if report.healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
