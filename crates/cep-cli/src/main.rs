// crates/cep-cli/src/main.rs
mod args;

use crate::args::{CliArgs, Commands};
use anyhow::{bail, Context};
use cep_core::{
    AddressQuery, AutocompleteKind, CepError, CepService, Endpoint, GeoPoint, GeocodeRequest, Lookup,
    MemoryCache, PostalDb, RadiusKind, RadiusQuery, ServiceConfig,
};
use clap::Parser;
use serde::Serialize;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_lookup<T: Serialize>(result: Lookup<T>) -> anyhow::Result<()> {
    match result {
        Lookup::Found(value) => print_json(&value),
        Lookup::NotFound(nf) => {
            eprintln!("{}", nf.message);
            Ok(())
        }
    }
}

/// `"lat,lon"` is a coordinate pair, anything else a CEP.
fn parse_endpoint(raw: &str) -> anyhow::Result<Endpoint> {
    match raw.split_once(',') {
        Some((lat, lon)) => {
            let latitude: f64 = lat.trim().parse().context("invalid latitude")?;
            let longitude: f64 = lon.trim().parse().context("invalid longitude")?;
            Ok(Endpoint::Coordinates(GeoPoint::new(latitude, longitude)?))
        }
        None => Ok(Endpoint::Cep(raw.trim().to_string())),
    }
}

/// 2 for bad input (usage errors), 1 for everything else.
fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<CepError>() {
        Some(e) if e.is_client_error() => 2,
        _ => 1,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(CliArgs::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_status(&e))
        }
    }
}

async fn run(args: CliArgs) -> anyhow::Result<()> {

    // Determine input file (default JSON inside cep-core)
    let input_path = args.input.unwrap_or_else(|| {
        let dir = PostalDb::default_data_dir();
        let filename = PostalDb::default_dataset_filename();
        dir.join(filename).to_string_lossy().to_string()
    });
    let db = PostalDb::load_from_path(&input_path)
        .with_context(|| format!("loading dataset {input_path}"))?;

    let config = match args.config.as_deref() {
        Some(path) => ServiceConfig::load(path).with_context(|| format!("loading config {path}"))?,
        None => ServiceConfig::default(),
    };
    debug!(?config, "service configuration");
    let service = CepService::new(db, MemoryCache::new()).with_config(config);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    match args.command {
        Commands::Stats => {
            let stats = service.stats(&cancel).await?;
            println!("Dataset statistics:");
            println!("  Localities: {}", stats.localities);
            println!("  Neighborhoods: {}", stats.neighborhoods);
            println!("  Streets: {}", stats.streets);
            println!("  Large users: {}", stats.large_users);
            println!("  Operational units: {}", stats.operational_units);
            println!("  Community PO boxes: {}", stats.community_boxes);
            println!("  Ranges: {}", stats.ranges);
        }

        Commands::Lookup { cep } => print_lookup(service.lookup(&cep, &cancel).await?)?,

        Commands::Validate { cep } => print_json(&service.validate_cep(&cep, &cancel).await?)?,

        Commands::Classify { cep } => print_json(&service.classify(&cep, &cancel).await?)?,

        Commands::Ranges { cep } => {
            let hits = service.ranges_for_cep(&cep, &cancel).await?;
            if hits.is_empty() {
                println!("No ranges contain {cep}");
            } else {
                print_json(&hits)?;
            }
        }

        Commands::Search {
            cep,
            street,
            neighborhood,
            locality,
            uf,
            page,
            page_size,
        } => {
            let query = AddressQuery {
                cep,
                street,
                neighborhood,
                locality,
                uf,
            };
            let result = service
                .search_addresses(&query, page, page_size, &cancel)
                .await?;
            print_json(&result)?;
        }

        Commands::Autocomplete {
            term,
            kind,
            uf,
            limit,
        } => {
            let kind = kind
                .as_deref()
                .map(str::parse::<AutocompleteKind>)
                .transpose()?;
            let results = service
                .autocomplete(&term, kind, uf.as_deref(), limit, &cancel)
                .await?;
            if results.is_empty() {
                println!("No suggestions for: {term}");
            } else {
                for address in &results {
                    println!("{}", address.display_line());
                }
            }
        }

        Commands::Geocode {
            cep,
            street,
            complement,
            neighborhood,
            locality,
            uf,
        } => {
            let request = GeocodeRequest {
                cep,
                street,
                complement,
                neighborhood,
                locality,
                uf,
            };
            print_lookup(service.geocode(&request, &cancel).await?)?;
        }

        Commands::Reverse {
            latitude,
            longitude,
        } => print_json(&service.reverse_geocode(latitude, longitude, &cancel).await?)?,

        Commands::Distance { from, to } => {
            let from = parse_endpoint(&from)?;
            let to = parse_endpoint(&to)?;
            print_lookup(service.distance(&from, &to, &cancel).await?)?;
        }

        Commands::Radius {
            origin,
            radius_km,
            kind,
            page,
            page_size,
        } => {
            let query = RadiusQuery {
                origin: parse_endpoint(&origin)?,
                radius_km,
                kind: kind.parse::<RadiusKind>()?,
                page,
                page_size,
            };
            print_lookup(service.search_by_radius(&query, &cancel).await?)?;
        }
    }

    if cancel.is_cancelled() {
        bail!("interrupted");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_parse_as_cep_or_coordinates() {
        assert_eq!(
            parse_endpoint("01310-100").unwrap(),
            Endpoint::Cep("01310-100".into())
        );
        assert_eq!(
            parse_endpoint("-15.78, -47.93").unwrap(),
            Endpoint::Coordinates(GeoPoint {
                latitude: -15.78,
                longitude: -47.93
            })
        );
        assert!(parse_endpoint("north,south").is_err());
        assert!(parse_endpoint("95,0").is_err());
    }

    #[test]
    fn input_errors_exit_with_usage_status() {
        let bad_cep = anyhow::Error::from(CepError::Format("CEP must have 8 digits".into()));
        assert_eq!(exit_status(&bad_cep), 2);

        let missing = anyhow::Error::from(CepError::InsufficientInput("no CEP".into()))
            .context("geocoding");
        assert_eq!(exit_status(&missing), 2);

        let upstream = anyhow::Error::from(CepError::Upstream("store down".into()));
        assert_eq!(exit_status(&upstream), 1);
        assert_eq!(exit_status(&anyhow::anyhow!("interrupted")), 1);
    }
}
