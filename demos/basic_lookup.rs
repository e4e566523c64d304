//! Basic usage example for cep-rs
//!
//! This example demonstrates how to:
//! - Load the bundled postal dataset
//! - Resolve and validate CEPs
//! - Search and autocomplete addresses
//! - Geocode and measure distances

use cep_core::{
    AddressQuery, CepService, Endpoint, GeocodeRequest, Lookup, MemoryCache, PostalDb, Result,
};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== CEP-RS Basic Usage Example ===\n");

    println!("Loading postal dataset...");
    let db = PostalDb::load()?;
    let service = CepService::new(db, MemoryCache::new());
    let cancel = CancellationToken::new();
    println!("✓ Dataset loaded successfully\n");

    // Example 1: Resolve a CEP
    println!("--- Example 1: Resolve a CEP ---");
    match service.lookup("01310-100", &cancel).await? {
        Lookup::Found(address) => println!("{}", address.display_line()),
        Lookup::NotFound(nf) => println!("{}", nf.message),
    }
    println!();

    // Example 2: Validate and classify
    println!("--- Example 2: Validate CEPs ---");
    for cep in ["01310930", "70160-900", "50000-000"] {
        let v = service.validate_cep(cep, &cancel).await?;
        println!("{cep}: valid={} kind={:?}", v.valid, v.kind);
    }
    println!();

    // Example 3: Search streets in a state
    println!("--- Example 3: Search streets ---");
    let query = AddressQuery {
        street: Some("paulista".into()),
        uf: Some("SP".into()),
        ..AddressQuery::default()
    };
    let page = service.search_addresses(&query, 1, 10, &cancel).await?;
    println!("{} result(s)", page.total);
    for address in &page.items {
        println!("- {}", address.display_line());
    }
    println!();

    // Example 4: Autocomplete
    println!("--- Example 4: Autocomplete 'cent' ---");
    for address in service.autocomplete("cent", None, None, 9, &cancel).await? {
        println!("- {}", address.display_line());
    }
    println!();

    // Example 5: Geocode and distance
    println!("--- Example 5: Geocode and distance ---");
    if let Lookup::Found(address) = service
        .geocode(&GeocodeRequest::by_cep("22021-001"), &cancel)
        .await?
    {
        println!(
            "{} ~ ({:?}, {:?})",
            address.display_line(),
            address.latitude,
            address.longitude
        );
    }
    let report = service
        .distance(
            &Endpoint::Cep("01310-100".into()),
            &Endpoint::Cep("22021-001".into()),
            &cancel,
        )
        .await?;
    if let Lookup::Found(report) = report {
        println!("São Paulo -> Rio de Janeiro: ~{} km", report.distance_km);
    }

    Ok(())
}
