//! # Seed Data Generator
//!
//! Populates the database with samples and their versions for development.
//!
//! ## Usage
//! ```bash
//! # Generate 100 samples (default)
//! cargo run -p crudkit-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p crudkit-db --bin seed -- --count 1000
//!
//! # Specify database path (otherwise CRUDKIT_DATABASE_PATH / ./crudkit.db)
//! cargo run -p crudkit-db --bin seed -- --db ./data/crudkit.db
//!
//! # More output
//! RUST_LOG=debug cargo run -p crudkit-db --bin seed
//! ```
//!
//! ## Generated Samples
//! - Id: `S-{index:05}`
//! - Type cycles through `Type_A`, `Type_B`, `Type_C`
//! - 1 to 3 versions each, written with one batch per sample
//! - Audit columns filled with a random operator id

use chrono::Utc;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crudkit_core::{PageRequest, Sample, SampleQuery, SampleVersion};
use crudkit_db::{Database, DbConfig};

/// Sample types for realistic test data
const SAMPLE_TYPES: &[&str] = &["Type_A", "Type_B", "Type_C"];

/// Name stems, suffixed with the index
const NAMES: &[&str] = &[
    "Baseline", "Calibration", "Control", "Reference", "Pilot", "Stability", "Batch", "Retest",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 100;
    let mut config = DbConfig::from_env()?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(100);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("crudkit Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of samples to generate (default: 100)");
                println!("  -d, --db <PATH>    Database file path (default: ./crudkit.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(
        database = %config.database_path.display(),
        count = count,
        "Seeding samples"
    );

    let db = Database::new(config).await?;
    let samples = db.samples()?;

    let (_, existing) = samples
        .list(&SampleQuery::default(), &PageRequest::first(1))
        .await?;
    if existing.total_available_items > 0 {
        warn!(
            existing = existing.total_available_items,
            "Database already has samples, skipping seed"
        );
        return Ok(());
    }

    let operator = Uuid::new_v4().to_string();
    let start = std::time::Instant::now();
    let mut generated = 0;
    let mut versions_written = 0;

    for index in 0..count {
        let (sample, versions) = generate_sample(index, &operator);

        if let Err(e) = samples.insert(&sample).await {
            warn!(sample_id = %sample.sample_id, error = %e, "Failed to insert sample");
            continue;
        }
        versions_written += samples.batch_upsert_versions(&versions).await?;

        generated += 1;
        if generated % 50 == 0 {
            info!(generated = generated, "Progress");
        }
    }

    let elapsed = start.elapsed();
    info!(
        samples = generated,
        versions = versions_written,
        elapsed_ms = elapsed.as_millis() as u64,
        "Seed complete"
    );

    let (page, page_info) = samples
        .list(&SampleQuery::default(), &PageRequest::first(10))
        .await?;
    info!(
        first_page = page.len(),
        max_page_index = page_info.max_page_index,
        total = page_info.total_available_items,
        "Verified list query"
    );

    db.close().await;
    Ok(())
}

/// Generates one sample and its versions.
fn generate_sample(index: usize, operator: &str) -> (Sample, Vec<SampleVersion>) {
    let now = Utc::now();
    let sample_id = format!("S-{:05}", index);
    let version_count = 1 + index % 3;

    let versions: Vec<SampleVersion> = (1..=version_count)
        .map(|n| SampleVersion {
            create_date: Some(now),
            create_user: operator.to_string(),
            ..SampleVersion::with_key(sample_id.clone(), n.to_string())
        })
        .collect();

    let sample = Sample {
        sample_type: SAMPLE_TYPES[index % SAMPLE_TYPES.len()].to_string(),
        sample_name: format!("{} {}", NAMES[index % NAMES.len()], index),
        sample_description: format!("Seeded sample number {}", index),
        sample_active_version: version_count.to_string(),
        create_date: Some(now),
        create_user: operator.to_string(),
        ..Sample::with_id(sample_id)
    };

    (sample, versions)
}
