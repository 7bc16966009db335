//! # Seed Data Generator
//!
//! Populates the products database with dummy clothing for development.
//!
//! ## Usage
//! ```bash
//! # Generate 50 products into the configured database
//! cargo run -p catalog-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p catalog-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p catalog-db --bin seed -- --db ./data/products.db
//! ```
//!
//! Each product gets a name and supplier from the lists below, a price of
//! $0.00 - $99.99, a quantity of 0 - 999 and a four-byte placeholder
//! picture (or no picture path, on the `picture_path` schema).

use catalog_core::NewProduct;
use catalog_db::{CatalogConfig, ProductStore};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const NAMES: &[&str] = &[
    "Super Soft Icon T-Shirt",
    "AirFlex + Patched Stacked Skinny Jean",
    "Super Soft Icon Cargo Jogger",
    "Super Soft Vintage Vault Graphic T-Shirt",
    "Cozy Cabin Flannel",
    "Super Soft Thermal Hoodie Tee",
    "AirFlex + 5.5\" Denim Short",
    "Flex Longer Length Cargo Short",
    "Space Dye 3\" Classic Trunk Underwear",
    "Skate Sneaker",
    "Super Soft Graphic T-Shirt",
    "Super Soft Slub Hoodie T-Shirt",
    "AirFlex + Temp Tech Patched Stacked Skinny Jean",
    "AirFlex 360 Patched Skinny Jean",
    "Space Dye 4.5\" Flex Boxer Brief",
    "Diamonds 6\" Horizontal Fly Flex Boxer Brief",
    "Air Balloon 6\" Horizontal Fly Flex Boxer Brief",
    "Lounge Jogger",
    "Super Soft Icon Jogger",
    "10\" Active 24/7 Jogger Short",
    "Fresh Foam Roav Boundaries Sneaker",
    "Men's Freeside Rapid Repel Boot",
    "Men's Jag Boot",
];

const SUPPLIERS: &[&str] = &[
    "Grainger Industrial Supply",
    "Hudson Wholesale Inc.",
    "Regards Wholesale",
    "Garment Center Supplier Association",
    "eFashion Wholesale",
];

const DEFAULT_COUNT: usize = 50;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut count = DEFAULT_COUNT;
    let mut db_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(DEFAULT_COUNT);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Clothes Catalog Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: {})", DEFAULT_COUNT);
                println!("  -d, --db <PATH>    Database file path (default: from catalog.toml)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let mut config = CatalogConfig::load_or_default(None);
    if let Some(path) = db_path {
        config.database.path = path;
    }
    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    info!(
        path = %config.database.path.display(),
        schema = %config.provider.schema,
        count,
        "Seeding products"
    );

    let store = ProductStore::open(&config).await?;

    let existing = store.count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping seed");
        println!("Database already has {} products. Delete it to regenerate.", existing);
        return Ok(());
    }

    let collection = store.collection_address();
    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..count {
        let fields = generate_product(seed).into_field_set(store.revision());
        match store.insert(&collection, &fields).await {
            Ok(address) => {
                generated += 1;
                if generated % 100 == 0 {
                    info!(generated, last = %address, "Progress");
                }
            }
            Err(e) => warn!(seed, error = %e, "Insert failed"),
        }
    }

    let elapsed = start.elapsed();
    println!("Generated {} products in {:?}", generated, elapsed);

    store.database().close().await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,catalog=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Deterministic dummy product for index `seed`.
fn generate_product(seed: usize) -> NewProduct {
    let mix = seed.wrapping_mul(2_654_435_761);

    NewProduct {
        name: NAMES[seed % NAMES.len()].to_string(),
        price_cents: (mix % 10_000) as i64,
        quantity: ((mix / 7) % 1_000) as i64,
        supplier: SUPPLIERS[(mix / 13) % SUPPLIERS.len()].to_string(),
        picture: Some((mix as u32).to_le_bytes().to_vec()),
        ..NewProduct::default()
    }
}
