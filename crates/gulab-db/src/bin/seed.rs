//! # Seed Data Generator
//!
//! Populates the database with demo catalog data for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p gulab-db --bin seed
//!
//! # Specify database path
//! cargo run -p gulab-db --bin seed -- --db ./data/gulab.db
//! ```
//!
//! Creates the store's standard categories (Attars, Perfume Oils, Sprays,
//! Incense) and a spread of products per category with realistic prices,
//! cost margins, and stock levels.

use std::env;

use gulab_core::ProductInput;
use gulab_db::{Database, DbConfig};

/// Category name plus (product name, price in minor units) pairs.
const CATALOG: &[(&str, &[(&str, i64)])] = &[
    (
        "Attars",
        &[
            ("Oud Attar 12ml", 1499),
            ("Rose Attar 12ml", 999),
            ("Musk Attar 12ml", 899),
            ("Amber Attar 12ml", 1099),
            ("Sandal Attar 12ml", 1299),
            ("Jannatul Firdaus 12ml", 799),
        ],
    ),
    (
        "Perfume Oils",
        &[
            ("White Musk Oil 10ml", 699),
            ("Black Oud Oil 10ml", 1199),
            ("Damask Rose Oil 10ml", 899),
            ("Vanilla Oil 10ml", 599),
            ("Kewda Oil 10ml", 649),
        ],
    ),
    (
        "Sprays",
        &[
            ("Oud Royale Spray 50ml", 2499),
            ("Rose Garden Spray 50ml", 1799),
            ("Citrus Burst Spray 50ml", 1499),
            ("Night Jasmine Spray 50ml", 1999),
        ],
    ),
    (
        "Incense",
        &[
            ("Bakhoor Oud 40g", 549),
            ("Bakhoor Rose 40g", 449),
            ("Agarbatti Sandal Pack", 199),
            ("Loban Resin 50g", 299),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./gulab_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Gulab POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./gulab_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Gulab POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().list_all().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} products", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding catalog...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    for (category_name, products) in CATALOG {
        let category = db.categories().create(category_name).await?;

        for (idx, (name, price_cents)) in products.iter().enumerate() {
            let input = ProductInput {
                name: name.to_string(),
                sku: make_sku(category_name, name, idx),
                category_id: category.id.clone(),
                price_cents: *price_cents,
                // Cost at 60-75% of price depending on position
                cost_price_cents: price_cents * (60 + (idx as i64 * 5) % 16) / 100,
                stock: 10 + (idx as i64 * 7) % 30,
                description: None,
                image_url: None,
            };

            if let Err(e) = db.products().create(input).await {
                eprintln!("Failed to insert {}: {}", name, e);
                continue;
            }

            generated += 1;
        }

        println!("  {} ({} products)", category_name, products.len());
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Seeded {} products in {:?}", generated, elapsed);
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a SKU like `ATT-OUD-000`.
fn make_sku(category: &str, name: &str, idx: usize) -> String {
    let cat: String = category
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    let prod: String = name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    format!("{}-{}-{:03}", cat, prod, idx)
}
