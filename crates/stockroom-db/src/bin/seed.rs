//! # Seed Data Generator
//!
//! Populates the database with test data for development.
//!
//! ## Usage
//! ```bash
//! # Generate 500 products (default)
//! cargo run -p stockroom-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p stockroom-db --bin seed -- --count 2000
//!
//! # Specify database path
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db
//! ```
//!
//! ## Generated Data
//! - One warehouse and a handful of suppliers
//! - Products across categories with codes like `BEV-0042`
//! - A received purchase and a stock adjustment per early product, so the
//!   ledger has some history to look at

use chrono::Utc;
use std::env;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use stockroom_core::types::{
    AdjustmentInput, AdjustmentItemInput, AdjustmentType, PaymentStatus, Product, PurchaseInput,
    PurchaseItemInput, PurchaseStatus, Supplier, Warehouse,
};
use stockroom_db::{Database, DbConfig};

/// Product categories for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "BEV",
        &[
            "Cola", "Lemon Soda", "Orange Soda", "Energy Drink", "Still Water",
            "Sparkling Water", "Orange Juice", "Apple Juice", "Iced Tea", "Cold Brew",
        ],
    ),
    (
        "SNK",
        &[
            "Salted Chips", "Nacho Chips", "Pretzels", "Chocolate Bar", "Gummy Bears",
            "Trail Mix", "Granola Bar", "Crackers", "Popcorn", "Cookies",
        ],
    ),
    (
        "DRY",
        &[
            "Whole Milk", "Skim Milk", "Oat Milk", "Cheddar", "Mozzarella",
            "Butter", "Greek Yogurt", "Sour Cream", "Eggs Dozen", "Cream Cheese",
        ],
    ),
    (
        "GRO",
        &[
            "White Bread", "Wheat Bread", "Spaghetti", "Penne", "White Rice",
            "Brown Rice", "Canned Beans", "Canned Corn", "Peanut Butter", "Honey",
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./stockroom_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./stockroom_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Stockroom Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Master data first
    let now = Utc::now();
    let warehouse = Warehouse {
        id: Uuid::new_v4().to_string(),
        name: "Main Warehouse".to_string(),
        phone: Some("555-0100".to_string()),
        email: None,
        address: Some("1 Depot Road".to_string()),
        created_at: now,
        updated_at: now,
    };
    db.warehouses().insert(&warehouse).await?;

    let supplier_names = ["Acme Supply", "Northside Wholesale", "Harbor Imports"];
    let mut supplier_ids = Vec::new();
    for name in supplier_names {
        let supplier = Supplier {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            company: Some(format!("{} LLC", name)),
            phone: None,
            email: None,
            address: None,
            created_at: now,
            updated_at: now,
        };
        db.suppliers().insert(&supplier).await?;
        supplier_ids.push(supplier.id);
    }
    println!("✓ Seeded 1 warehouse, {} suppliers", supplier_ids.len());

    // Products
    println!();
    println!("Generating products...");

    let mut generated = 0;
    let mut product_ids = Vec::new();
    let start = std::time::Instant::now();

    'outer: for repeat in 0usize.. {
        for &(category_code, names) in CATEGORIES {
            for (name_idx, &name) in names.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let index = repeat * 100 + name_idx;
                let product = generate_product(category_code, name, index, generated);

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.code, e);
                    continue;
                }

                product_ids.push(product.id);
                generated += 1;

                if generated % 100 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    // A little document history so the ledger isn't empty
    println!();
    println!("Generating documents...");

    let today = Utc::now().date_naive();
    let mut documents = 0;

    for (idx, product_id) in product_ids.iter().take(20).enumerate() {
        let quantity_milli = ((idx as i64 % 5) + 1) * 2_000;
        let unit_cost_cents = 300 + (idx as i64 % 7) * 50;
        let subtotal = unit_cost_cents * quantity_milli / 1_000;

        db.purchases()
            .create(PurchaseInput {
                reference: Some(format!("PUR-SEED-{:04}", idx)),
                supplier_id: supplier_ids[idx % supplier_ids.len()].clone(),
                warehouse_id: warehouse.id.clone(),
                date: today,
                status: PurchaseStatus::Received,
                payment_status: PaymentStatus::Unpaid,
                subtotal_cents: subtotal,
                tax_rate_bps: 0,
                tax_cents: 0,
                discount_cents: 0,
                shipping_cents: 0,
                total_cents: subtotal,
                paid_cents: 0,
                note: None,
                items: vec![PurchaseItemInput {
                    product_id: product_id.clone(),
                    quantity_milli,
                    unit_cost_cents,
                    discount_cents: 0,
                    tax_cents: 0,
                    subtotal_cents: subtotal,
                }],
            })
            .await?;
        documents += 1;

        if idx % 4 == 0 {
            db.adjustments()
                .create(AdjustmentInput {
                    reference: Some(format!("ADJ-SEED-{:04}", idx)),
                    warehouse_id: warehouse.id.clone(),
                    date: today,
                    adjustment_type: AdjustmentType::Subtraction,
                    note: Some("Shrinkage count".to_string()),
                    items: vec![AdjustmentItemInput {
                        product_id: product_id.clone(),
                        quantity_milli: 1_000,
                        item_type: AdjustmentType::Subtraction,
                    }],
                })
                .await?;
            documents += 1;
        }
    }

    println!("✓ Generated {} documents", documents);
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with deterministic pseudo-realistic data.
fn generate_product(category: &str, name: &str, index: usize, seq: usize) -> Product {
    let now = Utc::now();

    // Spread prices $0.99 - $19.99 and stock 0 - 100 units
    let price_cents = 99 + ((seq * 137) % 1900) as i64;
    let stock_milli = ((seq * 53) % 101) as i64 * 1_000;

    Product {
        id: Uuid::new_v4().to_string(),
        code: format!("{}-{:04}", category, index),
        barcode: Some(format!("20000{:08}", seq)),
        name: name.to_string(),
        price_cents,
        cost_cents: Some(price_cents * 7 / 10),
        stock_milli,
        alert_quantity_milli: 5_000,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
