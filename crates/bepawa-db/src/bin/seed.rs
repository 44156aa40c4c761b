//! # Seed Data Generator
//!
//! Populates a development database with one account per role and a
//! catalog of medicines listed by a pharmacy and a wholesaler.
//!
//! ## Usage
//! ```bash
//! # Seed ./data/bepawa.db
//! cargo run -p bepawa-db --bin seed
//!
//! # Specify database path
//! cargo run -p bepawa-db --bin seed -- --db ./data/dev.db
//! ```
//!
//! ## Generated Data
//! - Profiles: admin, individual, retail, wholesale, lab (business
//!   accounts pre-approved)
//! - Wholesale listings: public + wholesale, bulk pricing
//! - Retail listings: public + retail, some restocked from the wholesaler
//! - A few listings near expiry or low on stock so the dashboard has
//!   something to show

use bepawa_core::{Caller, NewProduct, NewProfile, Role};
use bepawa_db::{Database, DbConfig};
use chrono::{Duration, Utc};
use std::env;

/// (name, category, manufacturer, retail price in TZS)
const MEDICINES: &[(&str, &str, &str, i64)] = &[
    ("Panadol 500mg", "Pain Relief", "GSK", 1_500),
    ("Paracetamol 500mg", "Pain Relief", "Shelys", 800),
    ("Ibuprofen 400mg", "Pain Relief", "Zenufa", 1_200),
    ("Amoxicillin 500mg", "Antibiotics", "Shelys", 3_500),
    ("Azithromycin 250mg", "Antibiotics", "Cipla", 6_000),
    ("Ciprofloxacin 500mg", "Antibiotics", "Cipla", 4_000),
    ("Metformin 500mg", "Diabetes", "Sun Pharma", 5_000),
    ("Amlodipine 5mg", "Cardiovascular", "Cipla", 4_500),
    ("Artemether/Lumefantrine", "Antimalarials", "Novartis", 7_000),
    ("Quinine 300mg", "Antimalarials", "Zenufa", 3_000),
    ("ORS Sachets", "Rehydration", "Keko Pharma", 500),
    ("Zinc 20mg", "Supplements", "Keko Pharma", 2_000),
    ("Vitamin C 500mg", "Supplements", "Zenufa", 2_500),
    ("Ferrous Sulphate", "Supplements", "Shelys", 1_000),
    ("Cetirizine 10mg", "Allergy", "Cipla", 1_500),
    ("Omeprazole 20mg", "Digestive", "Sun Pharma", 3_000),
];

/// Seeded accounts: (id, role, name, email, business)
const ACCOUNTS: &[(&str, Role, &str, &str, Option<&str>)] = &[
    ("seed-admin", Role::Admin, "Platform Admin", "admin@bepawa.test", None),
    ("seed-individual", Role::Individual, "Neema Juma", "neema@bepawa.test", None),
    ("seed-pharmacy", Role::Retail, "Baraka Mollel", "afya@bepawa.test", Some("Afya Pharmacy")),
    ("seed-wholesaler", Role::Wholesale, "Rehema Said", "jumla@bepawa.test", Some("Jumla Medical Supplies")),
    ("seed-lab", Role::Lab, "Dr. Hamisi Ally", "maabara@bepawa.test", Some("Maabara Diagnostics")),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./data/bepawa.db");

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
                println!("BEPAWA Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./data/bepawa.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 BEPAWA Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Accounts
    println!();
    println!("Creating accounts...");
    let admin = Caller::new("seed-admin", Some(Role::Admin));
    for (id, role, name, email, business) in ACCOUNTS {
        let profile = db
            .profiles()
            .create(
                Some(id.to_string()),
                NewProfile {
                    role: *role,
                    full_name: name.to_string(),
                    email: email.to_string(),
                    phone: None,
                    region: Some("Dar es Salaam".to_string()),
                    business_name: business.map(str::to_string),
                    license_number: business.map(|_| format!("LIC-{}", id.to_uppercase())),
                },
            )
            .await?;
        if !profile.is_approved {
            db.profiles().approve(&admin, &profile.id).await?;
        }
        println!("  {:<12} {}", role.as_str(), email);
    }

    // Listings
    println!();
    println!("Generating listings...");
    let wholesaler = Caller::new("seed-wholesaler", Some(Role::Wholesale));
    let pharmacy = Caller::new("seed-pharmacy", Some(Role::Retail));
    let today = Utc::now().date_naive();
    let mut generated = 0;

    for (idx, (name, category, manufacturer, price)) in MEDICINES.iter().enumerate() {
        let sku = format!("MED-{:03}", idx + 1);

        db.products()
            .create(
                &wholesaler,
                NewProduct {
                    name: format!("{} (box of 100)", name),
                    category: Some(category.to_string()),
                    manufacturer: Some(manufacturer.to_string()),
                    sku: Some(format!("{}-W", sku)),
                    price: price * 60,
                    buy_price: Some(price * 45),
                    stock: 200 + (idx as i64 * 37) % 300,
                    min_stock: Some(50),
                    expiry_date: Some(today + Duration::days(365 + idx as i64 * 10)),
                    is_public_product: true,
                    is_wholesale_product: true,
                    ..Default::default()
                },
            )
            .await?;
        generated += 1;

        // Pharmacy shelf: a few items low, one near expiry, one restocked
        // from the wholesaler but kept off the public marketplace
        let stock = match idx % 5 {
            0 => 4,
            1 => 0,
            _ => 20 + (idx as i64 * 13) % 80,
        };
        let expiry = if idx == 3 {
            today + Duration::days(14)
        } else {
            today + Duration::days(180 + idx as i64 * 15)
        };
        db.products()
            .create(
                &pharmacy,
                NewProduct {
                    name: name.to_string(),
                    category: Some(category.to_string()),
                    manufacturer: Some(manufacturer.to_string()),
                    sku: Some(sku),
                    price: *price,
                    buy_price: Some(price * 60 / 100),
                    stock,
                    min_stock: Some(10),
                    expiry_date: Some(expiry),
                    is_public_product: idx % 7 != 6,
                    is_retail_product: true,
                    wholesaler_id: (idx % 7 == 6).then(|| wholesaler.id.clone()),
                    ..Default::default()
                },
            )
            .await?;
        generated += 1;
    }

    println!("✓ Generated {} listings", generated);

    let low = db.products().low_stock(&pharmacy.id).await?;
    println!("  Pharmacy low-stock items: {}", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
