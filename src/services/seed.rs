use crate::{db::Database, error::Result};
use rust_decimal::Decimal;

/// Demo catalog for fresh environments. Runs only against an empty products
/// table; an existing catalog is never touched.
pub async fn seed_products(db: &Database) -> Result<u64> {
    if db.count_products().await? > 0 {
        tracing::info!("Products already present; skipping seed");
        return Ok(0);
    }

    let catalog: &[(&str, &str, Decimal, i32)] = &[
        (
            "Flash Sale Sneaker",
            "Limited edition drop, single colourway",
            Decimal::new(9999, 2),
            100,
        ),
        (
            "Signature Hoodie",
            "Heavyweight fleece, embroidered logo",
            Decimal::new(5950, 2),
            250,
        ),
        (
            "Collector Cap",
            "Numbered run, adjustable strap",
            Decimal::new(2499, 2),
            500,
        ),
        (
            "Gallery Print",
            "Signed and numbered, 50x70cm",
            Decimal::new(14900, 2),
            40,
        ),
    ];

    let mut inserted = 0u64;
    for (name, description, price, stock) in catalog {
        let id = db.insert_product(name, description, *price, *stock).await?;
        tracing::debug!("Seeded product {}: {} (stock {})", id, name, stock);
        inserted += 1;
    }

    Ok(inserted)
}
