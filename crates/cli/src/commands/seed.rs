//! Catalog seeding command.
//!
//! Inserts a small demo catalog for local development. No-op when the
//! catalog already has products, so re-running is safe.

use rust_decimal::Decimal;

use shoebox_core::{Discount, compute_discounted_price};

use super::{CommandError, connect};

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    /// Price in cents.
    price_cents: i64,
    /// Discount percentage.
    discount: i64,
    stock: i32,
    brand: &'static str,
    category: &'static str,
    image_url: &'static str,
}

const DEMO_CATALOG: &[SeedProduct] = &[
    SeedProduct {
        name: "Air Zoom Pegasus 41",
        description: "Responsive neutral road runner with a full-length air unit.",
        price_cents: 139_99,
        discount: 10,
        stock: 40,
        brand: "nike",
        category: "running",
        image_url: "https://images.example.com/seed/pegasus-41.jpg",
    },
    SeedProduct {
        name: "Samba OG",
        description: "Classic low-profile leather trainer with gum sole.",
        price_cents: 99_99,
        discount: 0,
        stock: 60,
        brand: "adidas",
        category: "casual",
        image_url: "https://images.example.com/seed/samba-og.jpg",
    },
    SeedProduct {
        name: "Old Skool",
        description: "Skate staple with the signature sidestripe and waffle outsole.",
        price_cents: 74_99,
        discount: 20,
        stock: 80,
        brand: "vans",
        category: "sneakers",
        image_url: "https://images.example.com/seed/old-skool.jpg",
    },
    SeedProduct {
        name: "Fresh Foam X 1080v14",
        description: "Max-cushion daily trainer for long miles.",
        price_cents: 164_99,
        discount: 15,
        stock: 25,
        brand: "new_balance",
        category: "running",
        image_url: "https://images.example.com/seed/1080v14.jpg",
    },
    SeedProduct {
        name: "Chuck 70 High Top",
        description: "Premium canvas high top with vintage details.",
        price_cents: 89_99,
        discount: 0,
        stock: 50,
        brand: "converse",
        category: "casual",
        image_url: "https://images.example.com/seed/chuck-70.jpg",
    },
];

/// Seed the catalog with demo products.
///
/// # Errors
///
/// Returns `CommandError::Database` if a query fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await?;
    if existing > 0 {
        tracing::info!(products = existing, "catalog already seeded, skipping");
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    for product in DEMO_CATALOG {
        let price = Decimal::new(product.price_cents, 2);
        let discount = Discount::clamp(Decimal::new(product.discount, 0));
        let discounted_price = compute_discounted_price(price, discount);

        let (product_id,): (i32,) = sqlx::query_as(
            "INSERT INTO products
                 (name, description, price, discount, discounted_price, stock,
                  brand, category, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7::brand, $8::category, 'available')
             RETURNING id",
        )
        .bind(product.name)
        .bind(product.description)
        .bind(price)
        .bind(discount.percent())
        .bind(discounted_price)
        .bind(product.stock)
        .bind(product.brand)
        .bind(product.category)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO product_images (product_id, position, storage_id, url)
             VALUES ($1, 0, $2, $3)",
        )
        .bind(product_id)
        .bind(format!("seed/{product_id}"))
        .bind(product.image_url)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(products = DEMO_CATALOG.len(), "catalog seeded");
    Ok(())
}
