//! Product catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use shoebox_core::{Brand, Category, Discount, ProductId, ProductStatus};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::product::{NewProduct, Product, ProductFilter, ProductImage, ProductPatch};
use crate::services::catalog::CatalogService;
use crate::state::AppState;

/// Query parameters for `GET /products`.
#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    pub keyword: Option<String>,
    pub brand: Option<Brand>,
    #[serde(rename = "price.min")]
    pub price_min: Option<Decimal>,
    #[serde(rename = "price.max")]
    pub price_max: Option<Decimal>,
}

/// Body for `POST /products`.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    /// Percentage, clamped into [0, 100].
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub stock: i32,
    pub brand: Brand,
    pub category: Category,
    #[serde(default)]
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

/// Body for `PUT /products/{id}`. Absent fields keep their stored values.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub stock: Option<i32>,
    pub brand: Option<Brand>,
    pub category: Option<Category>,
    pub status: Option<ProductStatus>,
}

/// `GET /products` - public listing with filters.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Product>>> {
    let catalog = CatalogService::new(state.pool(), state.profanity());

    let products = catalog
        .list_products(&ProductFilter {
            keyword: params.keyword,
            brand: params.brand,
            price_min: params.price_min,
            price_max: params.price_max,
        })
        .await?;

    Ok(Json(products))
}

/// `GET /products/{id}` - public product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    let catalog = CatalogService::new(state.pool(), state.profanity());
    Ok(Json(catalog.get_product(ProductId::new(id)).await?))
}

/// `POST /products` - create a product (admin).
#[instrument(skip(state, _admin, body), fields(name = %body.name))]
pub async fn create(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let catalog = CatalogService::new(state.pool(), state.profanity());

    let product = catalog
        .create_product(&NewProduct {
            name: body.name,
            description: body.description,
            price: body.price,
            discount: Discount::clamp(body.discount),
            stock: body.stock,
            brand: body.brand,
            category: body.category,
            status: body.status.unwrap_or(ProductStatus::Available),
            images: body.images,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /products/{id}` - partial update (admin).
#[instrument(skip(state, _admin, body))]
pub async fn update(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    let catalog = CatalogService::new(state.pool(), state.profanity());

    let product = catalog
        .update_product(
            ProductId::new(id),
            &ProductPatch {
                name: body.name,
                description: body.description,
                price: body.price,
                discount: body.discount.map(Discount::clamp),
                stock: body.stock,
                brand: body.brand,
                category: body.category,
                status: body.status,
            },
        )
        .await?;

    Ok(Json(product))
}

/// `DELETE /products/{id}` - delete a product (admin).
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let catalog = CatalogService::new(state.pool(), state.profanity());
    catalog.delete_product(ProductId::new(id)).await?;

    Ok(StatusCode::NO_CONTENT)
}
