use super::AppState;
use crate::{
    error::{AppError, Result},
    models::{ApiResponse, Product},
    utils::format_amount,
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

/// Read-side projection of a product. `available_stock` mirrors the stock
/// column and may lag behind it for up to the cache TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: String,
    pub available_stock: i32,
    pub in_stock: bool,
}

impl ProductView {
    fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: format_amount(product.price),
            available_stock: product.stock,
            in_stock: product.stock > 0,
        }
    }
}

/// GET /products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<Json<ApiResponse<ProductView>>> {
    let cache = state.product_cache();

    if let Some(view) = cache.get::<ProductView>(product_id).await {
        return Ok(Json(ApiResponse::success(view)));
    }

    let product = state
        .db
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let view = ProductView::from_product(&product);
    cache.set(product_id, &view).await;

    Ok(Json(ApiResponse::success(view)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn sample_product(stock: i32) -> Product {
        Product {
            id: 7,
            name: "Flash Sale Sneaker".to_string(),
            description: "Limited edition drop".to_string(),
            price: Decimal::new(9999, 2),
            stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn view_formats_price_with_two_fraction_digits() {
        let view = ProductView::from_product(&sample_product(10));
        assert_eq!(view.price, "99.99");
        assert_eq!(view.available_stock, 10);
        assert!(view.in_stock);
    }

    #[test]
    fn view_reports_out_of_stock_at_zero() {
        let view = ProductView::from_product(&sample_product(0));
        assert!(!view.in_stock);
        assert_eq!(view.available_stock, 0);
    }
}
