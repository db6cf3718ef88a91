//! # Product Actions
//!
//! Catalog CRUD plus the description-generation flow.

use tracing::{debug, info};

use crate::error::ActionError;
use crate::AppState;
use gulab_ai::{generate_product_description, ProductDescriptionInput, ProductDescriptionOutput};
use gulab_core::validation::validate_product_input;
use gulab_core::{CoreError, Product, ProductInput};

/// Creates a product.
pub async fn create_product(
    state: &AppState,
    input: ProductInput,
) -> Result<Product, ActionError> {
    debug!(name = %input.name, sku = %input.sku, "create_product action");

    validate_product_input(&input).map_err(CoreError::from)?;

    let product = state.db.products().create(input).await?;
    info!(id = %product.id, sku = %product.sku, "Product created");
    Ok(product)
}

/// Gets a product by ID.
pub async fn get_product(state: &AppState, id: &str) -> Result<Product, ActionError> {
    state
        .db
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ActionError::not_found("Product", id))
}

/// Lists the whole catalog sorted by name.
pub async fn list_products(state: &AppState) -> Result<Vec<Product>, ActionError> {
    Ok(state.db.products().list_all().await?)
}

/// Lists products in a category.
///
/// An unknown or deleted category id simply yields an empty list.
pub async fn list_products_by_category(
    state: &AppState,
    category_id: &str,
) -> Result<Vec<Product>, ActionError> {
    Ok(state.db.products().list_by_category(category_id).await?)
}

/// Fully updates a product.
///
/// Full-field semantics: `description: None` clears any stored description.
pub async fn update_product(
    state: &AppState,
    id: &str,
    input: ProductInput,
) -> Result<Product, ActionError> {
    debug!(id = %id, "update_product action");

    validate_product_input(&input).map_err(CoreError::from)?;

    let product = state.db.products().update(id, input).await?;
    Ok(product)
}

/// Deletes a product.
///
/// Historical sale items keep their frozen snapshots.
pub async fn delete_product(state: &AppState, id: &str) -> Result<(), ActionError> {
    debug!(id = %id, "delete_product action");

    state.db.products().delete(id).await?;
    Ok(())
}

/// Generates a description and marketing copy for a product.
///
/// Resolves the category name when possible (a dangling category id just
/// omits the category from the prompt). Returns the generated text only;
/// saving it to the product is a separate, explicit update.
pub async fn generate_description(
    state: &AppState,
    product_id: &str,
    additional_details: Option<String>,
) -> Result<ProductDescriptionOutput, ActionError> {
    let ai = state
        .ai
        .as_ref()
        .ok_or_else(|| ActionError::not_generated("Text generation is not configured"))?;

    let product = get_product(state, product_id).await?;

    let category = state
        .db
        .categories()
        .get_by_id(&product.category_id)
        .await?
        .map(|c| c.name);

    let input = ProductDescriptionInput {
        product_name: product.name.clone(),
        price_cents: product.price_cents,
        category,
        additional_details,
    };

    debug!(product_id = %product_id, "generate_description action");

    let output = generate_product_description(ai, &state.config.store_name, &input).await?;
    Ok(output)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::ErrorCode;
    use gulab_ai::TextGenClient;
    use gulab_db::{Database, DbConfig};

    async fn state() -> AppState {
        AppState::new(
            Database::new(DbConfig::in_memory()).await.unwrap(),
            None,
            AppConfig::default(),
        )
    }

    fn input(name: &str, sku: &str) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            sku: sku.to_string(),
            category_id: "cat-1".to_string(),
            price_cents: 799,
            cost_price_cents: 500,
            stock: 10,
            description: None,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let state = state().await;

        let created = create_product(&state, input("Oud Attar", "ATTAR-OUD"))
            .await
            .unwrap();
        let fetched = get_product(&state, &created.id).await.unwrap();
        assert_eq!(fetched.name, "Oud Attar");
    }

    #[tokio::test]
    async fn test_invalid_input_rejected() {
        let state = state().await;

        let mut bad = input("Oud Attar", "ATTAR-OUD");
        bad.price_cents = -1;

        let err = create_product(&state, bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let state = state().await;

        let err = get_product(&state, "ghost").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_update_clears_description() {
        let state = state().await;

        let mut with_desc = input("Oud Attar", "ATTAR-OUD");
        with_desc.description = Some("old copy".to_string());
        let created = create_product(&state, with_desc).await.unwrap();

        let updated = update_product(&state, &created.id, input("Oud Attar", "ATTAR-OUD"))
            .await
            .unwrap();
        assert!(updated.description.is_none());
    }

    #[tokio::test]
    async fn test_generate_without_client_is_not_generated() {
        let state = state().await;
        let created = create_product(&state, input("Oud Attar", "ATTAR-OUD"))
            .await
            .unwrap();

        let err = generate_description(&state, &created.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotGenerated);
    }

    #[tokio::test]
    async fn test_generate_with_unreachable_endpoint_fails() {
        let mut state = state().await;
        state.ai = Some(TextGenClient::new("http://127.0.0.1:1", "key", "model").unwrap());

        let created = create_product(&state, input("Oud Attar", "ATTAR-OUD"))
            .await
            .unwrap();

        let err = generate_description(&state, &created.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotGenerated);
    }
}
