//! # Category Actions

use tracing::debug;

use crate::error::ActionError;
use crate::AppState;
use gulab_core::validation::validate_category_name;
use gulab_core::Category;

/// Creates a category.
pub async fn create_category(state: &AppState, name: &str) -> Result<Category, ActionError> {
    debug!(name = %name, "create_category action");

    validate_category_name(name).map_err(gulab_core::CoreError::from)?;

    let category = state.db.categories().create(name).await?;
    Ok(category)
}

/// Lists all categories sorted by name.
pub async fn list_categories(state: &AppState) -> Result<Vec<Category>, ActionError> {
    Ok(state.db.categories().list_all().await?)
}

/// Renames a category.
pub async fn rename_category(
    state: &AppState,
    id: &str,
    name: &str,
) -> Result<Category, ActionError> {
    debug!(id = %id, name = %name, "rename_category action");

    validate_category_name(name).map_err(gulab_core::CoreError::from)?;

    let category = state.db.categories().rename(id, name).await?;
    Ok(category)
}

/// Deletes a category.
///
/// Products referencing it are left with a dangling `category_id`; the
/// catalog keeps working and listings tolerate the unknown reference.
pub async fn delete_category(state: &AppState, id: &str) -> Result<(), ActionError> {
    debug!(id = %id, "delete_category action");

    state.db.categories().delete(id).await?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::ErrorCode;
    use gulab_db::{Database, DbConfig};

    async fn state() -> AppState {
        AppState::new(
            Database::new(DbConfig::in_memory()).await.unwrap(),
            None,
            AppConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_create_list_delete() {
        let state = state().await;

        let cat = create_category(&state, "Attars").await.unwrap();
        assert_eq!(list_categories(&state).await.unwrap().len(), 1);

        delete_category(&state, &cat.id).await.unwrap();
        assert!(list_categories(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let state = state().await;

        let err = create_category(&state, "  ").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_delete_leaves_products_dangling() {
        let state = state().await;

        let cat = create_category(&state, "Attars").await.unwrap();
        let product = state
            .db
            .products()
            .create(gulab_core::ProductInput {
                name: "Oud Attar".to_string(),
                sku: "ATTAR-OUD".to_string(),
                category_id: cat.id.clone(),
                price_cents: 799,
                cost_price_cents: 500,
                stock: 10,
                description: None,
                image_url: None,
            })
            .await
            .unwrap();

        delete_category(&state, &cat.id).await.unwrap();

        // Product survives with its (now dangling) category reference
        let fetched = state
            .db
            .products()
            .get_by_id(&product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.category_id, cat.id);
    }
}
