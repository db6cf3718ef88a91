//! # Category Repository
//!
//! Database operations for product categories.
//!
//! Categories are a flat namespace. Deleting one does NOT cascade to
//! products: their `category_id` is left dangling on purpose, and catalog
//! consumers must tolerate unknown ids.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use gulab_core::Category;

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Creates a category with a generated ID.
    pub async fn create(&self, name: &str) -> DbResult<Category> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
        };

        debug!(id = %category.id, name = %category.name, "Creating category");

        sqlx::query("INSERT INTO categories (id, name) VALUES (?1, ?2)")
            .bind(&category.id)
            .bind(&category.name)
            .execute(&self.pool)
            .await?;

        Ok(category)
    }

    /// Gets a category by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Lists all categories sorted by name.
    pub async fn list_all(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Renames a category.
    pub async fn rename(&self, id: &str, name: &str) -> DbResult<Category> {
        let name = name.trim();

        let result = sqlx::query("UPDATE categories SET name = ?2 WHERE id = ?1")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(Category {
            id: id.to_string(),
            name: name.to_string(),
        })
    }

    /// Deletes a category.
    ///
    /// Products referencing it keep their `category_id` unchanged.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let db = db().await;
        let repo = db.categories();

        repo.create("Attars").await.unwrap();
        repo.create("Perfume Oils").await.unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        // Sorted by name
        assert_eq!(all[0].name, "Attars");
        assert_eq!(all[1].name, "Perfume Oils");
    }

    #[tokio::test]
    async fn test_rename() {
        let db = db().await;
        let repo = db.categories();

        let cat = repo.create("Atars").await.unwrap();
        let renamed = repo.rename(&cat.id, "Attars").await.unwrap();
        assert_eq!(renamed.name, "Attars");

        let fetched = repo.get_by_id(&cat.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Attars");
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let db = db().await;
        assert!(db.categories().delete("no-such-id").await.is_err());
    }
}
