//! # Sale Repository
//!
//! Database operations for sales and sale items, including the
//! sale-completion transaction.
//!
//! ## Sale Completion
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  complete_sale() - one transaction                      │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    INSERT INTO sales (totals, phone, invoice_url, status)              │
//! │    for each line:                                                       │
//! │      INSERT INTO sale_items (frozen snapshot)                           │
//! │      UPDATE products SET stock = stock - qty                            │
//! │        └── enforce_stock: ... AND stock >= qty                          │
//! │              rows_affected == 0 → InsufficientStock → ROLLBACK          │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure rolls back everything: no sale row, no items, no           │
//! │  stock changes. Notification dispatch happens strictly after COMMIT     │
//! │  and is not part of this transaction.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use gulab_core::cart::{CartLine, CartTotals};
use gulab_core::{NotificationStatus, Sale, SaleItem};

/// All columns of the sales table, in struct order (items loaded separately).
const SALE_COLUMNS: &str = "id, subtotal_cents, tax_cents, discount_cents, total_cents, \
     customer_phone, invoice_url, notification_status, created_at";

/// Everything `complete_sale` needs beyond the cart lines.
#[derive(Debug, Clone)]
pub struct NewSale {
    /// Totals computed by the cart under the active checkout policy.
    pub totals: CartTotals,

    /// Customer WhatsApp number as entered, if any.
    pub customer_phone: Option<String>,

    /// Where the invoice for this sale can be retrieved.
    pub invoice_url: String,

    /// When true, each stock decrement is conditional on sufficient stock
    /// and the transaction fails instead of going negative.
    pub enforce_stock: bool,
}

/// Aggregate figures across all recorded sales.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SalesSummary {
    pub sale_count: i64,
    pub total_revenue_cents: i64,
    pub total_profit_cents: i64,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Completes a sale atomically.
    ///
    /// Inserts the sale row and one frozen item row per cart line, and
    /// decrements each product's stock, all in a single transaction.
    /// The initial notification status is derived from the phone field
    /// (`Pending` when usable, `Skipped` otherwise).
    ///
    /// ## Errors
    /// - `NotFound` when a line references a product no longer in the
    ///   catalog (the decrement matches zero rows)
    /// - `InsufficientStock` when `enforce_stock` is on and a line would
    ///   drive stock negative
    ///
    /// Either error rolls the whole transaction back.
    pub async fn complete_sale(&self, lines: &[CartLine], new_sale: NewSale) -> DbResult<Sale> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let status = NotificationStatus::for_phone(new_sale.customer_phone.as_deref());

        debug!(
            id = %id,
            lines = lines.len(),
            total_cents = new_sale.totals.total_cents,
            "Completing sale"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, subtotal_cents, tax_cents, discount_cents, total_cents,
                customer_phone, invoice_url, notification_status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&id)
        .bind(new_sale.totals.subtotal_cents)
        .bind(new_sale.totals.tax_cents)
        .bind(new_sale.totals.discount_cents)
        .bind(new_sale.totals.total_cents)
        .bind(&new_sale.customer_phone)
        .bind(&new_sale.invoice_url)
        .bind(status)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());

        for line in lines {
            let item = SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: id.clone(),
                product_id: line.product_id.clone(),
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.final_price_cents,
                line_total_cents: line.final_price_cents * line.quantity,
                cost_price_cents: line.cost_price_cents,
            };

            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, product_name,
                    quantity, unit_price_cents, line_total_cents, cost_price_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.line_total_cents)
            .bind(item.cost_price_cents)
            .execute(&mut *tx)
            .await?;

            let result = if new_sale.enforce_stock {
                sqlx::query(
                    "UPDATE products SET stock = stock - ?2, updated_at = ?3 \
                     WHERE id = ?1 AND stock >= ?2",
                )
                .bind(&line.product_id)
                .bind(line.quantity)
                .bind(now)
                .execute(&mut *tx)
                .await?
            } else {
                sqlx::query(
                    "UPDATE products SET stock = stock - ?2, updated_at = ?3 WHERE id = ?1",
                )
                .bind(&line.product_id)
                .bind(line.quantity)
                .bind(now)
                .execute(&mut *tx)
                .await?
            };

            if result.rows_affected() == 0 {
                // Distinguish "product gone" from "not enough stock".
                let available: Option<i64> =
                    sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                        .bind(&line.product_id)
                        .fetch_optional(&mut *tx)
                        .await?;

                // Dropping tx rolls back the whole sale.
                return match available {
                    Some(available) => Err(DbError::InsufficientStock {
                        product_name: line.product_name.clone(),
                        available,
                        requested: line.quantity,
                    }),
                    None => Err(DbError::not_found("Product", &line.product_id)),
                };
            }

            items.push(item);
        }

        tx.commit().await?;

        Ok(Sale {
            id,
            subtotal_cents: new_sale.totals.subtotal_cents,
            tax_cents: new_sale.totals.tax_cents,
            discount_cents: new_sale.totals.discount_cents,
            total_cents: new_sale.totals.total_cents,
            customer_phone: new_sale.customer_phone,
            invoice_url: new_sale.invoice_url,
            notification_status: status,
            created_at: now,
            items,
        })
    }

    /// Gets a sale by ID, with its items in insertion order.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match sale {
            Some(mut sale) => {
                sale.items = self.get_items(&sale.id).await?;
                Ok(Some(sale))
            }
            None => Ok(None),
        }
    }

    /// Gets all items for a sale.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, product_name,
                   quantity, unit_price_cents, line_total_cents, cost_price_cents
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists recent sales, newest first, with items loaded.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let mut sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY created_at DESC, id LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        for sale in &mut sales {
            sale.items = self.get_items(&sale.id).await?;
        }

        Ok(sales)
    }

    /// Deletes a sale and (via FK cascade) its items.
    ///
    /// Stock is NOT restored: a deleted sale is a record correction, and
    /// physical inventory is adjusted through catalog edits if needed.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Updates the notification status of a sale.
    ///
    /// The only mutation sales support after completion.
    pub async fn update_notification_status(
        &self,
        id: &str,
        status: NotificationStatus,
    ) -> DbResult<()> {
        let result = sqlx::query("UPDATE sales SET notification_status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Aggregate revenue and profit across all sales.
    ///
    /// Profit comes from the frozen cost snapshots on sale items, so
    /// later catalog cost changes never rewrite history.
    pub async fn summary(&self) -> DbResult<SalesSummary> {
        let (sale_count, total_revenue_cents): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(total_cents), 0) FROM sales",
        )
        .fetch_one(&self.pool)
        .await?;

        let total_profit_cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(line_total_cents - cost_price_cents * quantity), 0) \
             FROM sale_items",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(SalesSummary {
            sale_count,
            total_revenue_cents,
            total_profit_cents,
        })
    }

}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use gulab_core::ProductInput;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, name: &str, price: i64, cost: i64, stock: i64) -> String {
        db.products()
            .create(ProductInput {
                name: name.to_string(),
                sku: format!("SKU-{}", name.replace(' ', "-")),
                category_id: "cat-1".to_string(),
                price_cents: price,
                cost_price_cents: cost,
                stock,
                description: None,
                image_url: None,
            })
            .await
            .unwrap()
            .id
    }

    fn line(product_id: &str, name: &str, price: i64, cost: i64, qty: i64) -> CartLine {
        CartLine {
            product_id: product_id.to_string(),
            product_name: name.to_string(),
            default_price_cents: price,
            final_price_cents: price,
            quantity: qty,
            cost_price_cents: cost,
            stock: 999,
        }
    }

    fn new_sale(total: i64, phone: Option<&str>, enforce: bool) -> NewSale {
        NewSale {
            totals: CartTotals {
                subtotal_cents: total,
                discount_cents: 0,
                tax_cents: 0,
                total_cents: total,
            },
            customer_phone: phone.map(str::to_string),
            invoice_url: "/invoice/test".to_string(),
            enforce_stock: enforce,
        }
    }

    #[tokio::test]
    async fn test_complete_sale_persists_and_decrements() {
        let db = db().await;
        let pid = seed_product(&db, "Oud Attar", 799, 500, 10).await;

        let sale = db
            .sales()
            .complete_sale(
                &[line(&pid, "Oud Attar", 799, 500, 2)],
                new_sale(1598, Some("9876543210"), false),
            )
            .await
            .unwrap();

        assert_eq!(sale.total_cents, 1598);
        assert_eq!(sale.notification_status, NotificationStatus::Pending);
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.items[0].line_total_cents, 1598);

        // Stock decremented 10 -> 8
        assert_eq!(db.products().current_stock(&pid).await.unwrap(), 8);

        // Round-trips with items
        let fetched = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(fetched.items.len(), 1);
        assert_eq!(fetched.items[0].product_name, "Oud Attar");
    }

    #[tokio::test]
    async fn test_complete_sale_no_phone_is_skipped() {
        let db = db().await;
        let pid = seed_product(&db, "Oud Attar", 799, 500, 10).await;

        let sale = db
            .sales()
            .complete_sale(
                &[line(&pid, "Oud Attar", 799, 500, 1)],
                new_sale(799, None, false),
            )
            .await
            .unwrap();

        assert_eq!(sale.notification_status, NotificationStatus::Skipped);
    }

    #[tokio::test]
    async fn test_complete_sale_rolls_back_on_missing_product() {
        let db = db().await;
        let pid = seed_product(&db, "Oud Attar", 799, 500, 10).await;

        let err = db
            .sales()
            .complete_sale(
                &[
                    line(&pid, "Oud Attar", 799, 500, 2),
                    line("ghost-id", "Ghost", 100, 50, 1),
                ],
                new_sale(1698, None, false),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));

        // Nothing persisted, first line's decrement rolled back
        assert_eq!(db.sales().list_recent(10).await.unwrap().len(), 0);
        assert_eq!(db.products().current_stock(&pid).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_blind_decrement_goes_negative() {
        let db = db().await;
        let pid = seed_product(&db, "Oud Attar", 799, 500, 1).await;

        db.sales()
            .complete_sale(
                &[line(&pid, "Oud Attar", 799, 500, 3)],
                new_sale(2397, None, false),
            )
            .await
            .unwrap();

        assert_eq!(db.products().current_stock(&pid).await.unwrap(), -2);
    }

    #[tokio::test]
    async fn test_enforced_decrement_fails_and_rolls_back() {
        let db = db().await;
        let pid = seed_product(&db, "Oud Attar", 799, 500, 1).await;

        let err = db
            .sales()
            .complete_sale(
                &[line(&pid, "Oud Attar", 799, 500, 3)],
                new_sale(2397, None, true),
            )
            .await
            .unwrap_err();

        match err {
            DbError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 1);
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(db.products().current_stock(&pid).await.unwrap(), 1);
        assert_eq!(db.sales().list_recent(10).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_delete_cascades_items_keeps_stock() {
        let db = db().await;
        let pid = seed_product(&db, "Oud Attar", 799, 500, 10).await;

        let sale = db
            .sales()
            .complete_sale(
                &[line(&pid, "Oud Attar", 799, 500, 2)],
                new_sale(1598, None, false),
            )
            .await
            .unwrap();

        db.sales().delete(&sale.id).await.unwrap();

        assert!(db.sales().get_by_id(&sale.id).await.unwrap().is_none());
        assert!(db.sales().get_items(&sale.id).await.unwrap().is_empty());
        // Deleting the record does not restore stock
        assert_eq!(db.products().current_stock(&pid).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_update_notification_status() {
        let db = db().await;
        let pid = seed_product(&db, "Oud Attar", 799, 500, 10).await;

        let sale = db
            .sales()
            .complete_sale(
                &[line(&pid, "Oud Attar", 799, 500, 1)],
                new_sale(799, Some("9876543210"), false),
            )
            .await
            .unwrap();

        db.sales()
            .update_notification_status(&sale.id, NotificationStatus::Sent)
            .await
            .unwrap();

        let fetched = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(fetched.notification_status, NotificationStatus::Sent);
    }

    #[tokio::test]
    async fn test_summary_uses_frozen_costs() {
        let db = db().await;
        let pid = seed_product(&db, "Oud Attar", 799, 500, 10).await;

        db.sales()
            .complete_sale(
                &[line(&pid, "Oud Attar", 799, 500, 2)],
                new_sale(1598, None, false),
            )
            .await
            .unwrap();

        let summary = db.sales().summary().await.unwrap();
        assert_eq!(summary.sale_count, 1);
        assert_eq!(summary.total_revenue_cents, 1598);
        assert_eq!(summary.total_profit_cents, 1598 - 1000);
    }
}
