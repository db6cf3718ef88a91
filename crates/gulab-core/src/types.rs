//! # Domain Types
//!
//! Core domain types used throughout Gulab POS.
//!
//! ## Type Hierarchy
//! ```text
//! Category ◄── Product            catalog (mutable via inventory actions)
//!                 │
//!                 ▼ snapshot at checkout
//!              CartLine            ephemeral, per checkout session
//!                 │
//!                 ▼ sale completion
//!              Sale ── SaleItem    immutable once written
//! ```
//!
//! ## Snapshot Pattern
//! A `SaleItem` freezes the product name, the edited unit price, and the
//! cost price at the moment of sale. Later catalog edits never change what
//! a historical sale reports, which keeps profit figures stable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// A product category.
///
/// Categories are a flat namespace; products reference them by id. There is
/// deliberately no foreign key from products to categories: deleting a
/// category leaves referencing products with a dangling `category_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on the POS grid and on sale lines.
    pub name: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Category this product belongs to. May dangle after a category
    /// deletion; consumers must tolerate unknown ids.
    pub category_id: String,

    /// Selling price in minor units.
    pub price_cents: i64,

    /// Cost price in minor units (for profit margin calculations and the
    /// price-floor rule at checkout).
    pub cost_price_cents: i64,

    /// Current stock level. Mutated only by sale completion.
    pub stock: i64,

    /// Optional generated or hand-written description.
    pub description: Option<String>,

    /// Optional image reference.
    pub image_url: Option<String>,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the selling price as a Money value.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the cost price as a Money value.
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    /// Whether at least one unit can be sold.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock >= 1
    }
}

/// Input fields for creating or fully updating a product.
///
/// Updates are full-field: passing `description: None` removes any stored
/// description (explicit unset, never a stale leftover value).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub sku: String,
    pub category_id: String,
    pub price_cents: i64,
    pub cost_price_cents: i64,
    pub stock: i64,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

// =============================================================================
// Notification Status
// =============================================================================

/// Delivery state of the purchase-confirmation message for a sale.
///
/// ## State Machine
/// ```text
/// (no usable phone) ──────────► Skipped            terminal
/// (phone present)   ──────────► Pending ──► Sent ◄──┐
///                                      └──► Failed ◄┘  (re-dispatch moves
///                                                       between these two)
/// ```
/// `Skipped` is the only terminal state. A re-dispatch of a `Sent` or
/// `Failed` sale regenerates and re-sends; each attempt records its own
/// outcome, and nothing ever reverts to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    /// A message should be generated and sent.
    Pending,
    /// The message was generated and handed to the delivery channel.
    Sent,
    /// Generation or delivery failed; eligible for manual resend.
    Failed,
    /// No usable customer contact; nothing will ever be sent.
    Skipped,
}

impl NotificationStatus {
    /// Initial status for a new sale given the customer phone field.
    ///
    /// Matches the checkout rule: anything longer than 3 characters after
    /// trimming counts as a usable phone number.
    pub fn for_phone(phone: Option<&str>) -> Self {
        match phone.map(str::trim) {
            Some(p) if p.len() >= crate::MIN_PHONE_LEN => NotificationStatus::Pending,
            _ => NotificationStatus::Skipped,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale.
///
/// Immutable once created except for `notification_status`; corrections
/// happen by deleting and re-entering the sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    /// Customer WhatsApp number, if one was captured at checkout.
    pub customer_phone: Option<String>,
    /// Reference to the retrievable invoice artifact.
    pub invoice_url: String,
    pub notification_status: NotificationStatus,
    pub created_at: DateTime<Utc>,
    /// Line items, loaded from their own table.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<SaleItem>,
}

impl Sale {
    /// Returns the grand total as a Money value.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// One immutable line of a completed sale (snapshot pattern).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Quantity sold.
    pub quantity: i64,
    /// The edited final price at time of sale (frozen).
    pub unit_price_cents: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
    /// Cost price at time of sale, for profit reporting even if the
    /// product's cost later changes.
    pub cost_price_cents: i64,
}

impl SaleItem {
    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }

    /// Profit contributed by this line at its frozen cost price.
    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.line_total_cents - self.cost_price_cents * self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_phone() {
        assert_eq!(
            NotificationStatus::for_phone(None),
            NotificationStatus::Skipped
        );
        assert_eq!(
            NotificationStatus::for_phone(Some("")),
            NotificationStatus::Skipped
        );
        assert_eq!(
            NotificationStatus::for_phone(Some("123")),
            NotificationStatus::Skipped
        );
        assert_eq!(
            NotificationStatus::for_phone(Some("  123 ")),
            NotificationStatus::Skipped
        );
        assert_eq!(
            NotificationStatus::for_phone(Some("9876543210")),
            NotificationStatus::Pending
        );
    }

    #[test]
    fn test_sale_item_profit() {
        let item = SaleItem {
            id: "i1".to_string(),
            sale_id: "s1".to_string(),
            product_id: "p1".to_string(),
            product_name: "Oud Attar".to_string(),
            quantity: 2,
            unit_price_cents: 799,
            line_total_cents: 1598,
            cost_price_cents: 500,
        };
        assert_eq!(item.profit().cents(), 1598 - 1000);
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&NotificationStatus::Skipped).unwrap();
        assert_eq!(json, "\"skipped\"");
    }
}
