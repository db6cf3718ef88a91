//! # Cart Accumulator
//!
//! The in-memory structure a staff member assembles before checkout.
//!
//! ## Ownership
//! A `Cart` is a plain value owned by the active checkout session and
//! passed by reference to whoever needs it. There is no global cart, no
//! interior mutability, no locking: one owner, synchronous mutation.
//!
//! ## Operations Flow
//! ```text
//! Tap product        ──► add_line()     ──► new line / quantity +1
//! Edit qty or price  ──► update_line()  ──► merge-patch (no clamping here)
//! Tap remove         ──► remove_line()
//! Checkout / cancel  ──► validate_checkout() + totals(), then clear()
//! ```
//!
//! ## Validation Split
//! The accumulator itself never clamps quantities or prices; it stores
//! whatever the caller patched in. Boundary code is expected to run
//! [`validate_line_update`] before applying an edit (reverting and warning
//! on rejection) and [`validate_checkout`] before completing a sale. The
//! checkout path re-checks regardless, so a misbehaving caller cannot
//! persist a price below cost.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError};
use crate::money::{Money, TaxRate};
use crate::types::Product;
use crate::validation::validate_quantity;

// =============================================================================
// Cart Line
// =============================================================================

/// One product entry in the in-progress, not-yet-committed sale.
///
/// Freezes the product data it needs at the moment of adding: later catalog
/// edits do not affect lines already in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product ID (UUID).
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub product_name: String,

    /// Catalog price at time of adding (frozen).
    pub default_price_cents: i64,

    /// Editable selling price for this line. Starts at the default price;
    /// staff may lower it, but never below `cost_price_cents`.
    pub final_price_cents: i64,

    /// Quantity in cart.
    pub quantity: i64,

    /// Cost price at time of adding (frozen) - the price floor.
    pub cost_price_cents: i64,

    /// Stock level at time of adding (frozen) - the quantity ceiling.
    pub stock: i64,
}

impl CartLine {
    /// Creates a line for one unit of the given product.
    pub fn from_product(product: &Product) -> Self {
        CartLine {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            default_price_cents: product.price_cents,
            final_price_cents: product.price_cents,
            quantity: 1,
            cost_price_cents: product.cost_price_cents,
            stock: product.stock,
        }
    }

    /// Line total: final price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.final_price_cents).multiply_quantity(self.quantity)
    }
}

/// Merge-patch for a cart line. `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CartLineUpdate {
    pub quantity: Option<i64>,
    pub final_price_cents: Option<i64>,
}

/// What happened when a product was added to the cart.
///
/// The accumulator never warns by itself; callers map `AtStockLimit` and
/// `OutOfStock` to whatever user feedback fits their surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was created with quantity 1.
    Added,
    /// An existing line's quantity was incremented by 1.
    Incremented,
    /// The line already holds the full stock snapshot; left unchanged.
    AtStockLimit,
    /// The product has no stock; no line was created.
    OutOfStock,
}

// =============================================================================
// Checkout Policy & Totals
// =============================================================================

/// Deployment-level checkout knobs.
///
/// Tax and discount are configuration, not hard-coded business logic: the
/// default deployment charges neither, a known variant charges 5% tax
/// (`tax_rate = TaxRate::from_bps(500)`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CheckoutPolicy {
    /// Tax applied on the subtotal.
    pub tax_rate: TaxRate,

    /// Discount applied on the subtotal, in basis points. No UI sets this
    /// today; it exists so a discount never has to be hard-coded in.
    pub discount_bps: u32,

    /// When true, sale completion uses a conditional stock decrement and
    /// fails the whole transaction if any line would drive stock negative.
    /// When false (default), the decrement is unconditional and concurrent
    /// sales of the same product can over-sell it.
    pub enforce_stock: bool,
}

/// Totals derived from the cart at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

// =============================================================================
// Cart
// =============================================================================

/// The in-progress sale.
///
/// ## Invariants
/// - Lines are unique by `product_id`; adding the same product again
///   increments its quantity.
/// - Line order is insertion order and is preserved into the sale record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds one unit of a product, or bumps the existing line's quantity.
    ///
    /// The stock snapshot taken when the line was created caps the
    /// quantity; an add that would exceed it leaves the line unchanged and
    /// reports [`AddOutcome::AtStockLimit`].
    pub fn add_line(&mut self, product: &Product) -> AddOutcome {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            if line.quantity >= line.stock {
                return AddOutcome::AtStockLimit;
            }
            line.quantity += 1;
            return AddOutcome::Incremented;
        }

        if product.stock < 1 {
            return AddOutcome::OutOfStock;
        }

        self.lines.push(CartLine::from_product(product));
        AddOutcome::Added
    }

    /// Merge-patches the matching line.
    ///
    /// Performs no range or price clamping - that is the boundary's job
    /// (see [`validate_line_update`]). Returns `false` if the product has
    /// no line in the cart.
    pub fn update_line(&mut self, product_id: &str, update: CartLineUpdate) -> bool {
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                if let Some(quantity) = update.quantity {
                    line.quantity = quantity;
                }
                if let Some(final_price_cents) = update.final_price_cents {
                    line.final_price_cents = final_price_cents;
                }
                true
            }
            None => false,
        }
    }

    /// Removes the line for a product. Returns `false` if absent.
    pub fn remove_line(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    /// Removes all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// The lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Subtotal: Σ final_price × quantity over all lines.
    pub fn subtotal(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, l| acc + l.line_total())
    }

    /// Recomputes totals under the given policy.
    ///
    /// `total = subtotal − discount + tax`. Recomputed on every call; the
    /// cart caches nothing.
    pub fn totals(&self, policy: &CheckoutPolicy) -> CartTotals {
        let subtotal = self.subtotal();
        let discount = subtotal.apply_rate(TaxRate::from_bps(policy.discount_bps));
        let tax = subtotal.apply_rate(policy.tax_rate);
        let total = subtotal - discount + tax;

        CartTotals {
            subtotal_cents: subtotal.cents(),
            discount_cents: discount.cents(),
            tax_cents: tax.cents(),
            total_cents: total.cents(),
        }
    }
}

// =============================================================================
// Boundary Validation
// =============================================================================

/// Validates a proposed line edit against the line's frozen snapshot.
///
/// Boundary code calls this before `update_line` and reverts the edit with
/// a warning when it fails. Rules:
/// - quantity must be a valid quantity (`[1, MAX_ITEM_QUANTITY]`) and
///   must not exceed the stock snapshot
/// - final price must stay at or above the cost price
pub fn validate_line_update(
    line: &CartLine,
    update: &CartLineUpdate,
) -> Result<(), ValidationError> {
    if let Some(quantity) = update.quantity {
        validate_quantity(quantity)?;

        if quantity > line.stock {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: line.stock,
            });
        }
    }

    if let Some(final_price_cents) = update.final_price_cents {
        if final_price_cents < line.cost_price_cents {
            return Err(ValidationError::BelowMinimum {
                field: "final_price".to_string(),
                min: line.cost_price_cents,
            });
        }
    }

    Ok(())
}

/// Server-side precondition check for sale completion.
///
/// The UI boundary already enforces both rules at edit time, but checkout
/// re-checks so nothing below cost can ever be persisted:
/// - the line list must be non-empty;
/// - every line's final price must be at or above its cost price.
pub fn validate_checkout(lines: &[CartLine]) -> Result<(), CoreError> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    for line in lines {
        if line.final_price_cents < line.cost_price_cents {
            return Err(CoreError::PriceBelowCost {
                product_name: line.product_name.clone(),
                final_price_cents: line.final_price_cents,
                cost_price_cents: line.cost_price_cents,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, price: i64, cost: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            sku: format!("SKU-{}", id),
            category_id: "cat-1".to_string(),
            price_cents: price,
            cost_price_cents: cost,
            stock,
            description: None,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_line_new_product() {
        let mut cart = Cart::new();
        let p = product("a", 799, 500, 10);

        assert_eq!(cart.add_line(&p), AddOutcome::Added);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines()[0].quantity, 1);
        assert_eq!(cart.lines()[0].final_price_cents, 799);
    }

    #[test]
    fn test_add_line_increments_existing() {
        let mut cart = Cart::new();
        let p = product("a", 799, 500, 10);

        cart.add_line(&p);
        assert_eq!(cart.add_line(&p), AddOutcome::Incremented);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_add_line_caps_at_stock_snapshot() {
        let mut cart = Cart::new();
        let p = product("a", 799, 500, 2);

        cart.add_line(&p);
        cart.add_line(&p);
        assert_eq!(cart.add_line(&p), AddOutcome::AtStockLimit);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_add_line_out_of_stock() {
        let mut cart = Cart::new();
        let p = product("a", 799, 500, 0);

        assert_eq!(cart.add_line(&p), AddOutcome::OutOfStock);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_line_merge_patch() {
        let mut cart = Cart::new();
        let p = product("a", 799, 500, 10);
        cart.add_line(&p);

        // Only quantity patched; price untouched.
        assert!(cart.update_line(
            "a",
            CartLineUpdate {
                quantity: Some(3),
                final_price_cents: None,
            }
        ));
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.lines()[0].final_price_cents, 799);

        // Only price patched; quantity untouched.
        assert!(cart.update_line(
            "a",
            CartLineUpdate {
                quantity: None,
                final_price_cents: Some(650),
            }
        ));
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.lines()[0].final_price_cents, 650);
    }

    #[test]
    fn test_update_line_does_not_clamp() {
        // The accumulator stores whatever it is given; validation is the
        // boundary's job.
        let mut cart = Cart::new();
        let p = product("a", 799, 500, 2);
        cart.add_line(&p);

        cart.update_line(
            "a",
            CartLineUpdate {
                quantity: Some(99),
                final_price_cents: Some(1),
            },
        );
        assert_eq!(cart.lines()[0].quantity, 99);
        assert_eq!(cart.lines()[0].final_price_cents, 1);
    }

    #[test]
    fn test_update_missing_line() {
        let mut cart = Cart::new();
        assert!(!cart.update_line("ghost", CartLineUpdate::default()));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add_line(&product("a", 799, 500, 10));
        cart.add_line(&product("b", 400, 200, 10));

        assert!(cart.remove_line("a"));
        assert!(!cart.remove_line("a"));
        assert_eq!(cart.line_count(), 1);

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_subtotal_property() {
        // subtotal == Σ final_price × quantity after any mutation sequence
        let mut cart = Cart::new();
        cart.add_line(&product("a", 799, 500, 10));
        cart.add_line(&product("a", 799, 500, 10));
        cart.add_line(&product("b", 400, 200, 5));
        cart.update_line(
            "b",
            CartLineUpdate {
                quantity: Some(3),
                final_price_cents: Some(350),
            },
        );

        let expected: i64 = cart
            .lines()
            .iter()
            .map(|l| l.final_price_cents * l.quantity)
            .sum();
        assert_eq!(cart.subtotal().cents(), expected);
        assert_eq!(cart.subtotal().cents(), 799 * 2 + 350 * 3);
    }

    #[test]
    fn test_totals_default_policy() {
        let mut cart = Cart::new();
        let p = product("a", 799, 500, 10);
        cart.add_line(&p);
        cart.add_line(&p);

        let totals = cart.totals(&CheckoutPolicy::default());
        assert_eq!(totals.subtotal_cents, 1598);
        assert_eq!(totals.discount_cents, 0);
        assert_eq!(totals.tax_cents, 0);
        assert_eq!(totals.total_cents, 1598);
    }

    #[test]
    fn test_totals_with_five_percent_tax() {
        let mut cart = Cart::new();
        cart.add_line(&product("a", 1000, 500, 10));

        let policy = CheckoutPolicy {
            tax_rate: TaxRate::from_bps(500),
            ..Default::default()
        };
        let totals = cart.totals(&policy);
        assert_eq!(totals.subtotal_cents, 1000);
        assert_eq!(totals.tax_cents, 50);
        assert_eq!(totals.total_cents, 1050);
    }

    #[test]
    fn test_validate_line_update_rules() {
        let p = product("a", 799, 500, 5);
        let line = CartLine::from_product(&p);

        assert!(validate_line_update(
            &line,
            &CartLineUpdate {
                quantity: Some(5),
                final_price_cents: Some(500),
            }
        )
        .is_ok());

        assert!(validate_line_update(
            &line,
            &CartLineUpdate {
                quantity: Some(0),
                final_price_cents: None,
            }
        )
        .is_err());

        assert!(validate_line_update(
            &line,
            &CartLineUpdate {
                quantity: Some(6),
                final_price_cents: None,
            }
        )
        .is_err());

        assert!(validate_line_update(
            &line,
            &CartLineUpdate {
                quantity: None,
                final_price_cents: Some(499),
            }
        )
        .is_err());
    }

    #[test]
    fn test_validate_line_update_caps_at_max_quantity() {
        // A huge stock snapshot does not lift the per-line quantity cap
        let p = product("a", 799, 500, 5000);
        let line = CartLine::from_product(&p);

        assert!(validate_line_update(
            &line,
            &CartLineUpdate {
                quantity: Some(crate::MAX_ITEM_QUANTITY),
                final_price_cents: None,
            }
        )
        .is_ok());

        assert!(validate_line_update(
            &line,
            &CartLineUpdate {
                quantity: Some(crate::MAX_ITEM_QUANTITY + 1),
                final_price_cents: None,
            }
        )
        .is_err());
    }

    #[test]
    fn test_validate_checkout_empty() {
        assert!(matches!(validate_checkout(&[]), Err(CoreError::EmptyCart)));
    }

    #[test]
    fn test_validate_checkout_price_below_cost() {
        let p = product("b", 799, 500, 5);
        let mut line = CartLine::from_product(&p);
        line.final_price_cents = 400;

        let err = validate_checkout(std::slice::from_ref(&line)).unwrap_err();
        match err {
            CoreError::PriceBelowCost {
                product_name,
                final_price_cents,
                cost_price_cents,
            } => {
                assert_eq!(product_name, "Product b");
                assert_eq!(final_price_cents, 400);
                assert_eq!(cost_price_cents, 500);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
