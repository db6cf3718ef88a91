//! # Sale Actions
//!
//! Sale completion, history, and the manual notification resend.
//!
//! ## Completion Flow
//! ```text
//! complete_sale(cart, phone)
//!      │
//!      ├── validate_checkout      non-empty, every price >= cost
//!      ├── cart.totals(policy)    subtotal − discount + tax
//!      ├── db.complete_sale       one transaction (sale + items + stock)
//!      └── spawn_dispatch         only when phone usable AND client set
//! ```
//! The caller clears its cart after a successful return.

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ActionError;
use crate::notify::{self, DispatchOutcome};
use crate::AppState;
use gulab_core::cart::{validate_checkout, Cart};
use gulab_core::{NotificationStatus, Sale};
use gulab_db::{NewSale, SalesSummary};

/// Completes the in-progress sale.
///
/// Validates the cart, persists the sale atomically, and (when the sale
/// has a usable phone and a generation client is configured) spawns the
/// confirmation dispatcher. Returns the persisted sale; its notification
/// status at this point is `Pending` or `Skipped` - the dispatcher moves
/// it to `Sent`/`Failed` afterwards.
pub async fn complete_sale(
    state: &AppState,
    cart: &Cart,
    customer_phone: Option<String>,
) -> Result<Sale, ActionError> {
    debug!(lines = cart.line_count(), "complete_sale action");

    validate_checkout(cart.lines())?;

    let policy = state.config.checkout_policy();
    let totals = cart.totals(&policy);

    let invoice_url = format!(
        "{}/{}.pdf",
        state.config.invoice_base_url.trim_end_matches('/'),
        Uuid::new_v4()
    );

    let sale = state
        .db
        .sales()
        .complete_sale(
            cart.lines(),
            NewSale {
                totals,
                customer_phone,
                invoice_url,
                enforce_stock: policy.enforce_stock,
            },
        )
        .await?;

    info!(
        sale_id = %sale.id,
        total_cents = sale.total_cents,
        items = sale.items.len(),
        status = ?sale.notification_status,
        "Sale completed"
    );

    if sale.notification_status == NotificationStatus::Pending {
        if let Some(ai) = &state.ai {
            notify::spawn_dispatch(
                state.db.clone(),
                ai.clone(),
                state.config.clone(),
                sale.clone(),
            );
        }
    }

    Ok(sale)
}

/// Gets a sale with its items.
pub async fn get_sale(state: &AppState, id: &str) -> Result<Sale, ActionError> {
    state
        .db
        .sales()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ActionError::not_found("Sale", id))
}

/// Lists recent sales, newest first.
pub async fn list_sales(state: &AppState, limit: u32) -> Result<Vec<Sale>, ActionError> {
    Ok(state.db.sales().list_recent(limit).await?)
}

/// Deletes a sale record (items cascade; stock is not restored).
pub async fn delete_sale(state: &AppState, id: &str) -> Result<(), ActionError> {
    debug!(id = %id, "delete_sale action");

    state.db.sales().delete(id).await?;
    Ok(())
}

/// Aggregate revenue and profit across recorded sales.
pub async fn sales_summary(state: &AppState) -> Result<SalesSummary, ActionError> {
    Ok(state.db.sales().summary().await?)
}

/// Manually re-runs notification dispatch for a sale.
///
/// Works for any sale with a usable phone: ones stuck `Pending`
/// (completed while generation was unconfigured), `Failed` ones, and
/// already-`Sent` ones (re-sends). Runs synchronously so the caller sees
/// the outcome.
pub async fn resend_notification(
    state: &AppState,
    sale_id: &str,
) -> Result<DispatchOutcome, ActionError> {
    let ai = state
        .ai
        .as_ref()
        .ok_or_else(|| ActionError::not_generated("Text generation is not configured"))?;

    let sale = get_sale(state, sale_id).await?;

    Ok(notify::dispatch(&state.db, ai, &state.config, &sale).await)
}

// =============================================================================
// Unit Tests
// =============================================================================
