//! # Notification Dispatcher
//!
//! Best-effort delivery of purchase-confirmation messages.
//!
//! ## Lifecycle
//! ```text
//! complete_sale                     dispatcher task
//! ─────────────                     ───────────────
//! COMMIT sale (status: pending)
//!      │
//!      ├── spawn_dispatch ────────► generate message (gulab-ai)
//!      │                                 │
//!      ▼                                 ├── ok  → hand to channel → status: sent
//! return Sale to caller                  └── err → status: failed
//! ```
//!
//! The dispatcher never runs inside the sale transaction and its failure
//! never un-completes a sale. Re-dispatching any sale with a usable phone
//! regenerates and re-sends; the only side effect is the status field, so
//! a manual resend works for `Failed` and `Sent` sales alike.
//!
//! Delivery itself is a log line for now; the WhatsApp gateway hookup is
//! where the generated message would be handed off.

use tracing::{error, info, warn};

use crate::config::AppConfig;
use gulab_ai::{generate_whatsapp_invoice_message, TextGenClient, WhatsappInvoiceInput};
use gulab_core::{NotificationStatus, Sale};
use gulab_db::Database;

/// What a dispatch attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The sale has no usable customer contact; nothing to send.
    NotApplicable,
    /// Message generated and handed to the delivery channel.
    Sent,
    /// Generation or delivery failed; sale marked failed.
    Failed,
}

/// Runs one dispatch attempt for a sale and records the resulting status.
///
/// Skips only `Skipped` sales (no usable phone was captured). Everything
/// else - a fresh `Pending` sale, a `Failed` one, even an already `Sent`
/// one - is regenerated and re-sent; the status ends up `Sent` or `Failed`
/// per this attempt.
pub async fn dispatch(
    db: &Database,
    ai: &TextGenClient,
    config: &AppConfig,
    sale: &Sale,
) -> DispatchOutcome {
    if sale.notification_status == NotificationStatus::Skipped {
        return DispatchOutcome::NotApplicable;
    }

    let input = WhatsappInvoiceInput {
        customer_name: None,
        store_name: config.store_name.clone(),
        invoice_number: invoice_number(sale),
        total_amount: config.format_currency(sale.total_cents),
        invoice_link: sale.invoice_url.clone(),
        items_purchased: sale
            .items
            .iter()
            .map(|i| format!("{} x{}", i.product_name, i.quantity))
            .collect(),
    };

    let outcome = match generate_whatsapp_invoice_message(ai, &input).await {
        Ok(message) => {
            // Delivery channel: logged until the gateway is wired up
            info!(
                sale_id = %sale.id,
                phone = sale.customer_phone.as_deref().unwrap_or("-"),
                message = %message,
                "WhatsApp confirmation dispatched"
            );
            DispatchOutcome::Sent
        }
        Err(e) => {
            warn!(sale_id = %sale.id, error = %e, "WhatsApp confirmation failed");
            DispatchOutcome::Failed
        }
    };

    let status = match outcome {
        DispatchOutcome::Sent => NotificationStatus::Sent,
        _ => NotificationStatus::Failed,
    };

    if let Err(e) = db.sales().update_notification_status(&sale.id, status).await {
        error!(sale_id = %sale.id, error = %e, "Failed to record notification status");
    }

    outcome
}

/// Spawns a fire-and-forget dispatch task for a freshly completed sale.
///
/// Checkout returns to the caller immediately; the task owns the status
/// transition to `Sent` or `Failed`.
pub fn spawn_dispatch(db: Database, ai: TextGenClient, config: AppConfig, sale: Sale) {
    tokio::spawn(async move {
        dispatch(&db, &ai, &config, &sale).await;
    });
}

/// Human-facing invoice number derived from the sale id.
pub fn invoice_number(sale: &Sale) -> String {
    let short: String = sale.id.chars().filter(|c| *c != '-').take(8).collect();
    format!("INV-{}", short.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_invoice_number_shape() {
        let sale = Sale {
            id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            subtotal_cents: 0,
            tax_cents: 0,
            discount_cents: 0,
            total_cents: 0,
            customer_phone: None,
            invoice_url: String::new(),
            notification_status: NotificationStatus::Skipped,
            created_at: Utc::now(),
            items: vec![],
        };
        assert_eq!(invoice_number(&sale), "INV-550E8400");
    }
}
