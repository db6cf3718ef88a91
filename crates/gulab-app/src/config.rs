//! # Application Configuration
//!
//! Deployment settings loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`GULAB_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use serde::{Deserialize, Serialize};

use gulab_core::validation::validate_rate_bps;
use gulab_core::{CheckoutPolicy, TaxRate};

/// Application configuration.
///
/// The default deployment is the original store: no tax, no discount,
/// blind stock decrements. Variants (e.g. a 5% tax jurisdiction) set the
/// corresponding environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Store name (used in generated copy and confirmation messages).
    pub store_name: String,

    /// Currency symbol for display formatting.
    pub currency_symbol: String,

    /// Tax rate applied at checkout, in basis points.
    pub tax_rate_bps: u32,

    /// Discount applied at checkout, in basis points.
    pub discount_bps: u32,

    /// Fail sale completion instead of letting stock go negative.
    pub enforce_stock: bool,

    /// Base URL under which sale invoices are retrievable.
    pub invoice_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            store_name: "Guns And Gulab".to_string(),
            currency_symbol: "₹".to_string(),
            tax_rate_bps: 0,
            discount_bps: 0,
            enforce_stock: false,
            invoice_base_url: "/invoices".to_string(),
        }
    }
}

impl AppConfig {
    /// Creates a config from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `GULAB_STORE_NAME`
    /// - `GULAB_TAX_RATE_BPS` (e.g. "500" for 5%; 0-10000)
    /// - `GULAB_DISCOUNT_BPS` (0-10000)
    /// - `GULAB_ENFORCE_STOCK` ("1"/"true" to enable)
    /// - `GULAB_INVOICE_BASE_URL`
    ///
    /// Unparseable or out-of-range rate values are ignored and the default
    /// (zero) kept.
    pub fn from_env() -> Self {
        let mut config = AppConfig::default();

        if let Ok(store_name) = std::env::var("GULAB_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Some(bps) = rate_bps_from_env("GULAB_TAX_RATE_BPS") {
            config.tax_rate_bps = bps;
        }

        if let Some(bps) = rate_bps_from_env("GULAB_DISCOUNT_BPS") {
            config.discount_bps = bps;
        }

        if let Ok(flag) = std::env::var("GULAB_ENFORCE_STOCK") {
            config.enforce_stock = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        if let Ok(url) = std::env::var("GULAB_INVOICE_BASE_URL") {
            config.invoice_base_url = url;
        }

        config
    }

    /// The checkout policy derived from this configuration.
    pub fn checkout_policy(&self) -> CheckoutPolicy {
        CheckoutPolicy {
            tax_rate: TaxRate::from_bps(self.tax_rate_bps),
            discount_bps: self.discount_bps,
            enforce_stock: self.enforce_stock,
        }
    }

    /// Formats a minor-unit amount as a currency string.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = AppConfig::default();
    /// assert_eq!(config.format_currency(1598), "₹15.98");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        format!(
            "{}{}{}.{:02}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            (cents / 100).abs(),
            (cents % 100).abs()
        )
    }
}

/// Reads a basis-points rate from an environment variable, rejecting
/// values that fail [`validate_rate_bps`] (above 100%).
fn rate_bps_from_env(var: &str) -> Option<u32> {
    let bps = std::env::var(var).ok()?.parse::<u32>().ok()?;
    validate_rate_bps(bps).ok()?;
    Some(bps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.store_name, "Guns And Gulab");
        assert_eq!(config.tax_rate_bps, 0);
        assert_eq!(config.discount_bps, 0);
        assert!(!config.enforce_stock);
    }

    #[test]
    fn test_checkout_policy() {
        let config = AppConfig {
            tax_rate_bps: 500,
            enforce_stock: true,
            ..Default::default()
        };

        let policy = config.checkout_policy();
        assert_eq!(policy.tax_rate.bps(), 500);
        assert!(policy.enforce_stock);
    }

    #[test]
    fn test_rate_bps_from_env_rejects_out_of_range() {
        // Only this test touches these variable names
        std::env::set_var("GULAB_TEST_RATE_OK", "500");
        std::env::set_var("GULAB_TEST_RATE_HIGH", "20000");
        std::env::set_var("GULAB_TEST_RATE_JUNK", "five");

        assert_eq!(rate_bps_from_env("GULAB_TEST_RATE_OK"), Some(500));
        assert_eq!(rate_bps_from_env("GULAB_TEST_RATE_HIGH"), None);
        assert_eq!(rate_bps_from_env("GULAB_TEST_RATE_JUNK"), None);
        assert_eq!(rate_bps_from_env("GULAB_TEST_RATE_UNSET"), None);
    }

    #[test]
    fn test_format_currency() {
        let config = AppConfig::default();
        assert_eq!(config.format_currency(1598), "₹15.98");
        assert_eq!(config.format_currency(0), "₹0.00");
        assert_eq!(config.format_currency(-550), "-₹5.50");
    }
}
