//! # Generation Flows
//!
//! The two text-generation flows the POS exposes:
//!
//! 1. **Product description** - a copywriter prompt that produces a
//!    detailed description plus short marketing copy for a catalog entry.
//! 2. **WhatsApp invoice message** - a friendly purchase-confirmation
//!    message referencing the invoice number, total, and download link.
//!
//! Both flows ask the model for a single JSON object and parse it
//! tolerantly (models love wrapping JSON in markdown fences).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::TextGenClient;
use crate::error::{AiError, AiResult};

// =============================================================================
// Product Description Flow
// =============================================================================

/// Input for the product-description flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDescriptionInput {
    /// The name of the product.
    pub product_name: String,

    /// The default selling price, in minor units.
    pub price_cents: i64,

    /// The category name, if the product has a resolvable category.
    pub category: Option<String>,

    /// Free-form extra details to weave into the copy.
    pub additional_details: Option<String>,
}

/// Output of the product-description flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDescriptionOutput {
    /// A compelling, detailed product description.
    pub product_description: String,

    /// Short, engaging marketing copy.
    pub marketing_copy: String,
}

/// Generates a description and marketing copy for a catalog product.
pub async fn generate_product_description(
    client: &TextGenClient,
    store_name: &str,
    input: &ProductDescriptionInput,
) -> AiResult<ProductDescriptionOutput> {
    let system = format!(
        "You are a professional marketing copywriter for \"{store_name}\", a high-end \
         retail store specializing in unique products. Generate a compelling product \
         description and short, engaging marketing copy based on the provided product \
         details. The tone should be sophisticated, appealing, and highlight the \
         product's value and unique selling points. Respond with a single JSON object \
         with exactly two string fields: \"product_description\" and \"marketing_copy\"."
    );

    let mut user = format!(
        "Product Name: {}\nDefault Price: ₹{}.{:02}\n",
        input.product_name,
        input.price_cents / 100,
        (input.price_cents % 100).abs()
    );
    if let Some(category) = &input.category {
        user.push_str(&format!("Category: {category}\n"));
    }
    if let Some(details) = &input.additional_details {
        user.push_str(&format!("Additional Details: {details}\n"));
    }

    debug!(product = %input.product_name, "Generating product description");

    let raw = client.complete(&system, &user).await?;
    let output: ProductDescriptionOutput = parse_json_output(&raw)?;

    if output.product_description.trim().is_empty() {
        return Err(AiError::EmptyOutput);
    }

    Ok(output)
}

// =============================================================================
// WhatsApp Invoice Message Flow
// =============================================================================

/// Input for the WhatsApp invoice-message flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsappInvoiceInput {
    /// The customer's name, if captured at checkout.
    pub customer_name: Option<String>,

    /// The store name (e.g. "Guns And Gulab").
    pub store_name: String,

    /// The sale's invoice number.
    pub invoice_number: String,

    /// Display-formatted total (e.g. "₹15.98").
    pub total_amount: String,

    /// Link to download the invoice.
    pub invoice_link: String,

    /// Item names for personalization.
    pub items_purchased: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WhatsappMessageOutput {
    message: String,
}

/// Generates a personalized purchase-confirmation message.
pub async fn generate_whatsapp_invoice_message(
    client: &TextGenClient,
    input: &WhatsappInvoiceInput,
) -> AiResult<String> {
    let system = "You are an assistant that generates personalized WhatsApp messages for \
         customers after they complete a purchase. The goal is a friendly, engaging \
         message that encourages repeat business. Address the customer by name when one \
         is provided, otherwise use a general greeting. Thank them for shopping, mention \
         the invoice number and total amount, and encourage them to download the invoice \
         using the provided link. If items are listed, reference them briefly and \
         positively. Keep the tone warm, appreciative, and concise for WhatsApp. Respond \
         with a single JSON object with one string field: \"message\".";

    let mut user = format!(
        "Store Name: {}\nInvoice Number: {}\nTotal Amount: {}\nInvoice Link: {}\n",
        input.store_name, input.invoice_number, input.total_amount, input.invoice_link
    );
    if let Some(name) = &input.customer_name {
        user.push_str(&format!("Customer Name: {name}\n"));
    }
    if !input.items_purchased.is_empty() {
        user.push_str("Items Purchased:\n");
        for item in &input.items_purchased {
            user.push_str(&format!("- {item}\n"));
        }
    }

    debug!(invoice = %input.invoice_number, "Generating WhatsApp message");

    let raw = client.complete(system, &user).await?;
    let output: WhatsappMessageOutput = parse_json_output(&raw)?;

    if output.message.trim().is_empty() {
        return Err(AiError::EmptyOutput);
    }

    Ok(output.message)
}

// =============================================================================
// Output Parsing
// =============================================================================

/// Parses a JSON object out of model output, stripping markdown fences and
/// any prose around the outermost braces.
fn parse_json_output<T: serde::de::DeserializeOwned>(raw: &str) -> AiResult<T> {
    let trimmed = raw.trim();

    // Direct parse first
    if let Ok(value) = serde_json::from_str::<T>(trimmed) {
        return Ok(value);
    }

    // Fall back to the outermost brace span
    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    if let (Some(start), Some(end)) = (start, end) {
        if end > start {
            let candidate = &trimmed[start..=end];
            return serde_json::from_str::<T>(candidate)
                .map_err(|e| AiError::InvalidResponse(e.to_string()));
        }
    }

    Err(AiError::InvalidResponse(
        "no JSON object in model output".to_string(),
    ))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let out: WhatsappMessageOutput =
            parse_json_output(r#"{"message": "Thank you!"}"#).unwrap();
        assert_eq!(out.message, "Thank you!");
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "```json\n{\"message\": \"Thank you!\"}\n```";
        let out: WhatsappMessageOutput = parse_json_output(raw).unwrap();
        assert_eq!(out.message, "Thank you!");
    }

    #[test]
    fn test_parse_json_with_prose() {
        let raw = "Here is your message:\n{\"message\": \"Thanks for shopping!\"}\nHope that helps.";
        let out: WhatsappMessageOutput = parse_json_output(raw).unwrap();
        assert_eq!(out.message, "Thanks for shopping!");
    }

    #[test]
    fn test_parse_garbage_fails() {
        let result: AiResult<WhatsappMessageOutput> = parse_json_output("no json here");
        assert!(matches!(result, Err(AiError::InvalidResponse(_))));
    }

    #[test]
    fn test_description_output_shape() {
        let raw = r#"{"product_description": "A deep, woody attar.", "marketing_copy": "Oud, elevated."}"#;
        let out: ProductDescriptionOutput = parse_json_output(raw).unwrap();
        assert_eq!(out.marketing_copy, "Oud, elevated.");
    }
}
