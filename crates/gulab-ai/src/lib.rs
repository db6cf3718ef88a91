//! # gulab-ai: Text-Generation Flows for Gulab POS
//!
//! Client and flows for the hosted text-generation endpoint.
//!
//! ## Flows
//! - [`flows::generate_product_description`] - catalog copywriting
//! - [`flows::generate_whatsapp_invoice_message`] - purchase confirmations
//!
//! ## Optionality
//! The whole crate is an optional capability at runtime: the app constructs
//! [`TextGenClient::from_env`] and simply skips both flows when it returns
//! `None`. Sales completed without a configured client keep their pending
//! notification status until a manual resend.

pub mod client;
pub mod error;
pub mod flows;

pub use client::TextGenClient;
pub use error::{AiError, AiResult};
pub use flows::{
    generate_product_description, generate_whatsapp_invoice_message, ProductDescriptionInput,
    ProductDescriptionOutput, WhatsappInvoiceInput,
};
