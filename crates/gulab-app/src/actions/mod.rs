//! # Actions
//!
//! The operations the presentation surface invokes. Every action takes the
//! shared [`crate::AppState`] and returns `Result<T, ActionError>`.

pub mod category;
pub mod product;
pub mod sale;
