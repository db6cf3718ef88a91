//! # Repository Modules
//!
//! One repository per entity. Each repository owns a clone of the pool and
//! exposes async methods returning `DbResult`.

pub mod category;
pub mod product;
pub mod sale;
