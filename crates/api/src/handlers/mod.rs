//! HTTP handlers, grouped by resource.

pub mod category;
pub mod product;
