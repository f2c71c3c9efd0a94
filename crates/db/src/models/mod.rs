//! Row structs matching the database tables.
//!
//! Rows carry columns only; association ids are loaded from the join table
//! and grafted on via `into_entity`, since the core entities hold their
//! edges as id-sets rather than foreign-key columns.

pub mod category;
pub mod product;

pub use category::CategoryRow;
pub use product::ProductRow;
