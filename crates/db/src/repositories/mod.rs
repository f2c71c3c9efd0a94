//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods over the
//! pool (or an executor, for queries that participate in a transaction).

pub mod category_repo;
pub mod product_repo;

pub use category_repo::CategoryRepo;
pub use product_repo::ProductRepo;
