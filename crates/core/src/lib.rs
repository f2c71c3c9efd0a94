//! Domain core for the catalogd backend.
//!
//! Everything in this crate is I/O-free: the entity model, the error
//! taxonomy, the `CatalogStore` contract, the fallback-category resolver,
//! the consistency engine, and the search-filter composer. The Postgres
//! implementation of the store lives in `catalogd-db`; HTTP/WebSocket
//! plumbing lives in `catalogd-api`.

pub mod engine;
pub mod entity;
pub mod error;
pub mod fallback;
pub mod filter;
pub mod store;
pub mod types;
