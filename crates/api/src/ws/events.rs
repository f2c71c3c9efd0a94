use catalogd_core::types::DbId;
use serde::Serialize;

/// Catalog change notification pushed to all connected clients.
///
/// Serialized as `{ "type": "...", ... }` JSON text frames.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogEvent {
    ProductCreated { id: DbId, name: String },
    ProductUpdated { id: DbId, name: String },
    ProductDeleted { id: DbId },
    CategoryCreated { id: DbId, name: String },
    CategoryUpdated { id: DbId, name: String },
    CategoryDeleted { id: DbId },
}
