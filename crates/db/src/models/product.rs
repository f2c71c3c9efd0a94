use std::collections::BTreeSet;

use catalogd_core::entity::Product;
use catalogd_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductRow {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProductRow {
    /// Combine the row with its join-table edges into a core entity.
    pub fn into_entity(self, category_ids: BTreeSet<DbId>) -> Product {
        Product {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
            created_at: self.created_at,
            updated_at: self.updated_at,
            category_ids,
        }
    }
}
