use std::collections::BTreeSet;

use catalogd_core::entity::Category;
use catalogd_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryRow {
    pub id: DbId,
    pub name: String,
}

impl CategoryRow {
    /// Combine the row with its join-table edges into a core entity.
    pub fn into_entity(self, product_ids: BTreeSet<DbId>) -> Category {
        Category {
            id: self.id,
            name: self.name,
            product_ids,
        }
    }
}
