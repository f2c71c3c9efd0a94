//! Product and Category entities and their input DTOs.
//!
//! The many-to-many association is held as two independent id-sets
//! (`Product::category_ids`, `Category::product_ids`) that the attach/detach
//! helpers keep in sync. Entities are passive data holders: mutations touch
//! local state only, never the store. Set membership is by surrogate id;
//! ordering and equality follow the display name.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{DbId, Timestamp};

/// Sentinel id for an entity that has not been persisted yet. The store
/// assigns the real surrogate id on first save.
pub const UNSAVED: DbId = 0;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// A catalog category. Name is unique (case-sensitive) and non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    /// Ids of the products currently in this category. Kept in sync with the
    /// product side by [`Product::attach_category`] / [`Product::detach_category`].
    pub product_ids: BTreeSet<DbId>,
}

impl Category {
    /// Create an unsaved category with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: UNSAVED,
            name: name.into(),
            product_ids: BTreeSet::new(),
        }
    }

    /// Rename the category. Membership is untouched.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn contains_product(&self, product_id: DbId) -> bool {
        self.product_ids.contains(&product_id)
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Category {}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Categories order by name. Two rows with the same name compare equal here
/// even though they are distinct rows; membership bookkeeping always goes
/// through id-sets, never through entity comparison.
impl Ord for Category {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// A catalog product. Price is a positive integer in the smallest currency
/// unit. `created_at` is set once; every mutating setter bumps `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Ids of the categories this product belongs to.
    pub category_ids: BTreeSet<DbId>,
}

impl Product {
    /// Create an unsaved product with no category edges.
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: i64) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: UNSAVED,
            name: name.into(),
            description: description.into(),
            price,
            created_at: now,
            updated_at: now,
            category_ids: BTreeSet::new(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }

    pub fn set_price(&mut self, price: i64) {
        self.price = price;
        self.touch();
    }

    /// Add a single association edge, updating both sides.
    ///
    /// Both entities must already carry a persisted id; the ids are the join
    /// keys. No-op on re-attach (sets are idempotent).
    pub fn attach_category(&mut self, category: &mut Category) {
        self.category_ids.insert(category.id);
        category.product_ids.insert(self.id);
        self.touch();
    }

    /// Add a batch of edges, updating both sides of every pair.
    pub fn attach_categories<'a>(&mut self, categories: impl IntoIterator<Item = &'a mut Category>) {
        for category in categories {
            self.category_ids.insert(category.id);
            category.product_ids.insert(self.id);
        }
        self.touch();
    }

    /// Remove a single association edge, updating both sides.
    pub fn detach_category(&mut self, category: &mut Category) {
        self.category_ids.remove(&category.id);
        category.product_ids.remove(&self.id);
        self.touch();
    }

    /// Remove this product from every linked category's set and clear the
    /// local edge set. Callers pass the categories currently linked; ids not
    /// present in the slice are dropped from the local side regardless.
    pub fn clear_categories<'a>(&mut self, categories: impl IntoIterator<Item = &'a mut Category>) {
        for category in categories {
            category.product_ids.remove(&self.id);
        }
        self.category_ids.clear();
        self.touch();
    }

    pub fn has_any_category(&self) -> bool {
        !self.category_ids.is_empty()
    }

    fn touch(&mut self) {
        self.updated_at = chrono::Utc::now();
    }
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Product {}

impl PartialOrd for Product {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Products order by name.
impl Ord for Product {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

// ---------------------------------------------------------------------------
// DTOs (engine input; validated by the transport layer before the engine
// sees them)
// ---------------------------------------------------------------------------

/// Input for creating a product. Unknown category names are created on
/// reference; an empty list yields the fallback category.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(range(min = 1))]
    pub price: i64,
    /// Category names to attach. Resolved case-sensitively, reuse-by-name.
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Partial update for a product. Absent fields are left untouched. A present,
/// non-empty `categories` list is attached as a union with the product's
/// remaining categories (after redundant-fallback removal).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductPatch {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub price: Option<i64>,
    pub categories: Option<Vec<String>>,
}

/// Input for creating a category.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCategory {
    #[validate(length(min = 1))]
    pub name: String,
}

/// Rename request for a category. Membership is never touched by renames.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryPatch {
    #[validate(length(min = 1))]
    pub name: String,
}

/// Id set for batch delete endpoints.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IdBatch {
    #[validate(length(min = 1))]
    pub ids: Vec<DbId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(mut product: Product, id: DbId) -> Product {
        product.id = id;
        product
    }

    #[test]
    fn attach_updates_both_sides() {
        let mut product = saved(Product::new("Bread", "wheat", 50), 1);
        let mut category = Category {
            id: 7,
            ..Category::new("Grocery")
        };

        product.attach_category(&mut category);

        assert!(product.category_ids.contains(&7));
        assert!(category.contains_product(1));
    }

    #[test]
    fn detach_updates_both_sides() {
        let mut product = saved(Product::new("Bread", "wheat", 50), 1);
        let mut category = Category {
            id: 7,
            ..Category::new("Grocery")
        };
        product.attach_category(&mut category);

        product.detach_category(&mut category);

        assert!(!product.has_any_category());
        assert!(category.product_ids.is_empty());
    }

    #[test]
    fn clear_removes_product_from_every_category() {
        let mut product = saved(Product::new("Bread", "wheat", 50), 1);
        let mut a = Category {
            id: 7,
            ..Category::new("Grocery")
        };
        let mut b = Category {
            id: 8,
            ..Category::new("Bakery")
        };
        product.attach_category(&mut a);
        product.attach_category(&mut b);

        product.clear_categories([&mut a, &mut b]);

        assert!(!product.has_any_category());
        assert!(a.product_ids.is_empty());
        assert!(b.product_ids.is_empty());
    }

    #[test]
    fn setters_bump_updated_at() {
        let mut product = Product::new("Bread", "wheat", 50);
        let before = product.updated_at;

        product.set_price(60);

        assert!(product.updated_at >= before);
        assert_eq!(product.created_at, before);
    }

    #[test]
    fn entities_order_by_name() {
        let apples = Product::new("Apples", "fresh", 30);
        let bread = Product::new("Bread", "wheat", 50);
        assert!(apples < bread);

        let bakery = Category::new("Bakery");
        let grocery = Category::new("Grocery");
        assert!(bakery < grocery);
    }

    #[test]
    fn same_name_compares_equal_across_distinct_rows() {
        let a = Category {
            id: 1,
            ..Category::new("Grocery")
        };
        let b = Category {
            id: 2,
            ..Category::new("Grocery")
        };
        assert_eq!(a, b);
    }
}
