//! The catalog consistency engine.
//!
//! Orchestrates every mutating operation on products and categories over a
//! [`CatalogStore`], maintaining two invariants after each operation:
//!
//! - **Symmetry**: a category's product set and a product's category set
//!   agree on every association edge.
//! - **Non-empty membership**: every persisted product belongs to at least
//!   one category; the reserved "Other" category fills the gap when no
//!   domain category applies.
//!
//! Input is assumed validated by the transport layer (non-empty names,
//! positive prices); the engine re-checks nothing but existence.

use crate::entity::{Category, CategoryPatch, NewCategory, NewProduct, Product, ProductPatch};
use crate::error::{CoreError, CoreResult};
use crate::fallback;
use crate::filter::{ProductFilter, SearchCriteria, SortSpec};
use crate::store::CatalogStore;
use crate::types::DbId;

pub struct CatalogEngine<S> {
    store: S,
}

impl<S: CatalogStore> CatalogEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Products
    // -----------------------------------------------------------------------

    /// Create a product. Requested category names are resolved
    /// case-sensitively, creating unknown ones on reference; a product left
    /// with zero categories gets the fallback sentinel attached. The full
    /// edge set is attached before the product is saved, so the row and its
    /// join rows land in one store commit — a crash can never strand a
    /// persisted product without categories.
    pub async fn add_product(&self, input: NewProduct) -> CoreResult<Product> {
        let mut categories = self.resolve_categories(&input.categories).await?;

        let mut product = Product::new(input.name, input.description, input.price);
        product.attach_categories(categories.iter_mut());
        fallback::attach_fallback_if_uncategorized(&self.store, &mut product).await?;

        let product = self.store.save_product(product).await?;
        tracing::info!(id = product.id, name = %product.name, "Product added");
        Ok(product)
    }

    /// Create a batch of products, best-effort per element: a failing
    /// element is logged and skipped, its siblings still commit.
    pub async fn add_products(&self, inputs: Vec<NewProduct>) -> CoreResult<Vec<Product>> {
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            match self.add_product(input).await {
                Ok(product) => created.push(product),
                Err(e) => tracing::warn!(error = %e, "Skipping product in batch add"),
            }
        }
        Ok(created)
    }

    /// Apply a partial update. Present scalar fields overwrite; a present,
    /// non-empty category-name list is attached as a union with whatever
    /// remains after redundant-fallback removal.
    pub async fn update_product(&self, id: DbId, patch: ProductPatch) -> CoreResult<Product> {
        let mut product = self.require_product(id).await?;

        if let Some(name) = patch.name {
            product.set_name(name);
        }
        if let Some(description) = patch.description {
            product.set_description(description);
        }
        if let Some(price) = patch.price {
            product.set_price(price);
        }

        if let Some(names) = &patch.categories {
            if !names.is_empty() {
                fallback::detach_redundant_fallback(&self.store, &mut product).await?;
                let mut categories = self.resolve_categories(names).await?;
                product.attach_categories(categories.iter_mut());
                // Same path as creation keeps the invariant restoration
                // uniform; with a non-empty list this is a no-op.
                fallback::attach_fallback_if_uncategorized(&self.store, &mut product).await?;
            }
        }

        // Scalar changes and the reshaped edge set commit together.
        let product = self.store.save_product(product).await?;
        tracing::info!(id = product.id, "Product updated");
        Ok(product)
    }

    /// Delete a product. The store removes the row together with its join
    /// rows in one commit, so every category's member set sheds the product
    /// atomically. No fallback logic: the product ceases to exist.
    pub async fn delete_product(&self, id: DbId) -> CoreResult<()> {
        self.require_product(id).await?;
        self.store.delete_product_by_id(id).await?;
        tracing::info!(id, "Product deleted");
        Ok(())
    }

    /// Delete a batch of products. Fails only when *none* of the ids
    /// resolve; unresolved ids are otherwise skipped silently.
    pub async fn delete_products(&self, ids: Vec<DbId>) -> CoreResult<()> {
        let products = self.store.find_products_by_ids(&ids).await?;
        if products.is_empty() {
            return Err(CoreError::NoneFound {
                entity: "Product",
                ids,
            });
        }
        for product in products {
            self.store.delete_product_by_id(product.id).await?;
            tracing::info!(id = product.id, "Product deleted");
        }
        Ok(())
    }

    /// Detach a product from all its categories and immediately reattach the
    /// fallback sentinel. The edge-set swap is persisted by a single product
    /// save, so membership is never observably empty.
    pub async fn clear_product_categories(&self, id: DbId) -> CoreResult<Product> {
        let mut product = self.require_product(id).await?;
        let ids: Vec<DbId> = product.category_ids.iter().copied().collect();
        let mut categories = self.store.find_categories_by_ids(&ids).await?;
        product.clear_categories(categories.iter_mut());
        fallback::attach_fallback_if_uncategorized(&self.store, &mut product).await?;
        let product = self.store.save_product(product).await?;
        tracing::info!(id = product.id, "Product categories cleared");
        Ok(product)
    }

    pub async fn find_product(&self, id: DbId) -> CoreResult<Product> {
        self.require_product(id).await
    }

    pub async fn list_products(&self, sort: Option<SortSpec>) -> CoreResult<Vec<Product>> {
        self.store.query_products(None, sort).await
    }

    /// Search products by composed criteria. Empty criteria fall back to an
    /// unfiltered listing.
    pub async fn search_products(
        &self,
        criteria: &SearchCriteria,
        sort: Option<SortSpec>,
    ) -> CoreResult<Vec<Product>> {
        let filter = ProductFilter::build(criteria);
        self.store.query_products(filter.as_ref(), sort).await
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    /// Create a category, or return the existing row as a no-op when the
    /// name is already taken. Uniqueness is checked here as well as by the
    /// store's constraint.
    pub async fn add_category(&self, input: NewCategory) -> CoreResult<Category> {
        if let Some(existing) = self.store.find_category_by_name(&input.name).await? {
            tracing::info!(id = existing.id, name = %existing.name, "Category already exists");
            return Ok(existing);
        }
        let category = self.store.save_category(Category::new(input.name)).await?;
        tracing::info!(id = category.id, name = %category.name, "Category added");
        Ok(category)
    }

    pub async fn add_categories(&self, inputs: Vec<NewCategory>) -> CoreResult<Vec<Category>> {
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            created.push(self.add_category(input).await?);
        }
        Ok(created)
    }

    /// Rename a category in place. Membership is never touched by renames.
    pub async fn update_category(&self, id: DbId, patch: CategoryPatch) -> CoreResult<Category> {
        let mut category = self.require_category(id).await?;
        category.set_name(patch.name);
        let category = self.store.save_category(category).await?;
        tracing::info!(id = category.id, name = %category.name, "Category renamed");
        Ok(category)
    }

    /// Delete a category. Every member product is detached and, if left
    /// uncategorized, reassigned to the fallback sentinel; all join rows are
    /// purged before the category row itself is removed. Deleting the
    /// reserved fallback category is refused while it still has members.
    pub async fn delete_category(&self, id: DbId) -> CoreResult<()> {
        let category = self.require_category(id).await?;
        self.delete_resolved_category(category).await
    }

    /// Delete a batch of categories. Fails only when none of the ids
    /// resolve; unresolved ids are otherwise skipped silently.
    pub async fn delete_categories(&self, ids: Vec<DbId>) -> CoreResult<()> {
        let categories = self.store.find_categories_by_ids(&ids).await?;
        if categories.is_empty() {
            return Err(CoreError::NoneFound {
                entity: "Category",
                ids,
            });
        }
        for category in categories {
            self.delete_resolved_category(category).await?;
        }
        Ok(())
    }

    pub async fn find_category(&self, id: DbId) -> CoreResult<Category> {
        self.require_category(id).await
    }

    pub async fn list_categories(&self) -> CoreResult<Vec<Category>> {
        self.store.list_categories().await
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn require_product(&self, id: DbId) -> CoreResult<Product> {
        self.store
            .find_product_by_id(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Product",
                id,
            })
    }

    async fn require_category(&self, id: DbId) -> CoreResult<Category> {
        self.store
            .find_category_by_id(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Category",
                id,
            })
    }

    /// Resolve category names to persisted rows, creating unknown names on
    /// reference. Resolution is case-sensitive exact match.
    async fn resolve_categories(&self, names: &[String]) -> CoreResult<Vec<Category>> {
        let mut categories = Vec::with_capacity(names.len());
        for name in names {
            let category = match self.store.find_category_by_name(name).await? {
                Some(existing) => existing,
                None => self.store.save_category(Category::new(name.clone())).await?,
            };
            categories.push(category);
        }
        Ok(categories)
    }

    /// Cascade-delete an already-resolved category. Each member product's
    /// edge removal and fallback reassignment are persisted by one product
    /// save, join rows are purged, and only then is the row removed — no
    /// intermediate state leaves a product uncategorized or a join reference
    /// dangling.
    async fn delete_resolved_category(&self, mut category: Category) -> CoreResult<()> {
        if category.name == fallback::FALLBACK_CATEGORY_NAME && !category.product_ids.is_empty() {
            // The sentinel is the invariant's backstop; while products still
            // lean on it there is nothing to re-home them to.
            return Err(CoreError::Conflict(format!(
                "Category '{}' is reserved and still has {} member product(s)",
                category.name,
                category.product_ids.len()
            )));
        }

        let member_ids: Vec<DbId> = category.product_ids.iter().copied().collect();
        let mut products = self.store.find_products_by_ids(&member_ids).await?;
        for product in &mut products {
            product.detach_category(&mut category);
            fallback::attach_fallback_if_uncategorized(&self.store, product).await?;
        }
        self.store.save_products(products).await?;
        self.store.purge_category_links(category.id).await?;
        self.store.delete_category_by_id(category.id).await?;

        tracing::info!(id = category.id, name = %category.name, "Category deleted");
        Ok(())
    }
}
