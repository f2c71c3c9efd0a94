//! The fallback category resolver.
//!
//! Every persisted product must belong to at least one category. When no
//! domain category applies, the reserved "Other" category steps in. The
//! sentinel is identified by name only — its id differs across environments
//! and must never be hard-coded.

use crate::entity::{Category, Product};
use crate::error::CoreResult;
use crate::store::CatalogStore;

/// Reserved name of the sentinel category.
pub const FALLBACK_CATEGORY_NAME: &str = "Other";

/// Look up the sentinel by name, creating and persisting it when absent.
///
/// Idempotent: repeated calls resolve the same row, whether or not it
/// already has products attached. Should the existence check race with a
/// concurrent creation, the lookup miss falls through to a create and the
/// store's unique constraint arbitrates.
pub async fn ensure_fallback<S: CatalogStore + ?Sized>(store: &S) -> CoreResult<Category> {
    if store.category_exists_by_name(FALLBACK_CATEGORY_NAME).await? {
        if let Some(existing) = store.find_category_by_name(FALLBACK_CATEGORY_NAME).await? {
            return Ok(existing);
        }
    }
    let created = store
        .save_category(Category::new(FALLBACK_CATEGORY_NAME))
        .await?;
    tracing::info!(id = created.id, "Created fallback category");
    Ok(created)
}

/// Attach the sentinel to a product left with zero categories.
///
/// No-op when the product already has a category. Only the in-memory edge
/// sets change here; the caller's product save carries the join, so the
/// attachment commits together with the rest of the product's state.
pub async fn attach_fallback_if_uncategorized<S: CatalogStore + ?Sized>(
    store: &S,
    product: &mut Product,
) -> CoreResult<()> {
    if product.has_any_category() {
        return Ok(());
    }
    let mut other = ensure_fallback(store).await?;
    product.attach_category(&mut other);
    Ok(())
}

/// Detach the sentinel when it is the product's *only* category.
///
/// Called just before a non-empty replacement category set is attached, so
/// "Other" does not linger alongside real categories after the update. The
/// edge removal is persisted by the caller's product save.
pub async fn detach_redundant_fallback<S: CatalogStore + ?Sized>(
    store: &S,
    product: &mut Product,
) -> CoreResult<()> {
    if product.category_ids.len() != 1 {
        return Ok(());
    }
    let Some(mut other) = store.find_category_by_name(FALLBACK_CATEGORY_NAME).await? else {
        return Ok(());
    };
    if product.category_ids.contains(&other.id) {
        product.detach_category(&mut other);
    }
    Ok(())
}
