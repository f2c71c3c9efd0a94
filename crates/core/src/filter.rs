//! Product search filter composition.
//!
//! A [`SearchCriteria`] is a bag of independently-optional fields. Each
//! present scalar field contributes one [`FilterClause`]; a non-empty
//! category-name set contributes a single union clause (match any listed
//! category). Clauses combine by AND. Empty criteria compose to no filter at
//! all rather than a vacuous always-true predicate, so unfiltered listings
//! skip WHERE generation entirely.
//!
//! The composed filter is store-agnostic: `catalogd-db` renders it to SQL,
//! and [`ProductFilter::matches`] evaluates it in memory so the composition
//! rules are testable without a database.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entity::Product;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

/// Optional search criteria for product search. All fields independent;
/// absent fields contribute nothing to the composed filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchCriteria {
    /// Case-insensitive substring match on the product name.
    pub name_contains: Option<String>,
    /// Case-insensitive substring match on the description.
    pub description_contains: Option<String>,
    /// Inclusive lower price bound.
    pub price_min: Option<i64>,
    /// Inclusive upper price bound.
    pub price_max: Option<i64>,
    /// Inclusive upper bound on creation time.
    pub created_before: Option<Timestamp>,
    /// Inclusive lower bound on creation time.
    pub created_after: Option<Timestamp>,
    /// Category-membership union: a product matches when it belongs to any
    /// listed category. Empty means no membership restriction.
    #[serde(default)]
    pub category_names: Vec<String>,
}

impl SearchCriteria {
    pub fn is_empty(&self) -> bool {
        self.name_contains.is_none()
            && self.description_contains.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && self.created_before.is_none()
            && self.created_after.is_none()
            && self.category_names.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Composed filter
// ---------------------------------------------------------------------------

/// One restriction on a product. The category-union clause counts as a
/// single clause regardless of how many names it carries.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    NameContains(String),
    DescriptionContains(String),
    PriceAtLeast(i64),
    PriceAtMost(i64),
    CreatedOnOrBefore(Timestamp),
    CreatedOnOrAfter(Timestamp),
    /// OR-union of "belongs to the category named X" over the listed names.
    InAnyCategory(Vec<String>),
}

/// An AND-combination of filter clauses. Never empty; build returns `None`
/// instead of an empty filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFilter {
    clauses: Vec<FilterClause>,
}

impl ProductFilter {
    /// Compose a filter from the present criteria fields. Returns `None`
    /// when no criteria are present.
    pub fn build(criteria: &SearchCriteria) -> Option<Self> {
        let mut clauses = Vec::new();

        if !criteria.category_names.is_empty() {
            clauses.push(FilterClause::InAnyCategory(criteria.category_names.clone()));
        }
        if let Some(name) = &criteria.name_contains {
            clauses.push(FilterClause::NameContains(name.clone()));
        }
        if let Some(description) = &criteria.description_contains {
            clauses.push(FilterClause::DescriptionContains(description.clone()));
        }
        if let Some(max) = criteria.price_max {
            clauses.push(FilterClause::PriceAtMost(max));
        }
        if let Some(min) = criteria.price_min {
            clauses.push(FilterClause::PriceAtLeast(min));
        }
        if let Some(before) = criteria.created_before {
            clauses.push(FilterClause::CreatedOnOrBefore(before));
        }
        if let Some(after) = criteria.created_after {
            clauses.push(FilterClause::CreatedOnOrAfter(after));
        }

        if clauses.is_empty() {
            None
        } else {
            Some(Self { clauses })
        }
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    /// Evaluate the filter against a product in memory. `category_names`
    /// carries the names of the categories the product currently belongs to.
    pub fn matches(&self, product: &Product, category_names: &BTreeSet<String>) -> bool {
        self.clauses.iter().all(|clause| match clause {
            FilterClause::NameContains(needle) => contains_ci(&product.name, needle),
            FilterClause::DescriptionContains(needle) => contains_ci(&product.description, needle),
            FilterClause::PriceAtLeast(min) => product.price >= *min,
            FilterClause::PriceAtMost(max) => product.price <= *max,
            FilterClause::CreatedOnOrBefore(bound) => product.created_at <= *bound,
            FilterClause::CreatedOnOrAfter(bound) => product.created_at >= *bound,
            FilterClause::InAnyCategory(names) => {
                names.iter().any(|name| category_names.contains(name))
            }
        })
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// ---------------------------------------------------------------------------
// Sort
// ---------------------------------------------------------------------------

/// Sortable product fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Id,
    Name,
    Price,
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDir {
    Asc,
    Desc,
}

/// Sort order for product queries. Defaults to ascending by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub dir: SortDir,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::Id,
            dir: SortDir::Asc,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn named(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn empty_criteria_compose_to_no_filter() {
        assert_eq!(ProductFilter::build(&SearchCriteria::default()), None);
    }

    #[test]
    fn empty_category_list_contributes_no_clause() {
        let criteria = SearchCriteria {
            price_min: Some(10),
            category_names: vec![],
            ..Default::default()
        };
        let filter = ProductFilter::build(&criteria).unwrap();
        assert_eq!(filter.clauses(), &[FilterClause::PriceAtLeast(10)]);
    }

    #[test]
    fn category_union_counts_as_one_clause() {
        let criteria = SearchCriteria {
            category_names: vec!["A".into(), "Grocery".into()],
            ..Default::default()
        };
        let filter = ProductFilter::build(&criteria).unwrap();
        assert_eq!(filter.clauses().len(), 1);
    }

    #[test]
    fn name_match_is_case_insensitive_substring() {
        let criteria = SearchCriteria {
            name_contains: Some("BrE".into()),
            ..Default::default()
        };
        let filter = ProductFilter::build(&criteria).unwrap();
        let product = Product::new("Bread", "wheat", 50);

        assert!(filter.matches(&product, &BTreeSet::new()));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let criteria = SearchCriteria {
            price_min: Some(50),
            price_max: Some(50),
            ..Default::default()
        };
        let filter = ProductFilter::build(&criteria).unwrap();

        assert!(filter.matches(&Product::new("Bread", "wheat", 50), &BTreeSet::new()));
        assert!(!filter.matches(&Product::new("Milk", "whole", 51), &BTreeSet::new()));
        assert!(!filter.matches(&Product::new("Eggs", "dozen", 49), &BTreeSet::new()));
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let product = Product::new("Bread", "wheat", 50);
        let criteria = SearchCriteria {
            created_before: Some(product.created_at),
            created_after: Some(product.created_at),
            ..Default::default()
        };
        let filter = ProductFilter::build(&criteria).unwrap();

        assert!(filter.matches(&product, &BTreeSet::new()));
    }

    #[test]
    fn union_then_intersection() {
        // name contains "e" AND price <= 1000 AND in ("A" OR "Grocery").
        let criteria = SearchCriteria {
            name_contains: Some("e".into()),
            price_max: Some(1000),
            category_names: vec!["A".into(), "Grocery".into()],
            ..Default::default()
        };
        let filter = ProductFilter::build(&criteria).unwrap();

        let bread = Product::new("Bread", "wheat", 50);
        assert!(filter.matches(&bread, &named(&["Grocery"])));
        assert!(filter.matches(&bread, &named(&["A", "Snacks"])));
        // Not in any listed category.
        assert!(!filter.matches(&bread, &named(&["Snacks"])));
        // Name without "e".
        assert!(!filter.matches(&Product::new("Milk", "whole", 50), &named(&["A"])));
        // Over the price bound.
        assert!(!filter.matches(&Product::new("Cheese", "aged", 1001), &named(&["A"])));
    }

    #[test]
    fn membership_union_requires_any_listed_name() {
        let criteria = SearchCriteria {
            category_names: vec!["Bakery".into()],
            ..Default::default()
        };
        let filter = ProductFilter::build(&criteria).unwrap();
        let bread = Product::new("Bread", "wheat", 50);

        assert!(filter.matches(&bread, &named(&["Bakery", "Grocery"])));
        assert!(!filter.matches(&bread, &named(&["Grocery"])));
        assert!(!filter.matches(&bread, &BTreeSet::new()));
    }

    #[test]
    fn default_sort_is_ascending_by_id() {
        let sort = SortSpec::default();
        assert_eq!(sort.field, SortField::Id);
        assert_eq!(sort.dir, SortDir::Asc);
    }
}
