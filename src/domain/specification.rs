//! Filter specifications for list queries.
//!
//! A specification is built once per request from query parameters and
//! consumed by exactly one repository call. It can be rendered two ways
//! with the same selection semantics:
//! - as a parameterized SQL predicate appended to a [`QueryBuilder`]
//!   (filter values are always bound, never spliced into the SQL text);
//! - as an in-process check against a candidate record.

use crate::domain::inventory::InventoryItem;
use crate::domain::item::Item;
use sqlx::{Postgres, QueryBuilder};
use std::str::FromStr;

/// A composable filter predicate over `Candidate` records.
pub trait Specification: Send + Sync {
    type Candidate;

    /// Appends a parenthesized boolean expression to `query`.
    fn push_predicate(&self, query: &mut QueryBuilder<'_, Postgres>);

    fn is_satisfied_by(&self, candidate: &Self::Candidate) -> bool;
}

/// Lower bounds default to zero when absent or unparseable.
pub fn parse_min_bound<T>(raw: Option<&str>) -> T
where
    T: FromStr + Default + PartialOrd,
{
    raw.and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| v.partial_cmp(&T::default()).is_some())
        .unwrap_or_default()
}

/// Upper bounds that are absent, unparseable or negative mean "unbounded".
pub fn parse_max_bound<T>(raw: Option<&str>) -> Option<T>
where
    T: FromStr + Default + PartialOrd,
{
    raw.and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| *v >= T::default())
}

/// `%value%` with LIKE metacharacters escaped, so the match is a literal substring.
fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Filters items by name/description substring and price range.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSpecification {
    name: String,
    description: String,
    min_price: f64,
    max_price: Option<f64>,
}

impl Default for ItemSpecification {
    fn default() -> Self {
        Self::new("", "", 0.0, None)
    }
}

impl ItemSpecification {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        min_price: f64,
        max_price: Option<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            min_price: if min_price.is_nan() { 0.0 } else { min_price },
            max_price: max_price.filter(|max| *max >= 0.0),
        }
    }

    /// Builds the specification from raw query-string values.
    pub fn from_params(
        name: Option<&str>,
        description: Option<&str>,
        min_price: Option<&str>,
        max_price: Option<&str>,
    ) -> Self {
        Self::new(
            name.unwrap_or_default(),
            description.unwrap_or_default(),
            parse_min_bound(min_price),
            parse_max_bound(max_price),
        )
    }

    pub fn max_price(&self) -> Option<f64> {
        self.max_price
    }
}

impl Specification for ItemSpecification {
    type Candidate = Item;

    fn push_predicate(&self, query: &mut QueryBuilder<'_, Postgres>) {
        query.push("(");
        {
            let mut clauses = query.separated(" AND ");
            if !self.name.is_empty() {
                clauses.push("item.name ILIKE ");
                clauses.push_bind_unseparated(contains_pattern(&self.name));
            }
            if !self.description.is_empty() {
                clauses.push("item.description ILIKE ");
                clauses.push_bind_unseparated(contains_pattern(&self.description));
            }
            clauses.push("item.price >= ");
            clauses.push_bind_unseparated(self.min_price);
            if let Some(max) = self.max_price {
                clauses.push("item.price <= ");
                clauses.push_bind_unseparated(max);
            }
        }
        query.push(")");
    }

    fn is_satisfied_by(&self, item: &Item) -> bool {
        contains_ignore_case(&item.name, &self.name)
            && contains_ignore_case(&item.description, &self.description)
            && item.price >= self.min_price
            && self.max_price.map_or(true, |max| item.price <= max)
    }
}

/// Filters inventory by quantity range, ANDed with an item filter on the bound item.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InventorySpecification {
    min_quantity: i32,
    max_quantity: Option<i32>,
    item: ItemSpecification,
}

impl InventorySpecification {
    pub fn new(min_quantity: i32, max_quantity: Option<i32>, item: ItemSpecification) -> Self {
        Self {
            min_quantity,
            max_quantity: max_quantity.filter(|max| *max >= 0),
            item,
        }
    }

    pub fn from_params(
        min_quantity: Option<&str>,
        max_quantity: Option<&str>,
        item: ItemSpecification,
    ) -> Self {
        Self::new(
            parse_min_bound(min_quantity),
            parse_max_bound(max_quantity),
            item,
        )
    }

    pub fn item_specification(&self) -> &ItemSpecification {
        &self.item
    }
}

impl Specification for InventorySpecification {
    type Candidate = InventoryItem;

    /// Expects `item` to be joined into the query alongside `inventory`.
    fn push_predicate(&self, query: &mut QueryBuilder<'_, Postgres>) {
        query.push("(");
        self.item.push_predicate(query);
        query.push(" AND inventory.quantity >= ");
        query.push_bind(self.min_quantity);
        if let Some(max) = self.max_quantity {
            query.push(" AND inventory.quantity <= ");
            query.push_bind(max);
        }
        query.push(")");
    }

    /// `candidate.item` must already be hydrated.
    fn is_satisfied_by(&self, candidate: &InventoryItem) -> bool {
        self.item.is_satisfied_by(&candidate.item)
            && candidate.quantity >= self.min_quantity
            && self.max_quantity.map_or(true, |max| candidate.quantity <= max)
    }
}
