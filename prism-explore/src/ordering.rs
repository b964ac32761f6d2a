//! Ordering policy over the insight-space collection.
//!
//! Every mode returns a fresh `Vec` and leaves the input untouched. Sorts are
//! stable: spaces with equal keys keep the pipeline's relative rank.

use prism_core::{Field, FieldId, InsightSpace, OrderBy};
use std::collections::HashMap;

/// Order `spaces` according to `order`.
pub fn order_spaces(spaces: &[InsightSpace], order: OrderBy, fields: &[Field]) -> Vec<InsightSpace> {
    let mut ordered = spaces.to_vec();
    match order {
        OrderBy::Default => {}
        OrderBy::FieldNum => ordered.sort_by_key(InsightSpace::field_count),
        OrderBy::Cardinality => {
            let counts = distinct_counts(fields);
            ordered.sort_by_key(|space| cardinality_estimate(space, &counts));
        }
    }
    ordered
}

/// Approximate cardinality of a space: the summed distinct counts of its
/// dimensions. Fields missing from the catalog contribute 0.
///
/// The true figure would need an aggregation query per space, which ranking
/// does not issue.
pub fn cardinality_estimate(space: &InsightSpace, counts: &HashMap<&FieldId, u64>) -> u64 {
    space
        .dimensions
        .iter()
        .filter_map(|dim| counts.get(dim))
        .fold(0u64, |acc, count| acc.saturating_add(*count))
}

/// Distinct counts keyed by field. The first catalog entry for a key wins.
pub fn distinct_counts(fields: &[Field]) -> HashMap<&FieldId, u64> {
    let mut counts = HashMap::with_capacity(fields.len());
    for field in fields {
        counts.entry(&field.key).or_insert(field.distinct_count);
    }
    counts
}
