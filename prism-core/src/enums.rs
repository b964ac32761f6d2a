//! Enum types shared by the explore engine and its collaborators

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ORDERING
// ============================================================================

/// Navigation order applied to the ranked insight-space collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    /// Keep the pipeline's rank order
    #[default]
    Default,
    /// Ascending by total number of fields in the space
    FieldNum,
    /// Ascending by summed distinct-value counts of the dimensions
    Cardinality,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::Default => "default",
            OrderBy::FieldNum => "field_num",
            OrderBy::Cardinality => "cardinality",
        }
    }

    pub fn all() -> &'static [OrderBy] {
        &[OrderBy::Default, OrderBy::FieldNum, OrderBy::Cardinality]
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderBy {
    type Err = OrderByParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(OrderBy::Default),
            "field_num" => Ok(OrderBy::FieldNum),
            "cardinality" => Ok(OrderBy::Cardinality),
            _ => Err(OrderByParseError(s.to_string())),
        }
    }
}

/// Error when parsing an invalid ordering mode string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid explore order: {0}")]
pub struct OrderByParseError(pub String);

// ============================================================================
// VIEW ENUMS
// ============================================================================

/// Aggregation operator applied to a measure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregator {
    #[default]
    Sum,
    Mean,
    Count,
}

impl Aggregator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregator::Sum => "sum",
            Aggregator::Mean => "mean",
            Aggregator::Count => "count",
        }
    }
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which half of a view a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Dimensions,
    Measures,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Dimensions => "dimensions",
            FieldKind::Measures => "measures",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where association mining runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskMode {
    #[default]
    Local,
    Server,
}

// ============================================================================
// VISUAL PREFERENCES
// ============================================================================

/// How the chart container is sized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    /// Fit the available area
    #[default]
    Auto,
    /// Use the explicit width/height
    Control,
    /// Leave the renderer's own size alone
    None,
}

/// Chart recommendation flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisMode {
    /// Distribution-oriented charts
    #[default]
    Dist,
    /// Business-style common charts
    Common,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_by_round_trips_through_str() {
        for order in OrderBy::all() {
            let parsed: OrderBy = order.as_str().parse().unwrap();
            assert_eq!(parsed, *order);
        }
    }

    #[test]
    fn test_order_by_rejects_unknown() {
        let err = "by_name".parse::<OrderBy>().unwrap_err();
        assert!(err.to_string().contains("by_name"));
    }

    #[test]
    fn test_order_by_serde_uses_snake_case() {
        let json = serde_json::to_string(&OrderBy::FieldNum).unwrap();
        assert_eq!(json, "\"field_num\"");
    }
}
