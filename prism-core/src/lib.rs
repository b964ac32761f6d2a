//! PRISM Core - Explore Data Types
//!
//! Pure data structures shared by the explore engine and the collaborators it
//! talks to. Behaviour lives in `prism-explore`.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod config;
pub mod enums;
pub mod error;

pub use config::{ExploreConfig, VisualDefaults};
pub use enums::{
    Aggregator, FieldKind, OrderBy, OrderByParseError, ResizeMode, TaskMode, VisMode,
};
pub use error::{ConfigError, PipelineError, PrismError, PrismResult};

// ============================================================================
// FIELD CATALOG
// ============================================================================

/// Identifier of a dataset column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FieldId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Analytic role of a field in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticRole {
    Dimension,
    Measure,
}

/// A field catalog entry with its precomputed profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub key: FieldId,
    pub analytic_type: AnalyticRole,
    /// Distinct value count from the field profile
    pub distinct_count: u64,
}

impl Field {
    pub fn dimension(key: impl Into<FieldId>, distinct_count: u64) -> Self {
        Self {
            key: key.into(),
            analytic_type: AnalyticRole::Dimension,
            distinct_count,
        }
    }

    pub fn measure(key: impl Into<FieldId>, distinct_count: u64) -> Self {
        Self {
            key: key.into(),
            analytic_type: AnalyticRole::Measure,
            distinct_count,
        }
    }
}

// ============================================================================
// INSIGHT SPACES
// ============================================================================

/// A candidate dimension/measure grouping proposed by the mining pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSpace {
    pub dimensions: Vec<FieldId>,
    pub measures: Vec<FieldId>,
    pub significance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impurity: Option<f64>,
}

impl InsightSpace {
    pub fn new<D, M>(dimensions: D, measures: M) -> Self
    where
        D: IntoIterator,
        D::Item: Into<FieldId>,
        M: IntoIterator,
        M::Item: Into<FieldId>,
    {
        Self {
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            measures: measures.into_iter().map(Into::into).collect(),
            significance: 1.0,
            score: None,
            impurity: None,
        }
    }

    pub fn with_significance(mut self, significance: f64) -> Self {
        self.significance = significance;
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Total number of fields in the space.
    pub fn field_count(&self) -> usize {
        self.dimensions.len() + self.measures.len()
    }
}

/// An insight space with its schema and data denormalised alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VizSpace {
    #[serde(flatten)]
    pub space: InsightSpace,
    pub schema: ChartSchema,
    pub data_view: Vec<Row>,
}

/// First- and second-order associated views for a space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssociatedViews {
    pub first_order: Vec<VizSpace>,
    pub second_order: Vec<VizSpace>,
}

// ============================================================================
// SPECIFICATIONS
// ============================================================================

/// One data record.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Renderer-specific chart specification, opaque to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartSchema(pub serde_json::Value);

impl ChartSchema {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Resolver output for a view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSpec {
    pub schema: ChartSchema,
    pub data_view: Vec<Row>,
}

/// Input to the specification resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecifyRequest {
    pub dimensions: Vec<FieldId>,
    pub measures: Vec<FieldId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub significance: Option<f64>,
}

impl SpecifyRequest {
    pub fn for_space(space: &InsightSpace) -> Self {
        Self {
            dimensions: space.dimensions.clone(),
            measures: space.measures.clone(),
            significance: Some(space.significance),
        }
    }
}

/// Input to the aggregation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeRequest {
    pub dimensions: Vec<FieldId>,
    pub measures: Vec<FieldId>,
    pub aggregators: Vec<Aggregator>,
}
