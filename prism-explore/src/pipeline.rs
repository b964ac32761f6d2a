//! Collaborator traits the engine consumes.
//!
//! The mining pipeline owns the ranked spaces and the field catalog; both are
//! re-read on every call and never cached by the engine.

use async_trait::async_trait;
use prism_core::{
    AssociatedViews, CubeRequest, Field, FieldId, InsightSpace, PipelineError, ResolvedSpec, Row,
    SpecifyRequest, TaskMode,
};

pub type PipelineResult<T> = Result<T, PipelineError>;

/// The insight-mining pipeline.
#[async_trait]
pub trait InsightPipeline: Send + Sync {
    /// Current ranked spaces, in the pipeline's own order.
    fn insight_spaces(&self) -> Vec<InsightSpace>;

    /// Current field catalog.
    fn fields(&self) -> Vec<Field>;

    /// Resolve a view into a renderable spec. `Ok(None)` means nothing could
    /// be specified; the engine treats it the same as an error.
    async fn specify(&self, request: &SpecifyRequest) -> PipelineResult<Option<ResolvedSpec>>;

    /// First- and second-order associations of a dimension/measure pair.
    async fn associated_views(
        &self,
        dimensions: &[FieldId],
        measures: &[FieldId],
        mode: TaskMode,
    ) -> PipelineResult<AssociatedViews>;

    /// Drill-down detail spaces for the space at `space_index`.
    async fn scan_details(&self, space_index: usize) -> PipelineResult<Vec<InsightSpace>>;
}

/// The aggregation engine.
#[async_trait]
pub trait AnalyticsService: Send + Sync {
    async fn cube(&self, request: &CubeRequest) -> PipelineResult<Vec<Row>>;

    async fn sub_insights(
        &self,
        dimensions: &[FieldId],
        measures: &[FieldId],
    ) -> PipelineResult<Vec<serde_json::Value>>;
}
