//! PRISM Test Utilities
//!
//! Centralized test infrastructure for the PRISM workspace:
//! - Mock pipeline and analytics collaborators
//! - Proptest generators for spaces and field catalogs
//! - Test fixtures for common scenarios
//! - Custom assertions for engine invariants

pub use prism_core::{
    AssociatedViews, ChartSchema, CubeRequest, ExploreConfig, Field, FieldId, FieldKind,
    InsightSpace, OrderBy, PipelineError, ResolvedSpec, Row, SpecifyRequest, TaskMode, VizSpace,
};
pub use prism_explore::{
    AnalyticsService, ExploreEngine, ExploreState, InsightPipeline, Outcome, PipelineResult,
};

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

// ============================================================================
// MOCK PIPELINE
// ============================================================================

/// How the mock resolver answers one `specify` call.
#[derive(Debug)]
pub enum SpecifyStep {
    /// Answer with the echo spec
    Respond,
    /// Answer `Ok(None)`
    Empty,
    /// Answer with an error
    Fail(PipelineError),
    /// Wait for the matching [`HoldGate`] before answering with the echo spec
    Hold(oneshot::Receiver<()>),
}

/// Releases a held mock call.
#[derive(Debug)]
pub struct HoldGate {
    tx: oneshot::Sender<()>,
}

impl HoldGate {
    pub fn release(self) {
        let _ = self.tx.send(());
    }
}

/// Scriptable in-memory mining pipeline.
///
/// `specify` answers with [`echo_spec`] unless a [`SpecifyStep`] is queued.
/// Steps are consumed in call order.
#[derive(Debug, Default)]
pub struct MockPipeline {
    spaces: Mutex<Vec<InsightSpace>>,
    fields: Mutex<Vec<Field>>,
    steps: Mutex<VecDeque<SpecifyStep>>,
    specify_log: Mutex<Vec<SpecifyRequest>>,
    associations: Mutex<Option<AssociatedViews>>,
    association_log: Mutex<Vec<(Vec<FieldId>, Vec<FieldId>, TaskMode)>>,
    details: Mutex<Option<Vec<InsightSpace>>>,
    detail_log: Mutex<Vec<usize>>,
    association_hold: Mutex<Option<oneshot::Receiver<()>>>,
    detail_hold: Mutex<Option<oneshot::Receiver<()>>>,
}

impl MockPipeline {
    pub fn new(spaces: Vec<InsightSpace>, fields: Vec<Field>) -> Self {
        Self {
            spaces: Mutex::new(spaces),
            fields: Mutex::new(fields),
            associations: Mutex::new(Some(AssociatedViews::default())),
            details: Mutex::new(Some(Vec::new())),
            ..Self::default()
        }
    }

    pub fn set_spaces(&self, spaces: Vec<InsightSpace>) {
        *self.spaces.lock().expect("mock lock poisoned") = spaces;
    }

    pub fn set_fields(&self, fields: Vec<Field>) {
        *self.fields.lock().expect("mock lock poisoned") = fields;
    }

    pub fn push_step(&self, step: SpecifyStep) {
        self.steps
            .lock()
            .expect("mock lock poisoned")
            .push_back(step);
    }

    /// Queue a hold for the next unscripted `specify` call.
    pub fn hold_next_specify(&self) -> HoldGate {
        let (tx, rx) = oneshot::channel();
        self.push_step(SpecifyStep::Hold(rx));
        HoldGate { tx }
    }

    /// Answer association lookups with `views`; `None` makes them fail.
    pub fn set_associations(&self, views: Option<AssociatedViews>) {
        *self.associations.lock().expect("mock lock poisoned") = views;
    }

    /// Answer detail scans with `details`; `None` makes them fail.
    pub fn set_details(&self, details: Option<Vec<InsightSpace>>) {
        *self.details.lock().expect("mock lock poisoned") = details;
    }

    pub fn specify_requests(&self) -> Vec<SpecifyRequest> {
        self.specify_log.lock().expect("mock lock poisoned").clone()
    }

    pub fn specify_calls(&self) -> usize {
        self.specify_log.lock().expect("mock lock poisoned").len()
    }

    pub fn association_requests(&self) -> Vec<(Vec<FieldId>, Vec<FieldId>, TaskMode)> {
        self.association_log
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }

    /// Hold the next `associated_views` call until the gate is released.
    pub fn hold_next_associations(&self) -> HoldGate {
        let (tx, rx) = oneshot::channel();
        *self.association_hold.lock().expect("mock lock poisoned") = Some(rx);
        HoldGate { tx }
    }

    /// Hold the next `scan_details` call until the gate is released.
    pub fn hold_next_details(&self) -> HoldGate {
        let (tx, rx) = oneshot::channel();
        *self.detail_hold.lock().expect("mock lock poisoned") = Some(rx);
        HoldGate { tx }
    }

    pub fn detail_requests(&self) -> Vec<usize> {
        self.detail_log.lock().expect("mock lock poisoned").clone()
    }

    /// Yield until at least `count` `specify` calls have started.
    pub async fn wait_for_specify_calls(&self, count: usize) {
        while self.specify_calls() < count {
            tokio::task::yield_now().await;
        }
    }

    pub async fn wait_for_association_calls(&self, count: usize) {
        while self.association_requests().len() < count {
            tokio::task::yield_now().await;
        }
    }

    pub async fn wait_for_detail_calls(&self, count: usize) {
        while self.detail_requests().len() < count {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl InsightPipeline for MockPipeline {
    fn insight_spaces(&self) -> Vec<InsightSpace> {
        self.spaces.lock().expect("mock lock poisoned").clone()
    }

    fn fields(&self) -> Vec<Field> {
        self.fields.lock().expect("mock lock poisoned").clone()
    }

    async fn specify(&self, request: &SpecifyRequest) -> PipelineResult<Option<ResolvedSpec>> {
        self.specify_log
            .lock()
            .expect("mock lock poisoned")
            .push(request.clone());
        let step = self
            .steps
            .lock()
            .expect("mock lock poisoned")
            .pop_front()
            .unwrap_or(SpecifyStep::Respond);
        match step {
            SpecifyStep::Respond => Ok(Some(echo_spec(request))),
            SpecifyStep::Empty => Ok(None),
            SpecifyStep::Fail(err) => Err(err),
            SpecifyStep::Hold(rx) => {
                let _ = rx.await;
                Ok(Some(echo_spec(request)))
            }
        }
    }

    async fn associated_views(
        &self,
        dimensions: &[FieldId],
        measures: &[FieldId],
        mode: TaskMode,
    ) -> PipelineResult<AssociatedViews> {
        self.association_log
            .lock()
            .expect("mock lock poisoned")
            .push((dimensions.to_vec(), measures.to_vec(), mode));
        let hold = self
            .association_hold
            .lock()
            .expect("mock lock poisoned")
            .take();
        if let Some(rx) = hold {
            let _ = rx.await;
        }
        self.associations
            .lock()
            .expect("mock lock poisoned")
            .clone()
            .ok_or_else(|| PipelineError::request_failed("associations", "mock failure"))
    }

    async fn scan_details(&self, space_index: usize) -> PipelineResult<Vec<InsightSpace>> {
        self.detail_log
            .lock()
            .expect("mock lock poisoned")
            .push(space_index);
        let hold = self.detail_hold.lock().expect("mock lock poisoned").take();
        if let Some(rx) = hold {
            let _ = rx.await;
        }
        self.details
            .lock()
            .expect("mock lock poisoned")
            .clone()
            .ok_or_else(|| PipelineError::request_failed("details", "mock failure"))
    }
}

/// The spec the mock resolver produces: the request's fields echoed back.
pub fn echo_spec(request: &SpecifyRequest) -> ResolvedSpec {
    ResolvedSpec {
        schema: ChartSchema::new(json!({
            "dimensions": request.dimensions,
            "measures": request.measures,
        })),
        data_view: Vec::new(),
    }
}

// ============================================================================
// MOCK ANALYTICS
// ============================================================================

#[derive(Debug, Default)]
pub struct MockAnalytics {
    rows: Mutex<Option<Vec<Row>>>,
    insights: Mutex<Option<Vec<serde_json::Value>>>,
    cube_log: Mutex<Vec<CubeRequest>>,
}

impl MockAnalytics {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Some(Vec::new())),
            insights: Mutex::new(Some(Vec::new())),
            cube_log: Mutex::new(Vec::new()),
        }
    }

    /// Answer cube queries with `rows`; `None` makes them fail.
    pub fn set_rows(&self, rows: Option<Vec<Row>>) {
        *self.rows.lock().expect("mock lock poisoned") = rows;
    }

    /// Answer sub-insight queries with `insights`; `None` makes them fail.
    pub fn set_insights(&self, insights: Option<Vec<serde_json::Value>>) {
        *self.insights.lock().expect("mock lock poisoned") = insights;
    }

    pub fn cube_requests(&self) -> Vec<CubeRequest> {
        self.cube_log.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl AnalyticsService for MockAnalytics {
    async fn cube(&self, request: &CubeRequest) -> PipelineResult<Vec<Row>> {
        self.cube_log
            .lock()
            .expect("mock lock poisoned")
            .push(request.clone());
        self.rows
            .lock()
            .expect("mock lock poisoned")
            .clone()
            .ok_or_else(|| PipelineError::request_failed("cube", "mock failure"))
    }

    async fn sub_insights(
        &self,
        _dimensions: &[FieldId],
        _measures: &[FieldId],
    ) -> PipelineResult<Vec<serde_json::Value>> {
        self.insights
            .lock()
            .expect("mock lock poisoned")
            .clone()
            .ok_or_else(|| PipelineError::request_failed("subinsight", "mock failure"))
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for spaces and catalogs.

    use super::*;
    use proptest::prelude::*;

    /// Field ids drawn from a small alphabet so collisions happen.
    pub fn arb_field_id() -> impl Strategy<Value = FieldId> {
        "[a-f]".prop_map(FieldId::new)
    }

    pub fn arb_space() -> impl Strategy<Value = InsightSpace> {
        (
            prop::collection::vec(arb_field_id(), 0..4),
            prop::collection::vec(arb_field_id(), 0..3),
            0.0f64..1.0,
        )
            .prop_map(|(dimensions, measures, significance)| {
                InsightSpace::new(dimensions, measures).with_significance(significance)
            })
    }

    pub fn arb_spaces(max: usize) -> impl Strategy<Value = Vec<InsightSpace>> {
        prop::collection::vec(arb_space(), 0..max)
    }

    pub fn arb_fields() -> impl Strategy<Value = Vec<Field>> {
        prop::collection::vec((arb_field_id(), any::<bool>(), 0u64..500), 0..8).prop_map(
            |entries| {
                entries
                    .into_iter()
                    .map(|(key, is_dimension, count)| {
                        if is_dimension {
                            Field::dimension(key, count)
                        } else {
                            Field::measure(key, count)
                        }
                    })
                    .collect()
            },
        )
    }

    pub fn arb_order_by() -> impl Strategy<Value = OrderBy> {
        prop_oneof![
            Just(OrderBy::Default),
            Just(OrderBy::FieldNum),
            Just(OrderBy::Cardinality),
        ]
    }

    pub fn arb_field_kind() -> impl Strategy<Value = FieldKind> {
        prop_oneof![Just(FieldKind::Dimensions), Just(FieldKind::Measures)]
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    pub fn space(dimensions: &[&str], measures: &[&str]) -> InsightSpace {
        InsightSpace::new(dimensions.iter().copied(), measures.iter().copied())
    }

    /// A small catalog: three dimensions of increasing cardinality, two measures.
    pub fn sample_fields() -> Vec<Field> {
        vec![
            Field::dimension("gender", 2),
            Field::dimension("region", 12),
            Field::dimension("city", 300),
            Field::measure("sales", 9_000),
            Field::measure("profit", 7_500),
        ]
    }

    /// Engine wired to fresh mocks.
    pub struct Harness {
        pub engine: Arc<ExploreEngine>,
        pub pipeline: Arc<MockPipeline>,
        pub analytics: Arc<MockAnalytics>,
    }

    pub fn harness(spaces: Vec<InsightSpace>) -> Harness {
        harness_with(spaces, sample_fields(), ExploreConfig::standard())
    }

    pub fn harness_with(
        spaces: Vec<InsightSpace>,
        fields: Vec<Field>,
        config: ExploreConfig,
    ) -> Harness {
        let pipeline = Arc::new(MockPipeline::new(spaces, fields));
        let analytics = Arc::new(MockAnalytics::new());
        let engine = Arc::new(ExploreEngine::new(
            pipeline.clone(),
            analytics.clone(),
            config,
        ));
        Harness {
            engine,
            pipeline,
            analytics,
        }
    }

    pub fn viz(space: InsightSpace) -> VizSpace {
        VizSpace {
            space,
            schema: ChartSchema::default(),
            data_view: Vec::new(),
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for engine invariants.

    use super::*;

    /// Assert the state right after a committed transition to `index`.
    #[track_caller]
    pub fn assert_committed_at(state: &ExploreState, index: usize) {
        assert_eq!(state.cursor.page_index, index, "page index");
        assert!(state.cursor.spec.is_some(), "committed spec missing");
        assert!(state.cursor.view.is_some(), "committed view missing");
        assert_eq!(state.cursor.view, state.fork.view, "fork diverged on commit");
        assert!(state.fork.spec.is_none(), "fork spec not cleared");
        assert!(state.details.is_empty(), "details not cleared");
        assert!(state.associations_t1.is_empty(), "first-order associations not cleared");
        assert!(state.associations_t2.is_empty(), "second-order associations not cleared");
        assert!(!state.panels.show_associations, "associations still shown");
    }

    /// Assert an outcome is `Applied`.
    #[track_caller]
    pub fn assert_applied(outcome: &Outcome) {
        assert!(outcome.is_applied(), "Expected Applied, got: {:?}", outcome);
    }
}
