//! View transition engine.
//!
//! Owns the cursor, fork view, constraints, association/detail lists and
//! visual preferences, publishing each change as a new [`ExploreState`] on a
//! `watch` channel.
//!
//! # Request sequencing
//!
//! Resolver calls are tagged with a generation drawn from one of two counters,
//! one for commits and one for fork resolutions. A result is applied only if
//! its generation is still the latest issued for its target. Fork, association
//! and detail results additionally carry the commit generation that was live
//! when they were issued and are dropped if a commit has landed since.

use crate::nav;
use crate::ordering::order_spaces;
use crate::outcome::{IgnoreReason, Outcome};
use crate::pipeline::{AnalyticsService, InsightPipeline};
use crate::state::ExploreState;
use crate::view::{ForkView, ViewCursor, ViewDescriptor};
use crate::visual::{Panels, VisualConfig};
use prism_core::{
    Aggregator, CubeRequest, ExploreConfig, Field, FieldId, FieldKind, InsightSpace, OrderBy, Row,
    SpecifyRequest, TaskMode,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Navigation and fork controller over the pipeline's insight spaces.
///
/// Every operation reports an [`Outcome`] instead of an error; anything other
/// than `Applied` leaves the published state untouched.
pub struct ExploreEngine {
    pipeline: Arc<dyn InsightPipeline>,
    analytics: Arc<dyn AnalyticsService>,
    config: ExploreConfig,
    state: watch::Sender<ExploreState>,
    commit_issued: AtomicU64,
    fork_issued: AtomicU64,
}

impl ExploreEngine {
    pub fn new(
        pipeline: Arc<dyn InsightPipeline>,
        analytics: Arc<dyn AnalyticsService>,
        config: ExploreConfig,
    ) -> Self {
        let (state, _) = watch::channel(ExploreState::new(&config));
        Self {
            pipeline,
            analytics,
            config,
            state,
            commit_issued: AtomicU64::new(0),
            fork_issued: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ExploreConfig {
        &self.config
    }

    pub fn subscribe(&self) -> watch::Receiver<ExploreState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ExploreState {
        self.state.borrow().clone()
    }

    pub fn fields(&self) -> Vec<Field> {
        self.pipeline.fields()
    }

    /// The pipeline's spaces under the current ordering mode.
    pub fn ordered_spaces(&self) -> Vec<InsightSpace> {
        let order = self.state.borrow().order_by;
        self.ordered_spaces_by(order)
    }

    fn ordered_spaces_by(&self, order: OrderBy) -> Vec<InsightSpace> {
        let spaces = self.pipeline.insight_spaces();
        match order {
            OrderBy::Cardinality => order_spaces(&spaces, order, &self.pipeline.fields()),
            _ => order_spaces(&spaces, order, &[]),
        }
    }

    // ========================================================================
    // COMMITTED TRANSITIONS
    // ========================================================================

    /// Resolve the space at `index` of the current ordering and, on success,
    /// commit it as the displayed view.
    pub async fn commit_transition(&self, index: usize) -> Outcome {
        let spaces = self.ordered_spaces();
        let Some(space) = spaces.get(index).cloned() else {
            tracing::debug!(index, len = spaces.len(), "Transition index out of range");
            return Outcome::Ignored(IgnoreReason::OutOfRange {
                index,
                len: spaces.len(),
            });
        };

        let generation = self.commit_issued.fetch_add(1, Ordering::SeqCst) + 1;
        let request = SpecifyRequest::for_space(&space);
        let resolved = match self.pipeline.specify(&request).await {
            Ok(Some(spec)) => spec,
            Ok(None) => {
                tracing::debug!(index, generation, "Resolver returned no spec for transition");
                return Outcome::Unresolved;
            }
            Err(err) => {
                tracing::warn!(error = %err, index, generation, "Transition resolution failed");
                return Outcome::Failed(err);
            }
        };

        let defaults = &self.config.visual;
        let applied = self.state.send_if_modified(|state| {
            if self.commit_issued.load(Ordering::SeqCst) != generation {
                return false;
            }
            // Two separate constructions: the fork must never share storage
            // with the committed view.
            state.cursor = ViewCursor {
                page_index: index,
                view: Some(ViewDescriptor::from_space(&space)),
                spec: Some(Arc::new(resolved)),
                generation,
            };
            state.fork = ForkView {
                view: Some(ViewDescriptor::from_space(&space)),
                spec: None,
            };
            state.details.clear();
            state.panels.show_associations = false;
            state.associations_t1.clear();
            state.associations_t2.clear();
            state.visual.reset_resize(defaults);
            true
        });

        if applied {
            tracing::debug!(index, generation, "Committed view transition");
            Outcome::Applied
        } else {
            tracing::debug!(index, generation, "Dropped stale transition result");
            Outcome::Stale
        }
    }

    pub async fn advance(&self) -> Outcome {
        let len = self.ordered_spaces().len();
        let current = self.state.borrow().cursor.page_index;
        match nav::next_index(current, len) {
            Some(index) => self.commit_transition(index).await,
            None => Outcome::Ignored(IgnoreReason::EmptyCollection),
        }
    }

    pub async fn retreat(&self) -> Outcome {
        let len = self.ordered_spaces().len();
        let current = self.state.borrow().cursor.page_index;
        match nav::previous_index(current, len) {
            Some(index) => self.commit_transition(index).await,
            None => Outcome::Ignored(IgnoreReason::EmptyCollection),
        }
    }

    /// Commit the first space whose dimension and measure sets equal the
    /// target's.
    pub async fn jump_to_view(&self, target: &InsightSpace) -> Outcome {
        let wanted = ViewDescriptor::from_space(target);
        let position = self
            .ordered_spaces()
            .iter()
            .position(|space| wanted.matches_space(space));
        match position {
            Some(index) => self.commit_transition(index).await,
            None => {
                tracing::debug!("No space matches jump target");
                Outcome::Ignored(IgnoreReason::NoMatchingSpace)
            }
        }
    }

    /// Switch ordering mode and re-commit the current page index under it.
    ///
    /// The index is not re-mapped, so the page may now show a different space.
    pub async fn set_order(&self, order: OrderBy) -> Outcome {
        self.state.send_if_modified(|state| {
            let changed = state.order_by != order;
            state.order_by = order;
            changed
        });
        let current = self.state.borrow().cursor.page_index;
        self.commit_transition(current).await
    }

    // ========================================================================
    // FORK VIEW
    // ========================================================================

    /// Append a field to the fork view and re-resolve it. A field already in
    /// the fork is a no-op and does not reach the resolver.
    pub async fn add_field(&self, kind: FieldKind, fid: FieldId) -> Outcome {
        let mut added = None;
        self.state.send_if_modified(|state| match state.fork.view.as_mut() {
            Some(view) => {
                let changed = view.add_field(kind, fid);
                added = Some(changed);
                changed
            }
            None => false,
        });
        match added {
            None => Outcome::Ignored(IgnoreReason::NoForkView),
            Some(false) => Outcome::Ignored(IgnoreReason::DuplicateField),
            Some(true) => self.specify_fork_view().await,
        }
    }

    /// Remove the first occurrence of a field from the fork view. The fork is
    /// re-resolved whether or not anything was removed.
    pub async fn remove_field(&self, kind: FieldKind, fid: &FieldId) -> Outcome {
        let mut has_fork = false;
        self.state.send_if_modified(|state| match state.fork.view.as_mut() {
            Some(view) => {
                has_fork = true;
                view.remove_field(kind, fid)
            }
            None => false,
        });
        if !has_fork {
            return Outcome::Ignored(IgnoreReason::NoForkView);
        }
        self.specify_fork_view().await
    }

    /// Change the aggregator of a fork measure.
    pub fn set_fork_op(&self, index: usize, op: Aggregator) -> bool {
        self.state.send_if_modified(|state| match state.fork.view.as_mut() {
            Some(view) => view.set_op(index, op),
            None => false,
        })
    }

    /// Resolve the current fork view into the fork's own spec.
    pub async fn specify_fork_view(&self) -> Outcome {
        let (request, epoch) = {
            let state = self.state.borrow();
            match state.fork.view.as_ref() {
                Some(view) => (
                    view.specify_request(Some(self.config.fork_significance)),
                    state.cursor.generation,
                ),
                None => return Outcome::Ignored(IgnoreReason::NoForkView),
            }
        };

        let generation = self.fork_issued.fetch_add(1, Ordering::SeqCst) + 1;
        let resolved = match self.pipeline.specify(&request).await {
            Ok(Some(spec)) => spec,
            Ok(None) => {
                tracing::debug!(generation, "Resolver returned no spec for fork view");
                return Outcome::Unresolved;
            }
            Err(err) => {
                tracing::warn!(error = %err, generation, "Fork view resolution failed");
                return Outcome::Failed(err);
            }
        };

        let applied = self.state.send_if_modified(|state| {
            if self.fork_issued.load(Ordering::SeqCst) != generation
                || state.cursor.generation != epoch
            {
                return false;
            }
            state.fork.spec = Some(Arc::new(resolved));
            true
        });

        if applied {
            Outcome::Applied
        } else {
            tracing::debug!(generation, epoch, "Dropped stale fork resolution");
            Outcome::Stale
        }
    }

    // ========================================================================
    // CONSTRAINTS
    // ========================================================================

    /// Rebuild constraints from the pipeline's field catalog.
    pub fn init_constraints(&self) {
        let fields = self.pipeline.fields();
        self.state
            .send_modify(|state| state.constraints.initialize(&fields));
    }

    pub fn cycle_constraint(&self, kind: FieldKind, index: usize) -> bool {
        self.state
            .send_if_modified(|state| state.constraints.cycle(kind, index))
    }

    // ========================================================================
    // ASSOCIATIONS & DETAILS
    // ========================================================================

    /// Load associated views for the space at the current page index.
    /// `mode` falls back to the configured association mode.
    pub async fn load_associated_views(&self, mode: Option<TaskMode>) -> Outcome {
        let mode = mode.unwrap_or(self.config.association_mode);
        let (page_index, epoch) = {
            let state = self.state.borrow();
            (state.cursor.page_index, state.cursor.generation)
        };
        let spaces = self.ordered_spaces();
        let Some(space) = spaces.get(page_index) else {
            return Outcome::Ignored(IgnoreReason::NoCurrentSpace);
        };

        let views = match self
            .pipeline
            .associated_views(&space.dimensions, &space.measures, mode)
            .await
        {
            Ok(views) => views,
            Err(err) => {
                tracing::warn!(error = %err, page_index, "Association lookup failed");
                return Outcome::Failed(err);
            }
        };

        let applied = self.state.send_if_modified(|state| {
            if state.cursor.generation != epoch {
                return false;
            }
            state.associations_t1 = views.first_order;
            state.associations_t2 = views.second_order;
            state.panels.show_associations = true;
            true
        });
        stale_unless(applied)
    }

    pub async fn scan_details(&self, space_index: usize) -> Outcome {
        let epoch = self.state.borrow().cursor.generation;
        let details = match self.pipeline.scan_details(space_index).await {
            Ok(details) => details,
            Err(err) => {
                tracing::warn!(error = %err, space_index, "Detail scan failed");
                return Outcome::Failed(err);
            }
        };
        let applied = self.state.send_if_modified(|state| {
            if state.cursor.generation != epoch {
                return false;
            }
            state.details = details;
            true
        });
        stale_unless(applied)
    }

    // ========================================================================
    // AUXILIARY QUERIES
    // ========================================================================

    /// Aggregated rows for an arbitrary view. Failures yield no rows.
    pub async fn view_data(
        &self,
        dimensions: Vec<FieldId>,
        measures: Vec<FieldId>,
        ops: Vec<Aggregator>,
    ) -> Vec<Row> {
        let request = CubeRequest {
            dimensions,
            measures,
            aggregators: ops,
        };
        match self.analytics.cube(&request).await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(error = %err, "Cube query failed");
                Vec::new()
            }
        }
    }

    pub async fn sub_insights(
        &self,
        dimensions: &[FieldId],
        measures: &[FieldId],
    ) -> Vec<serde_json::Value> {
        match self.analytics.sub_insights(dimensions, measures).await {
            Ok(insights) => insights,
            Err(err) => {
                tracing::error!(error = %err, "Sub-insight query failed");
                Vec::new()
            }
        }
    }

    /// Hand the committed schema to the external chart editor.
    pub fn bring_to_editor(&self) -> bool {
        self.state.send_if_modified(|state| match state.cursor.spec.as_ref() {
            Some(spec) => {
                state.editor_spec = Some(spec.schema.clone());
                true
            }
            None => false,
        })
    }

    // ========================================================================
    // PRESENTATION STATE
    // ========================================================================

    pub fn update_visual_config(&self, updater: impl FnOnce(&mut VisualConfig)) {
        self.state.send_modify(|state| updater(&mut state.visual));
    }

    pub fn set_aggregated(&self, aggregated: bool) {
        self.update_visual_config(|visual| visual.default_aggregated = aggregated);
    }

    pub fn reset_visual_resize(&self) {
        let defaults = &self.config.visual;
        self.update_visual_config(|visual| visual.reset_resize(defaults));
    }

    pub fn set_show_associations(&self, show: bool) {
        self.set_panel(show, |panels| &mut panels.show_associations);
    }

    pub fn set_show_constraints(&self, show: bool) {
        self.set_panel(show, |panels| &mut panels.show_constraints);
    }

    pub fn set_show_preferences(&self, show: bool) {
        self.set_panel(show, |panels| &mut panels.show_preferences);
    }

    pub fn set_show_save_modal(&self, show: bool) {
        self.set_panel(show, |panels| &mut panels.show_save_modal);
    }

    pub fn set_show_subinsights(&self, show: bool) {
        self.set_panel(show, |panels| &mut panels.show_subinsights);
    }

    fn set_panel(&self, show: bool, flag: impl FnOnce(&mut Panels) -> &mut bool) {
        self.state.send_if_modified(|state| {
            let slot = flag(&mut state.panels);
            let changed = *slot != show;
            *slot = show;
            changed
        });
    }
}

fn stale_unless(applied: bool) -> Outcome {
    if applied {
        Outcome::Applied
    } else {
        Outcome::Stale
    }
}
