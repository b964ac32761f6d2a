//! Published explore state.

use crate::constraints::ConstraintSet;
use crate::view::{ForkView, ViewCursor};
use crate::visual::{Panels, VisualConfig};
use prism_core::{ChartSchema, ExploreConfig, InsightSpace, OrderBy, VizSpace};

/// Immutable snapshot of everything the engine owns.
///
/// Subscribers receive a new value on every observable change; they never
/// mutate it in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ExploreState {
    pub order_by: OrderBy,
    pub cursor: ViewCursor,
    pub fork: ForkView,
    /// Schema handed to the external chart editor
    pub editor_spec: Option<ChartSchema>,
    pub details: Vec<InsightSpace>,
    pub associations_t1: Vec<VizSpace>,
    pub associations_t2: Vec<VizSpace>,
    pub constraints: ConstraintSet,
    pub visual: VisualConfig,
    pub panels: Panels,
}

impl ExploreState {
    pub fn new(config: &ExploreConfig) -> Self {
        Self {
            order_by: config.default_order,
            cursor: ViewCursor::default(),
            fork: ForkView::default(),
            editor_spec: None,
            details: Vec::new(),
            associations_t1: Vec::new(),
            associations_t2: Vec::new(),
            constraints: ConstraintSet::new(),
            visual: VisualConfig::from_defaults(&config.visual),
            panels: Panels::default(),
        }
    }

    pub fn page_index(&self) -> usize {
        self.cursor.page_index
    }

    /// Whether a transition has been committed yet.
    pub fn has_view(&self) -> bool {
        self.cursor.view.is_some()
    }
}
