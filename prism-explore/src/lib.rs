//! PRISM Explore - view navigation and synthesis
//!
//! Selects, orders, forks and transitions the insight space currently on
//! display. Insight discovery and spec rendering stay behind the
//! [`InsightPipeline`] and [`AnalyticsService`] traits.

pub mod constraints;
pub mod engine;
pub mod nav;
pub mod ordering;
pub mod outcome;
pub mod pipeline;
pub mod state;
pub mod view;
pub mod visual;

pub use constraints::{ConstraintEntry, ConstraintSet, ConstraintState, ConstraintStateError};
pub use engine::ExploreEngine;
pub use ordering::order_spaces;
pub use outcome::{IgnoreReason, Outcome};
pub use pipeline::{AnalyticsService, InsightPipeline, PipelineResult};
pub use state::ExploreState;
pub use view::{is_set_equal, ForkView, ViewCursor, ViewDescriptor};
pub use visual::{Panels, ResizeConfig, VisualConfig};
