//! Presentation preferences and panel visibility owned by the engine.

use prism_core::{Aggregator, ResizeMode, VisMode, VisualDefaults};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualConfig {
    pub aggregator: Aggregator,
    pub default_aggregated: bool,
    pub default_stack: bool,
    pub vis_mode: VisMode,
    pub zoom: bool,
    pub debug: bool,
    pub resize: ResizeMode,
    pub resize_config: ResizeConfig,
    pub nlg: bool,
}

impl VisualConfig {
    pub fn from_defaults(defaults: &VisualDefaults) -> Self {
        Self {
            aggregator: defaults.aggregator,
            default_aggregated: defaults.default_aggregated,
            default_stack: defaults.default_stack,
            vis_mode: defaults.vis_mode,
            zoom: defaults.zoom,
            debug: defaults.debug,
            resize: ResizeMode::Auto,
            resize_config: ResizeConfig {
                width: defaults.resize_width,
                height: defaults.resize_height,
            },
            nlg: defaults.nlg,
        }
    }

    /// Back to auto sizing at the default dimensions. Other preferences stay.
    pub fn reset_resize(&mut self, defaults: &VisualDefaults) {
        self.resize = ResizeMode::Auto;
        self.resize_config = ResizeConfig {
            width: defaults.resize_width,
            height: defaults.resize_height,
        };
    }
}

/// Visibility flags read by the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Panels {
    pub show_associations: bool,
    pub show_constraints: bool,
    pub show_preferences: bool,
    pub show_save_modal: bool,
    pub show_subinsights: bool,
}
