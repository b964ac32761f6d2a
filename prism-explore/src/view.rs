//! View descriptors and the two overlays built from them.

use prism_core::{
    Aggregator, CubeRequest, FieldId, FieldKind, InsightSpace, ResolvedSpec, SpecifyRequest,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Ordered dimensions and measures with one aggregator per measure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewDescriptor {
    dimensions: Vec<FieldId>,
    measures: Vec<FieldId>,
    ops: Vec<Aggregator>,
}

impl ViewDescriptor {
    /// Build a descriptor from a space, every measure aggregated with `sum`.
    pub fn from_space(space: &InsightSpace) -> Self {
        Self {
            dimensions: space.dimensions.clone(),
            measures: space.measures.clone(),
            ops: vec![Aggregator::Sum; space.measures.len()],
        }
    }

    pub fn dimensions(&self) -> &[FieldId] {
        &self.dimensions
    }

    pub fn measures(&self) -> &[FieldId] {
        &self.measures
    }

    pub fn ops(&self) -> &[Aggregator] {
        &self.ops
    }

    pub fn fields(&self, kind: FieldKind) -> &[FieldId] {
        match kind {
            FieldKind::Dimensions => &self.dimensions,
            FieldKind::Measures => &self.measures,
        }
    }

    pub fn contains(&self, kind: FieldKind, fid: &FieldId) -> bool {
        self.fields(kind).contains(fid)
    }

    /// Append `fid` unless present. Returns whether the view changed.
    pub fn add_field(&mut self, kind: FieldKind, fid: FieldId) -> bool {
        if self.contains(kind, &fid) {
            return false;
        }
        match kind {
            FieldKind::Dimensions => self.dimensions.push(fid),
            FieldKind::Measures => {
                self.measures.push(fid);
                self.ops.push(Aggregator::Sum);
            }
        }
        true
    }

    /// Remove the first occurrence of `fid`. Returns whether the view changed.
    pub fn remove_field(&mut self, kind: FieldKind, fid: &FieldId) -> bool {
        let Some(index) = self.fields(kind).iter().position(|f| f == fid) else {
            return false;
        };
        match kind {
            FieldKind::Dimensions => {
                self.dimensions.remove(index);
            }
            FieldKind::Measures => {
                self.measures.remove(index);
                self.ops.remove(index);
            }
        }
        true
    }

    /// Set the aggregator for the measure at `index`.
    pub fn set_op(&mut self, index: usize, op: Aggregator) -> bool {
        match self.ops.get_mut(index) {
            Some(slot) => {
                *slot = op;
                true
            }
            None => false,
        }
    }

    pub fn specify_request(&self, significance: Option<f64>) -> SpecifyRequest {
        SpecifyRequest {
            dimensions: self.dimensions.clone(),
            measures: self.measures.clone(),
            significance,
        }
    }

    pub fn cube_request(&self) -> CubeRequest {
        CubeRequest {
            dimensions: self.dimensions.clone(),
            measures: self.measures.clone(),
            aggregators: self.ops.clone(),
        }
    }

    /// Order- and duplicate-insensitive match against a space.
    pub fn matches_space(&self, space: &InsightSpace) -> bool {
        is_set_equal(&self.dimensions, &space.dimensions)
            && is_set_equal(&self.measures, &space.measures)
    }
}

/// Whether two field lists hold the same set of ids.
pub fn is_set_equal(a: &[FieldId], b: &[FieldId]) -> bool {
    let left: HashSet<&FieldId> = a.iter().collect();
    let right: HashSet<&FieldId> = b.iter().collect();
    left == right
}

/// The committed position: page index, view and its resolved spec.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewCursor {
    pub page_index: usize,
    pub view: Option<ViewDescriptor>,
    pub spec: Option<Arc<ResolvedSpec>>,
    /// Generation of the commit that produced this cursor; 0 before the first commit
    pub generation: u64,
}

/// Editable draft of the committed view, resolved on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForkView {
    pub view: Option<ViewDescriptor>,
    pub spec: Option<Arc<ResolvedSpec>>,
}
