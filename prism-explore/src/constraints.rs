//! Tri-state field constraints used to bias future mining.

use prism_core::{AnalyticRole, Field, FieldId, FieldKind};
use serde::{Deserialize, Serialize};

/// Inclusion marker for a single field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum ConstraintState {
    /// Field must not appear
    Exclude,
    /// No constraint
    #[default]
    Free,
    /// Field must appear
    Include,
}

impl ConstraintState {
    pub fn value(self) -> i8 {
        match self {
            ConstraintState::Exclude => -1,
            ConstraintState::Free => 0,
            ConstraintState::Include => 1,
        }
    }

    /// Next state in the cycle `0 -> 1 -> -1 -> 0`.
    pub fn next(self) -> Self {
        match (self.value() + 2).rem_euclid(3) - 1 {
            -1 => ConstraintState::Exclude,
            1 => ConstraintState::Include,
            _ => ConstraintState::Free,
        }
    }
}

impl From<ConstraintState> for i8 {
    fn from(state: ConstraintState) -> Self {
        state.value()
    }
}

impl TryFrom<i8> for ConstraintState {
    type Error = ConstraintStateError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(ConstraintState::Exclude),
            0 => Ok(ConstraintState::Free),
            1 => Ok(ConstraintState::Include),
            other => Err(ConstraintStateError(other)),
        }
    }
}

/// Error when decoding a constraint marker outside `-1..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid constraint state: {0}")]
pub struct ConstraintStateError(pub i8);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintEntry {
    pub fid: FieldId,
    pub state: ConstraintState,
}

impl ConstraintEntry {
    pub fn free(fid: FieldId) -> Self {
        Self {
            fid,
            state: ConstraintState::Free,
        }
    }
}

/// Constraint entries partitioned by analytic role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSet {
    dimensions: Vec<ConstraintEntry>,
    measures: Vec<ConstraintEntry>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: &[Field]) -> Self {
        let mut set = Self::new();
        set.initialize(fields);
        set
    }

    /// Rebuild both lists from the catalog. Prior state is discarded.
    pub fn initialize(&mut self, fields: &[Field]) {
        self.dimensions = entries_for_role(fields, AnalyticRole::Dimension);
        self.measures = entries_for_role(fields, AnalyticRole::Measure);
    }

    /// Advance the entry at `index`. Returns false when the index is out of range.
    pub fn cycle(&mut self, kind: FieldKind, index: usize) -> bool {
        match self.entries_mut(kind).get_mut(index) {
            Some(entry) => {
                entry.state = entry.state.next();
                true
            }
            None => false,
        }
    }

    pub fn entries(&self, kind: FieldKind) -> &[ConstraintEntry] {
        match kind {
            FieldKind::Dimensions => &self.dimensions,
            FieldKind::Measures => &self.measures,
        }
    }

    pub fn dimensions(&self) -> &[ConstraintEntry] {
        &self.dimensions
    }

    pub fn measures(&self) -> &[ConstraintEntry] {
        &self.measures
    }

    pub fn included(&self, kind: FieldKind) -> Vec<FieldId> {
        self.in_state(kind, ConstraintState::Include)
    }

    pub fn excluded(&self, kind: FieldKind) -> Vec<FieldId> {
        self.in_state(kind, ConstraintState::Exclude)
    }

    fn in_state(&self, kind: FieldKind, state: ConstraintState) -> Vec<FieldId> {
        self.entries(kind)
            .iter()
            .filter(|entry| entry.state == state)
            .map(|entry| entry.fid.clone())
            .collect()
    }

    fn entries_mut(&mut self, kind: FieldKind) -> &mut Vec<ConstraintEntry> {
        match kind {
            FieldKind::Dimensions => &mut self.dimensions,
            FieldKind::Measures => &mut self.measures,
        }
    }
}

fn entries_for_role(fields: &[Field], role: AnalyticRole) -> Vec<ConstraintEntry> {
    fields
        .iter()
        .filter(|field| field.analytic_type == role)
        .map(|field| ConstraintEntry::free(field.key.clone()))
        .collect()
}
