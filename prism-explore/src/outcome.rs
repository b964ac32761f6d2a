//! Results reported by engine operations.
//!
//! No operation returns `Err`. Anything other than `Applied` leaves the
//! published state exactly as it was.

use prism_core::PipelineError;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A new snapshot was published
    Applied,
    /// The request was rejected before reaching a collaborator
    Ignored(IgnoreReason),
    /// The resolver answered with nothing
    Unresolved,
    /// A collaborator failed
    Failed(PipelineError),
    /// A later request superseded this one before it completed
    Stale,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    OutOfRange { index: usize, len: usize },
    EmptyCollection,
    NoMatchingSpace,
    NoForkView,
    DuplicateField,
    NoCurrentSpace,
}
