//! Action layer: turns a verdict into a (non-destructive) change on the node
//! the content was extracted from.

pub mod applier;
pub mod errors;
pub mod suppress;

pub use applier::{ActionApplier, ApplyOutcome};
pub use errors::ApplyError;
pub use suppress::{StyleSuppressor, DEFAULT_SUPPRESSION_FILTER};
