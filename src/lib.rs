//! calmfeed: keeps a social feed calm by blurring posts whose text scores as
//! negative.
//!
//! The library half of the `calmfeed` binary; exposed for integration tests.

pub mod app_context;
pub mod cli;

pub use app_context::{build_engine, load_document, ModerationContext};
