//! Site adapters turn a host document into [`ContentEntity`] values.
//!
//! Every site's markup heuristics live behind [`SiteAdapter`]; the registry
//! picks one by host name so nothing downstream needs to know which site is
//! being moderated.
//!
//! [`ContentEntity`]: calmfeed_core_types::ContentEntity

pub mod adapter;
pub mod errors;
pub mod facebook;
pub mod registry;

pub use adapter::SiteAdapter;
pub use errors::AdapterError;
pub use facebook::FacebookAdapter;
pub use registry::SiteAdapterRegistry;
