//! Document port for calmfeed.
//!
//! The moderation loop never touches a concrete DOM. It reads and mutates the
//! host page through [`Document`], and learns where it is through
//! [`HostContext`]. [`MemoryDocument`] is the in-process implementation used by
//! the CLI and by tests.

pub mod document;
pub mod errors;
pub mod memory;
mod style;

pub use document::{parse_selector, Document, HostContext, StaticHost};
pub use errors::DomError;
pub use memory::MemoryDocument;
pub use scraper::Selector;
