pub mod defaults;
pub mod errors;
pub mod loader;
mod merge;
pub mod model;

pub use defaults::default_snapshot;
pub use errors::PolicyError;
pub use loader::{load_policy, LoadOptions};
pub use model::{PolicySnapshot, PolicySource, PolicyView};

#[cfg(test)]
mod tests;
