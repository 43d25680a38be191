//! The extract, transform and load stages of region proposal targets.

mod extractor;
mod loader;
mod provider;
mod transformer;

pub use extractor::*;
pub use loader::*;
pub use provider::*;
pub use transformer::*;
