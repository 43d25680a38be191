//! The extract, transform and load stage traits.

use crate::common::*;

/// Decodes raw item bytes.
pub trait Extractor {
    type Item;

    /// Returns `None` if the item should be skipped.
    fn extract(&self, data: &[u8]) -> Option<Self::Item>;
}

/// Applies per-item processing to a decoded item.
///
/// Implementations may keep mutable state, such as a random stream,
/// so an instance must not be shared between workers.
pub trait Transformer {
    type Item;
    type Params;

    fn transform(&mut self, params: &Self::Params, item: Self::Item) -> Result<Self::Item>;
}

/// Copies a processed item into caller owned buffers.
pub trait Loader {
    type Item;
    type Buffers<'a>;

    fn load(&self, buffers: &mut Self::Buffers<'_>, item: &Self::Item) -> Result<()>;
}
