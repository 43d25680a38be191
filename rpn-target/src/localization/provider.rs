use super::{LocalizationExtractor, LocalizationLoader, LocalizationTransformer};
use crate::{
    anchor::AnchorLattice,
    buffer::{BufferSpec, OutputBuffers, OutputLayout},
    common::*,
    config::Config,
    decoded::Decoded,
    etl::{Extractor, Loader, Transformer},
    params::ImageParams,
};

/// Runs the extract, transform and load stages for one worker.
#[derive(Debug, Clone)]
pub struct LocalizationProvider {
    extractor: LocalizationExtractor,
    transformer: LocalizationTransformer,
    loader: LocalizationLoader,
}

impl LocalizationProvider {
    pub fn new(config: Arc<Config>, lattice: Arc<AnchorLattice>) -> Self {
        let seed = config.random_seed();
        Self::with_seed(config, lattice, seed)
    }

    pub fn with_seed(config: Arc<Config>, lattice: Arc<AnchorLattice>, seed: u64) -> Self {
        Self {
            extractor: LocalizationExtractor::new(config.clone()),
            loader: LocalizationLoader::new(&config),
            transformer: LocalizationTransformer::with_seed(config, lattice, seed),
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        self.loader.layout()
    }

    pub fn buffer_specs(&self) -> Vec<BufferSpec> {
        self.loader.buffer_specs()
    }

    /// Decode and transform an item without loading it.
    pub fn decode(&mut self, data: &[u8], params: &ImageParams) -> Result<Option<Decoded>> {
        let decoded = match self.extractor.extract(data) {
            Some(decoded) => decoded,
            None => return Ok(None),
        };
        let decoded = self.transformer.transform(params, decoded)?;
        Ok(Some(decoded))
    }

    /// Process an item into the buffers.
    ///
    /// Returns `false` if the item is skipped, in which case the buffers
    /// are left untouched.
    pub fn process(
        &mut self,
        data: &[u8],
        params: &ImageParams,
        buffers: &mut OutputBuffers<'_>,
    ) -> Result<bool> {
        let decoded = match self.decode(data, params)? {
            Some(decoded) => decoded,
            None => return Ok(false),
        };
        self.loader.load(buffers, &decoded)?;
        Ok(true)
    }
}
