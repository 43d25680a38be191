use crate::{
    annotation::{AnnotationParser, JsonAnnotationParser},
    common::*,
    config::Config,
    decoded::{Decoded, GroundTruth},
    etl::Extractor,
};

/// Decodes annotation bytes into a [Decoded] item.
///
/// Box parsing is delegated to the annotation parser. Class names are
/// mapped to indices in the label vocabulary.
#[derive(Debug, Clone)]
pub struct LocalizationExtractor<P = JsonAnnotationParser>
where
    P: AnnotationParser,
{
    config: Arc<Config>,
    parser: P,
}

impl LocalizationExtractor<JsonAnnotationParser> {
    pub fn new(config: Arc<Config>) -> Self {
        Self::with_parser(config, JsonAnnotationParser::new())
    }
}

impl<P> LocalizationExtractor<P>
where
    P: AnnotationParser,
{
    pub fn with_parser(config: Arc<Config>, parser: P) -> Self {
        Self { config, parser }
    }

    /// Extract the item, reporting why it fails.
    pub fn try_extract(&self, data: &[u8]) -> Result<Decoded> {
        let annotation = self.parser.parse(data)?;

        let boxes: Vec<GroundTruth> = annotation
            .objects
            .into_iter()
            .map(|object| -> Result<_> {
                let class = self.config.class_index(&object.name).ok_or_else(|| {
                    format_err!("the label '{}' is not in the vocabulary", object.name)
                })?;

                Ok(Label {
                    rect: object.rect,
                    class,
                    difficult: object.difficult,
                    truncated: object.truncated,
                })
            })
            .collect::<Result<_>>()?;

        Ok(Decoded::new(annotation.image_size, annotation.depth, boxes))
    }
}

impl<P> Extractor for LocalizationExtractor<P>
where
    P: AnnotationParser,
{
    type Item = Decoded;

    fn extract(&self, data: &[u8]) -> Option<Decoded> {
        match self.try_extract(data) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!("skip item with bad annotation: {:#}", err);
                None
            }
        }
    }
}
