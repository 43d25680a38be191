//! Box annotation parsing.

use crate::common::*;

/// A parsed annotation document.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub image_size: Size<usize>,
    pub depth: usize,
    pub objects: Vec<AnnotatedObject>,
}

/// An annotated object with its class name.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedObject {
    pub name: String,
    pub rect: XYXY<f32>,
    pub difficult: bool,
    pub truncated: bool,
}

/// Turns raw annotation bytes into an [Annotation].
pub trait AnnotationParser
where
    Self: Debug + Send + Sync,
{
    fn parse(&self, data: &[u8]) -> Result<Annotation>;
}

/// Parser of VOC style JSON annotations.
///
/// ```json
/// {
///     "size": { "width": 500, "height": 375, "depth": 3 },
///     "object": [
///         {
///             "name": "dog",
///             "bndbox": { "xmin": 48, "ymin": 240, "xmax": 195, "ymax": 371 },
///             "difficult": false,
///             "truncated": true
///         }
///     ]
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonAnnotationParser;

impl JsonAnnotationParser {
    pub fn new() -> Self {
        Self
    }
}

impl AnnotationParser for JsonAnnotationParser {
    fn parse(&self, data: &[u8]) -> Result<Annotation> {
        let raw: json::Annotation = serde_json::from_slice(data)?;
        let json::Annotation {
            size: json::Size {
                width,
                height,
                depth,
            },
            objects,
        } = raw;

        let objects: Vec<_> = objects
            .into_iter()
            .enumerate()
            .map(|(index, object)| -> Result<_> {
                let json::Object {
                    name,
                    bndbox:
                        json::BndBox {
                            xmin,
                            ymin,
                            xmax,
                            ymax,
                        },
                    difficult,
                    truncated,
                } = object;

                let rect = XYXY::try_from_xyxy([xmin, ymin, xmax, ymax])
                    .with_context(|| format!("object {} ('{}') has an invalid box", index, name))?;

                Ok(AnnotatedObject {
                    name,
                    rect,
                    difficult,
                    truncated,
                })
            })
            .collect::<Result<_>>()?;

        Ok(Annotation {
            image_size: Size::from_wh([width, height]),
            depth,
            objects,
        })
    }
}

mod json {
    use super::*;

    #[derive(Debug, Clone, Deserialize)]
    pub struct Annotation {
        pub size: Size,
        #[serde(default, rename = "object")]
        pub objects: Vec<Object>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Size {
        pub width: usize,
        pub height: usize,
        #[serde(default = "default_depth")]
        pub depth: usize,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Object {
        pub name: String,
        pub bndbox: BndBox,
        #[serde(default)]
        pub difficult: bool,
        #[serde(default)]
        pub truncated: bool,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct BndBox {
        pub xmin: f32,
        pub ymin: f32,
        pub xmax: f32,
        pub ymax: f32,
    }

    fn default_depth() -> usize {
        3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_json_annotation() -> Result<()> {
        let data = br#"{
            "size": { "width": 500, "height": 375 },
            "object": [
                {
                    "name": "dog",
                    "bndbox": { "xmin": 48, "ymin": 240, "xmax": 195, "ymax": 371 },
                    "truncated": true
                },
                {
                    "name": "person",
                    "bndbox": { "xmin": 8, "ymin": 12, "xmax": 352, "ymax": 498.5 },
                    "difficult": true
                }
            ]
        }"#;
        let annotation = JsonAnnotationParser::new().parse(data)?;
        assert_eq!(annotation.image_size, Size::from_wh([500, 375]));
        assert_eq!(annotation.depth, 3);
        assert_eq!(annotation.objects.len(), 2);

        let dog = &annotation.objects[0];
        assert_eq!(dog.name, "dog");
        assert_eq!(dog.rect.xyxy(), [48.0, 240.0, 195.0, 371.0]);
        assert!(dog.truncated && !dog.difficult);

        let person = &annotation.objects[1];
        assert_eq!(person.rect.y2(), 498.5);
        assert!(person.difficult);
        Ok(())
    }

    #[test]
    fn parse_json_without_objects() -> Result<()> {
        let annotation = JsonAnnotationParser::new()
            .parse(br#"{ "size": { "width": 32, "height": 32, "depth": 1 } }"#)?;
        assert!(annotation.objects.is_empty());
        assert_eq!(annotation.depth, 1);
        Ok(())
    }

    #[test]
    fn parse_json_failures() {
        let parser = JsonAnnotationParser::new();
        assert!(parser.parse(b"not json").is_err());
        assert!(parser.parse(br#"{ "object": [] }"#).is_err());
        assert!(parser
            .parse(
                br#"{
                    "size": { "width": 32, "height": 32 },
                    "object": [
                        { "name": "dog", "bndbox": { "xmin": 20, "ymin": 0, "xmax": 10, "ymax": 5 } }
                    ]
                }"#
            )
            .is_err());
    }
}
