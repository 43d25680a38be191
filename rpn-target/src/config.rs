//! Target generation configuration.

use crate::{anchor, common::*};

/// The configuration as written in the configuration file.
///
/// Every field except `max_size` and `labels` has a default value.
/// Call [ConfigInit::build] to obtain a validated [Config].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigInit {
    /// The number of sampled anchors per image.
    #[serde(default = "default_rois_per_image")]
    pub rois_per_image: usize,
    /// The minimum image extent in pixels, copied from the image pipeline.
    #[serde(default)]
    pub min_size: Option<usize>,
    /// The maximum image extent in pixels, copied from the image pipeline.
    pub max_size: usize,
    /// The side length of the reference window.
    #[serde(default = "default_base_size")]
    pub base_size: usize,
    /// The ratio of feature map size to image size.
    #[serde(default = "default_scaling_factor")]
    pub scaling_factor: R64,
    /// Anchor aspect ratios in height over width.
    #[serde(default = "default_ratios")]
    pub ratios: Vec<R64>,
    /// Anchor scales relative to the reference window.
    #[serde(default = "default_scales")]
    pub scales: Vec<R64>,
    /// Anchors below this IoU with every box are background.
    #[serde(default = "default_negative_overlap")]
    pub negative_overlap: R64,
    /// Anchors reaching this IoU with any box are foreground.
    #[serde(default = "default_positive_overlap")]
    pub positive_overlap: R64,
    /// The maximum fraction of foreground anchors among sampled anchors.
    #[serde(default = "default_foreground_fraction")]
    pub foreground_fraction: R64,
    /// The maximum number of ground truth boxes kept per image.
    #[serde(default = "default_max_gt_boxes")]
    pub max_gt_boxes: usize,
    /// The class vocabulary.
    pub labels: Vec<String>,
    /// The seed of the sampling random stream.
    #[serde(default)]
    pub random_seed: u64,
}

impl ConfigInit {
    /// Create a configuration with default values.
    pub fn new(max_size: usize, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            rois_per_image: default_rois_per_image(),
            min_size: None,
            max_size,
            base_size: default_base_size(),
            scaling_factor: default_scaling_factor(),
            ratios: default_ratios(),
            scales: default_scales(),
            negative_overlap: default_negative_overlap(),
            positive_overlap: default_positive_overlap(),
            foreground_fraction: default_foreground_fraction(),
            max_gt_boxes: default_max_gt_boxes(),
            labels: labels.into_iter().map(Into::into).collect(),
            random_seed: 0,
        }
    }

    /// Load the configuration from a JSON5 file.
    pub fn load<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let config = json5::from_str(&text)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
        Ok(config)
    }

    pub fn build(self) -> Result<Config> {
        let Self {
            rois_per_image,
            min_size,
            max_size,
            base_size,
            scaling_factor,
            ratios,
            scales,
            negative_overlap,
            positive_overlap,
            foreground_fraction,
            max_gt_boxes,
            labels,
            random_seed,
        } = self;

        ensure!(rois_per_image > 0, "rois_per_image must be positive");
        ensure!(base_size > 0, "base_size must be positive");
        ensure!(max_size > 0, "max_size must be positive");
        ensure!(max_gt_boxes > 0, "max_gt_boxes must be positive");
        if let Some(min_size) = min_size {
            ensure!(min_size <= max_size, "min_size must not exceed max_size");
        }
        ensure!(
            scaling_factor > 0.0 && scaling_factor <= 1.0,
            "scaling_factor must be in range (0, 1]"
        );
        ensure!(!ratios.is_empty(), "ratios must not be empty");
        ensure!(
            ratios.iter().all(|&ratio| ratio > 0.0),
            "ratios must be positive"
        );
        ensure!(!scales.is_empty(), "scales must not be empty");
        ensure!(
            scales.iter().all(|&scale| scale > 0.0),
            "scales must be positive"
        );
        ensure!(
            (0.0..=1.0).contains(&negative_overlap.raw()),
            "negative_overlap must be in range [0, 1]"
        );
        ensure!(
            (0.0..=1.0).contains(&positive_overlap.raw()),
            "positive_overlap must be in range [0, 1]"
        );
        ensure!(
            negative_overlap <= positive_overlap,
            "negative_overlap must not exceed positive_overlap"
        );
        ensure!(
            (0.0..=1.0).contains(&foreground_fraction.raw()),
            "foreground_fraction must be in range [0, 1]"
        );
        ensure!(!labels.is_empty(), "labels must not be empty");

        let num_labels = labels.len();
        let labels: IndexSet<String> = labels.into_iter().collect();
        ensure!(labels.len() == num_labels, "labels must be unique");

        let ratios: Vec<f64> = ratios.into_iter().map(|ratio| ratio.raw()).collect();
        let scales: Vec<f64> = scales.into_iter().map(|scale| scale.raw()).collect();

        let config = Config {
            rois_per_image,
            min_size,
            max_size,
            base_size,
            scaling_factor: scaling_factor.raw(),
            ratios,
            scales,
            negative_overlap: negative_overlap.raw() as f32,
            positive_overlap: positive_overlap.raw() as f32,
            foreground_fraction: foreground_fraction.raw(),
            max_gt_boxes,
            labels,
            random_seed,
        };

        ensure!(
            config.grid_size() > 0,
            "max_size * scaling_factor must be at least 1, but get {}",
            config.max_size as f64 * config.scaling_factor
        );

        let base_anchors = anchor::base_anchors(config.base_size, &config.ratios, &config.scales);
        if let Some(anchor) = base_anchors.iter().find(|anchor| anchor.is_degenerate()) {
            bail!(
                "the base anchor {:?} has zero width or height, check ratios and scales",
                anchor
            );
        }

        Ok(config)
    }
}

/// The validated, immutable configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    rois_per_image: usize,
    min_size: Option<usize>,
    max_size: usize,
    base_size: usize,
    scaling_factor: f64,
    ratios: Vec<f64>,
    scales: Vec<f64>,
    negative_overlap: f32,
    positive_overlap: f32,
    foreground_fraction: f64,
    max_gt_boxes: usize,
    labels: IndexSet<String>,
    random_seed: u64,
}

impl Config {
    pub fn rois_per_image(&self) -> usize {
        self.rois_per_image
    }

    pub fn min_size(&self) -> Option<usize> {
        self.min_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn base_size(&self) -> usize {
        self.base_size
    }

    pub fn scaling_factor(&self) -> f64 {
        self.scaling_factor
    }

    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    pub fn negative_overlap(&self) -> f32 {
        self.negative_overlap
    }

    pub fn positive_overlap(&self) -> f32 {
        self.positive_overlap
    }

    pub fn foreground_fraction(&self) -> f64 {
        self.foreground_fraction
    }

    pub fn max_gt_boxes(&self) -> usize {
        self.max_gt_boxes
    }

    pub fn labels(&self) -> &IndexSet<String> {
        &self.labels
    }

    pub fn random_seed(&self) -> u64 {
        self.random_seed
    }

    /// Get the class index of a label name.
    pub fn class_index(&self, name: &str) -> Option<usize> {
        self.labels.get_index_of(name)
    }

    /// The number of anchors per grid cell.
    pub fn num_base_anchors(&self) -> usize {
        self.ratios.len() * self.scales.len()
    }

    /// The number of grid cells along each image axis.
    pub fn grid_size(&self) -> usize {
        (self.max_size as f64 * self.scaling_factor).floor() as usize
    }

    /// The distance in pixels between adjacent grid cells.
    pub fn feature_stride(&self) -> f64 {
        1.0 / self.scaling_factor
    }

    pub fn total_anchors(&self) -> usize {
        let grid_size = self.grid_size();
        self.num_base_anchors() * grid_size * grid_size
    }

    /// The maximum number of retained foreground anchors per image.
    pub fn num_foreground(&self) -> usize {
        (self.foreground_fraction * self.rois_per_image as f64).floor() as usize
    }
}

fn default_rois_per_image() -> usize {
    256
}

fn default_base_size() -> usize {
    16
}

fn default_scaling_factor() -> R64 {
    r64(1.0 / 16.0)
}

fn default_ratios() -> Vec<R64> {
    vec![r64(0.5), r64(1.0), r64(2.0)]
}

fn default_scales() -> Vec<R64> {
    vec![r64(8.0), r64(16.0), r64(32.0)]
}

fn default_negative_overlap() -> R64 {
    r64(0.3)
}

fn default_positive_overlap() -> R64 {
    r64(0.7)
}

fn default_foreground_fraction() -> R64 {
    r64(0.5)
}

fn default_max_gt_boxes() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() -> Result<()> {
        let init: ConfigInit = json5::from_str(
            r#"{
                max_size: 1000,
                labels: ["person", "car"],
            }"#,
        )?;
        assert_eq!(init, ConfigInit::new(1000, ["person", "car"]));

        let config = init.build()?;
        assert_eq!(config.rois_per_image(), 256);
        assert_eq!(config.num_base_anchors(), 9);
        assert_eq!(config.grid_size(), 62);
        assert_eq!(config.total_anchors(), 9 * 62 * 62);
        assert_eq!(config.feature_stride(), 16.0);
        assert_eq!(config.num_foreground(), 128);
        assert_eq!(config.class_index("car"), Some(1));
        assert_eq!(config.class_index("dog"), None);
        Ok(())
    }

    #[test]
    fn config_missing_labels() {
        let result: Result<ConfigInit, _> = json5::from_str("{ max_size: 1000 }");
        assert!(result.is_err());
    }

    #[test]
    fn config_reject_invalid_values() {
        let base = ConfigInit::new(1000, ["person"]);

        let init = ConfigInit {
            negative_overlap: r64(0.8),
            ..base.clone()
        };
        assert!(init.build().is_err());

        let init = ConfigInit {
            positive_overlap: r64(1.5),
            ..base.clone()
        };
        assert!(init.build().is_err());

        let init = ConfigInit {
            foreground_fraction: r64(-0.1),
            ..base.clone()
        };
        assert!(init.build().is_err());

        let init = ConfigInit {
            rois_per_image: 0,
            ..base.clone()
        };
        assert!(init.build().is_err());

        let init = ConfigInit {
            labels: vec![],
            ..base.clone()
        };
        assert!(init.build().is_err());

        let init = ConfigInit {
            labels: vec!["person".into(), "person".into()],
            ..base.clone()
        };
        assert!(init.build().is_err());

        let init = ConfigInit {
            ratios: vec![],
            ..base.clone()
        };
        assert!(init.build().is_err());

        let init = ConfigInit {
            max_size: 8,
            ..base.clone()
        };
        assert!(init.build().is_err());

        let init = ConfigInit {
            base_size: 1,
            ratios: vec![r64(0.01)],
            ..base
        };
        assert!(init.build().is_err());
    }
}
