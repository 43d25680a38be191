//! Anchor, label and regression target generation for region proposal training.
//!
//! The [AnchorLattice] is built once per [Config] and shared by every worker.
//! Each worker owns a [localization::LocalizationProvider] that runs the
//! extract, transform and load stages for one data item at a time.

mod common;

pub mod anchor;
pub mod annotation;
pub mod buffer;
pub mod config;
pub mod decoded;
pub mod etl;
pub mod localization;
pub mod overlap;
pub mod params;
pub mod sampler;
pub mod target;

pub use anchor::AnchorLattice;
pub use config::{Config, ConfigInit};
pub use decoded::{Decoded, GroundTruth};
pub use params::ImageParams;
pub use sampler::{AnchorLabel, Sampler};
pub use target::Target;
