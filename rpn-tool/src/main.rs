use anyhow::{format_err, Context, Result};
use bbox::{prelude::*, Size};
use clap::Parser;
use prettytable::{cell, row, Table};
use rpn_target::{
    annotation::{AnnotationParser, JsonAnnotationParser},
    localization::{LocalizationLoader, LocalizationProvider},
    AnchorLabel, AnchorLattice, ConfigInit, ImageParams,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

#[derive(Debug, Clone, Parser)]
/// Inspect anchor lattices and training targets.
enum Opts {
    Info {
        /// configuration file
        config_file: PathBuf,
    },
    Targets {
        /// configuration file
        config_file: PathBuf,
        /// JSON annotation file
        annotation_file: PathBuf,
        /// image resize factor
        #[clap(long, default_value = "1.0")]
        scale: f32,
        /// mirror the image horizontally
        #[clap(long)]
        flip: bool,
        /// output image width, defaults to the scaled image width
        #[clap(long)]
        width: Option<usize>,
        /// output image height, defaults to the scaled image height
        #[clap(long)]
        height: Option<usize>,
        /// sampling seed, defaults to the configured seed
        #[clap(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    match Opts::parse() {
        Opts::Info { config_file } => {
            info(config_file)?;
        }
        Opts::Targets {
            config_file,
            annotation_file,
            scale,
            flip,
            width,
            height,
            seed,
        } => {
            targets(
                config_file,
                annotation_file,
                scale,
                flip,
                [width, height],
                seed,
            )?;
        }
    }

    Ok(())
}

fn info(config_file: impl AsRef<Path>) -> Result<()> {
    let config = ConfigInit::load(config_file)?.build()?;
    let lattice = AnchorLattice::generate(&config);

    // print base anchors
    {
        let mut table = Table::new();
        table.add_row(row!["index", "ratio", "scale", "x1", "y1", "x2", "y2", "w", "h"]);

        let ratio_scales = config
            .ratios()
            .iter()
            .flat_map(|&ratio| config.scales().iter().map(move |&scale| (ratio, scale)));

        lattice
            .base_anchors()
            .iter()
            .zip(ratio_scales)
            .enumerate()
            .for_each(|(index, (anchor, (ratio, scale)))| {
                let [x1, y1, x2, y2] = anchor.xyxy();
                let [w, h] = anchor.wh();
                table.add_row(row![index, ratio, scale, x1, y1, x2, y2, w, h]);
            });

        table.printstd();
    }

    // print summary
    {
        let mut table = Table::new();
        table.add_row(row!["labels", format!("{:?}", config.labels())]);
        table.add_row(row!["max size", config.max_size()]);
        table.add_row(row!["grid size", lattice.grid_size()]);
        table.add_row(row!["feature stride", lattice.stride()]);
        table.add_row(row!["total anchors", lattice.len()]);
        table.add_row(row!["rois per image", config.rois_per_image()]);
        table.add_row(row!["max foreground", config.num_foreground()]);
        table.add_row(row!["max gt boxes", config.max_gt_boxes()]);

        for spec in LocalizationLoader::new(&config).buffer_specs() {
            table.add_row(row![
                format!("buffer '{}'", spec.name),
                format!("{:?} x {}", spec.kind, spec.len)
            ]);
        }

        table.printstd();
    }

    Ok(())
}

fn targets(
    config_file: impl AsRef<Path>,
    annotation_file: impl AsRef<Path>,
    scale: f32,
    flip: bool,
    [width, height]: [Option<usize>; 2],
    seed: Option<u64>,
) -> Result<()> {
    let config = Arc::new(ConfigInit::load(config_file)?.build()?);
    let lattice = Arc::new(AnchorLattice::generate(&config));

    let annotation_file = annotation_file.as_ref();
    let data = std::fs::read(annotation_file)
        .with_context(|| format!("failed to read '{}'", annotation_file.display()))?;

    let image_size = JsonAnnotationParser::new().parse(&data)?.image_size;
    let output_size = Size::from_wh([
        width.unwrap_or_else(|| (image_size.w() as f32 * scale).round() as usize),
        height.unwrap_or_else(|| (image_size.h() as f32 * scale).round() as usize),
    ]);
    let params = ImageParams {
        flip,
        ..ImageParams::new(scale, output_size)
    };

    let seed = seed.unwrap_or_else(|| config.random_seed());
    let mut provider = LocalizationProvider::with_seed(config.clone(), lattice.clone(), seed);
    let decoded = provider
        .decode(&data, &params)?
        .ok_or_else(|| format_err!("the annotation is skipped"))?;

    // print ground truth boxes
    {
        let mut table = Table::new();
        table.add_row(row!["index", "class", "difficult", "x1", "y1", "x2", "y2"]);

        decoded.gt_boxes.iter().enumerate().for_each(|(index, gt)| {
            let [x1, y1, x2, y2] = gt.rect.xyxy();
            let class = &config.labels()[gt.class];
            table.add_row(row![index, class, gt.difficult, x1, y1, x2, y2]);
        });

        table.printstd();
    }

    // print sampled anchors
    {
        let mut table = Table::new();
        table.add_row(row!["anchor", "label", "box", "dx", "dy", "dw", "dh"]);

        decoded.anchor_index.iter().for_each(|&index| {
            let label = decoded.labels[index];
            let [x1, y1, x2, y2] = lattice.anchors()[index].xyxy();
            let rect = format!("[{}, {}, {}, {}]", x1, y1, x2, y2);

            if label == AnchorLabel::Foreground {
                let [dx, dy, dw, dh] = decoded.bbox_targets[index].to_array();
                table.add_row(row![
                    index,
                    format!("{:?}", label),
                    rect,
                    format!("{:.4}", dx),
                    format!("{:.4}", dy),
                    format!("{:.4}", dw),
                    format!("{:.4}", dh)
                ]);
            } else {
                table.add_row(row![index, format!("{:?}", label), rect, "", "", "", ""]);
            }
        });

        table.printstd();
    }

    println!(
        "{} foreground and {} background anchors sampled, {} inside the {}x{} image",
        decoded.num_foreground(),
        decoded.num_background(),
        lattice
            .inside_image_bounds(output_size.w(), output_size.h())
            .len(),
        output_size.w(),
        output_size.h()
    );

    Ok(())
}
