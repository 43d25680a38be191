use anyhow::Result;
use bbox::{prelude::*, XYXY};
use rand::{prelude::*, rngs::StdRng};
use rpn_target::{
    anchor, overlap::OverlapMatrix, sampler::SampledAnchor, AnchorLabel, AnchorLattice,
    ConfigInit, Sampler,
};

fn random_box(rng: &mut StdRng, max: f32) -> XYXY<f32> {
    let x1 = rng.gen_range(0.0..max - 8.0);
    let y1 = rng.gen_range(0.0..max - 8.0);
    let x2 = rng.gen_range(x1 + 4.0..max);
    let y2 = rng.gen_range(y1 + 4.0..max);
    XYXY::from_xyxy([x1, y1, x2, y2])
}

#[test]
fn lattice_covers_every_cell() -> Result<()> {
    for max_size in [64, 200, 600] {
        let config = ConfigInit::new(max_size, ["object"]).build()?;
        let lattice = AnchorLattice::generate(&config);
        let grid_size = lattice.grid_size();
        let num_base = lattice.base_anchors().len();
        assert_eq!(lattice.len(), num_base * grid_size * grid_size);
        assert_eq!(lattice.len(), config.total_anchors());

        let stride = lattice.stride() as f32;
        for row in 0..grid_size {
            for col in 0..grid_size {
                for (base_index, base) in lattice.base_anchors().iter().enumerate() {
                    let anchor = &lattice.anchors()[lattice.index_of(row, col, base_index)];
                    assert_eq!(anchor.x1(), base.x1() + col as f32 * stride);
                    assert_eq!(anchor.y1(), base.y1() + row as f32 * stride);
                    assert_eq!(anchor.wh(), base.wh());
                }
            }
        }
    }
    Ok(())
}

#[test]
fn inside_indices_are_sorted_and_inside() -> Result<()> {
    let config = ConfigInit {
        scales: vec![noisy_float::prelude::r64(1.0), noisy_float::prelude::r64(2.0)],
        ..ConfigInit::new(320, ["object"])
    }
    .build()?;
    let lattice = AnchorLattice::generate(&config);

    for [width, height] in [[320, 320], [320, 200], [100, 240]] {
        let indices = anchor::inside_image_bounds(width, height, lattice.anchors());
        assert!(!indices.is_empty());
        assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(indices
            .iter()
            .all(|&index| lattice.anchors()[index].is_inside(width as f32, height as f32)));

        let num_inside = lattice
            .anchors()
            .iter()
            .filter(|anchor| anchor.is_inside(width as f32, height as f32))
            .count();
        assert_eq!(indices.len(), num_inside);
    }
    Ok(())
}

#[test]
fn iou_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(0);
    for _ in 0..1000 {
        let lhs = random_box(&mut rng, 100.0);
        let rhs = random_box(&mut rng, 100.0);
        assert_eq!(lhs.iou_with(&rhs), rhs.iou_with(&lhs));
        assert_eq!(lhs.iou_with(&lhs), 1.0);
    }
}

#[test]
fn every_box_has_a_foreground_anchor() -> Result<()> {
    let config = ConfigInit {
        rois_per_image: 64,
        ..ConfigInit::new(256, ["object"])
    }
    .build()?;
    let lattice = AnchorLattice::generate(&config);
    let inside = lattice.inside_image_bounds(256, 256);
    let anchors: Vec<_> = inside.iter().map(|&index| lattice.anchors()[index]).collect();

    let mut rng = StdRng::seed_from_u64(1);
    let mut sampler = Sampler::new(&config);

    for _ in 0..50 {
        let num_boxes = rng.gen_range(1..6);
        let boxes: Vec<_> = (0..num_boxes)
            .map(|_| random_box(&mut rng, 256.0))
            .collect();
        let overlaps = OverlapMatrix::compute(&anchors, &boxes);

        // labeling forces a foreground anchor on every box
        let labels = sampler.label(&overlaps);
        for (gt_index, best) in overlaps.gt_argmax().into_iter().enumerate() {
            let (anchor_index, _) = best.expect("every box has a best anchor");
            assert_eq!(
                labels[anchor_index],
                AnchorLabel::Foreground,
                "box {} has no foreground anchor",
                gt_index
            );
        }

        let sampled: Vec<SampledAnchor> = sampler.sample(&overlaps);
        let num_fg = sampled
            .iter()
            .filter(|sample| sample.label == AnchorLabel::Foreground)
            .count();
        assert!(num_fg <= config.num_foreground());
        assert!(sampled.len() <= config.rois_per_image());
        assert!(sampled
            .iter()
            .all(|sample| (sample.label == AnchorLabel::Foreground) == sample.gt_index.is_some()));
    }
    Ok(())
}
