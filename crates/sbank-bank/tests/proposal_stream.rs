use std::f64::consts::{FRAC_PI_2, TAU};

use sbank_bank::{generate, Metric, Region};
use sbank_core::{CoordinateFrame, RngHandle};

#[test]
fn cartesian_samples_stay_in_bounds() {
    let region = Region::new((-1.0, 2.0), (10.0, 10.5), CoordinateFrame::Cartesian).unwrap();
    let mut rng = RngHandle::from_seed(1);
    let stream = generate(&region, CoordinateFrame::Cartesian, Metric::identity(), &mut rng).unwrap();
    for proposal in stream.take(2_000) {
        assert!((-1.0..=2.0).contains(&proposal.x1()));
        assert!((10.0..=10.5).contains(&proposal.x2()));
        assert!(!proposal.is_seed_point());
    }
}

#[test]
fn polar_samples_map_to_the_annulus() {
    let region = Region::new((0.5, 1.0), (0.0, FRAC_PI_2), CoordinateFrame::Polar).unwrap();
    let mut rng = RngHandle::from_seed(2);
    let stream = generate(&region, CoordinateFrame::Polar, Metric::identity(), &mut rng).unwrap();
    assert_eq!(stream.frame(), CoordinateFrame::Polar);
    for proposal in stream.take(2_000) {
        let radius = proposal.x1().hypot(proposal.x2());
        assert!(radius >= 0.5 - 1e-12 && radius <= 1.0 + 1e-12);
        assert!(proposal.x1() >= -1e-12 && proposal.x2() >= -1e-12);
        assert!((proposal.norm() - radius).abs() < 1e-12);
    }
}

#[test]
fn degenerate_axis_yields_constant_coordinate() {
    let region = Region::new((0.3, 0.3), (0.0, 1.0), CoordinateFrame::Cartesian).unwrap();
    let mut rng = RngHandle::from_seed(3);
    let stream = generate(&region, CoordinateFrame::Cartesian, Metric::identity(), &mut rng).unwrap();
    assert!(stream.take(100).all(|p| p.x1() == 0.3));
}

#[test]
fn same_seed_replays_the_stream() {
    let region = Region::unit_square();
    let draw = |seed| {
        let mut rng = RngHandle::from_seed(seed);
        generate(&region, CoordinateFrame::ScaledEuclidean, Metric::scaled_euclidean(), &mut rng)
            .unwrap()
            .take(64)
            .map(|t| t.params())
            .collect::<Vec<_>>()
    };
    assert_eq!(draw(42), draw(42));
    assert_ne!(draw(42), draw(43));
}

#[test]
fn stream_resumes_where_it_stopped() {
    let region = Region::unit_square();
    let mut whole = RngHandle::from_seed(8);
    let expected: Vec<[f64; 2]> = generate(&region, CoordinateFrame::Cartesian, Metric::identity(), &mut whole)
        .unwrap()
        .take(20)
        .map(|t| t.params())
        .collect();

    let mut split = RngHandle::from_seed(8);
    let mut got: Vec<[f64; 2]> = generate(&region, CoordinateFrame::Cartesian, Metric::identity(), &mut split)
        .unwrap()
        .take(7)
        .map(|t| t.params())
        .collect();
    got.extend(
        generate(&region, CoordinateFrame::Cartesian, Metric::identity(), &mut split)
            .unwrap()
            .take(13)
            .map(|t| t.params()),
    );
    assert_eq!(got, expected);
}

#[test]
fn malformed_bounds_are_configuration_errors() {
    let cases = [
        ((1.0, 0.0), (0.0, 1.0), CoordinateFrame::Cartesian, "bounds-inverted"),
        ((0.0, f64::INFINITY), (0.0, 1.0), CoordinateFrame::Cartesian, "bounds-non-finite"),
        ((-0.1, 1.0), (0.0, 1.0), CoordinateFrame::Polar, "polar-bounds"),
        ((0.0, 1.0), (0.0, TAU + 0.1), CoordinateFrame::Polar, "polar-bounds"),
        ((0.0, 1.0), (-0.5, 1.0), CoordinateFrame::Polar, "polar-bounds"),
    ];
    for (x1, x2, frame, code) in cases {
        let err = Region::new(x1, x2, frame).unwrap_err();
        assert!(err.is_config());
        assert_eq!(err.info().code, code, "{x1:?} {x2:?} {frame}");
    }
    assert!(Region::new((-1.0, 1.0), (-1.0, 1.0), CoordinateFrame::Cartesian).is_ok());
    assert!(Region::new((0.0, 1.0), (0.0, TAU), CoordinateFrame::Polar).is_ok());
}

#[test]
fn generate_revalidates_hand_built_regions() {
    let region = Region {
        x1_min: 2.0,
        x1_max: 1.0,
        x2_min: 0.0,
        x2_max: 1.0,
    };
    let mut rng = RngHandle::from_seed(0);
    let err = generate(&region, CoordinateFrame::Cartesian, Metric::identity(), &mut rng).unwrap_err();
    assert_eq!(err.info().code, "bounds-inverted");
}
