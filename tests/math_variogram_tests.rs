#![cfg(feature = "dev")]

use approx::assert_relative_eq;
use geoloess::internals::math::variogram::{Variogram, VariogramKind, VariogramModel};
use geoloess::internals::primitives::errors::GeoLoessError;

#[test]
fn test_zero_lag_is_zero_for_every_kind() {
    for model in [
        VariogramModel::spherical(2.0, 10.0),
        VariogramModel::exponential(2.0, 10.0),
        VariogramModel::gaussian(2.0, 10.0),
        VariogramModel::spherical(2.0, 10.0).with_nugget(0.5),
    ] {
        assert_eq!(model.semivariance(0.0), 0.0);
        assert_eq!(model.semivariance(-1.0), 0.0);
    }
}

#[test]
fn test_spherical_reaches_sill_at_range() {
    let model = VariogramModel::spherical(1.0, 10.0);
    assert_relative_eq!(model.semivariance(10.0), 1.0);
    assert_relative_eq!(model.semivariance(25.0), 1.0);
    // 1.5 * 0.5 - 0.5 * 0.125
    assert_relative_eq!(model.semivariance(5.0), 0.6875, epsilon = 1e-12);
}

#[test]
fn test_practical_range_convention() {
    let exp = VariogramModel::exponential(1.0, 10.0);
    let gau = VariogramModel::gaussian(1.0, 10.0);
    let expected = 1.0 - (-3.0f64).exp();
    assert_relative_eq!(exp.semivariance(10.0), expected, epsilon = 1e-12);
    assert_relative_eq!(gau.semivariance(10.0), expected, epsilon = 1e-12);
}

#[test]
fn test_nugget_jump_near_origin() {
    let model = VariogramModel::exponential(2.0, 10.0).with_nugget(0.5);
    assert_relative_eq!(model.partial_sill(), 1.5);
    assert!(model.semivariance(1e-9) > 0.49);
    assert_eq!(model.nugget(), 0.5);
    assert_eq!(model.range(), 10.0);
    assert_eq!(model.kind(), VariogramKind::Exponential);
}

#[test]
fn test_semivariance_bounded_by_sill() {
    for model in [
        VariogramModel::spherical(3.0, 4.0).with_nugget(1.0),
        VariogramModel::exponential(3.0, 4.0),
        VariogramModel::gaussian(3.0, 4.0).with_nugget(0.1),
    ] {
        let mut prev = 0.0;
        for i in 0..200 {
            let h = i as f64 * 0.1;
            let g = model.semivariance(h);
            assert!(g >= prev - 1e-12, "non-monotone at h={}", h);
            assert!(g <= model.sill() + 1e-12);
            prev = g;
        }
    }
}

#[test]
fn test_default_pairwise_is_euclidean() {
    let model = VariogramModel::spherical(1.0, 1.0);
    assert_relative_eq!(model.pairwise(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
}

#[test]
fn test_validate_parameters() {
    assert!(VariogramModel::spherical(1.0, 1.0).validate().is_ok());

    let invalid = [
        VariogramModel::spherical(0.0, 1.0),
        VariogramModel::spherical(1.0, 0.0),
        VariogramModel::spherical(1.0, f64::INFINITY),
        VariogramModel::spherical(1.0, 1.0).with_nugget(2.0),
        VariogramModel::spherical(1.0, 1.0).with_nugget(-0.1),
    ];
    for model in invalid {
        assert!(matches!(
            model.validate(),
            Err(GeoLoessError::InvalidVariogram(_))
        ));
    }
}

/// A variogram measuring lag along the first axis only.
#[derive(Debug)]
struct AxisVariogram;

impl Variogram<f64> for AxisVariogram {
    fn sill(&self) -> f64 {
        4.0
    }
    fn semivariance(&self, h: f64) -> f64 {
        if h <= 0.0 { 0.0 } else { h.min(4.0) }
    }
    fn pairwise(&self, a: &[f64], b: &[f64]) -> f64 {
        (a[0] - b[0]).abs()
    }
}

#[test]
fn test_custom_variogram_defaults() {
    let v = AxisVariogram;
    assert_eq!(v.nugget(), 0.0);
    assert!(v.range().is_infinite());
    assert!(v.validate().is_ok());
    assert_eq!(v.pairwise(&[1.0, 0.0], &[3.0, 100.0]), 2.0);
}
