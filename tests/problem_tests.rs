#![cfg(feature = "dev")]

use geoloess::internals::primitives::errors::GeoLoessError;
use geoloess::internals::problem::data::GeoData;
use geoloess::internals::problem::domain::{CartesianGrid, Domain, PointSet};
use geoloess::internals::problem::problem::EstimationProblem;

// ============================================================================
// Observation Data
// ============================================================================

#[test]
fn test_geodata_rejects_ragged_coordinates() {
    let err = GeoData::new(vec![0.0, 1.0, 2.0], 2).unwrap_err();
    assert_eq!(
        err,
        GeoLoessError::MismatchedInputs {
            coords_len: 3,
            dimensions: 2
        }
    );

    assert!(matches!(
        GeoData::new(vec![0.0, f64::NAN], 1),
        Err(GeoLoessError::InvalidNumericValue(_))
    ));
}

#[test]
fn test_geodata_rejects_wrong_value_count() {
    let err = GeoData::new(vec![0.0, 1.0], 1)
        .unwrap()
        .with_values("z", vec![1.0])
        .unwrap_err();
    assert_eq!(err.variable(), Some("z"));
    assert!(matches!(err, GeoLoessError::MismatchedValues { expected: 2, got: 1, .. }));
}

#[test]
fn test_valid_observations_skip_missing() {
    let data = GeoData::new(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0], 2)
        .unwrap()
        .with_variable("z", vec![Some(1.0), None, Some(3.0)])
        .unwrap();

    let obs = data.valid_observations("z").unwrap();
    assert_eq!(obs.len(), 2);
    assert_eq!(obs.values, vec![1.0, 3.0]);
    assert_eq!(obs.source_indices, vec![0, 2]);
    assert_eq!(obs.point(1), &[0.0, 1.0]);
}

#[test]
fn test_valid_observations_errors() {
    let data = GeoData::new(vec![0.0, 1.0], 1)
        .unwrap()
        .with_variable("empty", vec![None, None])
        .unwrap()
        .with_variable("bad", vec![Some(f64::INFINITY), None])
        .unwrap();

    assert_eq!(
        data.valid_observations("empty").unwrap_err(),
        GeoLoessError::NoValidObservations {
            variable: "empty".to_string()
        }
    );
    let err = data.valid_observations("bad").unwrap_err();
    assert_eq!(err.variable(), Some("bad"));
    assert!(matches!(err.cause(), GeoLoessError::InvalidNumericValue(_)));
    assert_eq!(
        data.valid_observations("missing").unwrap_err(),
        GeoLoessError::UnknownVariable("missing".to_string())
    );
}

#[test]
fn test_with_variable_replaces_existing_column() {
    let data = GeoData::new(vec![0.0, 1.0], 1)
        .unwrap()
        .with_values("z", vec![1.0, 2.0])
        .unwrap()
        .with_values("z", vec![5.0, 6.0])
        .unwrap();

    assert_eq!(data.variable_names().count(), 1);
    assert_eq!(data.values("z").unwrap(), &[Some(5.0), Some(6.0)]);
}

// ============================================================================
// Domains
// ============================================================================

#[test]
fn test_point_set_coordinates() {
    let domain = PointSet::new(vec![0.0, 1.0, 2.0, 3.0], 2).unwrap();
    assert_eq!(domain.len(), 2);
    assert_eq!(domain.dimensions(), 2);

    let mut out = [0.0; 2];
    domain.coordinates_at(1, &mut out);
    assert_eq!(out, [2.0, 3.0]);
}

#[test]
fn test_grid_enumerates_first_axis_fastest() {
    let grid = CartesianGrid::new(vec![3, 2], vec![10.0, 0.0], vec![0.5, 2.0]).unwrap();
    assert_eq!(grid.len(), 6);

    let mut out = [0.0; 2];
    let mut all = Vec::new();
    for i in 0..grid.len() {
        grid.coordinates_at(i, &mut out);
        all.push(out);
    }
    assert_eq!(
        all,
        vec![
            [10.0, 0.0],
            [10.5, 0.0],
            [11.0, 0.0],
            [10.0, 2.0],
            [10.5, 2.0],
            [11.0, 2.0],
        ]
    );
}

#[test]
fn test_grid_validation() {
    assert!(matches!(
        CartesianGrid::new(vec![2, 2], vec![0.0], vec![1.0, 1.0]),
        Err(GeoLoessError::DimensionMismatch { .. })
    ));
    assert!(matches!(
        CartesianGrid::new(vec![2], vec![0.0], vec![0.0]),
        Err(GeoLoessError::InvalidNumericValue(_))
    ));
    assert!(matches!(
        CartesianGrid::new(vec![2], vec![f64::NAN], vec![1.0]),
        Err(GeoLoessError::InvalidNumericValue(_))
    ));
}

#[test]
fn test_grid_node_count_overflow_rejected() {
    let shape = vec![usize::MAX / 2, 3];
    assert_eq!(
        CartesianGrid::new(shape.clone(), vec![0.0_f64, 0.0], vec![1.0, 1.0]),
        Err(GeoLoessError::GridTooLarge { shape })
    );

    let grid = CartesianGrid::new(vec![usize::MAX, 1], vec![0.0_f64, 0.0], vec![1.0, 1.0]).unwrap();
    assert_eq!(grid.len(), usize::MAX);
}

// ============================================================================
// Problem
// ============================================================================

fn two_variable_data() -> GeoData<f64> {
    GeoData::new(vec![0.0, 1.0, 2.0], 1)
        .unwrap()
        .with_values("a", vec![1.0, 2.0, 3.0])
        .unwrap()
        .with_values("b", vec![3.0, 2.0, 1.0])
        .unwrap()
}

#[test]
fn test_problem_defaults_to_all_variables() {
    let domain = PointSet::new(vec![0.5], 1).unwrap();
    let problem = EstimationProblem::new(two_variable_data(), domain).unwrap();
    assert_eq!(problem.variables(), &["a".to_string(), "b".to_string()]);
}

#[test]
fn test_problem_selected_variables_deduplicated() {
    let domain = PointSet::new(vec![0.5], 1).unwrap();
    let problem =
        EstimationProblem::with_variables(two_variable_data(), domain, ["b", "a", "b"]).unwrap();
    assert_eq!(problem.variables(), &["b".to_string(), "a".to_string()]);
}

#[test]
fn test_problem_errors() {
    let err = EstimationProblem::with_variables(
        two_variable_data(),
        PointSet::new(vec![0.5], 1).unwrap(),
        ["c"],
    )
    .unwrap_err();
    assert_eq!(err, GeoLoessError::UnknownVariable("c".to_string()));

    let err =
        EstimationProblem::new(two_variable_data(), PointSet::new(vec![0.5, 0.5], 2).unwrap())
            .unwrap_err();
    assert_eq!(err, GeoLoessError::DimensionMismatch { data: 1, domain: 2 });

    let empty = CartesianGrid::new(vec![0], vec![0.0], vec![1.0]).unwrap();
    let err = EstimationProblem::new(two_variable_data(), empty).unwrap_err();
    assert_eq!(err, GeoLoessError::EmptyDomain);
}
