use approx::assert_relative_eq;
use geoloess::prelude::*;

fn line_data() -> GeoData<f64> {
    GeoData::new(vec![0.0, 1.0, 2.0], 1)
        .unwrap()
        .with_values("z", vec![0.0, 1.0, 2.0])
        .unwrap()
}

// ============================================================================
// End-to-End Estimation
// ============================================================================

#[test]
fn test_line_reproduced_between_observations() {
    let problem =
        EstimationProblem::new(line_data(), PointSet::new(vec![0.5, 1.5], 1).unwrap()).unwrap();

    let result = GeoLoess::new()
        .neighbors(3)
        .variogram(VariogramModel::spherical(1.0, 10.0))
        .build()
        .unwrap()
        .estimate(&problem)
        .unwrap();

    let z = result.get("z").unwrap();
    assert_relative_eq!(z.mean[0], 0.5, epsilon = 1e-10);
    assert_relative_eq!(z.mean[1], 1.5, epsilon = 1e-10);
    assert!(z.uncertainty.iter().all(|&u| u.is_finite() && u >= 0.0));
    assert_relative_eq!(z.uncertainty[0], z.uncertainty[1], epsilon = 1e-12);
}

#[test]
fn test_2d_plane_on_grid() {
    // z = 1 + 2x - y on a scattered 5 x 5 lattice
    let mut coords = Vec::new();
    let mut values = Vec::new();
    for i in 0..5 {
        for j in 0..5 {
            let x = i as f64 + 0.1 * (j % 2) as f64;
            let y = j as f64 + 0.1 * (i % 3) as f64;
            coords.extend([x, y]);
            values.push(1.0 + 2.0 * x - y);
        }
    }
    let data = GeoData::new(coords, 2).unwrap().with_values("z", values).unwrap();
    let grid = CartesianGrid::new(vec![4, 4], vec![0.5, 0.5], vec![1.0, 1.0]).unwrap();
    let problem = EstimationProblem::new(data, grid).unwrap();

    let result = GeoLoess::new()
        .neighbors(8)
        .variogram(VariogramModel::gaussian(1.0, 6.0).with_nugget(0.1))
        .build()
        .unwrap()
        .estimate(&problem)
        .unwrap();

    let z = result.get("z").unwrap();
    assert_eq!(z.len(), 16);
    let mut q = [0.0; 2];
    for (loc, &m) in z.mean.iter().enumerate() {
        problem.domain().coordinates_at(loc, &mut q);
        assert_relative_eq!(m, 1.0 + 2.0 * q[0] - q[1], epsilon = 1e-9);
    }
}

#[test]
fn test_missing_values_are_ignored_per_variable() {
    let data = GeoData::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], 1)
        .unwrap()
        .with_variable("a", vec![Some(0.0), None, Some(4.0), None, Some(8.0)])
        .unwrap()
        .with_values("b", vec![5.0, 5.0, 5.0, 5.0, 5.0])
        .unwrap();
    let reduced = GeoData::new(vec![0.0, 2.0, 4.0], 1)
        .unwrap()
        .with_values("a", vec![0.0, 4.0, 8.0])
        .unwrap();
    let domain = PointSet::new(vec![0.7, 3.3], 1).unwrap();

    let model = GeoLoess::new()
        .variogram(VariogramModel::exponential(2.0, 3.0))
        .build()
        .unwrap();

    let full = model
        .estimate(&EstimationProblem::new(data, domain.clone()).unwrap())
        .unwrap();
    let expected = model
        .estimate(&EstimationProblem::new(reduced, domain).unwrap())
        .unwrap();

    assert_eq!(full.len(), 2);
    let a = full.get("a").unwrap();
    let e = expected.get("a").unwrap();
    for i in 0..2 {
        assert_relative_eq!(a.mean[i], e.mean[i], epsilon = 1e-12);
        assert_relative_eq!(a.uncertainty[i], e.uncertainty[i], epsilon = 1e-12);
    }
    assert!(full.get("b").unwrap().mean.iter().all(|&m| (m - 5.0_f64).abs() < 1e-10));
}

#[test]
fn test_selected_variables_only() {
    let data = line_data().with_values("t", vec![3.0, 3.0, 3.0]).unwrap();
    let domain = PointSet::new(vec![1.0], 1).unwrap();
    let problem = EstimationProblem::with_variables(data, domain, ["t"]).unwrap();

    let result = GeoLoess::new().build().unwrap().estimate(&problem).unwrap();
    assert_eq!(result.variables().collect::<Vec<_>>(), vec!["t"]);
}

#[test]
fn test_variable_override() {
    let data = line_data().with_values("t", vec![1.0, 1.0, 4.0]).unwrap();
    let domain = PointSet::new(vec![0.1], 1).unwrap();
    let problem = EstimationProblem::new(data, domain).unwrap();

    let model = GeoLoess::new()
        .neighbors(3)
        .variable(
            "t",
            VariableParams::new(VariogramModel::spherical(1.0, 5.0)).with_neighbors(2),
        )
        .build()
        .unwrap();
    let result = model.estimate(&problem).unwrap();

    // Two nearest neighbors of 0.1 are both 1.0
    assert_relative_eq!(result.get("t").unwrap().mean[0], 1.0, epsilon = 1e-12);
    assert_relative_eq!(result.get("z").unwrap().mean[0], 0.1, epsilon = 1e-10);
}

#[test]
fn test_custom_metric_matches_builtin() {
    let data = GeoData::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], 1)
        .unwrap()
        .with_values("z", vec![1.0, 0.0, 2.0, 1.0, 3.0])
        .unwrap();
    let domain = PointSet::new(vec![0.4, 1.5, 2.2, 3.9], 1).unwrap();
    let problem = EstimationProblem::new(data, domain).unwrap();

    let builtin = GeoLoess::new()
        .neighbors(3)
        .variogram(VariogramModel::spherical(1.0, 4.0))
        .metric(Manhattan)
        .build()
        .unwrap()
        .estimate(&problem)
        .unwrap();
    let custom = GeoLoess::new()
        .neighbors(3)
        .variogram(VariogramModel::spherical(1.0, 4.0))
        .metric(Metric::custom("abs", |a: &[f64], b: &[f64]| (a[0] - b[0]).abs()))
        .build()
        .unwrap()
        .estimate(&problem)
        .unwrap();

    let (b, c) = (builtin.get("z").unwrap(), custom.get("z").unwrap());
    for i in 0..4 {
        assert_relative_eq!(b.mean[i], c.mean[i], epsilon = 1e-12);
    }
}

#[test]
fn test_display_summary() {
    let problem =
        EstimationProblem::new(line_data(), PointSet::new(vec![0.5, 1.5], 1).unwrap()).unwrap();
    let result = GeoLoess::new()
        .variogram(VariogramModel::spherical(1.0, 10.0))
        .build()
        .unwrap()
        .estimate(&problem)
        .unwrap();

    let text = result.to_string();
    assert!(text.contains("Summary:"));
    assert!(text.contains("Locations: 2"));
    assert!(text.contains("Variable 'z':"));
    assert!(!text.contains("Failed"));
}

// ============================================================================
// Configuration Errors
// ============================================================================

#[test]
fn test_zero_neighbors_rejected_at_build() {
    let err = GeoLoess::<f64>::new().neighbors(0).build().unwrap_err();
    assert_eq!(err, GeoLoessError::InvalidNeighbors(0));
}

#[test]
fn test_duplicate_parameters_rejected() {
    let err = GeoLoess::<f64>::new()
        .neighbors(3)
        .neighbors(4)
        .build()
        .unwrap_err();
    assert_eq!(err, GeoLoessError::DuplicateParameter("neighbors"));

    let err = GeoLoess::<f64>::new()
        .variable("z", VariableParams::default())
        .variable("z", VariableParams::default())
        .build()
        .unwrap_err();
    assert_eq!(err, GeoLoessError::DuplicateParameter("variable"));
}

#[test]
fn test_invalid_variogram_rejected_at_build() {
    let err = GeoLoess::new()
        .variogram(VariogramModel::spherical(-1.0, 1.0))
        .build()
        .unwrap_err();
    assert!(matches!(err, GeoLoessError::InvalidVariogram(_)));
}

#[test]
fn test_invalid_override_variogram_names_variable() {
    let err = GeoLoess::<f64>::new()
        .variable("t", VariableParams::new(VariogramModel::spherical(1.0, -2.0)))
        .build()
        .unwrap_err();
    assert_eq!(err.variable(), Some("t"));
    assert_eq!(err.stage(), Some(Stage::Validation));
    assert_eq!(
        err.cause(),
        &GeoLoessError::InvalidVariogram("range must be positive".to_string())
    );
}

#[test]
fn test_too_many_neighbors() {
    let problem =
        EstimationProblem::new(line_data(), PointSet::new(vec![0.5], 1).unwrap()).unwrap();
    let err = GeoLoess::new()
        .neighbors(5)
        .build()
        .unwrap()
        .estimate(&problem)
        .unwrap_err();

    assert_eq!(
        err,
        GeoLoessError::InvalidNeighborCount {
            variable: "z".to_string(),
            k: 5,
            available: 3
        }
    );
    assert_eq!(err.stage(), Some(Stage::Validation));
}

#[test]
fn test_variable_without_observations() {
    let data = line_data().with_variable("q", vec![None, None, None]).unwrap();
    let problem = EstimationProblem::new(data, PointSet::new(vec![0.5], 1).unwrap()).unwrap();

    let err = GeoLoess::new().build().unwrap().estimate(&problem).unwrap_err();
    assert_eq!(
        err,
        GeoLoessError::NoValidObservations {
            variable: "q".to_string()
        }
    );
}

#[test]
fn test_metric_weights_checked_against_dimensions() {
    let data = GeoData::new(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0], 2)
        .unwrap()
        .with_values("z", vec![1.0, 2.0, 3.0])
        .unwrap();
    let problem = EstimationProblem::new(data, PointSet::new(vec![0.5, 0.5], 2).unwrap()).unwrap();

    let err = GeoLoess::new()
        .metric(Weighted(vec![1.0]))
        .build()
        .unwrap()
        .estimate(&problem)
        .unwrap_err();
    assert_eq!(err.variable(), Some("z"));
    assert_eq!(err.stage(), Some(Stage::Validation));
    assert!(matches!(err.cause(), GeoLoessError::InvalidMetric(_)));
    assert!(err.is_configuration());
}

#[test]
fn test_metric_override_error_names_variable() {
    let data = GeoData::new(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0], 2)
        .unwrap()
        .with_values("a", vec![1.0, 2.0, 3.0])
        .unwrap()
        .with_values("b", vec![1.0, 2.0, 3.0])
        .unwrap();
    let problem = EstimationProblem::new(data, PointSet::new(vec![0.5, 0.5], 2).unwrap()).unwrap();

    let err = GeoLoess::new()
        .variable(
            "b",
            VariableParams::new(VariogramModel::spherical(1.0, 5.0)).with_metric(Weighted(vec![1.0])),
        )
        .build()
        .unwrap()
        .estimate(&problem)
        .unwrap_err();
    assert_eq!(err.variable(), Some("b"));
    assert_eq!(err.stage(), Some(Stage::Validation));
    assert!(err.to_string().starts_with("[validation] variable 'b': Invalid distance metric"));
}

#[test]
fn test_non_finite_value_names_variable() {
    let data = line_data()
        .with_variable("q", vec![Some(1.0), Some(f64::NAN), None])
        .unwrap();
    let problem = EstimationProblem::new(data, PointSet::new(vec![0.5], 1).unwrap()).unwrap();

    let err = GeoLoess::new().build().unwrap().estimate(&problem).unwrap_err();
    assert_eq!(err.variable(), Some("q"));
    assert_eq!(err.stage(), Some(Stage::Validation));
    assert_eq!(
        err.cause(),
        &GeoLoessError::InvalidNumericValue("non-finite value at point 1".to_string())
    );
}

// ============================================================================
// Numerical Failures
// ============================================================================

/// Collinear neighbors near (2.5, 0), a full-rank neighborhood near (0, 0.9).
fn partly_singular_problem() -> EstimationProblem<f64, PointSet<f64>> {
    let coords = vec![0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 0.0, 1.0];
    let values = coords
        .chunks_exact(2)
        .map(|p| 1.0 + 2.0 * p[0] + 3.0 * p[1])
        .collect();
    let data = GeoData::new(coords, 2).unwrap().with_values("z", values).unwrap();
    let domain = PointSet::new(vec![0.0, 0.9, 2.5, 0.0], 2).unwrap();
    EstimationProblem::new(data, domain).unwrap()
}

#[test]
fn test_singular_system_aborts_by_default() {
    let err = GeoLoess::new()
        .neighbors(3)
        .variogram(VariogramModel::spherical(1.0, 10.0))
        .build()
        .unwrap()
        .estimate(&partly_singular_problem())
        .unwrap_err();

    assert_eq!(
        err,
        GeoLoessError::SingularSystem {
            variable: "z".to_string(),
            location: 1
        }
    );
    assert_eq!(err.stage(), Some(Stage::Solve));
    assert!(!err.is_configuration());
}

#[test]
fn test_singular_system_flagged() {
    let result = GeoLoess::new()
        .neighbors(3)
        .variogram(VariogramModel::spherical(1.0, 10.0))
        .failure_policy(Flag)
        .build()
        .unwrap()
        .estimate(&partly_singular_problem())
        .unwrap();

    let z = result.get("z").unwrap();
    assert_relative_eq!(z.mean[0], 3.7, epsilon = 1e-10);
    assert!(z.mean[1].is_nan());
    assert!(z.uncertainty[1].is_nan());
    assert_eq!(z.failed_locations, vec![1]);
    assert!(!z.is_complete());
    assert_eq!(result.n_failed(), 1);
    assert!(result.to_string().contains("Failed locations: 1"));
}

/// A semivariance that exceeds its sill, producing negative kernel weights.
#[derive(Debug)]
struct Overshoot;

impl Variogram<f64> for Overshoot {
    fn sill(&self) -> f64 {
        1.0
    }
    fn semivariance(&self, h: f64) -> f64 {
        2.0 * h
    }
}

#[test]
fn test_negative_weight_always_aborts() {
    let problem =
        EstimationProblem::new(line_data(), PointSet::new(vec![0.5], 1).unwrap()).unwrap();
    let err = GeoLoess::new()
        .variogram(Overshoot)
        .failure_policy(Flag)
        .build()
        .unwrap()
        .estimate(&problem)
        .unwrap_err();

    assert_eq!(
        err,
        GeoLoessError::NegativeWeight {
            variable: "z".to_string(),
            location: 0,
            weight: -2.0
        }
    );
    assert_eq!(err.stage(), Some(Stage::Weighting));
}

// ============================================================================
// Parallel Execution
// ============================================================================

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_matches_sequential() {
    let mut coords = Vec::new();
    let mut values = Vec::new();
    let mut state = 17u64;
    let mut next = || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    for _ in 0..300 {
        let (x, y) = (next() * 10.0, next() * 10.0);
        coords.extend([x, y]);
        values.push((x * 0.7).sin() + (y * 0.3).cos());
    }
    let data = GeoData::new(coords, 2).unwrap().with_values("z", values).unwrap();
    let grid = CartesianGrid::new(vec![20, 20], vec![0.0, 0.0], vec![0.5, 0.5]).unwrap();
    let problem = EstimationProblem::new(data, grid).unwrap();

    let build = |parallel| {
        GeoLoess::new()
            .neighbors(12)
            .variogram(VariogramModel::exponential(1.0, 4.0))
            .parallel(parallel)
            .build()
            .unwrap()
    };

    let seq = build(false).estimate(&problem).unwrap();
    let par = build(true).estimate(&problem).unwrap();
    assert_eq!(seq, par);
}

// ============================================================================
// Empty Inputs
// ============================================================================

#[test]
fn test_empty_data_is_a_configuration_error() {
    let data = GeoData::new(Vec::<f64>::new(), 1)
        .unwrap()
        .with_values("z", Vec::new())
        .unwrap();
    let problem = EstimationProblem::new(data, PointSet::new(vec![0.0], 1).unwrap()).unwrap();

    let err = GeoLoess::new().build().unwrap().estimate(&problem).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Validation));
    assert!(err.is_configuration());
}

#[test]
fn test_empty_domain_rejected() {
    let grid = CartesianGrid::new(vec![0, 3], vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
    let data = GeoData::new(vec![0.0, 0.0], 2)
        .unwrap()
        .with_values("z", vec![1.0])
        .unwrap();

    let err = EstimationProblem::new(data, grid).unwrap_err();
    assert_eq!(err, GeoLoessError::EmptyDomain);
}
