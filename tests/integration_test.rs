// Integration tests for scorecast
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scorecast_api::ServiceContext;
use scorecast_core::{
    train, DatasetSchema, Error, EstimatorConfig, ForestParams, Predictor, Record,
    SyntheticDataset, TrainingConfig, Value,
};
use scorecast_storage::{ArtifactError, ArtifactStore};

const GENDERS: [&str; 3] = ["Male", "Female", "Other"];
const EDUCATIONS: [&str; 3] = ["High School", "Bachelor", "Master"];
const SCHOOLS: [&str; 2] = ["Public", "Private"];

/// Labeled rows where `final_score` is a clean linear function of
/// `previous_gpa` plus bounded noise; every other field is filler.
fn linear_plus_noise_rows(n: usize, seed: u64) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let gpa = rng.random_range(0.0..4.0);
            let noise = rng.random_range(-1.0..1.0);
            Record::new()
                .with_field("age", rng.random_range(16.0f64..25.0).round())
                .with_field("gender", GENDERS[i % GENDERS.len()])
                .with_field("parental_education", EDUCATIONS[i % EDUCATIONS.len()])
                .with_field("household_income", rng.random_range(20_000.0..200_000.0))
                .with_field("previous_gpa", gpa)
                .with_field("study_hours_per_week", rng.random_range(1.0..40.0))
                .with_field("attendance_rate", rng.random_range(40.0..100.0))
                .with_field("sleep_hours", rng.random_range(4.0..12.0))
                .with_field("exercise_hours_per_week", rng.random_range(0.0..20.0))
                .with_field("has_internet", if rng.random_bool(0.9) { 1.0 } else { 0.0 })
                .with_field("has_computer", if rng.random_bool(0.85) { 1.0 } else { 0.0 })
                .with_field("extracurricular_hours", rng.random_range(0.0f64..15.0).round())
                .with_field("school_type", SCHOOLS[i % SCHOOLS.len()])
                .with_field("class_size", rng.random_range(10.0f64..50.0).round())
                .with_field("final_score", 20.0 * gpa + noise)
        })
        .collect()
}

/// The worked example from the API documentation.
fn reference_record() -> Record {
    Record::new()
        .with_field("age", 18.0)
        .with_field("gender", "Female")
        .with_field("parental_education", "Bachelor")
        .with_field("household_income", 50_000.0)
        .with_field("previous_gpa", 3.5)
        .with_field("study_hours_per_week", 20.0)
        .with_field("attendance_rate", 85.0)
        .with_field("sleep_hours", 7.0)
        .with_field("exercise_hours_per_week", 3.0)
        .with_field("has_internet", 1.0)
        .with_field("has_computer", 1.0)
        .with_field("extracurricular_hours", 5.0)
        .with_field("school_type", "Public")
        .with_field("class_size", 25.0)
}

#[test]
fn test_end_to_end_known_relationship() {
    let schema = DatasetSchema::student_performance();
    let rows = linear_plus_noise_rows(500, 11);

    let bundle = train(&schema, &rows, &TrainingConfig::default()).unwrap();

    // A dominant linear signal must be learnable well past the 0.7 bar.
    assert!(
        bundle.metrics.r2 > 0.7,
        "held-out r2 = {}",
        bundle.metrics.r2
    );
    assert_eq!(bundle.report.train_size, 400);
    assert_eq!(bundle.report.test_size, 100);

    // previous_gpa carries the signal, and the forest should notice.
    let importances = bundle.report.feature_importances.as_ref().unwrap();
    assert_eq!(importances[0].feature, "previous_gpa");

    // Scoring is deterministic: training again on the same rows with the
    // same config reproduces the metrics exactly.
    let again = train(&schema, &rows, &TrainingConfig::default()).unwrap();
    assert_eq!(bundle.metrics, again.metrics);
}

#[test]
fn test_save_load_roundtrip_preserves_predictions() {
    let schema = DatasetSchema::student_performance();
    let rows = linear_plus_noise_rows(200, 3);
    let bundle = train(&schema, &rows, &TrainingConfig::default()).unwrap();

    let probe: Vec<Record> = rows
        .iter()
        .take(20)
        .map(|row| schema.split_target(row.clone()).unwrap().0)
        .collect();

    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path()).unwrap();
    store.save(&bundle).unwrap();

    let before = Predictor::new(bundle);
    let after = Predictor::new(store.load().unwrap());
    assert_eq!(
        before.predict_many(&probe).unwrap(),
        after.predict_many(&probe).unwrap()
    );
}

#[test]
fn test_reference_record_prediction_in_target_range() {
    let schema = DatasetSchema::student_performance();
    let rows = SyntheticDataset::new(500).generate();
    let bundle = train(&schema, &rows, &TrainingConfig::default()).unwrap();
    let predictor = Predictor::new(bundle);

    let prediction = predictor.predict_one(&reference_record()).unwrap();
    assert!(prediction.is_finite());
    // Forest leaves average observed targets, which the synthetic dataset
    // normalizes onto 0..100.
    assert!(
        (0.0..=100.0).contains(&prediction),
        "prediction = {}",
        prediction
    );
}

#[test]
fn test_batch_matches_single_predictions() {
    let schema = DatasetSchema::student_performance();
    let rows = SyntheticDataset::new(120).generate();
    let bundle = train(&schema, &rows, &TrainingConfig::default()).unwrap();
    let predictor = Predictor::new(bundle);

    let queries: Vec<Record> = SyntheticDataset::new(10)
        .with_seed(5)
        .generate()
        .into_iter()
        .map(|row| schema.split_target(row).unwrap().0)
        .collect();

    let batch = predictor.predict_many(&queries).unwrap();
    for (record, expected) in queries.iter().zip(batch.iter()) {
        assert_eq!(predictor.predict_one(record).unwrap(), *expected);
    }
    assert_eq!(
        predictor.predict_many(&queries[..1]).unwrap()[0],
        batch[0]
    );
}

#[test]
fn test_unseen_category_rejected() {
    let schema = DatasetSchema::student_performance();
    let rows = SyntheticDataset::new(120).generate();
    let bundle = train(&schema, &rows, &TrainingConfig::default()).unwrap();
    let predictor = Predictor::new(bundle);

    let mut record = reference_record();
    record.insert("parental_education", "Correspondence Course");
    let err = predictor.predict_one(&record).unwrap_err();
    assert!(err.is_schema_error());
    assert!(matches!(
        err,
        Error::UnknownCategory { column, .. } if column == "parental_education"
    ));
}

#[test]
fn test_missing_field_rejected() {
    let schema = DatasetSchema::student_performance();
    let rows = SyntheticDataset::new(120).generate();
    let bundle = train(&schema, &rows, &TrainingConfig::default()).unwrap();
    let predictor = Predictor::new(bundle);

    let mut record = reference_record();
    record.remove("class_size");
    assert!(matches!(
        predictor.predict_one(&record),
        Err(Error::MissingField(f)) if f == "class_size"
    ));
}

#[test]
fn test_linear_baseline_end_to_end() {
    let schema = DatasetSchema::student_performance();
    let rows = linear_plus_noise_rows(300, 23);
    let config = TrainingConfig {
        estimator: EstimatorConfig::Linear,
        ..TrainingConfig::default()
    };

    let bundle = train(&schema, &rows, &config).unwrap();
    // OLS nails an (almost) linear relationship.
    assert!(
        bundle.metrics.r2 > 0.95,
        "held-out r2 = {}",
        bundle.metrics.r2
    );
}

#[test]
fn test_forest_seed_controls_fit() {
    let schema = DatasetSchema::student_performance();
    let rows = linear_plus_noise_rows(150, 31);

    let fit_with_seed = |seed: u64| {
        let config = TrainingConfig {
            estimator: EstimatorConfig::RandomForest(ForestParams {
                n_estimators: 20,
                seed,
                ..ForestParams::default()
            }),
            ..TrainingConfig::default()
        };
        let bundle = train(&schema, &rows, &config).unwrap();
        Predictor::new(bundle)
            .predict_one(&reference_record())
            .unwrap()
    };

    assert_eq!(fit_with_seed(42), fit_with_seed(42));
    assert_ne!(fit_with_seed(42), fit_with_seed(1234));
}

#[test]
fn test_service_context_lifecycle() {
    let dir = tempfile::tempdir().unwrap();

    // Fresh directory: the service starts not ready.
    let ctx =
        ServiceContext::with_startup_load(ArtifactStore::new(dir.path()).unwrap()).unwrap();
    assert!(!ctx.is_ready());
    assert!(ctx.predictor().is_none());

    // An external training run writes the artifact...
    let schema = DatasetSchema::student_performance();
    let rows = SyntheticDataset::new(120).generate();
    let bundle = train(&schema, &rows, &TrainingConfig::default()).unwrap();
    ArtifactStore::new(dir.path()).unwrap().save(&bundle).unwrap();

    // ...and an explicit reload swaps it in.
    ctx.reload().unwrap();
    assert!(ctx.is_ready());
    let predictor = ctx.predictor().unwrap();
    assert!(predictor.predict_one(&reference_record()).unwrap().is_finite());
}

#[test]
fn test_artifact_error_taxonomy() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path()).unwrap();

    // Not trained yet.
    assert!(matches!(store.load(), Err(ArtifactError::NotFound(_))));

    // Corrupt bytes are a distinct failure.
    std::fs::write(store.path(), b"definitely not a bundle").unwrap();
    assert!(matches!(store.load(), Err(ArtifactError::Corrupt(_))));
}

#[test]
fn test_degenerate_training_data_writes_no_artifact() {
    let schema = DatasetSchema::student_performance();
    let mut rows = linear_plus_noise_rows(50, 17);
    for row in &mut rows {
        row.insert("final_score", 55.5);
    }

    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path()).unwrap();

    let result = train(&schema, &rows, &TrainingConfig::default());
    assert!(matches!(result, Err(Error::DegenerateTarget(_))));
    assert!(!store.exists());
}

#[test]
fn test_transform_determinism_through_public_surface() {
    let schema = DatasetSchema::student_performance();
    let rows = SyntheticDataset::new(120).generate();
    let bundle = train(&schema, &rows, &TrainingConfig::default()).unwrap();

    let record = reference_record();
    let a = bundle.preprocessor.transform_one(&record).unwrap();
    let b = bundle.preprocessor.transform_one(&record).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 14);

    // Encoded labels occupy the categorical slots with small integer codes.
    let vocab = bundle.preprocessor.vocabulary("gender").unwrap();
    assert_eq!(a[0], vocab.code("Female").unwrap() as f64);
}

#[test]
fn test_sample_scores_match_target_scale() {
    let rows = SyntheticDataset::new(50).generate();
    for row in rows {
        let score = row.get("final_score").and_then(Value::as_number).unwrap();
        assert!((0.0..=100.0).contains(&score));
    }
}
