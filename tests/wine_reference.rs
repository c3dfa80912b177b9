//! Reference accuracies on the real wine recognition data.
//!
//! Reads `tests/data/wine.csv` (the 178-row UCI wine data in loader format: the
//! 13 feature columns followed by `target`). Run with `cargo test -- --ignored`
//! once the file is in place.

use std::path::PathBuf;

use statpanel::config::PanelConfig;
use statpanel::dataset::DatasetId;
use statpanel::panel::ProcedureResult;
use statpanel::pipeline;

const TOLERANCE: f64 = 0.05;
const REFERENCE: &[(&str, f64)] = &[
    ("Logistic Regression", 1.0),
    ("Random Forest", 1.0),
    ("SVM", 0.972),
    ("Decision Tree", 0.944),
    ("KNN", 0.944),
];

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

#[test]
#[ignore = "needs tests/data/wine.csv"]
fn wine_accuracies_match_reference_values() {
    let data_dir = fixture_dir();
    assert!(
        data_dir.join(DatasetId::Wine.file_name()).is_file(),
        "missing {}",
        data_dir.join(DatasetId::Wine.file_name()).display()
    );
    let config = PanelConfig {
        data_dir: Some(data_dir),
        ..PanelConfig::default()
    };
    let output = pipeline::run(DatasetId::Wine, &config).unwrap();
    assert_eq!(output.dataset_summary.rows, 178);
    assert!(output.run.skipped.is_empty(), "{:?}", output.run.skipped);
    for (name, expected) in REFERENCE {
        let record = output
            .run
            .records
            .iter()
            .find(|record| record.name == *name)
            .unwrap();
        let ProcedureResult::Classification(result) = &record.result else {
            panic!("{name} did not classify");
        };
        assert_eq!(result.truth.len(), 36);
        assert!(
            (result.accuracy - expected).abs() <= TOLERANCE,
            "{name}: accuracy {} vs reference {expected}",
            result.accuracy
        );
    }
}
