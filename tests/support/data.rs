use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statpanel::dataset::DatasetId;
use statpanel::dataset::catalog::{DIABETES_FEATURES, TARGET_COLUMN, WINE_CLASSES, WINE_FEATURES};

fn gaussian(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

fn header(features: &[&str]) -> String {
    let mut columns: Vec<&str> = features.to_vec();
    columns.push(TARGET_COLUMN);
    columns.join(",")
}

/// Three well separated classes over the wine schema, targets written by name.
pub fn wine_like_csv(rows_per_class: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut lines = vec![header(WINE_FEATURES)];
    for row in 0..rows_per_class * WINE_CLASSES.len() {
        let class = row % WINE_CLASSES.len();
        let values: Vec<String> = (0..WINE_FEATURES.len())
            .map(|j| {
                let center = 6.0 * ((class + j) % WINE_CLASSES.len()) as f64;
                // Uneven column scales, as in the real measurements.
                let scale = 1.0 + j as f64 * 3.0;
                format!("{:.5}", (center + gaussian(&mut rng)) * scale)
            })
            .collect();
        lines.push(format!("{},{}", values.join(","), WINE_CLASSES[class]));
    }
    lines.join("\n") + "\n"
}

/// Regression data over the diabetes schema. The target rises with `bmi` and `s5`;
/// `s1` and `s2` are strongly correlated and differ in mean.
pub fn diabetes_like_csv(rows: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut lines = vec![header(DIABETES_FEATURES)];
    for _ in 0..rows {
        let mut values = [0.0f64; 10];
        for value in values.iter_mut() {
            *value = gaussian(&mut rng) * 0.05;
        }
        values[1] = if rng.random::<bool>() { 0.05 } else { -0.045 };
        values[5] = values[4] * 0.9 + gaussian(&mut rng) * 0.01 + 0.01;
        let target = 150.0 + 900.0 * values[2] + 600.0 * values[8] + gaussian(&mut rng) * 20.0;
        let fields: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
        lines.push(format!("{},{target:.3}", fields.join(",")));
    }
    lines.join("\n") + "\n"
}

pub fn write_dataset(dir: &Path, id: DatasetId, contents: &str) {
    std::fs::write(dir.join(id.file_name()), contents).expect("write dataset csv");
}
