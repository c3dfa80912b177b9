//! Named dataset sources and their documented schemas.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Feature columns of the wine recognition data (13 chemical measurements).
pub const WINE_FEATURES: &[&str] = &[
    "alcohol",
    "malic_acid",
    "ash",
    "alcalinity_of_ash",
    "magnesium",
    "total_phenols",
    "flavanoids",
    "nonflavanoid_phenols",
    "proanthocyanins",
    "color_intensity",
    "hue",
    "od280/od315_of_diluted_wines",
    "proline",
];

/// Cultivar classes of the wine recognition data.
pub const WINE_CLASSES: &[&str] = &["class_0", "class_1", "class_2"];

/// Baseline variables of the diabetes data.
pub const DIABETES_FEATURES: &[&str] = &[
    "age", "sex", "bmi", "bp", "s1", "s2", "s3", "s4", "s5", "s6",
];

/// Name of the diabetes response: disease progression one year after baseline.
pub const DIABETES_TARGET: &str = "progression";

/// Header name of the target column in dataset files.
pub const TARGET_COLUMN: &str = "target";

/// Enumerated dataset sources understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetId {
    /// 178 wines, 13 features, 3 classes. Drives the classification panel.
    Wine,
    /// 442 patients, 10 features, continuous target. Drives the statistics panel.
    Diabetes,
}

/// How the target column is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Classes(&'static [&'static str]),
    Continuous(&'static str),
}

impl DatasetId {
    pub const ALL: [DatasetId; 2] = [DatasetId::Wine, DatasetId::Diabetes];

    pub fn as_str(self) -> &'static str {
        match self {
            DatasetId::Wine => "wine",
            DatasetId::Diabetes => "diabetes",
        }
    }

    pub fn feature_names(self) -> &'static [&'static str] {
        match self {
            DatasetId::Wine => WINE_FEATURES,
            DatasetId::Diabetes => DIABETES_FEATURES,
        }
    }

    pub fn target_kind(self) -> TargetKind {
        match self {
            DatasetId::Wine => TargetKind::Classes(WINE_CLASSES),
            DatasetId::Diabetes => TargetKind::Continuous(DIABETES_TARGET),
        }
    }

    /// File name the loader looks for inside the data directory.
    pub fn file_name(self) -> String {
        format!("{}.csv", self.as_str())
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        DatasetId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("Unknown dataset {value} (expected wine or diabetes)"))
    }
}
