//! Panel configuration loaded from TOML.
//!
//! Config keys (TOML): `data_dir`, `workers`, `alpha`, `split`, `classifiers`,
//! `statistics`. Every key is optional; missing keys fall back to an 80/20 split
//! with seed 42, alpha 0.05, k = 5, 100 trees, a linear kernel and quartile ANOVA.

mod defaults;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;
pub use crate::ml::SvmKernel;
use crate::stats::Variable;

use defaults::{
    clamp_worker_count, default_alpha, default_anova_groups, default_bmi,
    default_bmi_variable, default_false, default_forest_trees, default_knn_k,
    default_logistic_alpha, default_logistic_max_iterations, default_paired_first,
    default_paired_second, default_reference, default_regression_features, default_seed,
    default_split_ratio, default_svm_batch_size, default_svm_c, default_svm_epochs,
    default_svm_learning_rate, default_true, default_worker_count,
};

/// Default filename used to store the panel configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Directory holding `<dataset>.csv` files. Falls back to the app data dir.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Worker threads for the panel; `0` uses the available parallelism.
    #[serde(default = "default_worker_count")]
    pub workers: usize,
    /// Significance level shared by every statistical procedure.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default)]
    pub split: SplitSettings,
    #[serde(default)]
    pub classifiers: ClassifierSettings,
    #[serde(default)]
    pub statistics: StatisticsSettings,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            workers: default_worker_count(),
            alpha: default_alpha(),
            split: SplitSettings::default(),
            classifiers: ClassifierSettings::default(),
            statistics: StatisticsSettings::default(),
        }
    }
}

/// Train/evaluation partition and scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSettings {
    /// Fraction of rows held out for evaluation, in `(0, 1)`.
    #[serde(default = "default_split_ratio")]
    pub ratio: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_true")]
    pub standardize: bool,
    /// Run scale-free classifiers on raw features when a feature is degenerate.
    #[serde(default = "default_false")]
    pub unscaled_fallback: bool,
}

impl Default for SplitSettings {
    fn default() -> Self {
        Self {
            ratio: default_split_ratio(),
            seed: default_seed(),
            standardize: default_true(),
            unscaled_fallback: default_false(),
        }
    }
}

/// Hyperparameters for the classification panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSettings {
    #[serde(default = "default_knn_k")]
    pub knn_k: usize,
    #[serde(default = "default_forest_trees")]
    pub forest_trees: usize,
    #[serde(default = "default_seed")]
    pub forest_seed: u64,
    /// Depth limit for the single decision tree and every forest member.
    #[serde(default)]
    pub tree_max_depth: Option<usize>,
    #[serde(default)]
    pub svm_kernel: SvmKernel,
    #[serde(default = "default_svm_c")]
    pub svm_c: f64,
    #[serde(default = "default_svm_epochs")]
    pub svm_epochs: usize,
    #[serde(default = "default_svm_learning_rate")]
    pub svm_learning_rate: f64,
    #[serde(default = "default_svm_batch_size")]
    pub svm_batch_size: usize,
    #[serde(default = "default_seed")]
    pub svm_seed: u64,
    /// L2 penalty strength for logistic regression.
    #[serde(default = "default_logistic_alpha")]
    pub logistic_alpha: f64,
    #[serde(default = "default_logistic_max_iterations")]
    pub logistic_max_iterations: u64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            knn_k: default_knn_k(),
            forest_trees: default_forest_trees(),
            forest_seed: default_seed(),
            tree_max_depth: None,
            svm_kernel: SvmKernel::default(),
            svm_c: default_svm_c(),
            svm_epochs: default_svm_epochs(),
            svm_learning_rate: default_svm_learning_rate(),
            svm_batch_size: default_svm_batch_size(),
            svm_seed: default_seed(),
            logistic_alpha: default_logistic_alpha(),
            logistic_max_iterations: default_logistic_max_iterations(),
        }
    }
}

/// Variables and reference values for the statistics panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSettings {
    #[serde(default = "default_bmi_variable")]
    pub one_sample: Variable,
    #[serde(default = "default_reference")]
    pub one_sample_reference: f64,
    /// Variable compared between the above-median and at-or-below-median target groups.
    #[serde(default = "default_bmi_variable")]
    pub two_sample: Variable,
    /// Pooled-variance (Student) when true, Welch otherwise.
    #[serde(default = "default_true")]
    pub equal_var: bool,
    #[serde(default = "default_paired_first")]
    pub paired_first: String,
    #[serde(default = "default_paired_second")]
    pub paired_second: String,
    #[serde(default = "default_bmi_variable")]
    pub interval: Variable,
    #[serde(default = "default_reference")]
    pub interval_reference: f64,
    #[serde(default = "default_bmi")]
    pub anova_feature: String,
    #[serde(default = "default_anova_groups")]
    pub anova_groups: usize,
    #[serde(default = "default_regression_features")]
    pub regression_features: Vec<String>,
}

impl Default for StatisticsSettings {
    fn default() -> Self {
        Self {
            one_sample: default_bmi_variable(),
            one_sample_reference: default_reference(),
            two_sample: default_bmi_variable(),
            equal_var: default_true(),
            paired_first: default_paired_first(),
            paired_second: default_paired_second(),
            interval: default_bmi_variable(),
            interval_reference: default_reference(),
            anova_feature: default_bmi(),
            anova_groups: default_anova_groups(),
            regression_features: default_regression_features(),
        }
    }
}

impl PanelConfig {
    /// Clamp counts into usable ranges. The split ratio is left untouched so an
    /// out-of-range value surfaces as an invalid ratio when splitting.
    pub fn normalized(mut self) -> Self {
        self.workers = clamp_worker_count(self.workers);
        let classifiers = &mut self.classifiers;
        classifiers.knn_k = classifiers.knn_k.max(1);
        classifiers.forest_trees = classifiers.forest_trees.max(1);
        classifiers.svm_epochs = classifiers.svm_epochs.max(1);
        classifiers.svm_batch_size = classifiers.svm_batch_size.max(1);
        classifiers.logistic_max_iterations = classifiers.logistic_max_iterations.max(1);
        self.statistics.anova_groups = self.statistics.anova_groups.max(2);
        self
    }

    /// Reject values no procedure can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "alpha must lie strictly between 0 and 1 (got {})",
                self.alpha
            )));
        }
        let classifiers = &self.classifiers;
        if !(classifiers.svm_c.is_finite() && classifiers.svm_c > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "svm_c must be > 0 (got {})",
                classifiers.svm_c
            )));
        }
        if !(classifiers.svm_learning_rate.is_finite() && classifiers.svm_learning_rate > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "svm_learning_rate must be > 0 (got {})",
                classifiers.svm_learning_rate
            )));
        }
        if !(classifiers.logistic_alpha.is_finite() && classifiers.logistic_alpha >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "logistic_alpha must be >= 0 (got {})",
                classifiers.logistic_alpha
            )));
        }
        if self.statistics.regression_features.is_empty() {
            return Err(ConfigError::Invalid(
                "regression_features must name at least one feature".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the number of worker threads to use for `jobs` procedures.
    pub fn worker_count(&self, jobs: usize) -> usize {
        let requested = if self.workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.workers
        };
        requested.min(jobs).max(1)
    }

    /// Dataset directory: explicit setting, then environment/app default.
    pub fn resolved_data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => app_dirs::default_data_dir().map_err(map_app_dir_error),
        }
    }
}

/// Errors raised while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No suitable config directory found")]
    NoConfigDir,
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Resolve the configuration file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load configuration from the app directory, returning defaults if missing.
pub fn load_or_default() -> Result<PanelConfig, ConfigError> {
    load_from_path(&config_path()?)
}

/// Load configuration from a specific file, returning defaults if it does not exist.
pub fn load_from_path(path: &Path) -> Result<PanelConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}; using defaults", path.display());
        return Ok(PanelConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: PanelConfig = toml::from_str(&text)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
        .map(PanelConfig::normalized)?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to a specific path, creating parent directories as needed.
pub fn save_to_path(config: &PanelConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let data = toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, data).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = load_from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, PanelConfig::default());
        assert_eq!(config.split.ratio, 0.2);
        assert_eq!(config.split.seed, 42);
        assert_eq!(config.classifiers.knn_k, 5);
        assert_eq!(config.classifiers.forest_trees, 100);
        assert_eq!(config.statistics.anova_groups, 4);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "alpha = 0.01\n\n[split]\nseed = 7\n\n[statistics]\none_sample = \"target\"\n",
        )
        .unwrap();
        let config = load_from_path(&path).unwrap();
        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.split.seed, 7);
        assert_eq!(config.split.ratio, 0.2);
        assert_eq!(config.statistics.one_sample, Variable::Target);
        assert_eq!(config.statistics.two_sample, Variable::Feature("bmi".into()));
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let mut config = PanelConfig::default();
        config.workers = 3;
        config.classifiers.tree_max_depth = Some(4);
        config.statistics.regression_features = vec!["bmi".into(), "bp".into()];
        save_to_path(&config, &path).unwrap();
        assert_eq!(load_from_path(&path).unwrap(), config);
    }

    #[test]
    fn rejects_alpha_outside_unit_interval() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "alpha = 1.5\n").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_kernel() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[classifiers]\nsvm_kernel = \"rbf\"\n").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
    }

    #[test]
    fn normalization_clamps_counts() {
        let mut config = PanelConfig::default();
        config.workers = 1_000;
        config.classifiers.knn_k = 0;
        config.statistics.anova_groups = 1;
        let config = config.normalized();
        assert_eq!(config.workers, 64);
        assert_eq!(config.classifiers.knn_k, 1);
        assert_eq!(config.statistics.anova_groups, 2);
    }

    #[test]
    fn worker_count_never_exceeds_jobs() {
        let mut config = PanelConfig::default();
        config.workers = 8;
        assert_eq!(config.worker_count(3), 3);
        assert_eq!(config.worker_count(0), 1);
    }

    #[test]
    fn app_dir_config_is_used() {
        let base = tempdir().unwrap();
        let _guard = app_dirs::OverrideGuard::set(base.path().to_path_buf());
        let path = config_path().unwrap();
        std::fs::write(&path, "workers = 2\n").unwrap();
        assert_eq!(load_or_default().unwrap().workers, 2);
    }
}
