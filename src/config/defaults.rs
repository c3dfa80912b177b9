use crate::stats::Variable;

pub(super) const MAX_WORKER_COUNT: usize = 64;

pub(super) fn clamp_worker_count(value: usize) -> usize {
    value.min(MAX_WORKER_COUNT)
}

pub(super) fn default_true() -> bool {
    true
}

pub(super) fn default_false() -> bool {
    false
}

pub(super) fn default_alpha() -> f64 {
    0.05
}

pub(super) fn default_worker_count() -> usize {
    0
}

pub(super) fn default_split_ratio() -> f64 {
    0.2
}

pub(super) fn default_seed() -> u64 {
    42
}

pub(super) fn default_knn_k() -> usize {
    5
}

pub(super) fn default_forest_trees() -> usize {
    100
}

pub(super) fn default_svm_c() -> f64 {
    1.0
}

pub(super) fn default_svm_epochs() -> usize {
    200
}

pub(super) fn default_svm_learning_rate() -> f64 {
    0.05
}

pub(super) fn default_svm_batch_size() -> usize {
    16
}

pub(super) fn default_logistic_alpha() -> f64 {
    1.0
}

pub(super) fn default_logistic_max_iterations() -> u64 {
    100
}

pub(super) fn default_anova_groups() -> usize {
    4
}

pub(super) fn default_bmi() -> String {
    "bmi".to_string()
}

pub(super) fn default_bmi_variable() -> Variable {
    Variable::Feature(default_bmi())
}

pub(super) fn default_reference() -> f64 {
    0.0
}

pub(super) fn default_paired_first() -> String {
    "s1".to_string()
}

pub(super) fn default_paired_second() -> String {
    "s2".to_string()
}

pub(super) fn default_regression_features() -> Vec<String> {
    vec![default_bmi()]
}
