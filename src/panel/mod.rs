//! The procedure panel: a closed set of classifiers and statistical procedures
//! that all run behind one `run` entry point.

pub mod runner;

pub use runner::{PanelRun, ProcedureRecord, SkippedProcedure, run_panel};

use std::fmt;

use ndarray::Array2;
use serde::Serialize;

use crate::config::PanelConfig;
use crate::dataset::{Dataset, DatasetId, Transform};
use crate::error::{FitError, PipelineError};
use crate::ml::{
    ClassificationResult, ForestModel, ForestParams, KnnModel, KnnParams, LogisticModel,
    LogisticParams, SvmModel, SvmParams, TreeModel, TreeParams,
};
use crate::stats::{
    RegressionResult, TestResult, Variable, anova, continuous_target, feature_column, ols, ttest,
};

/// Headline metric a procedure is ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Accuracy,
    PValue,
    RSquared,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MetricKind::Accuracy => "accuracy",
            MetricKind::PValue => "p-value",
            MetricKind::RSquared => "r-squared",
        })
    }
}

/// One procedure with its configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum Procedure {
    LogisticRegression(LogisticParams),
    DecisionTree(TreeParams),
    RandomForest(ForestParams),
    Svm(SvmParams),
    KNearestNeighbors(KnnParams),
    /// `H0: mean(variable) == reference`.
    OneSampleT { variable: Variable, reference: f64 },
    /// Compares `variable` between rows above and at-or-below the target median.
    TwoSampleT { variable: Variable, equal_var: bool },
    PairedT { first: String, second: String },
    /// Mean interval at `1 - alpha`, tested against `reference`.
    MeanInterval { variable: Variable, reference: f64 },
    /// Target across equal-frequency bins of `feature`.
    Anova { feature: String, groups: usize },
    /// Target regressed on `features` plus an intercept.
    Ols { features: Vec<String> },
}

impl Procedure {
    pub fn name(&self) -> &'static str {
        match self {
            Procedure::LogisticRegression(_) => "Logistic Regression",
            Procedure::DecisionTree(_) => "Decision Tree",
            Procedure::RandomForest(_) => "Random Forest",
            Procedure::Svm(_) => "SVM",
            Procedure::KNearestNeighbors(_) => "KNN",
            Procedure::OneSampleT { .. } => "One-sample t-test",
            Procedure::TwoSampleT { .. } => "Two-sample t-test",
            Procedure::PairedT { .. } => "Paired t-test",
            Procedure::MeanInterval { .. } => "Confidence interval",
            Procedure::Anova { .. } => "ANOVA",
            Procedure::Ols { .. } => "OLS Regression",
        }
    }

    pub fn metric(&self) -> MetricKind {
        match self {
            Procedure::LogisticRegression(_)
            | Procedure::DecisionTree(_)
            | Procedure::RandomForest(_)
            | Procedure::Svm(_)
            | Procedure::KNearestNeighbors(_) => MetricKind::Accuracy,
            Procedure::OneSampleT { .. }
            | Procedure::TwoSampleT { .. }
            | Procedure::PairedT { .. }
            | Procedure::MeanInterval { .. }
            | Procedure::Anova { .. } => MetricKind::PValue,
            Procedure::Ols { .. } => MetricKind::RSquared,
        }
    }

    pub fn is_classifier(&self) -> bool {
        self.metric() == MetricKind::Accuracy
    }

    /// Distance- and gradient-based learners need standardized inputs.
    pub fn requires_scaling(&self) -> bool {
        matches!(
            self,
            Procedure::LogisticRegression(_)
                | Procedure::Svm(_)
                | Procedure::KNearestNeighbors(_)
        )
    }
}

/// Output of one procedure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcedureResult {
    Classification(ClassificationResult),
    Test(TestResult),
    Regression(RegressionResult),
}

impl ProcedureResult {
    /// Value of `kind` carried by this result, if it has one.
    pub fn metric_value(&self, kind: MetricKind) -> Option<f64> {
        match (self, kind) {
            (ProcedureResult::Classification(result), MetricKind::Accuracy) => {
                Some(result.accuracy)
            }
            (ProcedureResult::Test(result), MetricKind::PValue) => Some(result.p_value),
            (ProcedureResult::Regression(result), MetricKind::RSquared) => Some(result.r_squared),
            _ => None,
        }
    }
}

/// How the classifier inputs were scaled.
#[derive(Debug, Clone, PartialEq)]
pub enum Scaling {
    /// Both subsets were standardized with statistics of the training subset.
    Standardized(Transform),
    /// Standardization was switched off; every classifier sees raw features.
    Disabled,
    /// Standardization failed on a zero-variance feature; only scale-free
    /// classifiers run, on raw features.
    Unavailable { feature: String },
}

/// Train and evaluation subsets ready for the classifiers.
#[derive(Debug, Clone)]
pub struct PreparedSplit {
    pub train: Dataset,
    pub eval: Dataset,
    pub scaling: Scaling,
}

/// Read-only inputs shared by every procedure in a panel.
#[derive(Debug, Clone, Copy)]
pub struct PanelInputs<'a> {
    /// Full dataset, used by the statistical procedures.
    pub dataset: &'a Dataset,
    /// Present when the panel contains classifiers.
    pub split: Option<&'a PreparedSplit>,
}

/// Run one procedure. Errors are local to the procedure.
pub fn run(
    procedure: &Procedure,
    inputs: &PanelInputs<'_>,
    alpha: f64,
) -> Result<ProcedureResult, PipelineError> {
    match procedure {
        Procedure::LogisticRegression(params) => classify(procedure, inputs, |x, y, _, eval| {
            Ok(LogisticModel::fit(x, y, params)?.predict(eval))
        }),
        Procedure::DecisionTree(params) => classify(procedure, inputs, |x, y, _, eval| {
            Ok(TreeModel::fit(x, y, params)?.predict(eval))
        }),
        Procedure::RandomForest(params) => classify(procedure, inputs, |x, y, k, eval| {
            Ok(ForestModel::fit(x, y, k, params)?.predict(eval))
        }),
        Procedure::Svm(params) => classify(procedure, inputs, |x, y, k, eval| {
            Ok(SvmModel::fit(x, y, k, params)?.predict(eval))
        }),
        Procedure::KNearestNeighbors(params) => classify(procedure, inputs, |x, y, k, eval| {
            Ok(KnnModel::fit(x, y, k, params)?.predict(eval))
        }),
        _ => run_statistic(procedure, inputs.dataset, alpha)
            .map_err(|err| err.for_procedure(procedure.name())),
    }
}

fn run_statistic(
    procedure: &Procedure,
    dataset: &Dataset,
    alpha: f64,
) -> Result<ProcedureResult, FitError> {
    let result = match procedure {
        Procedure::OneSampleT {
            variable,
            reference,
        } => ttest::one_sample(&variable.values(dataset)?, *reference, alpha)?,
        Procedure::TwoSampleT {
            variable,
            equal_var,
        } => {
            let values = variable.values(dataset)?;
            let target = continuous_target(dataset)?;
            let (above, rest) = ttest::split_by_target_median(&values, target);
            ttest::two_sample(&above, &rest, *equal_var, alpha)?
        }
        Procedure::PairedT { first, second } => {
            let a = feature_column(dataset, first)?;
            let b = feature_column(dataset, second)?;
            ttest::paired(&a, &b, alpha)?
        }
        Procedure::MeanInterval {
            variable,
            reference,
        } => ttest::mean_interval(&variable.values(dataset)?, *reference, alpha)?,
        Procedure::Anova { feature, groups } => {
            let response = continuous_target(dataset)?;
            let grouping = feature_column(dataset, feature)?;
            anova::by_quantile_groups(response, &grouping, *groups, alpha)?
        }
        Procedure::Ols { features } => {
            let response = continuous_target(dataset)?;
            let columns = features
                .iter()
                .map(|feature| feature_column(dataset, feature))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(ProcedureResult::Regression(ols::fit(
                features, &columns, response, alpha,
            )?));
        }
        _ => return Err(FitError::new("not a statistical procedure")),
    };
    Ok(ProcedureResult::Test(result))
}

/// Fit on the training subset, predict the evaluation subset and score it.
fn classify<F>(
    procedure: &Procedure,
    inputs: &PanelInputs<'_>,
    fit_predict: F,
) -> Result<ProcedureResult, PipelineError>
where
    F: FnOnce(&Array2<f64>, &[usize], usize, &Array2<f64>) -> Result<Vec<usize>, FitError>,
{
    let name = procedure.name();
    let Some(split) = inputs.split else {
        return Err(FitError::new("no train/evaluation split was prepared").for_procedure(name));
    };
    if let Scaling::Unavailable { feature } = &split.scaling {
        if procedure.requires_scaling() {
            return Err(PipelineError::DegenerateFeature {
                feature: feature.clone(),
            });
        }
    }
    let (Some((train_labels, classes)), Some((eval_labels, _))) =
        (split.train.class_labels(), split.eval.class_labels())
    else {
        return Err(
            FitError::new("target is continuous; class labels are required").for_procedure(name),
        );
    };
    let predicted = fit_predict(
        &split.train.records_array(),
        train_labels,
        classes.len(),
        &split.eval.records_array(),
    )
    .map_err(|err| err.for_procedure(name))?;
    Ok(ProcedureResult::Classification(ClassificationResult::score(
        classes,
        eval_labels.to_vec(),
        predicted,
    )))
}

/// Ordered list of procedures run together.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    procedures: Vec<Procedure>,
}

impl Panel {
    pub fn new(procedures: Vec<Procedure>) -> Self {
        Self { procedures }
    }

    /// Logistic regression, random forest, SVM, decision tree and k-NN.
    pub fn classification(config: &PanelConfig) -> Self {
        let c = &config.classifiers;
        Self::new(vec![
            Procedure::LogisticRegression(LogisticParams {
                alpha: c.logistic_alpha,
                max_iterations: c.logistic_max_iterations,
            }),
            Procedure::RandomForest(ForestParams {
                n_trees: c.forest_trees,
                seed: c.forest_seed,
                max_depth: c.tree_max_depth,
                max_features: None,
            }),
            Procedure::Svm(SvmParams {
                kernel: c.svm_kernel,
                c: c.svm_c,
                epochs: c.svm_epochs,
                learning_rate: c.svm_learning_rate,
                batch_size: c.svm_batch_size,
                seed: c.svm_seed,
            }),
            Procedure::DecisionTree(TreeParams {
                max_depth: c.tree_max_depth,
            }),
            Procedure::KNearestNeighbors(KnnParams { k: c.knn_k }),
        ])
    }

    /// One-sample, two-sample and paired t-tests, a mean interval, ANOVA and OLS.
    pub fn statistics(config: &PanelConfig) -> Self {
        let s = &config.statistics;
        Self::new(vec![
            Procedure::OneSampleT {
                variable: s.one_sample.clone(),
                reference: s.one_sample_reference,
            },
            Procedure::TwoSampleT {
                variable: s.two_sample.clone(),
                equal_var: s.equal_var,
            },
            Procedure::PairedT {
                first: s.paired_first.clone(),
                second: s.paired_second.clone(),
            },
            Procedure::MeanInterval {
                variable: s.interval.clone(),
                reference: s.interval_reference,
            },
            Procedure::Anova {
                feature: s.anova_feature.clone(),
                groups: s.anova_groups,
            },
            Procedure::Ols {
                features: s.regression_features.clone(),
            },
        ])
    }

    /// The standard panel for a catalog dataset.
    pub fn for_dataset(id: DatasetId, config: &PanelConfig) -> Self {
        match id {
            DatasetId::Wine => Self::classification(config),
            DatasetId::Diabetes => Self::statistics(config),
        }
    }

    pub fn procedures(&self) -> &[Procedure] {
        &self.procedures
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// Whether any procedure trains on a train/evaluation split.
    pub fn needs_split(&self) -> bool {
        self.procedures.iter().any(Procedure::is_classifier)
    }

    pub fn requires_scaling(&self) -> bool {
        self.procedures.iter().any(Procedure::requires_scaling)
    }
}
