//! End-to-end run: load, split and scale, run the panel, rank the results.

use tracing::{info, warn};

use crate::config::PanelConfig;
use crate::dataset::{self, Dataset, DatasetId, DatasetSummary, Transform};
use crate::error::PipelineError;
use crate::panel::{Panel, PanelInputs, PanelRun, PreparedSplit, Scaling, run_panel};
use crate::report::Report;

/// Everything one pipeline run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub dataset_summary: DatasetSummary,
    pub run: PanelRun,
    pub report: Report,
}

/// Load the catalog dataset `id` and run its standard panel.
pub fn run(id: DatasetId, config: &PanelConfig) -> Result<PipelineOutput, PipelineError> {
    let data_dir = config.resolved_data_dir()?;
    info!("Loading {id} from {}", data_dir.display());
    let dataset = dataset::load(id, &data_dir)?;
    run_dataset(&dataset, &Panel::for_dataset(id, config), config)
}

/// Run `panel` over an in-memory dataset.
pub fn run_dataset(
    dataset: &Dataset,
    panel: &Panel,
    config: &PanelConfig,
) -> Result<PipelineOutput, PipelineError> {
    config.validate()?;
    let dataset_summary = dataset::describe(dataset);
    let prepared = if panel.needs_split() {
        Some(prepare_split(dataset, panel, config)?)
    } else {
        None
    };
    let inputs = PanelInputs {
        dataset,
        split: prepared.as_ref(),
    };
    let workers = config.worker_count(panel.len());
    let run = run_panel(panel, &inputs, config.alpha, workers);
    let report = Report::build(&run);
    info!(
        "Panel finished: {} ranked, {} skipped",
        report.entries.len(),
        report.skipped.len()
    );
    Ok(PipelineOutput {
        dataset_summary,
        run,
        report,
    })
}

/// Split `dataset` and standardize both halves with training statistics.
///
/// A zero-variance training feature aborts the run when any procedure needs
/// scaled inputs, unless `split.unscaled_fallback` is set; then the subsets stay
/// raw and the scale-dependent procedures are skipped.
pub fn prepare_split(
    dataset: &Dataset,
    panel: &Panel,
    config: &PanelConfig,
) -> Result<PreparedSplit, PipelineError> {
    let settings = &config.split;
    let split = dataset::split(dataset, settings.ratio, settings.seed)?;
    info!(
        "Split {}: {} train / {} eval rows (ratio {}, seed {})",
        dataset.name(),
        split.train.n_rows(),
        split.eval.n_rows(),
        settings.ratio,
        settings.seed
    );
    if !settings.standardize {
        return Ok(PreparedSplit {
            train: split.train,
            eval: split.eval,
            scaling: Scaling::Disabled,
        });
    }
    match Transform::fit(&split.train) {
        Ok(transform) => Ok(PreparedSplit {
            train: transform.apply(&split.train)?,
            eval: transform.apply(&split.eval)?,
            scaling: Scaling::Standardized(transform),
        }),
        Err(PipelineError::DegenerateFeature { feature })
            if settings.unscaled_fallback || !panel.requires_scaling() =>
        {
            warn!("Feature {feature} has zero variance; classifiers run on raw features");
            Ok(PreparedSplit {
                train: split.train,
                eval: split.eval,
                scaling: Scaling::Unavailable { feature },
            })
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Target;
    use crate::ml::{KnnParams, TreeParams};
    use crate::panel::Procedure;

    fn flat_feature_dataset() -> Dataset {
        Dataset::new(
            "flat",
            vec!["x".into(), "constant".into()],
            (0..30).map(|i| vec![f64::from(i), 7.0]).collect(),
            Target::Classes {
                labels: (0..30).map(|i| usize::from(i >= 15)).collect(),
                classes: vec!["low".into(), "high".into()],
            },
        )
        .unwrap()
    }

    fn mixed_panel() -> Panel {
        Panel::new(vec![
            Procedure::DecisionTree(TreeParams::default()),
            Procedure::KNearestNeighbors(KnnParams::default()),
        ])
    }

    #[test]
    fn degenerate_feature_is_fatal_by_default() {
        let err = run_dataset(&flat_feature_dataset(), &mixed_panel(), &PanelConfig::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::DegenerateFeature { ref feature } if feature == "constant"));
    }

    #[test]
    fn fallback_runs_scale_free_procedures_only() {
        let mut config = PanelConfig::default();
        config.split.unscaled_fallback = true;
        let output = run_dataset(&flat_feature_dataset(), &mixed_panel(), &config).unwrap();
        assert_eq!(output.run.records.len(), 1);
        assert_eq!(output.run.records[0].name, "Decision Tree");
        assert_eq!(output.run.skipped.len(), 1);
        assert_eq!(output.run.skipped[0].name, "KNN");
        assert!(output.run.skipped[0].reason.contains("constant"));
    }

    #[test]
    fn scale_free_panel_proceeds_without_fallback() {
        let panel = Panel::new(vec![Procedure::DecisionTree(TreeParams::default())]);
        let output = run_dataset(&flat_feature_dataset(), &panel, &PanelConfig::default()).unwrap();
        assert_eq!(output.report.entries.len(), 1);
    }

    #[test]
    fn invalid_ratio_is_fatal() {
        let mut config = PanelConfig::default();
        config.split.ratio = 1.5;
        let err = run_dataset(&flat_feature_dataset(), &mixed_panel(), &config).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRatio { .. }));
    }

    #[test]
    fn standardization_can_be_disabled() {
        let mut config = PanelConfig::default();
        config.split.standardize = false;
        let prepared = prepare_split(&flat_feature_dataset(), &mixed_panel(), &config).unwrap();
        assert_eq!(prepared.scaling, Scaling::Disabled);
        assert_eq!(prepared.train.n_rows() + prepared.eval.n_rows(), 30);
    }
}
