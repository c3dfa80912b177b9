//! Command-line entry point: run the standard panel for a catalog dataset.

use std::path::PathBuf;

use statpanel::config::{self, PanelConfig};
use statpanel::dataset::{self, DatasetId};
use statpanel::logging;
use statpanel::pipeline;
use statpanel::report::{render_result, render_summary};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let mut config = match &options.config {
        Some(path) => config::load_from_path(path),
        None => config::load_or_default(),
    }
    .map_err(|err| err.to_string())?;
    options.apply(&mut config);
    config.validate().map_err(|err| err.to_string())?;

    if let Some(path) = &options.write_config {
        config::save_to_path(&config, path).map_err(|err| err.to_string())?;
        println!("Wrote config to {}", path.display());
    }

    if options.describe {
        let data_dir = config.resolved_data_dir().map_err(|err| err.to_string())?;
        let loaded = dataset::load(options.dataset, &data_dir).map_err(|err| err.to_string())?;
        print!("{}", dataset::describe(&loaded).render());
        return Ok(());
    }

    let output = pipeline::run(options.dataset, &config).map_err(|err| err.to_string())?;
    for record in &output.run.records {
        println!("{}", render_result(&record.name, &record.result));
    }
    println!("{}", render_summary(&output.report));

    if let Some(path) = &options.json {
        let json = output.report.to_json().map_err(|err| err.to_string())?;
        std::fs::write(path, json)
            .map_err(|err| format!("Failed to write {}: {err}", path.display()))?;
        println!("Wrote report to {}", path.display());
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct CliOptions {
    dataset: DatasetId,
    data_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    json: Option<PathBuf>,
    write_config: Option<PathBuf>,
    workers: Option<usize>,
    ratio: Option<f64>,
    seed: Option<u64>,
    alpha: Option<f64>,
    no_standardize: bool,
    describe: bool,
}

impl CliOptions {
    /// Command-line values override the config file.
    fn apply(&self, config: &mut PanelConfig) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(ratio) = self.ratio {
            config.split.ratio = ratio;
        }
        if let Some(seed) = self.seed {
            config.split.seed = seed;
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if self.no_standardize {
            config.split.standardize = false;
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut dataset: Option<DatasetId> = None;
    let mut data_dir: Option<PathBuf> = None;
    let mut config: Option<PathBuf> = None;
    let mut json: Option<PathBuf> = None;
    let mut write_config: Option<PathBuf> = None;
    let mut workers: Option<usize> = None;
    let mut ratio: Option<f64> = None;
    let mut seed: Option<u64> = None;
    let mut alpha: Option<f64> = None;
    let mut no_standardize = false;
    let mut describe = false;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--dataset" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--dataset requires a value".to_string())?;
                dataset = Some(value.parse::<DatasetId>()?);
            }
            "--data-dir" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--data-dir requires a value".to_string())?;
                data_dir = Some(PathBuf::from(value));
            }
            "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                config = Some(PathBuf::from(value));
            }
            "--json" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--json requires a value".to_string())?;
                json = Some(PathBuf::from(value));
            }
            "--write-config" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--write-config requires a value".to_string())?;
                write_config = Some(PathBuf::from(value));
            }
            "--workers" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--workers requires a value".to_string())?;
                workers = Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| format!("Invalid --workers value: {value}"))?,
                );
            }
            "--ratio" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--ratio requires a value".to_string())?;
                ratio = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("Invalid --ratio value: {value}"))?,
                );
            }
            "--seed" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--seed requires a value".to_string())?;
                seed = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("Invalid --seed value: {value}"))?,
                );
            }
            "--alpha" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--alpha requires a value".to_string())?;
                alpha = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("Invalid --alpha value: {value}"))?,
                );
            }
            "--no-standardize" => {
                no_standardize = true;
            }
            "--describe" => {
                describe = true;
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    let dataset = dataset.ok_or_else(help_text)?;
    Ok(CliOptions {
        dataset,
        data_dir,
        config,
        json,
        write_config,
        workers,
        ratio,
        seed,
        alpha,
        no_standardize,
        describe,
    })
}

fn help_text() -> String {
    [
        "statpanel",
        "",
        "Runs a panel of classifiers or statistical tests on a dataset and ranks the results.",
        "",
        "Usage:",
        "  statpanel --dataset <wine|diabetes> [options]",
        "",
        "Options:",
        "  --dataset <name>       Catalog dataset: wine (classifiers) or diabetes (tests) (required).",
        "  --data-dir <dir>       Directory holding <name>.csv (default: $STATPANEL_DATA_DIR or ~/.statpanel/data).",
        "  --config <file>        Config file (default: ~/.statpanel/config.toml).",
        "  --json <file>          Also write the ranked report as JSON.",
        "  --workers <n>          Worker threads, 0 = available parallelism (default: 0).",
        "  --ratio <f64>          Evaluation fraction of the split (default: 0.2).",
        "  --seed <u64>           Split seed (default: 42).",
        "  --alpha <f64>          Significance level (default: 0.05).",
        "  --no-standardize       Feed raw features to the classifiers.",
        "  --describe             Print per-feature summary statistics and exit.",
        "  --write-config <file>  Save the effective configuration as TOML.",
    ]
    .join("\n")
}
