//! Fan-out/fan-in execution of a panel over a small pool of scoped threads.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, mpsc::channel};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::{MetricKind, Panel, PanelInputs, Procedure, ProcedureResult, run};
use crate::error::PipelineError;

/// A procedure that completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcedureRecord {
    pub name: String,
    pub metric: MetricKind,
    pub result: ProcedureResult,
    pub elapsed: Duration,
}

/// A procedure whose run returned an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedProcedure {
    pub name: String,
    pub reason: String,
}

/// Outcome of running every procedure in a panel, in panel order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PanelRun {
    pub records: Vec<ProcedureRecord>,
    pub skipped: Vec<SkippedProcedure>,
}

impl PanelRun {
    /// Number of hypothesis tests that produced a p-value.
    pub fn test_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.metric == MetricKind::PValue)
            .count()
    }
}

type Outcome = (usize, Result<ProcedureRecord, SkippedProcedure>);

/// Run every procedure in `panel` on up to `workers` threads.
///
/// Procedures only borrow `inputs`. A failing procedure is logged and reported as
/// skipped; it never stops the others, and neither does a panic inside a model. Results come back in panel order whatever
/// order the workers finish in.
pub fn run_panel(panel: &Panel, inputs: &PanelInputs<'_>, alpha: f64, workers: usize) -> PanelRun {
    let jobs = panel.len();
    if jobs == 0 {
        return PanelRun::default();
    }
    let worker_count = workers.clamp(1, jobs);
    info!("Running {jobs} procedures on {worker_count} workers");
    let queue: Mutex<VecDeque<(usize, &Procedure)>> =
        Mutex::new(panel.procedures().iter().enumerate().collect());
    let (tx, rx) = channel::<Outcome>();

    std::thread::scope(|scope| {
        for _ in 0..worker_count {
            let queue = &queue;
            let tx = tx.clone();
            scope.spawn(move || {
                loop {
                    let next = {
                        let mut guard = match queue.lock() {
                            Ok(guard) => guard,
                            Err(_) => return,
                        };
                        guard.pop_front()
                    };
                    let Some((index, procedure)) = next else {
                        break;
                    };
                    let _ = tx.send((index, run_one(procedure, inputs, alpha)));
                }
            });
        }
    });
    drop(tx);

    collect_outcomes(rx, jobs)
}

fn run_one(
    procedure: &Procedure,
    inputs: &PanelInputs<'_>,
    alpha: f64,
) -> Result<ProcedureRecord, SkippedProcedure> {
    let name = procedure.name();
    let started = Instant::now();
    match guarded(name, || run(procedure, inputs, alpha)) {
        Ok(result) => {
            let elapsed = started.elapsed();
            debug!("{name} finished in {:.1} ms", elapsed.as_secs_f64() * 1000.0);
            Ok(ProcedureRecord {
                name: name.to_string(),
                metric: procedure.metric(),
                result,
                elapsed,
            })
        }
        Err(err) => {
            if err.is_local() {
                warn!("Skipping {name}: {err}");
            } else {
                error!("Skipping {name} after unexpected error: {err}");
            }
            Err(SkippedProcedure {
                name: name.to_string(),
                reason: err.to_string(),
            })
        }
    }
}

/// Run `job`, turning a panic into a `FitFailure` for `name`.
fn guarded<T>(
    name: &str,
    job: impl FnOnce() -> Result<T, PipelineError>,
) -> Result<T, PipelineError> {
    catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
        Err(PipelineError::FitFailure {
            procedure: name.to_string(),
            reason: format!("panicked: {}", panic_message(payload.as_ref())),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}

fn collect_outcomes(rx: std::sync::mpsc::Receiver<Outcome>, jobs: usize) -> PanelRun {
    let mut slots: Vec<Option<Result<ProcedureRecord, SkippedProcedure>>> = vec![None; jobs];
    while let Ok((index, outcome)) = rx.recv() {
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(outcome);
        }
    }
    let mut run = PanelRun::default();
    for outcome in slots.into_iter().flatten() {
        match outcome {
            Ok(record) => run.records.push(record),
            Err(skipped) => run.skipped.push(skipped),
        }
    }
    run
}
