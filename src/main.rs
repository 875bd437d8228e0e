use std::{env, fs, time::Duration};

use anyhow::Context;
use log::{info, warn};
use tokio::{signal, task};

use runner_state::{
    EntryPoint, Phase, PhaseConfig, PhaseState, RunConfig, State, StopSignal, Timer,
};

const BATCHES_PER_PHASE: usize = 32;
const BATCH_SIZE: usize = 8;

type Batches = Vec<Vec<f32>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match env::var("RUNNER_CONFIG") {
        Ok(path) => {
            let json = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            RunConfig::from_json(&json)?
        }
        Err(_) => default_config(),
    };

    let state: State<Batches, f32> = config.into_state(synthetic_batches)?;
    info!(entry_point = state.entry_point().as_str(); "starting run");

    let stop = state.stop_signal();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    });

    let state = task::spawn_blocking(move || drive(state)).await?;
    report(&state);

    Ok(())
}

fn default_config() -> RunConfig {
    RunConfig {
        entry_point: EntryPoint::Fit,
        train: Some(PhaseConfig {
            max_epochs: Some(3),
            max_steps_per_epoch: Some(16),
            ..Default::default()
        }),
        eval: Some(PhaseConfig {
            max_steps_per_epoch: Some(4),
            evaluate_every_n_epochs: Some(1),
            ..Default::default()
        }),
        predict: None,
    }
}

fn synthetic_batches(phase: Phase) -> Batches {
    let offset = match phase {
        Phase::Train => 0.0,
        Phase::Evaluate => 0.25,
        Phase::Predict => 0.5,
    };

    (0..BATCHES_PER_PHASE)
        .map(|b| {
            (0..BATCH_SIZE)
                .map(|i| ((b * BATCH_SIZE + i) as f32 * 0.1 + offset).sin())
                .collect()
        })
        .collect()
}

/// Stand-in for a user step function: mean of squares over the batch.
fn step(batch: &[f32]) -> f32 {
    batch.iter().map(|x| x * x).sum::<f32>() / batch.len().max(1) as f32
}

fn drive(mut state: State<Batches, f32>) -> State<Batches, f32> {
    let stop = state.stop_signal();

    match state.entry_point() {
        EntryPoint::Fit | EntryPoint::Train => train(&mut state, &stop),
        EntryPoint::Evaluate => {
            if let Some(eval) = state.eval_state.as_mut() {
                run_epoch(Phase::Evaluate, eval, &mut state.timer, &stop);
            }
        }
        EntryPoint::Predict => {
            if let Some(predict) = state.predict_state.as_mut() {
                run_epoch(Phase::Predict, predict, &mut state.timer, &stop);
            }
        }
    }

    if state.should_stop() {
        warn!("run ended early on stop request");
    }

    state
}

fn train(state: &mut State<Batches, f32>, stop: &StopSignal) {
    let Some(mut train) = state.train_state.take() else {
        warn!("no train state configured, nothing to do");
        return;
    };

    if train.data_source.is_empty() {
        warn!("train data source is empty, nothing to do");
        state.train_state = Some(train);
        return;
    }

    while !train.is_done() && !stop.is_set() {
        let steps_before = train.progress.num_steps_completed();

        for idx in 0..train.data_source.len() {
            if train.is_epoch_done() || stop.is_set() {
                break;
            }

            let out = state
                .timer
                .time("train_step", || step(&train.data_source[idx]));
            train.step_output = Some(out);
            train.progress.increment_step();

            if let Some(eval) = state.eval_state.as_mut() {
                if eval.should_evaluate_after_step(&train.progress) {
                    run_epoch(Phase::Evaluate, eval, &mut state.timer, stop);
                }
            }
        }

        if stop.is_set() {
            break;
        }

        train.progress.increment_epoch();
        info!(
            epoch = train.progress.num_epochs_completed(),
            steps = train.progress.num_steps_completed();
            "train epoch completed"
        );

        if let Some(eval) = state.eval_state.as_mut() {
            if eval.should_evaluate_after_epoch(&train.progress) {
                run_epoch(Phase::Evaluate, eval, &mut state.timer, stop);
            }
        }

        if train.progress.num_steps_completed() == steps_before && train.max_epochs().is_none() {
            warn!("train epoch made no progress and no epoch limit is set, stopping");
            break;
        }
    }

    state.train_state = Some(train);
}

/// Runs one pass over `phase_state`'s data, bounded by its per-epoch limit.
fn run_epoch(
    phase: Phase,
    phase_state: &mut PhaseState<Batches, f32>,
    timer: &mut Timer,
    stop: &StopSignal,
) {
    let action = format!("{phase}_step");

    for idx in 0..phase_state.data_source.len() {
        if phase_state.is_epoch_done() || stop.is_set() {
            break;
        }

        let out = timer.time(&action, || step(&phase_state.data_source[idx]));
        phase_state.step_output = Some(out);
        phase_state.progress.increment_step();
    }

    if stop.is_set() {
        return;
    }

    phase_state.progress.increment_epoch();
    info!(
        phase = phase.as_str(),
        steps = phase_state.progress.num_steps_completed();
        "{phase} pass completed"
    );
}

fn report(state: &State<Batches, f32>) {
    for phase in state.entry_point().phases() {
        let Some(phase_state) = state.phase(*phase) else {
            continue;
        };

        info!(
            phase = phase.as_str(),
            epochs = phase_state.progress.num_epochs_completed(),
            steps = phase_state.progress.num_steps_completed(),
            total_ms = millis(state.timer.total(&format!("{phase}_step")));
            "last step output: {:?}",
            phase_state.step_output
        );
    }

    info!(elapsed_ms = millis(state.timer.elapsed()); "run finished");
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
