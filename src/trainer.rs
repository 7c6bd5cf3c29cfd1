//! Utilities for running iterative trainers.

use crate::error::Result;
use crate::topology::CommitTarget;

use log::info;
use rand::Rng;
use std::time::{Duration, Instant};

/// A training algorithm that improves a network one step at a time.
pub trait IterableTrainer {
    /// Runs a single training iteration, returning its error.
    ///
    /// Any randomness the iteration needs is drawn from `rng`.
    fn apply<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<f64>;

    /// Returns the error of the most recent iteration.
    fn error(&self) -> f64;

    /// Returns the number of completed iterations.
    fn iteration(&self) -> usize;

    /// Redraws the trainable parameters from `rng`.
    fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()>;

    /// Writes the trained state back into a network.
    fn commit_changes(&self, target: &mut dyn CommitTarget);
}

/// A builder for running a trainer until some stop condition.
#[derive(Debug)]
pub struct TrainingLoop<T: IterableTrainer> {
    trainer: T,
    logging: Logging,
    stop_condition: StopCondition,
    commit_interval: Option<usize>,
}

impl<T: IterableTrainer> TrainingLoop<T> {
    /// Creates a new TrainingLoop instance.
    ///
    /// The loop is initialized with some default values. These defaults are:
    ///
    /// * Stops after 1000 training iterations.
    /// * Logs on training completion.
    /// * Only commits once training is complete.
    pub fn new(trainer: T) -> Self {
        TrainingLoop {
            trainer,
            logging: Logging::Completion,
            stop_condition: StopCondition::Iterations(1000),
            commit_interval: None,
        }
    }

    /// Sets the type of logging to be emitted during training.
    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = logging;
        self
    }

    /// Sets the condition to finish training.
    pub fn stop_condition<C>(mut self, condition: C) -> Self
    where
        C: Into<StopCondition>,
    {
        self.stop_condition = condition.into();
        self
    }

    /// Commits to the target every `iterations` iterations, in addition to
    /// the final commit.
    pub fn commit_every(mut self, iterations: usize) -> Self {
        self.commit_interval = Some(iterations);
        self
    }

    /// Trains until the stop condition holds, returning the trainer.
    pub fn run<R: Rng + ?Sized>(self, rng: &mut R) -> Result<T> {
        self.run_inner(rng, None)
    }

    /// Trains until the stop condition holds, committing into `target`
    /// periodically and once more at the end.
    pub fn run_committing<R: Rng + ?Sized>(
        self,
        rng: &mut R,
        target: &mut dyn CommitTarget,
    ) -> Result<T> {
        self.run_inner(rng, Some(target))
    }

    fn run_inner<R: Rng + ?Sized>(
        mut self,
        rng: &mut R,
        mut target: Option<&mut dyn CommitTarget>,
    ) -> Result<T> {
        let mut progress = Progress::new(&self.trainer);
        loop {
            let training_error = self.trainer.apply(rng)?;
            progress.steps += 1;

            self.logging.iteration(&progress, &self.trainer);
            if let (Some(interval), Some(target)) = (self.commit_interval, target.as_deref_mut()) {
                if interval > 0 && progress.steps % interval == 0 {
                    self.trainer.commit_changes(target);
                    progress.commits += 1;
                }
            }
            if self.stop_condition.should_stop(&progress, training_error) {
                break;
            }
        }
        if let Some(target) = target {
            self.trainer.commit_changes(target);
            progress.commits += 1;
        }
        self.logging.completion(&progress, &self.trainer);
        Ok(self.trainer)
    }
}

/// Bookkeeping for one call to `TrainingLoop::run`.
#[derive(Copy, Clone, Debug)]
struct Progress {
    /// Iterations applied by this run.
    steps: usize,
    /// The trainer's own iteration count when the run began.
    first_iteration: usize,
    /// The trainer's error when the run began.
    initial_error: f64,
    commits: usize,
    started: Instant,
}

impl Progress {
    fn new<T: IterableTrainer>(trainer: &T) -> Self {
        Progress {
            steps: 0,
            first_iteration: trainer.iteration(),
            initial_error: trainer.error(),
            commits: 0,
            started: Instant::now(),
        }
    }
}

/// Logging frequency to use during training
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Logging {
    /// No logs will be emitted
    Silent,
    /// A summary will be logged at completion
    Completion,
    /// The error will be logged after every `n` iterations of a run
    Iterations(usize),
}

impl Logging {
    fn iteration<T: IterableTrainer>(&self, progress: &Progress, trainer: &T) {
        if let Logging::Iterations(freq) = *self {
            if freq > 0 && progress.steps % freq == 0 {
                info!(
                    "Iteration {} (step {} of this run): MSE={}",
                    trainer.iteration(),
                    progress.steps,
                    trainer.error()
                );
            }
        }
    }

    fn completion<T: IterableTrainer>(&self, progress: &Progress, trainer: &T) {
        if let Logging::Silent = *self {
            return;
        }
        info!(
            "Trained iterations {}..{} in {:.3} seconds, MSE {} -> {}, {} commits",
            progress.first_iteration,
            trainer.iteration(),
            progress.started.elapsed().as_secs_f64(),
            progress.initial_error,
            trainer.error(),
            progress.commits
        );
    }
}

/// When to stop training
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StopCondition {
    /// Stops after this many iterations of the current run
    Iterations(usize),
    /// Stops once an iteration's error falls below the threshold
    ErrorThreshold(f64),
    /// Stops after the run has taken this long
    Duration(Duration),
}

impl From<Duration> for StopCondition {
    fn from(duration: Duration) -> StopCondition {
        StopCondition::Duration(duration)
    }
}

impl StopCondition {
    fn should_stop(&self, progress: &Progress, training_error: f64) -> bool {
        match *self {
            StopCondition::Iterations(limit) => progress.steps >= limit,
            StopCondition::ErrorThreshold(threshold) => training_error < threshold,
            StopCondition::Duration(limit) => progress.started.elapsed() > limit,
        }
    }
}
