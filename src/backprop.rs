//! Array-backed [backpropagation](https://en.wikipedia.org/wiki/Backpropagation)
//! with momentum.
//!
//! # Example
//!
//! Train the weights of a small topology, then copy them back into it:
//!
//! ```
//! # use shadownet::backprop::*;
//! # use shadownet::{IterableTrainer, NetworkTopology, TrainingSet, TransferFunction};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut topology = NetworkTopology::layered(&[2, 3, 1], TransferFunction::Logistic);
//! let examples = [([0.0, 0.0], [0.0]),
//!                 ([0.0, 1.0], [1.0]),
//!                 ([1.0, 0.0], [1.0]),
//!                 ([1.0, 1.0], [0.0])];
//! let training_set = TrainingSet::new(&examples[..]).unwrap();
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut trainer = BackpropConfig::new()
//!     .learning_rate(0.5)
//!     .momentum(0.9)
//!     .update_method(UpdateMethod::Epoch)
//!     .build(&topology, training_set)
//!     .unwrap();
//! trainer.randomize(&mut rng).unwrap();
//! for _ in 0..10 {
//!     trainer.apply(&mut rng).unwrap();
//! }
//! trainer.commit_changes(&mut topology);
//! assert_eq!(trainer.iteration(), 10);
//! ```

use crate::dataset::TrainingSet;
use crate::error::{Result, TrainingError};
use crate::randomizer::WeightInit;
use crate::shadow::ShadowNetwork;
use crate::topology::{CommitTarget, NetworkTopology};
use crate::trainer::IterableTrainer;

use log::{debug, trace};
use ndarray::Array1;
use rand::Rng;

/// Default learning rate.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Default momentum.
pub const DEFAULT_MOMENTUM: f64 = 0.0;

/// Which rows of the training set each iteration processes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateMethod {
    /// Every row, with gradients averaged into a single update.
    Epoch,
    /// Reserved. Selecting it fails with `TrainingError::NotImplemented`.
    Batch,
    /// One uniformly random row.
    Stochastic,
    /// The given number of distinct random rows, with gradients averaged
    /// into a single update.
    MiniBatch(usize),
    /// The row given by the iteration count modulo the number of rows.
    Single,
}

impl Default for UpdateMethod {
    fn default() -> Self {
        UpdateMethod::Stochastic
    }
}

/// Settings for a `BackpropTrainer`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackpropConfig {
    pub learning_rate: f64,
    /// Fraction of the previous update added to the next. Must be in
    /// `[0, 1]`.
    pub momentum: f64,
    pub update_method: UpdateMethod,
    /// Distribution used by `randomize` for weights.
    pub weight_init: WeightInit,
}

impl Default for BackpropConfig {
    fn default() -> Self {
        BackpropConfig {
            learning_rate: DEFAULT_LEARNING_RATE,
            momentum: DEFAULT_MOMENTUM,
            update_method: UpdateMethod::default(),
            weight_init: WeightInit::default(),
        }
    }
}

impl BackpropConfig {
    /// Creates a new config.
    ///
    /// The config is initialized with some default values. These defaults
    /// are:
    ///
    /// * A learning rate of 0.1.
    /// * No momentum.
    /// * A stochastic update method.
    /// * Weights drawn from a standard normal distribution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the learning rate to use during gradient descent.
    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }

    /// Sets the momentum.
    pub fn momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }

    /// Sets the `UpdateMethod` to use for training.
    pub fn update_method(mut self, method: UpdateMethod) -> Self {
        self.update_method = method;
        self
    }

    /// Sets the distribution weights are drawn from when randomizing.
    pub fn weight_init(mut self, init: WeightInit) -> Self {
        self.weight_init = init;
        self
    }

    /// Builds a trainer for `topology`.
    ///
    /// Every setting and the shape of the training set are checked here,
    /// once; iterations only fail on missing data or numerical blow-up.
    pub fn build(
        self,
        topology: &NetworkTopology,
        training_set: TrainingSet,
    ) -> Result<BackpropTrainer> {
        let network = ShadowNetwork::from_topology(topology)?;
        check_learning_rate(self.learning_rate)?;
        check_momentum(self.momentum)?;
        self.weight_init.validate()?;
        training_set.validate(network.input_len(), network.output_len())?;
        check_update_method(self.update_method, training_set.num_rows())?;

        debug!(
            "Built backprop trainer: {} layers, {} inputs, {} outputs, {:?}",
            network.layers().len() + 1,
            network.input_len(),
            network.output_len(),
            self.update_method
        );
        Ok(BackpropTrainer {
            errors: Array1::zeros(network.output_len()),
            network,
            training_set,
            config: self,
            iteration: 0,
            mse: 0.0,
            last_rows: Vec::new(),
        })
    }
}

/// Trains a layered network with backpropagation, using a shadow copy of
/// its state.
#[derive(Clone, Debug)]
pub struct BackpropTrainer {
    network: ShadowNetwork,
    training_set: TrainingSet,
    config: BackpropConfig,
    iteration: usize,
    /// Mean squared error of the most recent iteration.
    mse: f64,
    /// Errors (target minus output) for the most recent row.
    errors: Array1<f64>,
    /// Rows processed by the most recent iteration.
    last_rows: Vec<usize>,
}

impl BackpropTrainer {
    /// Creates a trainer with the default configuration.
    pub fn new(topology: &NetworkTopology, training_set: TrainingSet) -> Result<Self> {
        BackpropConfig::default().build(topology, training_set)
    }

    pub fn config(&self) -> &BackpropConfig {
        &self.config
    }

    pub fn learning_rate(&self) -> f64 {
        self.config.learning_rate
    }

    pub fn set_learning_rate(&mut self, rate: f64) -> Result<()> {
        check_learning_rate(rate)?;
        self.config.learning_rate = rate;
        Ok(())
    }

    pub fn momentum(&self) -> f64 {
        self.config.momentum
    }

    pub fn set_momentum(&mut self, momentum: f64) -> Result<()> {
        check_momentum(momentum)?;
        self.config.momentum = momentum;
        Ok(())
    }

    pub fn update_method(&self) -> UpdateMethod {
        self.config.update_method
    }

    pub fn set_update_method(&mut self, method: UpdateMethod) -> Result<()> {
        check_update_method(method, self.training_set.num_rows())?;
        self.config.update_method = method;
        Ok(())
    }

    pub fn training_set(&self) -> &TrainingSet {
        &self.training_set
    }

    /// Replaces the training data, checking it against the network.
    pub fn set_training_set(&mut self, training_set: TrainingSet) -> Result<()> {
        training_set.validate(self.network.input_len(), self.network.output_len())?;
        check_update_method(self.config.update_method, training_set.num_rows())?;
        self.training_set = training_set;
        Ok(())
    }

    /// Returns the shadow network being trained.
    pub fn network(&self) -> &ShadowNetwork {
        &self.network
    }

    /// Returns the rows processed by the most recent iteration.
    pub fn last_rows(&self) -> &[usize] {
        &self.last_rows
    }

    /// Returns target minus output for the most recently processed row.
    pub fn errors(&self) -> &Array1<f64> {
        &self.errors
    }
}

impl IterableTrainer for BackpropTrainer {
    fn apply<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<f64> {
        let (inputs, targets) = self.training_set.data()?;
        let rows = select_rows(self.config.update_method, inputs.nrows(), self.iteration, rng)?;
        let output_len = self.network.output_len() as f64;

        self.network.clear_gradients();
        let mut error = 0.0;
        for &row in &rows {
            self.network.feed_forward(inputs.row(row))?;
            self.errors.assign(&targets.row(row));
            self.errors -= self.network.output();
            let row_error = self.errors.dot(&self.errors) / output_len;
            if !row_error.is_finite() {
                return Err(TrainingError::NonFinite {
                    layer: self.network.layers().len(),
                    quantity: "error",
                });
            }
            error += row_error;
            self.network.feed_backwards(&self.errors)?;
            self.network.accumulate_gradients();
        }
        self.network.check_gradients()?;
        let scale = 1.0 / rows.len() as f64;
        self.network
            .apply_updates(self.config.learning_rate, self.config.momentum, scale);

        self.mse = error * scale;
        self.iteration += 1;
        trace!("Iteration {}: rows {:?}, MSE={}", self.iteration, rows, self.mse);
        self.last_rows = rows;
        Ok(self.mse)
    }

    fn error(&self) -> f64 {
        self.mse
    }

    fn iteration(&self) -> usize {
        self.iteration
    }

    fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        debug!("Randomizing weights from {:?}", self.config.weight_init);
        self.network.randomize(&self.config.weight_init, rng)
    }

    fn commit_changes(&self, target: &mut dyn CommitTarget) {
        self.network.commit(target);
    }
}

/// Chooses the rows of a `num_rows` training set that one iteration of
/// `method` processes.
pub fn select_rows<R: Rng + ?Sized>(
    method: UpdateMethod,
    num_rows: usize,
    iteration: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    if num_rows == 0 {
        return Err(TrainingError::EmptyTrainingSet);
    }
    match method {
        UpdateMethod::Epoch => Ok((0..num_rows).collect()),
        UpdateMethod::Stochastic => Ok(vec![rng.gen_range(0..num_rows)]),
        UpdateMethod::Single => Ok(vec![iteration % num_rows]),
        UpdateMethod::MiniBatch(size) => {
            check_batch_size(size, num_rows)?;
            Ok(rand::seq::index::sample(rng, num_rows, size).into_vec())
        }
        UpdateMethod::Batch => Err(TrainingError::NotImplemented(method)),
    }
}

fn check_learning_rate(rate: f64) -> Result<()> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(TrainingError::InvalidParameter {
            name: "learning rate",
            value: rate,
        });
    }
    Ok(())
}

fn check_momentum(momentum: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&momentum) {
        return Err(TrainingError::InvalidParameter {
            name: "momentum",
            value: momentum,
        });
    }
    Ok(())
}

/// Rejects unimplemented methods, and mini-batches that don't fit in
/// `num_rows` once data is loaded.
fn check_update_method(method: UpdateMethod, num_rows: Option<usize>) -> Result<()> {
    match method {
        UpdateMethod::Batch => Err(TrainingError::NotImplemented(method)),
        UpdateMethod::MiniBatch(size) => match num_rows {
            Some(rows) => check_batch_size(size, rows),
            None if size == 0 => Err(TrainingError::InvalidBatchSize { size, rows: 0 }),
            None => Ok(()),
        },
        _ => Ok(()),
    }
}

fn check_batch_size(size: usize, rows: usize) -> Result<()> {
    if size == 0 || size > rows {
        return Err(TrainingError::InvalidBatchSize { size, rows });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::transfer::TransferFunction;

    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn two_to_one(weights: [f64; 2]) -> NetworkTopology {
        let mut topology = NetworkTopology::layered(&[2, 1], TransferFunction::linear());
        topology
            .set_strengths(0, array![[weights[0]], [weights[1]]])
            .unwrap();
        topology
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1234)
    }

    /// A 1-1 linear network whose training rows are numbered by their
    /// input value.
    fn numbered_rows(num_rows: usize, method: UpdateMethod) -> BackpropTrainer {
        let topology = NetworkTopology::layered(&[1, 1], TransferFunction::linear());
        let inputs = Array2::from_shape_fn((num_rows, 1), |(r, _)| r as f64);
        let targets = Array2::zeros((num_rows, 1));
        BackpropConfig::new()
            .learning_rate(0.0)
            .update_method(method)
            .build(&topology, TrainingSet::from_arrays(inputs, targets))
            .unwrap()
    }

    #[test]
    fn single_example_step() {
        let topology = two_to_one([0.5, 0.5]);
        let training_set = TrainingSet::new(&[([1.0, -1.0], [1.0])][..]).unwrap();
        let mut trainer = BackpropConfig::new()
            .learning_rate(0.1)
            .momentum(0.0)
            .update_method(UpdateMethod::Single)
            .build(&topology, training_set)
            .unwrap();

        let error = trainer.apply(&mut rng()).unwrap();
        assert_abs_diff_eq!(error, 1.0);
        assert_abs_diff_eq!(trainer.network().output(), &array![0.0]);
        assert_abs_diff_eq!(trainer.errors(), &array![1.0]);

        let layer = &trainer.network().layers()[0];
        assert_abs_diff_eq!(layer.deltas(), &array![1.0]);
        assert_abs_diff_eq!(layer.weights(), &array![[0.6, 0.4]], epsilon = 1e-12);
        assert_abs_diff_eq!(layer.biases(), &array![0.1], epsilon = 1e-12);
    }

    #[test]
    fn zero_momentum_is_plain_gradient_descent() {
        let topology = two_to_one([0.2, -0.3]);
        let training_set = TrainingSet::new(&[([0.5, 2.0], [1.0])][..]).unwrap();
        let mut trainer = BackpropConfig::new()
            .learning_rate(0.05)
            .update_method(UpdateMethod::Single)
            .build(&topology, training_set)
            .unwrap();
        let mut rng = rng();
        for _ in 0..3 {
            let before = trainer.network().layers()[0].weights().clone();
            trainer.apply(&mut rng).unwrap();
            let layer = &trainer.network().layers()[0];
            let delta = layer.deltas()[0];
            let expected = &before + &(array![[0.5, 2.0]] * (0.05 * delta));
            assert_abs_diff_eq!(layer.weights(), &expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn momentum_accelerates_repeated_updates() {
        let training_set = || TrainingSet::new(&[([1.0, 0.0], [1.0])][..]).unwrap();
        let run = |momentum| {
            let mut trainer = BackpropConfig::new()
                .learning_rate(0.1)
                .momentum(momentum)
                .update_method(UpdateMethod::Single)
                .build(&two_to_one([0.0, 0.0]), training_set())
                .unwrap();
            let mut rng = rng();
            trainer.apply(&mut rng).unwrap();
            trainer.apply(&mut rng).unwrap();
            trainer.network().layers()[0].weights()[(0, 0)]
        };
        // The first step sets weight and bias to 0.1, so the second sees an
        // output of 0.2 and an error of 0.8.
        assert_abs_diff_eq!(run(0.0), 0.18, epsilon = 1e-12);
        // With momentum the second step also carries half the first.
        assert_abs_diff_eq!(run(0.5), 0.23, epsilon = 1e-12);
    }

    #[test]
    fn epoch_averages_every_row() {
        let topology = two_to_one([0.0, 0.0]);
        let examples = [([1.0, 0.0], [1.0]), ([0.0, 1.0], [-1.0])];
        let mut trainer = BackpropConfig::new()
            .learning_rate(1.0)
            .update_method(UpdateMethod::Epoch)
            .build(&topology, TrainingSet::new(&examples[..]).unwrap())
            .unwrap();
        let error = trainer.apply(&mut rng()).unwrap();
        assert_eq!(trainer.last_rows(), &[0, 1]);
        assert_abs_diff_eq!(error, 1.0);
        let layer = &trainer.network().layers()[0];
        assert_abs_diff_eq!(layer.weights(), &array![[0.5, -0.5]], epsilon = 1e-12);
        assert_abs_diff_eq!(layer.biases(), &array![0.0], epsilon = 1e-12);
    }

    #[test]
    fn stochastic_is_reproducible() {
        let picks = |seed| {
            let mut trainer = numbered_rows(10, UpdateMethod::Stochastic);
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| {
                    trainer.apply(&mut rng).unwrap();
                    trainer.last_rows()[0]
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(5), picks(5));
        assert!(picks(5).iter().all(|&r| r < 10));
    }

    #[test]
    fn mini_batch_picks_distinct_rows() {
        let mut trainer = numbered_rows(8, UpdateMethod::MiniBatch(3));
        let mut rng = rng();
        for _ in 0..10 {
            trainer.apply(&mut rng).unwrap();
            let mut rows = trainer.last_rows().to_vec();
            rows.sort_unstable();
            rows.dedup();
            assert_eq!(rows.len(), 3);
            assert!(rows.iter().all(|&r| r < 8));
        }
    }

    #[test]
    fn batch_is_not_implemented() {
        let topology = two_to_one([0.0, 0.0]);
        let training_set = TrainingSet::new(&[([1.0, 0.0], [1.0])][..]).unwrap();
        assert_eq!(
            BackpropConfig::new()
                .update_method(UpdateMethod::Batch)
                .build(&topology, training_set.clone())
                .unwrap_err(),
            TrainingError::NotImplemented(UpdateMethod::Batch)
        );
        let mut trainer = BackpropTrainer::new(&topology, training_set).unwrap();
        assert!(trainer.set_update_method(UpdateMethod::Batch).is_err());
        assert_eq!(trainer.update_method(), UpdateMethod::Stochastic);
    }

    #[test]
    fn too_large_batch_size() {
        let topology = two_to_one([0.0, 0.0]);
        let training_set = TrainingSet::new(&[([1.0, 0.0], [1.0])][..]).unwrap();
        assert_eq!(
            BackpropConfig::new()
                .update_method(UpdateMethod::MiniBatch(2))
                .build(&topology, training_set)
                .unwrap_err(),
            TrainingError::InvalidBatchSize { size: 2, rows: 1 }
        );
    }

    #[test]
    fn uninitialized_data() {
        let topology = two_to_one([0.5, 0.5]);
        let mut training_set = TrainingSet::default();
        training_set.set_input_data(array![[1.0, 1.0]]);
        let mut trainer = BackpropTrainer::new(&topology, training_set).unwrap();
        assert_eq!(
            trainer.apply(&mut rng()).unwrap_err(),
            TrainingError::DataNotInitialized
        );
        assert_eq!(trainer.iteration(), 0);
        assert!(trainer.last_rows().is_empty());
    }

    #[test]
    fn mismatched_training_set_is_rejected_at_construction() {
        let topology = two_to_one([0.5, 0.5]);
        let training_set = TrainingSet::new(&[([1.0], [1.0])][..]).unwrap();
        assert!(BackpropTrainer::new(&topology, training_set).is_err());

        let mut trainer = BackpropTrainer::new(&topology, TrainingSet::default()).unwrap();
        let bad = TrainingSet::from_arrays(array![[1.0, 1.0]], array![[1.0], [2.0]]);
        assert!(trainer.set_training_set(bad).is_err());
        assert!(trainer.training_set().input_data().is_none());
    }

    #[test]
    fn invalid_parameters() {
        let topology = two_to_one([0.5, 0.5]);
        let build = |config: BackpropConfig| config.build(&topology, TrainingSet::default());
        assert!(build(BackpropConfig::new().learning_rate(-0.1)).is_err());
        assert!(build(BackpropConfig::new().learning_rate(f64::NAN)).is_err());
        assert!(build(BackpropConfig::new().momentum(1.5)).is_err());
        let mut trainer = build(BackpropConfig::new()).unwrap();
        assert!(trainer.set_momentum(-0.5).is_err());
        assert!(trainer.set_momentum(0.9).is_ok());
        assert!(trainer.set_learning_rate(0.3).is_ok());
        assert_eq!(trainer.momentum(), 0.9);
        assert_eq!(trainer.learning_rate(), 0.3);
    }

    #[test]
    fn blow_up_leaves_parameters_untouched() {
        let topology = two_to_one([0.5, 0.5]);
        let examples = [([1.0, 1.0], [1.0]), ([f64::INFINITY, 1.0], [1.0])];
        let mut trainer = BackpropConfig::new()
            .update_method(UpdateMethod::Epoch)
            .build(&topology, TrainingSet::new(&examples[..]).unwrap())
            .unwrap();
        let before = trainer.network().layers()[0].weights().clone();
        assert!(matches!(
            trainer.apply(&mut rng()),
            Err(TrainingError::NonFinite { layer: 1, .. })
        ));
        assert_eq!(trainer.network().layers()[0].weights(), &before);
        assert_eq!(trainer.iteration(), 0);
    }

    #[test]
    fn overflowing_error_leaves_parameters_untouched() {
        let mut topology = NetworkTopology::layered(&[1, 1], TransferFunction::linear());
        topology.set_strengths(0, array![[1e200]]).unwrap();
        let training_set = TrainingSet::new(&[([1e100], [0.0])][..]).unwrap();
        let mut trainer = BackpropConfig::new()
            .update_method(UpdateMethod::Single)
            .build(&topology, training_set)
            .unwrap();
        assert_eq!(
            trainer.apply(&mut rng()).unwrap_err(),
            TrainingError::NonFinite {
                layer: 1,
                quantity: "error",
            }
        );
        assert_eq!(trainer.network().layers()[0].weights(), &array![[1e200]]);
        assert_eq!(trainer.network().layers()[0].biases(), &array![0.0]);
        assert_eq!(trainer.iteration(), 0);
    }

    #[test]
    fn overflowing_gradient_leaves_parameters_untouched() {
        // The output error is only -10, but error times input overflows.
        let mut topology = NetworkTopology::layered(&[1, 1], TransferFunction::linear());
        topology.set_strengths(0, array![[1e-307]]).unwrap();
        let training_set = TrainingSet::new(&[([1e308], [0.0])][..]).unwrap();
        let mut trainer = BackpropConfig::new()
            .update_method(UpdateMethod::Single)
            .build(&topology, training_set)
            .unwrap();
        assert_eq!(
            trainer.apply(&mut rng()).unwrap_err(),
            TrainingError::NonFinite {
                layer: 1,
                quantity: "gradient",
            }
        );
        assert_eq!(trainer.network().layers()[0].weights(), &array![[1e-307]]);
        assert_eq!(trainer.iteration(), 0);
        assert!(trainer.network().check_gradients().is_err());

        // The next attempt starts from a clean accumulator.
        trainer.set_training_set(TrainingSet::new(&[([1.0], [0.0])][..]).unwrap()).unwrap();
        assert!(trainer.apply(&mut rng()).is_ok());
        assert_eq!(trainer.iteration(), 1);
    }

    #[test]
    fn commit_round_trip() {
        let mut topology = NetworkTopology::layered(&[2, 2, 1], TransferFunction::Logistic);
        let examples = [([0.0, 1.0], [1.0]), ([1.0, 1.0], [0.0])];
        let mut trainer = BackpropConfig::new()
            .momentum(0.5)
            .update_method(UpdateMethod::Epoch)
            .build(&topology, TrainingSet::new(&examples[..]).unwrap())
            .unwrap();
        let mut rng = rng();
        trainer.randomize(&mut rng).unwrap();
        for _ in 0..5 {
            trainer.apply(&mut rng).unwrap();
        }
        trainer.commit_changes(&mut topology);

        let rebuilt = BackpropTrainer::new(&topology, TrainingSet::default()).unwrap();
        for (i, (a, b)) in rebuilt
            .network()
            .layers()
            .iter()
            .zip(trainer.network().layers())
            .enumerate()
        {
            assert_eq!(a.weights(), b.weights());
            assert_eq!(a.biases(), b.biases());
            assert_eq!(
                topology.layers()[i + 1].activations(),
                b.activations().as_slice().unwrap()
            );
        }
    }

    #[test]
    fn training_reduces_error() {
        let topology = NetworkTopology::layered(&[2, 4, 1], TransferFunction::Logistic);
        let examples = [
            ([0.0, 0.0], [0.0]),
            ([0.0, 1.0], [1.0]),
            ([1.0, 0.0], [1.0]),
            ([1.0, 1.0], [0.0]),
        ];
        let mut trainer = BackpropConfig::new()
            .learning_rate(0.5)
            .momentum(0.5)
            .update_method(UpdateMethod::Epoch)
            .build(&topology, TrainingSet::new(&examples[..]).unwrap())
            .unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        trainer.randomize(&mut rng).unwrap();
        let first = trainer.apply(&mut rng).unwrap();
        let mut last = first;
        for _ in 0..2000 {
            last = trainer.apply(&mut rng).unwrap();
        }
        assert!(last < first, "MSE went from {} to {}", first, last);
    }

    proptest! {
        #[test]
        fn single_mode_processes_iteration_mod_rows(num_rows in 1usize..20, steps in 0usize..50) {
            let mut trainer = numbered_rows(num_rows, UpdateMethod::Single);
            let mut rng = rng();
            for _ in 0..steps {
                trainer.apply(&mut rng).unwrap();
            }
            prop_assert_eq!(trainer.iteration(), steps);
            trainer.apply(&mut rng).unwrap();
            prop_assert_eq!(trainer.last_rows(), &[steps % num_rows][..]);
            prop_assert_eq!(trainer.iteration(), steps + 1);
            // Rows are numbered by their input value.
            prop_assert_eq!(trainer.network().input()[0], (steps % num_rows) as f64);
        }
    }
}
