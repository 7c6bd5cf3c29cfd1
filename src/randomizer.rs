//! Random initialization of weights and biases.

use crate::error::{Result, TrainingError};

use ndarray::{Array, Dimension};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::Normal;

/// How weights are drawn when a trainer is randomized.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WeightInit {
    /// Gaussian with the given mean and standard deviation.
    Normal { mean: f64, std_dev: f64 },
    /// Uniform over `[low, high)`.
    Uniform { low: f64, high: f64 },
}

impl Default for WeightInit {
    fn default() -> Self {
        WeightInit::Normal {
            mean: 0.0,
            std_dev: 1.0,
        }
    }
}

impl WeightInit {
    /// Checks the distribution parameters without drawing anything.
    pub fn validate(&self) -> Result<()> {
        match *self {
            WeightInit::Normal { mean, std_dev } => {
                if !mean.is_finite() {
                    return Err(TrainingError::InvalidParameter { name: "mean", value: mean });
                }
                if !std_dev.is_finite() || std_dev < 0.0 {
                    return Err(TrainingError::InvalidParameter {
                        name: "std_dev",
                        value: std_dev,
                    });
                }
            }
            WeightInit::Uniform { low, high } => {
                if !low.is_finite() {
                    return Err(TrainingError::InvalidParameter { name: "low", value: low });
                }
                if !high.is_finite() || high <= low {
                    return Err(TrainingError::InvalidParameter { name: "high", value: high });
                }
            }
        }
        Ok(())
    }

    /// Overwrites every element of `array` with a fresh sample.
    pub fn fill<D, R>(&self, array: &mut Array<f64, D>, rng: &mut R) -> Result<()>
    where
        D: Dimension,
        R: Rng + ?Sized,
    {
        self.validate()?;
        match *self {
            WeightInit::Normal { mean, std_dev } => {
                let dist = Normal::new(mean, std_dev).map_err(|_| {
                    TrainingError::InvalidParameter {
                        name: "std_dev",
                        value: std_dev,
                    }
                })?;
                sample_into(array, &dist, rng);
            }
            WeightInit::Uniform { low, high } => {
                sample_into(array, &Uniform::new(low, high), rng);
            }
        }
        Ok(())
    }
}

/// Overwrites every element of `array` with a sample from `[low, high)`.
///
/// Panics if `low >= high`.
pub(crate) fn fill_uniform<D, R>(array: &mut Array<f64, D>, low: f64, high: f64, rng: &mut R)
where
    D: Dimension,
    R: Rng + ?Sized,
{
    sample_into(array, &Uniform::new(low, high), rng);
}

fn sample_into<D, T, R>(array: &mut Array<f64, D>, dist: &T, rng: &mut R)
where
    D: Dimension,
    T: Distribution<f64>,
    R: Rng + ?Sized,
{
    for x in array.iter_mut() {
        *x = dist.sample(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn uniform_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut weights = Array2::zeros((10, 10));
        WeightInit::Uniform {
            low: -0.5,
            high: 0.5,
        }
        .fill(&mut weights, &mut rng)
        .unwrap();
        assert!(weights.iter().all(|&w| (-0.5..0.5).contains(&w)));
        assert!(weights.iter().any(|&w| w != 0.0));
    }

    #[test]
    fn seeded_fill_is_reproducible() {
        let fill = |seed| {
            let mut weights = Array2::zeros((3, 4));
            WeightInit::default()
                .fill(&mut weights, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            weights
        };
        assert_eq!(fill(11), fill(11));
        assert_ne!(fill(11), fill(12));
    }

    #[test]
    fn invalid_parameters() {
        let mut weights = Array2::zeros((1, 1));
        let mut rng = StdRng::seed_from_u64(0);
        assert!(WeightInit::Normal {
            mean: 0.0,
            std_dev: -1.0,
        }
        .fill(&mut weights, &mut rng)
        .is_err());
        assert!(WeightInit::Uniform { low: 1.0, high: 1.0 }
            .fill(&mut weights, &mut rng)
            .is_err());
    }
}
