//! Solutions: networks paired with their error on the training set.

use std::cmp::Ordering;

use nalgebra::DVector;

use crate::network::{Error, NeuralNetwork};

/// Reduces an error vector to a scalar fitness. Lower is better.
pub trait ErrorMetric {
    /// Returns the fitness of the error vector `error`.
    fn evaluate(&self, error: &DVector<f64>) -> f64;
}

/// The root of the mean of the squared errors.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RootMeanSquaredError;

impl ErrorMetric for RootMeanSquaredError {
    fn evaluate(&self, error: &DVector<f64>) -> f64 {
        root_mean_squared_error(error)
    }
}

/// Returns the root-mean-squared value of `error`.
pub fn root_mean_squared_error(error: &DVector<f64>) -> f64 {
    (error.norm_squared() / error.len() as f64).sqrt()
}

/// A calculated [`NeuralNetwork`] with its error vector (`predictions - target`) and fitness.
#[derive(Debug, PartialEq)]
pub struct Solution {
    network: NeuralNetwork,
    predictions: DVector<f64>,
    error: DVector<f64>,
    fitness: f64,
}

impl Solution {
    /// Wraps a calculated network, computing its error against `target` and scoring it with
    /// `metric`.
    pub fn new<M: ErrorMetric + ?Sized>(
        network: NeuralNetwork,
        target: &DVector<f64>,
        metric: &M,
    ) -> Result<Self, Error> {
        let output = network.output_neuron_id();
        let predictions = network
            .predictions()
            .ok_or(Error::Uncalculated(output))?
            .clone();

        if predictions.len() != target.len() {
            return Err(Error::SemanticsLength {
                node: output.into(),
                expected: target.len(),
                found: predictions.len(),
            });
        }

        let error = &predictions - target;
        let fitness = metric.evaluate(&error);

        Ok(Self {
            network,
            predictions,
            error,
            fitness,
        })
    }

    /// Returns the network of this `Solution`.
    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    /// Consumes this `Solution`, returning its network.
    pub fn into_network(self) -> NeuralNetwork {
        self.network
    }

    /// Returns the predictions of the network on the training set.
    pub fn predictions(&self) -> &DVector<f64> {
        &self.predictions
    }

    /// Returns the error vector, `predictions - target`.
    pub fn error(&self) -> &DVector<f64> {
        &self.error
    }

    /// Returns the fitness. Lower is better.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Compares the fitness of two solutions. `Less` means `self` is better. NaN fitness ranks
    /// below every number.
    pub fn compare_fitness(&self, other: &Self) -> Ordering {
        match (self.fitness.is_nan(), other.fitness.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self
                .fitness
                .partial_cmp(&other.fitness)
                .unwrap_or(Ordering::Equal),
        }
    }

    /// Returns a copy of this `Solution` whose network is a
    /// [`snapshot_sharing`][NeuralNetwork::snapshot_sharing] copy.
    pub fn snapshot_sharing(&self) -> Self {
        Self {
            network: self.network.snapshot_sharing(),
            predictions: self.predictions.clone(),
            error: self.error.clone(),
            fitness: self.fitness,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::network::tests::small_network;
    use crate::node::{NeuronId, SensorId};

    fn calculated_network() -> NeuralNetwork {
        let mut net = small_network();
        net.connect(SensorId::new(0).into(), NeuronId::new(0), 1.0).unwrap();
        net.connect(SensorId::new(1).into(), NeuronId::new(1), 1.0).unwrap();
        net.connect(NeuronId::new(0).into(), NeuronId::new(2), 1.0).unwrap();
        net.connect(NeuronId::new(2).into(), NeuronId::new(3), 1.0).unwrap();
        net.recalculate().unwrap();
        net
    }

    #[test]
    fn test_rmse() {
        assert_approx_eq!(0.0, root_mean_squared_error(&DVector::zeros(3)));
        assert_approx_eq!(
            (5.0f64 / 2.0).sqrt(),
            RootMeanSquaredError.evaluate(&DVector::from_vec(vec![1.0, -2.0]))
        );
    }

    #[test]
    fn test_solution() {
        // Predictions are [1, 2, 3]
        let target = DVector::from_vec(vec![1.0, 1.0, 5.0]);
        let solution = Solution::new(calculated_network(), &target, &RootMeanSquaredError).unwrap();

        assert_eq!(&DVector::from_vec(vec![1.0, 2.0, 3.0]), solution.predictions());
        assert_eq!(&DVector::from_vec(vec![0.0, 1.0, -2.0]), solution.error());
        assert_approx_eq!((5.0f64 / 3.0).sqrt(), solution.fitness());

        let copy = solution.snapshot_sharing();
        assert_eq!(solution, copy);
    }

    #[test]
    fn test_predictions_kept_with_solution() {
        let target = DVector::from_vec(vec![0.0, 0.0, 0.0]);
        let solution = Solution::new(calculated_network(), &target, &RootMeanSquaredError).unwrap();

        assert_eq!(solution.network().predictions(), Some(solution.predictions()));
        assert_eq!(solution.predictions(), solution.error());

        let copy = solution.snapshot_sharing();
        assert_eq!(solution.predictions(), copy.predictions());
    }

    #[test]
    fn test_solution_invalid() {
        let target = DVector::from_vec(vec![1.0, 1.0, 5.0]);
        assert_eq!(
            Err(Error::Uncalculated(NeuronId::new(3))),
            Solution::new(small_network(), &target, &RootMeanSquaredError)
        );

        let short = DVector::from_vec(vec![1.0]);
        assert_eq!(
            Err(Error::SemanticsLength {
                node: NeuronId::new(3).into(),
                expected: 1,
                found: 3,
            }),
            Solution::new(calculated_network(), &short, &RootMeanSquaredError)
        );
    }

    #[test]
    fn test_compare_fitness() {
        let target = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let perfect = Solution::new(calculated_network(), &target, &RootMeanSquaredError).unwrap();
        let worse = Solution::new(
            calculated_network(),
            &DVector::zeros(3),
            &RootMeanSquaredError,
        )
        .unwrap();

        assert_eq!(Ordering::Less, perfect.compare_fitness(&worse));
        assert_eq!(Ordering::Greater, worse.compare_fitness(&perfect));
        assert_eq!(Ordering::Equal, perfect.compare_fitness(&perfect));
    }
}
