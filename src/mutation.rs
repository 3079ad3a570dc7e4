//! Mutation operators, which propose new hidden neurons for a champion network.

use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::activation::ActivationRegistry;
use crate::network::NeuralNetwork;
use crate::node::Neuron;

/// Proposes new neurons to add to a network.
pub trait MutationOperator {
    /// Returns one batch of new neurons per hidden layer of `network`, in layer order. Batches may
    /// be empty. Every returned neuron must be unconnected and uncalculated; the caller connects
    /// and calculates them.
    fn mutate_network<R: Rng + ?Sized>(
        &self,
        network: &NeuralNetwork,
        activations: &ActivationRegistry,
        rng: &mut R,
    ) -> Vec<Vec<Neuron>>;
}

/// Adds between one and `max_neurons` neurons with random activation functions to every hidden
/// layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AddNeurons {
    max_neurons: usize,
}

impl AddNeurons {
    /// Returns a new `AddNeurons` that adds up to `max_neurons` neurons per layer. A
    /// `max_neurons` of zero adds nothing.
    pub fn new(max_neurons: usize) -> Self {
        Self { max_neurons }
    }

    /// Returns the maximum number of neurons added per layer.
    pub fn max_neurons(&self) -> usize {
        self.max_neurons
    }
}

impl Default for AddNeurons {
    fn default() -> Self {
        Self::new(3)
    }
}

impl MutationOperator for AddNeurons {
    fn mutate_network<R: Rng + ?Sized>(
        &self,
        network: &NeuralNetwork,
        activations: &ActivationRegistry,
        rng: &mut R,
    ) -> Vec<Vec<Neuron>> {
        network
            .hidden_layers()
            .iter()
            .map(|_| {
                let count = if self.max_neurons == 0 {
                    0
                } else {
                    rng.gen_range(1..=self.max_neurons)
                };

                (0..count)
                    .map(|_| activations.create_neuron(None, rng))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::network::tests::small_network;
    use crate::node::NeuronState;

    #[test]
    fn test_add_neurons() {
        let net = small_network();
        let registry = ActivationRegistry::all();
        let operator = AddNeurons::new(4);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        for _ in 0..20 {
            let batches = operator.mutate_network(&net, &registry, &mut rng);
            assert_eq!(net.hidden_layers().len(), batches.len());

            for batch in &batches {
                assert!((1..=4).contains(&batch.len()));
                assert!(batch
                    .iter()
                    .all(|neuron| neuron.state() == NeuronState::Unconnected));
            }
        }
    }

    #[test]
    fn test_add_nothing() {
        let net = small_network();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let batches = AddNeurons::new(0).mutate_network(&net, &ActivationRegistry::all(), &mut rng);

        assert_eq!(2, batches.len());
        assert!(batches.iter().all(Vec::is_empty));
    }

    #[test]
    fn test_deterministic() {
        let net = small_network();
        let registry = ActivationRegistry::all();
        let operator = AddNeurons::default();

        let activations = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            operator
                .mutate_network(&net, &registry, &mut rng)
                .iter()
                .map(|batch| batch.iter().map(Neuron::activation).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        };

        assert_eq!(activations(11), activations(11));
    }
}
