//! Mutation of the current champion.

use log::debug;
use nalgebra::DVector;
use rand::Rng;

use super::{layer_sources, Error, FanIn, Operation, SemanticLearningMachine};
use crate::dataset::DataSet;
use crate::mutation::MutationOperator;
use crate::network::NeuralNetwork;
use crate::node::{NeuronId, NodeId};

/// A mutated copy of the champion network.
///
/// Every new hidden neuron is connected and calculated. The output neuron still has the
/// champion's connections and semantics, so the offspring predicts exactly what the champion does
/// until its new last-layer neurons are weighted into the output.
#[derive(Debug)]
pub struct Offspring {
    network: NeuralNetwork,
    new_neurons: Vec<Vec<NeuronId>>,
    parent_error: DVector<f64>,
    parent_fitness: f64,
}

impl Offspring {
    /// Returns the mutated network.
    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    /// Consumes this `Offspring`, returning the mutated network.
    pub fn into_network(self) -> NeuralNetwork {
        self.network
    }

    /// Returns the IDs of the neurons added to each hidden layer.
    pub fn new_neurons(&self) -> &[Vec<NeuronId>] {
        &self.new_neurons
    }

    /// Returns the total number of neurons added.
    pub fn num_new_neurons(&self) -> usize {
        self.new_neurons.iter().map(Vec::len).sum()
    }

    /// Returns the error vector of the champion this offspring was made from.
    pub fn parent_error(&self) -> &DVector<f64> {
        &self.parent_error
    }

    /// Returns the fitness of the champion this offspring was made from.
    pub fn parent_fitness(&self) -> f64 {
        self.parent_fitness
    }
}

impl<D: DataSet, M: MutationOperator> SemanticLearningMachine<D, M> {
    /// Returns a mutated copy of the current champion. The champion itself is never modified.
    ///
    /// The mutation operator proposes new neurons for every hidden layer. New neurons of the first
    /// layer read from a random subset of the sensors, and new neurons of every other layer read
    /// from the whole previous layer, old and new neurons alike. Only new neurons are connected
    /// and calculated.
    pub fn mutate_champion<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Offspring, Error> {
        let champion = self.current_champion.as_ref().ok_or(Error::NoChampion)?;
        let mut network = champion.network().snapshot_sharing();

        let batches = self
            .mutation_operator
            .mutate_network(champion.network(), &self.activations, rng);
        let layers = network.hidden_layers().len();
        if batches.len() != layers {
            return Err(Error::MutationLayerCount {
                expected: layers,
                found: batches.len(),
            });
        }

        let mut new_neurons = Vec::with_capacity(layers);
        for (index, batch) in batches.into_iter().enumerate() {
            let ids = batch
                .into_iter()
                .map(|neuron| network.push_neuron(index, neuron))
                .collect::<Result<Vec<_>, _>>()
                .map_err(Error::network(Operation::ExtendLayer(index)))?;
            new_neurons.push(ids);
        }

        for (index, ids) in new_neurons.iter().enumerate() {
            if ids.is_empty() {
                continue;
            }

            let connected = if index == 0 {
                let sensor_ids: Vec<NodeId> = network.sensor_ids().collect();
                self.connect_nodes(&mut network, &sensor_ids, ids, FanIn::RandomSparse, rng)
            } else {
                layer_sources(&network, index - 1).and_then(|from| {
                    self.connect_nodes(&mut network, &from, ids, FanIn::Full, rng)
                })
            };
            connected.map_err(Error::network(Operation::ConnectLayer(index)))?;

            network
                .calculate_layer(index)
                .map_err(Error::network(Operation::CalculateLayer(index)))?;
        }

        // TODO: weight the new last-layer neurons into a fresh output neuron and accept the
        //       offspring as the next champion when it improves on the current one
        let offspring = Offspring {
            network,
            new_neurons,
            parent_error: champion.error().clone(),
            parent_fitness: champion.fitness(),
        };

        debug!(
            "mutated champion with fitness {}, added {} neurons",
            offspring.parent_fitness,
            offspring.num_new_neurons()
        );

        Ok(offspring)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::super::tests::{machine, training_set};
    use super::*;
    use crate::activation::ActivationRegistry;
    use crate::config::Config;
    use crate::dataset::ColumnDataSet;
    use crate::mutation::AddNeurons;
    use crate::network::Stage;
    use crate::node::{Neuron, NeuronState};

    fn machine_with_champion(seed: u64) -> SemanticLearningMachine<ColumnDataSet, AddNeurons> {
        let mut machine = machine(Config {
            layers: 3,
            max_connections: 2,
            ..Config::default()
        });
        machine
            .create_initial_population(&mut ChaCha8Rng::seed_from_u64(seed))
            .unwrap();
        machine
    }

    #[test]
    fn test_no_champion() {
        let machine = machine(Config::default());
        assert!(matches!(
            machine.mutate_champion(&mut ChaCha8Rng::seed_from_u64(0)),
            Err(Error::NoChampion)
        ));
    }

    #[test]
    fn test_mutate_champion() {
        let machine = machine_with_champion(1);
        let champion = machine.current_champion().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        for _ in 0..10 {
            let before = champion.snapshot_sharing();
            let offspring = machine.mutate_champion(&mut rng).unwrap();
            let net = offspring.network();

            // The champion is untouched
            assert_eq!(&before, champion);
            assert_eq!(champion.fitness(), offspring.parent_fitness());
            assert_eq!(champion.error(), offspring.parent_error());

            assert_eq!(Ok(()), net.check_topology());
            assert_eq!(3, offspring.new_neurons().len());
            for (index, ids) in offspring.new_neurons().iter().enumerate() {
                assert!((1..=3).contains(&ids.len()));
                let old_len = champion.network().hidden_layers()[index].len();
                assert_eq!(old_len + ids.len(), net.hidden_layers()[index].len());

                for &id in ids {
                    let neuron = &net[id];
                    assert_eq!(NeuronState::Calculated, neuron.state());

                    let sources = neuron.input_connections();
                    if index == 0 {
                        assert!((1..=2).contains(&sources.len()));
                        assert!(sources
                            .iter()
                            .all(|c| net.stage(c.from()) == Some(Stage::Sensors)));
                    } else {
                        // Full fan-in from the previous layer, old and new neurons alike
                        assert_eq!(net.hidden_layers()[index - 1].len(), sources.len());
                        assert!(sources
                            .iter()
                            .all(|c| net.stage(c.from()) == Some(Stage::Hidden(index - 1))));
                    }
                }
            }

            // The output neuron is carried over as is
            assert_eq!(champion.network().output_neuron(), net.output_neuron());
            assert_eq!(Some(champion.predictions()), net.predictions());
        }
    }

    #[test]
    fn test_old_neurons_untouched() {
        let machine = machine_with_champion(5);
        let champion = machine.current_champion().unwrap();
        let offspring = machine
            .mutate_champion(&mut ChaCha8Rng::seed_from_u64(6))
            .unwrap();

        for (id, neuron) in champion.network().neurons() {
            assert_eq!(neuron, &offspring.network()[id]);
        }
    }

    #[test]
    fn test_mutate_deterministic() {
        let machine = machine_with_champion(7);
        let run = || {
            machine
                .mutate_champion(&mut ChaCha8Rng::seed_from_u64(8))
                .unwrap()
                .into_network()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_empty_batches() {
        let mut machine = SemanticLearningMachine::new(
            Config::default(),
            training_set(),
            AddNeurons::new(0),
        )
        .unwrap();
        machine
            .create_initial_population(&mut ChaCha8Rng::seed_from_u64(3))
            .unwrap();

        let offspring = machine
            .mutate_champion(&mut ChaCha8Rng::seed_from_u64(4))
            .unwrap();
        assert_eq!(0, offspring.num_new_neurons());
        assert_eq!(
            machine.current_champion().unwrap().network(),
            offspring.network()
        );
    }

    struct WrongLayerCount;

    impl MutationOperator for WrongLayerCount {
        fn mutate_network<R: Rng + ?Sized>(
            &self,
            _network: &NeuralNetwork,
            activations: &ActivationRegistry,
            rng: &mut R,
        ) -> Vec<Vec<Neuron>> {
            vec![vec![activations.create_neuron(None, rng)]]
        }
    }

    #[test]
    fn test_wrong_layer_count() {
        let mut machine =
            SemanticLearningMachine::new(Config::default(), training_set(), WrongLayerCount)
                .unwrap();
        machine
            .create_initial_population(&mut ChaCha8Rng::seed_from_u64(3))
            .unwrap();

        assert!(matches!(
            machine.mutate_champion(&mut ChaCha8Rng::seed_from_u64(4)),
            Err(Error::MutationLayerCount {
                expected: 2,
                found: 1
            })
        ));
    }
}
