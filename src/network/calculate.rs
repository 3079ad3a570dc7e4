//! Calculation of network semantics.

use log::trace;
use nalgebra::DMatrix;

use super::{Error, NeuralNetwork};
use crate::node::{NeuronId, NodeId};

impl NeuralNetwork {
    /// Calculates the semantics of a neuron from the semantics of its sources.
    ///
    /// Every source must already be calculated.
    pub fn calculate_neuron(&mut self, id: NeuronId) -> Result<(), Error> {
        let index = id.as_usize();
        let neuron = self
            .neurons
            .get(index)
            .ok_or(Error::UnknownNode(id.into()))?;

        let weighted_input =
            neuron.weighted_input(id, self.num_instances, |node| self.semantics(node))?;
        self.neurons[index].calculate(&weighted_input);

        Ok(())
    }

    /// Calculates every uncalculated neuron in the hidden layer at `index` and returns how many
    /// were calculated. Already calculated neurons are left untouched.
    pub fn calculate_layer(&mut self, index: usize) -> Result<usize, Error> {
        let pending: Vec<NeuronId> = self
            .layer(index)?
            .iter()
            .copied()
            .filter(|&id| !self[id].is_calculated())
            .collect();

        for &id in &pending {
            self.calculate_neuron(id)?;
        }

        trace!("calculated {} neurons in hidden layer {}", pending.len(), index);

        Ok(pending.len())
    }

    /// Calculates the output neuron.
    pub fn calculate_output(&mut self) -> Result<(), Error> {
        self.calculate_neuron(self.output_neuron)
    }

    /// Calculates every neuron from scratch, one stage at a time.
    pub fn recalculate(&mut self) -> Result<(), Error> {
        for index in 0..self.hidden_layers.len() {
            for i in 0..self.hidden_layers[index].len() {
                let id = self.hidden_layers[index][i];
                self.calculate_neuron(id)?;
            }
        }

        self.calculate_output()
    }

    /// Returns the semantics of the last hidden layer as a matrix with one row per training
    /// instance and one column per neuron.
    pub fn partial_semantics(&self) -> Result<DMatrix<f64>, Error> {
        // Hidden layers can't be empty
        let last_layer = self.hidden_layers.last().ok_or(Error::NoHiddenLayers)?;

        let columns = last_layer
            .iter()
            .map(|&id| {
                self[id].semantics().ok_or(Error::UnsetSemantics {
                    neuron: self.output_neuron,
                    source: NodeId::Neuron(id),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DMatrix::from_fn(
            self.num_instances,
            columns.len(),
            |row, column| columns[column][row],
        ))
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use nalgebra::DVector;

    use super::super::tests::small_network;
    use super::*;
    use crate::node::{NeuronState, SensorId};

    fn id(i: usize) -> NeuronId {
        NeuronId::new(i)
    }

    fn sensor(i: usize) -> NodeId {
        SensorId::new(i).into()
    }

    fn connected_network() -> NeuralNetwork {
        let mut net = small_network();
        net.connect(sensor(0), id(0), 1.0).unwrap();
        net.connect(sensor(1), id(0), 2.0).unwrap();
        net.connect(sensor(0), id(1), -1.0).unwrap();
        net.connect(id(0).into(), id(2), 0.5).unwrap();
        net.connect(id(1).into(), id(2), 1.0).unwrap();
        net.connect(id(2).into(), id(3), 2.0).unwrap();
        net
    }

    #[test]
    fn test_calculate() {
        let mut net = connected_network();

        assert_eq!(2, net.calculate_layer(0).unwrap());
        assert_eq!(1, net.calculate_layer(1).unwrap());
        net.calculate_output().unwrap();

        // n0 = x0 + 2 * x1, n1 = relu(-x0) = 0
        assert_eq!(Some(&DVector::from_vec(vec![1.0, 4.0, 3.0])), net[id(0)].semantics());
        assert_eq!(Some(&DVector::zeros(3)), net[id(1)].semantics());
        let predictions = net.predictions().unwrap();
        assert_approx_eq!(1.0, predictions[0]);
        assert_approx_eq!(4.0, predictions[1]);
        assert_approx_eq!(3.0, predictions[2]);

        // Nothing left to calculate
        assert_eq!(0, net.calculate_layer(0).unwrap());
        assert_eq!(Ok(()), net.check_topology());
    }

    #[test]
    fn test_calculate_out_of_order() {
        let mut net = connected_network();

        assert_eq!(
            Err(Error::UnsetSemantics {
                neuron: id(2),
                source: id(0).into(),
            }),
            net.calculate_layer(1)
        );
        assert_eq!(
            Err(Error::UnsetSemantics {
                neuron: id(3),
                source: id(2).into(),
            }),
            net.partial_semantics().map(|_| ())
        );
        assert!(net[id(2)].semantics().is_none());
    }

    #[test]
    fn test_calculated_neuron_frozen() {
        let mut net = connected_network();
        net.calculate_layer(0).unwrap();

        assert_eq!(
            Err(Error::FrozenNeuron(id(0))),
            net.connect(sensor(1), id(0), 1.0)
        );
        assert_eq!(1, net[id(1)].input_connections().len());
    }

    #[test]
    fn test_partial_semantics() {
        let mut net = connected_network();
        net.calculate_layer(0).unwrap();
        net.calculate_layer(1).unwrap();

        let partial = net.partial_semantics().unwrap();
        assert_eq!((3, 1), partial.shape());
        assert_approx_eq!(0.5, partial[(0, 0)]);
        assert_approx_eq!(2.0, partial[(1, 0)]);
        assert_approx_eq!(1.5, partial[(2, 0)]);
    }

    #[test]
    fn test_clone_independent_recalculate() {
        let mut net = connected_network();
        net.recalculate().unwrap();

        let mut clone = net.clone_independent();
        assert_eq!(NeuronState::Connected, clone[id(0)].state());
        assert!(clone.predictions().is_none());

        clone.recalculate().unwrap();
        assert_eq!(net, clone);
    }
}
