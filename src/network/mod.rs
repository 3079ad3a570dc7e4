//! The neural network struct.

mod calculate;
mod error;

pub use error::Error;

use std::ops::Index;
use std::sync::Arc;

use nalgebra::DVector;

use crate::node::*;

/// The stage of a node in the layered topology of a [`NeuralNetwork`].
///
/// Stages are ordered: sensors come first, then every hidden layer by index, then the output
/// neuron. A connection is only valid from a strictly earlier stage to a later one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// The sensors of the network.
    Sensors,
    /// The hidden layer with the given index.
    Hidden(usize),
    /// The output neuron.
    Output,
}

/// Info about a neuron in a network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NeuronInfo {
    stage: Stage,
}

impl NeuronInfo {
    fn new(stage: Stage) -> Self {
        Self { stage }
    }

    /// Returns the stage of this neuron.
    pub fn stage(&self) -> Stage {
        self.stage
    }
}

// NOTE: Every connection in a `NeuralNetwork` goes from a strictly earlier stage to a later one,
//       and calculated neurons never receive new connections. Methods that modify the network
//       check both before changing anything.
/// A layered feed-forward network: sensors, an ordered list of hidden layers, and a single output
/// neuron.
///
/// Neurons live in an arena and are referred to by [`NeuronId`]. Sensors are shared between every
/// network built from the same training set.
///
/// `NeuralNetwork` deliberately has no `Clone` implementation; use
/// [`snapshot_sharing`][Self::snapshot_sharing] or [`clone_independent`][Self::clone_independent].
#[derive(Debug, PartialEq)]
pub struct NeuralNetwork {
    sensors: Arc<[Sensor]>,
    // Every neuron of the network, indexed by `NeuronId`
    neurons: Vec<Neuron>,
    // Info about each neuron, indexed by `NeuronId`
    neuron_info: Vec<NeuronInfo>,
    hidden_layers: Vec<Vec<NeuronId>>,
    output_neuron: NeuronId,
    // The semantics length of every node
    num_instances: usize,
}

impl NeuralNetwork {
    /// Returns a new unconnected network made of `sensors`, the neurons of `hidden_layers` and
    /// `output_neuron`.
    ///
    /// Every sensor must have the same semantics length, and every neuron must be unconnected and
    /// uncalculated.
    pub fn new(
        sensors: Arc<[Sensor]>,
        hidden_layers: Vec<Vec<Neuron>>,
        output_neuron: Neuron,
    ) -> Result<Self, Error> {
        let num_instances = sensors
            .first()
            .map(|sensor| sensor.semantics().len())
            .ok_or(Error::NoSensors)?;

        for (i, sensor) in sensors.iter().enumerate() {
            if sensor.semantics().len() != num_instances {
                return Err(Error::SemanticsLength {
                    node: SensorId::new(i).into(),
                    expected: num_instances,
                    found: sensor.semantics().len(),
                });
            }
        }

        if hidden_layers.is_empty() {
            return Err(Error::NoHiddenLayers);
        }

        let mut network = Self {
            sensors,
            neurons: Vec::new(),
            neuron_info: Vec::new(),
            hidden_layers: Vec::with_capacity(hidden_layers.len()),
            output_neuron: NeuronId::new(0),
            num_instances,
        };

        for (index, layer) in hidden_layers.into_iter().enumerate() {
            if layer.is_empty() {
                return Err(Error::EmptyLayer(index));
            }

            network.hidden_layers.push(Vec::with_capacity(layer.len()));
            for neuron in layer {
                network.push_neuron(index, neuron)?;
            }
        }

        network.output_neuron = network.insert_neuron(Stage::Output, output_neuron)?;

        Ok(network)
    }

    /// Returns the sensors of this `NeuralNetwork`.
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Returns a shared handle to the sensors of this `NeuralNetwork`.
    pub fn shared_sensors(&self) -> Arc<[Sensor]> {
        Arc::clone(&self.sensors)
    }

    /// Returns the IDs of every sensor, in order.
    pub fn sensor_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.sensors.len()).map(|i| SensorId::new(i).into())
    }

    /// Returns the number of training instances, which is the semantics length of every node.
    pub fn num_instances(&self) -> usize {
        self.num_instances
    }

    /// Returns the number of neurons, including the output neuron.
    pub fn num_neurons(&self) -> usize {
        self.neurons.len()
    }

    /// Returns the hidden layers of this `NeuralNetwork`.
    pub fn hidden_layers(&self) -> &[Vec<NeuronId>] {
        &self.hidden_layers
    }

    /// Returns the neurons of the hidden layer at `index`.
    pub fn layer(&self, index: usize) -> Result<&[NeuronId], Error> {
        self.hidden_layers
            .get(index)
            .map(Vec::as_slice)
            .ok_or(Error::UnknownLayer(index, self.hidden_layers.len()))
    }

    /// Returns the ID of the output neuron.
    pub fn output_neuron_id(&self) -> NeuronId {
        self.output_neuron
    }

    /// Returns the output neuron.
    pub fn output_neuron(&self) -> &Neuron {
        &self.neurons[self.output_neuron.as_usize()]
    }

    /// Returns the neuron with the given ID if it exists.
    pub fn neuron(&self, id: NeuronId) -> Option<&Neuron> {
        self.neurons.get(id.as_usize())
    }

    /// Returns an iterator over every neuron ID with its neuron.
    pub fn neurons(&self) -> impl Iterator<Item = (NeuronId, &Neuron)> + '_ {
        self.neurons
            .iter()
            .enumerate()
            .map(|(i, neuron)| (NeuronId::new(i), neuron))
    }

    /// Returns the stage of `node` if it exists.
    pub fn stage(&self, node: NodeId) -> Option<Stage> {
        match node {
            NodeId::Sensor(id) => (id.as_usize() < self.sensors.len()).then(|| Stage::Sensors),
            NodeId::Neuron(id) => self.neuron_info.get(id.as_usize()).map(NeuronInfo::stage),
        }
    }

    /// Returns the semantics of `node` if it exists and has been calculated.
    pub fn semantics(&self, node: NodeId) -> Option<&DVector<f64>> {
        match node {
            NodeId::Sensor(id) => self.sensors.get(id.as_usize()).map(Sensor::semantics),
            NodeId::Neuron(id) => self.neuron(id).and_then(Neuron::semantics),
        }
    }

    /// Returns the output semantics of this `NeuralNetwork` if the output neuron is calculated.
    pub fn predictions(&self) -> Option<&DVector<f64>> {
        self.output_neuron().semantics()
    }

    /// Appends a fresh neuron to the hidden layer at `index` and returns its ID.
    pub fn push_neuron(&mut self, index: usize, neuron: Neuron) -> Result<NeuronId, Error> {
        if index >= self.hidden_layers.len() {
            return Err(Error::UnknownLayer(index, self.hidden_layers.len()));
        }

        let id = self.insert_neuron(Stage::Hidden(index), neuron)?;
        self.hidden_layers[index].push(id);

        Ok(id)
    }

    /// Adds `neuron` to the arena at `stage`.
    fn insert_neuron(&mut self, stage: Stage, neuron: Neuron) -> Result<NeuronId, Error> {
        if neuron.state() != NeuronState::Unconnected {
            return Err(Error::NeuronNotFresh);
        }

        let id = NeuronId::new(self.neurons.len());
        self.neurons.push(neuron);
        self.neuron_info.push(NeuronInfo::new(stage));

        Ok(id)
    }

    /// Adds a connection from `from` to `to` with the given weight.
    ///
    /// `from` must be in a strictly earlier stage than `to`, and `to` must not be calculated yet.
    pub fn connect(&mut self, from: NodeId, to: NeuronId, weight: f64) -> Result<(), Error> {
        let source_stage = self.stage(from).ok_or(Error::UnknownNode(from))?;
        let target_stage = self.stage(to.into()).ok_or(Error::UnknownNode(to.into()))?;

        if source_stage >= target_stage {
            return Err(Error::OutOfOrderConnection {
                source: from,
                target: to,
            });
        }

        let target = &mut self.neurons[to.as_usize()];
        if target.is_calculated() {
            return Err(Error::FrozenNeuron(to));
        }

        target.push_connection(Connection::new(from, to, weight));

        Ok(())
    }

    /// Checks that every connection goes from an earlier stage to a later one, that connections
    /// are stored in their target, and that every calculated node has one value per training
    /// instance.
    pub fn check_topology(&self) -> Result<(), Error> {
        for (i, sensor) in self.sensors.iter().enumerate() {
            if sensor.semantics().len() != self.num_instances {
                return Err(Error::SemanticsLength {
                    node: SensorId::new(i).into(),
                    expected: self.num_instances,
                    found: sensor.semantics().len(),
                });
            }
        }

        for (id, neuron) in self.neurons() {
            let stage = self.neuron_info[id.as_usize()].stage();

            for connection in neuron.input_connections() {
                let source_stage = self
                    .stage(connection.from())
                    .ok_or(Error::UnknownNode(connection.from()))?;

                if connection.to() != id || source_stage >= stage {
                    return Err(Error::OutOfOrderConnection {
                        source: connection.from(),
                        target: id,
                    });
                }
            }

            if let Some(semantics) = neuron.semantics() {
                if semantics.len() != self.num_instances {
                    return Err(Error::SemanticsLength {
                        node: id.into(),
                        expected: self.num_instances,
                        found: semantics.len(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Returns a copy of this `NeuralNetwork` in which every neuron keeps its semantics and
    /// connections. The sensors are shared with the original.
    ///
    /// Changes to the copy, such as adding neurons, never affect the original.
    pub fn snapshot_sharing(&self) -> Self {
        Self {
            sensors: Arc::clone(&self.sensors),
            neurons: self.neurons.iter().map(Neuron::snapshot_sharing).collect(),
            neuron_info: self.neuron_info.clone(),
            hidden_layers: self.hidden_layers.clone(),
            output_neuron: self.output_neuron,
            num_instances: self.num_instances,
        }
    }

    /// Returns a copy of this `NeuralNetwork` in which every connection is duplicated and every
    /// neuron is uncalculated. Use [`recalculate`][Self::recalculate] to calculate it again.
    pub fn clone_independent(&self) -> Self {
        Self {
            sensors: Arc::clone(&self.sensors),
            neurons: self.neurons.iter().map(Neuron::clone_independent).collect(),
            neuron_info: self.neuron_info.clone(),
            hidden_layers: self.hidden_layers.clone(),
            output_neuron: self.output_neuron,
            num_instances: self.num_instances,
        }
    }
}

impl Index<NeuronId> for NeuralNetwork {
    type Output = Neuron;
    fn index(&self, idx: NeuronId) -> &Self::Output {
        &self.neurons[idx.as_usize()]
    }
}
