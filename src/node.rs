//! The nodes of a [`NeuralNetwork`][crate::NeuralNetwork] and the connections between them.

use std::fmt;

use nalgebra::DVector;

use crate::activation::Activation;
use crate::network::Error;

/// The ID of a [`Sensor`] in a [`NeuralNetwork`][crate::NeuralNetwork].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SensorId(usize);

impl SensorId {
    /// Returns a new `SensorId` with the given id.
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns this `SensorId` as a `usize`.
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

/// The ID of a [`Neuron`] in a [`NeuralNetwork`][crate::NeuralNetwork].
///
/// IDs are assigned in insertion order and stay valid for the lifetime of the network and all of
/// its clones.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NeuronId(usize);

impl NeuronId {
    /// Returns a new `NeuronId` with the given id.
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns this `NeuronId` as a `usize`.
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

/// Any node that can be the source of a [`Connection`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// See [`Sensor`].
    Sensor(SensorId),
    /// See [`Neuron`].
    Neuron(NeuronId),
}

impl From<SensorId> for NodeId {
    fn from(id: SensorId) -> Self {
        Self::Sensor(id)
    }
}

impl From<NeuronId> for NodeId {
    fn from(id: NeuronId) -> Self {
        Self::Neuron(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Sensor(id) => write!(f, "sensor {}", id.as_usize()),
            Self::Neuron(id) => write!(f, "neuron {}", id.as_usize()),
        }
    }
}

/// An input node. Its semantics are one raw feature column of the training set and never change.
#[derive(Clone, Debug, PartialEq)]
pub struct Sensor {
    // The name of the input variable this sensor was built from
    name: String,
    semantics: DVector<f64>,
}

impl Sensor {
    /// Returns a new `Sensor` for the input variable `name` with the given column values.
    pub fn new<S: Into<String>>(name: S, semantics: DVector<f64>) -> Self {
        Self {
            name: name.into(),
            semantics,
        }
    }

    /// Returns the name of the input variable of this `Sensor`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the semantics of this `Sensor`.
    pub fn semantics(&self) -> &DVector<f64> {
        &self.semantics
    }
}

/// A directed, weighted edge between two nodes.
///
/// Connections are stored in the input list of their target [`Neuron`] and never change once
/// created.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Connection {
    from: NodeId,
    to: NeuronId,
    weight: f64,
}

impl Connection {
    pub(crate) fn new(from: NodeId, to: NeuronId, weight: f64) -> Self {
        Self { from, to, weight }
    }

    /// Returns the source node of this `Connection`.
    pub fn from(&self) -> NodeId {
        self.from
    }

    /// Returns the target neuron of this `Connection`.
    pub fn to(&self) -> NeuronId {
        self.to
    }

    /// Returns the weight of this `Connection`.
    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// Where a [`Neuron`] is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NeuronState {
    /// The neuron has no input connections.
    Unconnected,
    /// The neuron has input connections but its semantics are unset.
    Connected,
    /// The neuron's semantics are set. Its connections are frozen from this point on.
    Calculated,
}

/// A computing node.
///
/// Applies its activation function to the weighted sum of the semantics of its input connections'
/// sources.
///
/// `Neuron` deliberately has no `Clone` implementation; use
/// [`snapshot_sharing`][Self::snapshot_sharing] or [`clone_independent`][Self::clone_independent].
#[derive(Debug, PartialEq)]
pub struct Neuron {
    activation: Activation,
    input_connections: Vec<Connection>,
    // Unset until the neuron is calculated
    semantics: Option<DVector<f64>>,
}

impl Neuron {
    /// Returns a new unconnected, uncalculated `Neuron`.
    pub fn new(activation: Activation) -> Self {
        Self {
            activation,
            input_connections: Vec::new(),
            semantics: None,
        }
    }

    /// Returns the activation function of this `Neuron`.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Returns the input connections of this `Neuron`.
    pub fn input_connections(&self) -> &[Connection] {
        &self.input_connections
    }

    /// Returns the semantics of this `Neuron` if it has been calculated.
    pub fn semantics(&self) -> Option<&DVector<f64>> {
        self.semantics.as_ref()
    }

    /// Returns whether the semantics of this `Neuron` are set.
    pub fn is_calculated(&self) -> bool {
        self.semantics.is_some()
    }

    /// Returns the lifecycle state of this `Neuron`.
    pub fn state(&self) -> NeuronState {
        if self.semantics.is_some() {
            NeuronState::Calculated
        } else if self.input_connections.is_empty() {
            NeuronState::Unconnected
        } else {
            NeuronState::Connected
        }
    }

    /// Returns a copy of this `Neuron` with its own semantics and connection list. The connections
    /// still refer to the same upstream nodes by ID.
    pub fn snapshot_sharing(&self) -> Self {
        Self {
            activation: self.activation,
            input_connections: self.input_connections.clone(),
            semantics: self.semantics.clone(),
        }
    }

    /// Returns a copy of this `Neuron` with every connection duplicated and its semantics unset.
    /// The copy must be recalculated before it can be used as a source.
    pub fn clone_independent(&self) -> Self {
        Self {
            activation: self.activation,
            input_connections: self.input_connections.iter().copied().collect(),
            semantics: None,
        }
    }

    pub(crate) fn push_connection(&mut self, connection: Connection) {
        self.input_connections.push(connection);
    }

    /// Sums the semantics of every input connection's source, weighted by the connection weight.
    ///
    /// `semantics_of` must return `None` for sources that have not been calculated.
    pub(crate) fn weighted_input<'a, F>(
        &self,
        id: NeuronId,
        num_instances: usize,
        semantics_of: F,
    ) -> Result<DVector<f64>, Error>
    where
        F: Fn(NodeId) -> Option<&'a DVector<f64>>,
    {
        if self.input_connections.is_empty() {
            return Err(Error::NoInputs(id));
        }

        let mut sum = DVector::zeros(num_instances);
        for connection in &self.input_connections {
            let source = semantics_of(connection.from()).ok_or(Error::UnsetSemantics {
                neuron: id,
                source: connection.from(),
            })?;

            if source.len() != num_instances {
                return Err(Error::SemanticsLength {
                    node: connection.from(),
                    expected: num_instances,
                    found: source.len(),
                });
            }

            sum.axpy(connection.weight(), source, 1.0);
        }

        Ok(sum)
    }

    /// Sets the semantics of this `Neuron` to its activation function applied to `weighted_input`.
    pub(crate) fn calculate(&mut self, weighted_input: &DVector<f64>) {
        self.semantics = Some(self.activation.apply_vector(weighted_input));
    }
}
