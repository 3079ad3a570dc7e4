//! The error type for building and calculating networks.

use std::{error, fmt};

use crate::node::{NeuronId, NodeId};

/// A violated precondition while building or calculating a network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The network has no sensors.
    NoSensors,
    /// The network has no hidden layers.
    NoHiddenLayers,
    /// A hidden layer has no neurons. Contains the index of the layer.
    EmptyLayer(usize),
    /// A node ID does not refer to a node of the network.
    UnknownNode(NodeId),
    /// A hidden layer index is out of range. Contains the index and the number of hidden layers.
    UnknownLayer(usize, usize),
    /// A neuron added to the network already has connections or semantics.
    NeuronNotFresh,
    /// A connection's source is not in a strictly earlier stage than its target.
    OutOfOrderConnection {
        /// The source of the rejected connection.
        source: NodeId,
        /// The target of the rejected connection.
        target: NeuronId,
    },
    /// A connection was added to a neuron that has already been calculated.
    FrozenNeuron(NeuronId),
    /// A neuron was calculated before one of its sources.
    UnsetSemantics {
        /// The neuron being calculated.
        neuron: NeuronId,
        /// The uncalculated source.
        source: NodeId,
    },
    /// A neuron's semantics were read before it was calculated.
    Uncalculated(NeuronId),
    /// A neuron without input connections was calculated.
    NoInputs(NeuronId),
    /// A node's semantics do not have one value per training instance.
    SemanticsLength {
        /// The node with the wrong semantics length.
        node: NodeId,
        /// The number of training instances.
        expected: usize,
        /// The length of the node's semantics.
        found: usize,
    },
    /// There are no sources to connect from.
    NoCandidates,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NoSensors => write!(f, "network has no sensors"),
            Self::NoHiddenLayers => write!(f, "network has no hidden layers"),
            Self::EmptyLayer(index) => write!(f, "hidden layer {} has no neurons", index),
            Self::UnknownNode(node) => write!(f, "{} does not exist", node),
            Self::UnknownLayer(index, count) => write!(
                f,
                "hidden layer {} does not exist in a network of {} hidden layers",
                index, count
            ),
            Self::NeuronNotFresh => write!(f, "added neuron already has connections or semantics"),
            Self::OutOfOrderConnection { source, target } => write!(
                f,
                "{} is not in an earlier stage than neuron {}",
                source,
                target.as_usize()
            ),
            Self::FrozenNeuron(id) => write!(
                f,
                "neuron {} is already calculated and cannot receive connections",
                id.as_usize()
            ),
            Self::UnsetSemantics { neuron, source } => write!(
                f,
                "neuron {} reads from {} before it is calculated",
                neuron.as_usize(),
                source
            ),
            Self::Uncalculated(id) => write!(f, "neuron {} is not calculated", id.as_usize()),
            Self::NoInputs(id) => write!(f, "neuron {} has no input connections", id.as_usize()),
            Self::SemanticsLength {
                node,
                expected,
                found,
            } => write!(
                f,
                "semantics of {} have length {}, expected {}",
                node, found, expected
            ),
            Self::NoCandidates => write!(f, "no source nodes to connect from"),
        }
    }
}

impl error::Error for Error {}
