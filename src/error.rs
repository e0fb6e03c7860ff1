/*!

  Errors raised by board edits and evaluation.

*/

use crate::{element::ElementId, pin::PinRef, wire::WireId};

/// A rejected connection attempt. The board is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub enum ConnectError {
    /// Neither end is an output
    #[error("you must connect an output pin to an input pin: {0} and {1} are both inputs")]
    BothInputs(PinRef, PinRef),
    /// Neither end is an input
    #[error("you must connect an output pin to an input pin: {0} and {1} are both outputs")]
    BothOutputs(PinRef, PinRef),
    /// The input already has a wire
    #[error("input {0} is already used by {1}")]
    InputOccupied(PinRef, WireId),
    /// One of the pins does not exist
    #[error("pin {0} does not exist")]
    UnknownPin(PinRef),
    /// The wire would feed an element's output back into itself
    #[error("wiring {0} to {1} would create a combinational loop")]
    WouldCreateLoop(PinRef, PinRef),
}

/// A hard evaluation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub enum EvalError {
    /// The element to evaluate does not exist
    #[error("element {0} does not exist")]
    UnknownElement(ElementId),
    /// Evaluation reached an element that is already being evaluated
    #[error("combinational loop through {0}")]
    CombinationalLoop(ElementId),
    /// Recursion went deeper than the configured limit
    #[error("evaluation exceeded the depth limit of {0}")]
    DepthExceeded(usize),
}

/// A rejected board operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The element handle does not resolve
    #[error("element {0} does not exist")]
    UnknownElement(ElementId),
    /// The wire handle does not resolve
    #[error("wire {0} does not exist")]
    UnknownWire(WireId),
    /// The operation needs a compound
    #[error("element {0} is not a compound")]
    NotACompound(ElementId),
    /// The operation needs an input source
    #[error("element {0} is not an input source")]
    NotASource(ElementId),
    /// The element is already on the board
    #[error("element {0} is already placed")]
    AlreadyPlaced(ElementId),
    /// The element lives inside a compound
    #[error("element {0} belongs to compound {1}")]
    Grouped(ElementId, ElementId),
    /// Adding the child would make a compound contain itself
    #[error("compound {0} cannot contain {1}")]
    Containment(ElementId, ElementId),
    /// No grouping session is open
    #[error("no group is being built")]
    NoGroupInProgress,
    /// Grouping sessions take plain elements only
    #[error("compound {0} cannot be added to a group")]
    CompoundInGroup(ElementId),
    /// Only elements on the board can be grouped
    #[error("element {0} is not placed on the board")]
    NotPlaced(ElementId),
    /// A truth table over this many sources is too large
    #[error("{0} input sources exceed the truth table limit of {1}")]
    TooManySources(usize, usize),
    /// A hard evaluation failure
    #[error(transparent)]
    Eval(#[from] EvalError),
}
