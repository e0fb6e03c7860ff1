/*!

  Directional connection terminals owned by elements.

*/

use crate::{element::ElementId, geometry::Point, wire::WireId};

/// Default distance, in board units, within which a pointer snaps to a pin tip
pub const DEFAULT_SNAP_RADIUS: i32 = 12;

/// The role of a pin in a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub enum Direction {
    /// Receives a value through at most one wire
    Input,
    /// Drives any number of wires
    Output,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

/// Addresses a pin on the board: the owning element and the pin's position in
/// that element's pin list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct PinRef {
    /// The element that owns the pin
    pub element: ElementId,
    /// Index into the owner's pin list
    pub index: usize,
}

impl PinRef {
    /// Creates a new pin address
    pub const fn new(element: ElementId, index: usize) -> Self {
        Self { element, index }
    }
}

impl std::fmt::Display for PinRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.element, self.index)
    }
}

/// A pin on a logic element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    /// Tip position
    tip: Point,
    direction: Direction,
    /// Length of the drawn stub
    stub_len: i32,
    /// Owning element
    owner: ElementId,
    snap_radius: i32,
    /// The single wire feeding this pin. Always [None] on outputs.
    incoming: Option<WireId>,
}

impl Pin {
    /// Creates an unconnected pin at the origin. The owner lays it out.
    pub fn new(owner: ElementId, direction: Direction, stub_len: i32, snap_radius: i32) -> Self {
        Self {
            tip: Point::default(),
            direction,
            stub_len,
            owner,
            snap_radius,
            incoming: None,
        }
    }

    /// Returns the tip position
    pub fn position(&self) -> Point {
        self.tip
    }

    /// Moves the tip
    pub fn set_position(&mut self, tip: Point) {
        self.tip = tip;
    }

    /// Returns the pin direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns `true` for input pins
    pub fn is_input(&self) -> bool {
        self.direction == Direction::Input
    }

    /// Returns `true` for output pins
    pub fn is_output(&self) -> bool {
        self.direction == Direction::Output
    }

    /// Returns the drawn stub length
    pub fn stub_len(&self) -> i32 {
        self.stub_len
    }

    /// Returns the element owning this pin
    pub fn owner(&self) -> ElementId {
        self.owner
    }

    /// Returns the snap radius
    pub fn snap_radius(&self) -> i32 {
        self.snap_radius
    }

    /// Changes the snap radius
    pub fn set_snap_radius(&mut self, r: i32) {
        self.snap_radius = r;
    }

    /// Returns `true` if (`px`, `py`) is within the snap radius of the tip.
    /// Used for both connection hit-testing and hover feedback.
    pub fn is_within_snap(&self, px: i32, py: i32) -> bool {
        let r = self.snap_radius as i64;
        self.tip.distance_sq(Point::new(px, py)) <= r * r
    }

    /// Returns the wire feeding this pin
    pub fn incoming_wire(&self) -> Option<WireId> {
        self.incoming
    }

    /// Returns `true` if a wire feeds this pin
    pub fn has_incoming_wire(&self) -> bool {
        self.incoming.is_some()
    }

    /// Records `wire` as the one feeding this pin, replacing any previous one.
    /// Silently ignored on output pins.
    pub fn set_incoming_wire(&mut self, wire: WireId) {
        if self.is_input() {
            self.incoming = Some(wire);
        }
    }

    /// Forgets the incoming wire, returning it
    pub fn clear_incoming_wire(&mut self) -> Option<WireId> {
        self.incoming.take()
    }
}

impl std::fmt::Display for Pin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.direction {
            Direction::Input => write!(f, "InPin{}", self.tip),
            Direction::Output => write!(f, "OutPin{}", self.tip),
        }
    }
}
